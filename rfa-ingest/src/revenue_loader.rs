//! CSV revenue loader.
//!
//! Parses purchase-revenue exports into canonical `RevenueEntry` values.
//! Column names are matched through aliases so both English and French
//! exports load without a mapping step. Amounts may use either decimal
//! separator, with space or dot/comma thousands grouping.
//!
//!   client_id | code_union | codeUnion | client
//!   supplier | fournisseur
//!   brand | marque                        (optional)
//!   product_family | famille | family     (optional)
//!   sub_family | sous_famille | sousFamille (optional)
//!   year | annee
//!   amount | ca | revenue

use std::fs::File;
use std::io::Read;
use std::path::Path;

use rfa_engine::RevenueEntry;
use serde::Deserialize;

use crate::error::{IngestError, IngestResult};
use crate::family::FamilyMapping;
use crate::normalize::{brand_key, family_key, text_key};

/// One CSV row as written in the export, before normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct RevenueRecord {
    #[serde(alias = "code_union", alias = "codeUnion", alias = "client")]
    pub client_id: String,
    #[serde(alias = "fournisseur")]
    pub supplier: String,
    #[serde(default, alias = "marque", deserialize_with = "deserialize_text")]
    pub brand: Option<String>,
    #[serde(
        default,
        alias = "famille",
        alias = "family",
        deserialize_with = "deserialize_text"
    )]
    pub product_family: Option<String>,
    #[serde(
        default,
        alias = "sous_famille",
        alias = "sousFamille",
        deserialize_with = "deserialize_text"
    )]
    pub sub_family: Option<String>,
    #[serde(alias = "annee")]
    pub year: i32,
    #[serde(alias = "ca", alias = "revenue", deserialize_with = "deserialize_amount")]
    pub amount: f64,
}

impl RevenueRecord {
    /// Canonical entry: keys trimmed, brand upper-cased, family lower-cased.
    /// A missing family is derived from the sub-family when the mapping knows it.
    pub fn to_entry(&self, mapping: &FamilyMapping) -> RevenueEntry {
        let product_family = self
            .product_family
            .as_deref()
            .or_else(|| {
                self.sub_family
                    .as_deref()
                    .and_then(|sub| mapping.family_for(sub))
            })
            .map(family_key);

        RevenueEntry {
            client_id: text_key(&self.client_id),
            supplier: text_key(&self.supplier),
            brand: self.brand.as_deref().map(brand_key),
            product_family,
            year: self.year,
            amount: self.amount,
        }
    }
}

/// A row left out of the load, by 1-based line number in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    pub entries: Vec<RevenueEntry>,
    pub skipped: Vec<SkippedRow>,
}

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("client_id", &["client_id", "code_union", "codeUnion", "client"]),
    ("supplier", &["supplier", "fournisseur"]),
    ("year", &["year", "annee"]),
    ("amount", &["amount", "ca", "revenue"]),
];

/// Load revenue entries from a CSV reader.
///
/// Fails only when the file itself is unusable (I/O error, missing required
/// column). Rows that do not parse are skipped and reported.
pub fn load_revenue<R: Read>(reader: R, mapping: &FamilyMapping) -> IngestResult<LoadOutcome> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for &(column, accepted) in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| accepted.contains(&h)) {
            return Err(IngestError::MissingColumn {
                column,
                accepted: accepted.join(", "),
            });
        }
    }

    let mut outcome = LoadOutcome::default();
    for (row_index, result) in csv_reader.deserialize::<RevenueRecord>().enumerate() {
        match result {
            Ok(record) => outcome.entries.push(record.to_entry(mapping)),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map_or(row_index as u64 + 2, |p| p.line());
                log::warn!("skipping revenue row at line {}: {}", line, e);
                outcome.skipped.push(SkippedRow {
                    line,
                    reason: e.to_string(),
                });
            }
        }
    }

    log::debug!(
        "loaded {} revenue entries, skipped {} rows",
        outcome.entries.len(),
        outcome.skipped.len()
    );
    Ok(outcome)
}

/// Load revenue entries from a CSV file path.
pub fn load_revenue_file(path: impl AsRef<Path>, mapping: &FamilyMapping) -> IngestResult<LoadOutcome> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_revenue(file, mapping)
}

/// Trimmed text, with blank cells read as absent.
fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Amount deserializer: accepts "1234.5", "1234,50", "1 234,50",
/// "1.234,50" and "1,234.50".
fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_amount(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("expected a numeric amount, got '{}'", raw.trim()))
    })
}

/// The last of `,` and `.` is the decimal separator when both appear. A lone
/// separator that occurs once is decimal; one that repeats groups thousands.
fn parse_amount(raw: &str) -> Option<f64> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\u{202f}')
        .collect();
    if compact.is_empty() {
        return None;
    }

    let decimal = match (compact.rfind(','), compact.rfind('.')) {
        (Some(comma), Some(dot)) => Some(if comma > dot { ',' } else { '.' }),
        (Some(_), None) if compact.matches(',').count() == 1 => Some(','),
        (None, Some(_)) if compact.matches('.').count() == 1 => Some('.'),
        _ => None,
    };
    let normalized: String = compact
        .chars()
        .filter_map(|c| match c {
            ',' | '.' if Some(c) == decimal => Some('.'),
            ',' | '.' => None,
            other => Some(other),
        })
        .collect();
    normalized.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRENCH_CSV: &str = "\
codeUnion,fournisseur,marque,sousFamille,annee,ca
M0001,Alliance,vernet,,2025,\"12500,50\"
M0001,Exadis,,PLAQUETTES DE FREIN VL,2025,30000
M0002,DCA, sbs ,,2025,1 200
M0002,ACR,,,2024,800
";

    #[test]
    fn load_french_headers() {
        let outcome = load_revenue(FRENCH_CSV.as_bytes(), &FamilyMapping::default()).unwrap();
        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.entries.len(), 4);

        let first = &outcome.entries[0];
        assert_eq!(first.client_id, "M0001");
        assert_eq!(first.supplier, "Alliance");
        assert_eq!(first.brand.as_deref(), Some("VERNET"));
        assert!((first.amount - 12_500.5).abs() < 1e-9);

        assert_eq!(outcome.entries[1].product_family.as_deref(), Some("freinage"));
        assert_eq!(outcome.entries[1].brand, None);
        assert_eq!(outcome.entries[2].brand.as_deref(), Some("SBS"));
        assert!((outcome.entries[2].amount - 1_200.0).abs() < 1e-9);
        assert_eq!(outcome.entries[3].year, 2024);
    }

    #[test]
    fn explicit_family_column_wins_over_sub_family() {
        let csv = "\
client_id,supplier,product_family,sub_family,year,amount
C1,ACR,Embrayage,PLAQUETTES DE FREIN VL,2025,100
";
        let outcome = load_revenue(csv.as_bytes(), &FamilyMapping::default()).unwrap();
        assert_eq!(outcome.entries[0].product_family.as_deref(), Some("embrayage"));
    }

    #[test]
    fn bad_rows_are_skipped_with_line_numbers() {
        let csv = "\
client_id,supplier,year,amount
C1,DCA,2025,100
C2,DCA,2025,abc
C3,DCA,next,50
C4,DCA,2025,-20
";
        let outcome = load_revenue(csv.as_bytes(), &FamilyMapping::default()).unwrap();
        assert_eq!(outcome.entries.len(), 2);
        assert_eq!(outcome.skipped.len(), 2);
        assert_eq!(outcome.skipped[0].line, 3);
        assert_eq!(outcome.skipped[1].line, 4);
        // negative amounts reach the engine, which rejects and reports them
        assert!((outcome.entries[1].amount + 20.0).abs() < 1e-9);
    }

    #[test]
    fn dot_grouped_french_amounts_load() {
        let csv = "\
client_id,supplier,year,amount
C1,DCA,2025,\"1.234,50\"
C2,DCA,2025,\"12.345.678,9\"
";
        let outcome = load_revenue(csv.as_bytes(), &FamilyMapping::default()).unwrap();
        assert!(outcome.skipped.is_empty());
        assert!((outcome.entries[0].amount - 1_234.5).abs() < 1e-9);
        assert!((outcome.entries[1].amount - 12_345_678.9).abs() < 1e-6);
    }

    #[test]
    fn missing_required_column_fails_the_file() {
        let csv = "client_id,supplier,year\nC1,DCA,2025\n";
        let err = load_revenue(csv.as_bytes(), &FamilyMapping::default()).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { column: "amount", .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_revenue_file("/nonexistent/revenue.csv", &FamilyMapping::default()).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }

    #[test]
    fn parse_amount_variants() {
        assert_eq!(parse_amount("1234.5"), Some(1234.5));
        assert_eq!(parse_amount("1234,5"), Some(1234.5));
        assert_eq!(parse_amount("12 345,00"), Some(12345.0));
        assert_eq!(parse_amount("1.234,50"), Some(1234.5));
        assert_eq!(parse_amount("1,234.50"), Some(1234.5));
        assert_eq!(parse_amount("1.234.567"), Some(1234567.0));
        assert_eq!(parse_amount("-20"), Some(-20.0));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("n/a"), None);
    }
}
