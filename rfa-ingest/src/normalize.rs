//! Canonical spelling of the text keys the engine matches on.
//!
//! The engine compares client, supplier, brand and family exactly, so every
//! input that carries them (CSV rows, JSON setups) goes through these.

use rfa_engine::{ClientContractAssignment, TripartiteAgreement, TripartiteReference};

pub fn text_key(raw: &str) -> String {
    raw.trim().to_string()
}

pub fn brand_key(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub fn family_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Blank brand or family cells mean "not set".
fn optional_key(raw: Option<&str>, key: fn(&str) -> String) -> Option<String> {
    raw.map(key).filter(|s| !s.is_empty())
}

pub fn normalize_agreement(agreement: &mut TripartiteAgreement) {
    agreement.supplier = text_key(&agreement.supplier);
    agreement.brand = optional_key(agreement.brand.as_deref(), brand_key);
    agreement.product_family = optional_key(agreement.product_family.as_deref(), family_key);
}

pub fn normalize_reference(reference: &mut TripartiteReference) {
    reference.supplier = text_key(&reference.supplier);
    reference.brand = optional_key(reference.brand.as_deref(), brand_key);
    reference.product_family = optional_key(reference.product_family.as_deref(), family_key);
}

pub fn normalize_assignment(assignment: &mut ClientContractAssignment) {
    assignment.client_id = text_key(&assignment.client_id);
    assignment.standard_contract_id =
        optional_key(assignment.standard_contract_id.as_deref(), text_key);
    assignment.tripartites.iter_mut().for_each(normalize_reference);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_csv_conventions() {
        assert_eq!(brand_key(" Sbs "), "SBS");
        assert_eq!(family_key("Etancheite Moteur "), "etancheite moteur");
        assert_eq!(text_key(" DCA "), "DCA");
    }

    #[test]
    fn agreement_and_reference_normalize_alike() {
        let mut agreement = TripartiteAgreement {
            supplier: " Exadis".into(),
            brand: Some("  ".into()),
            product_family: Some("Freinage".into()),
            revenue_threshold: 25_000.0,
            rebate_percent: 2.0,
            active: true,
        };
        let mut reference = TripartiteReference {
            supplier: "Exadis ".into(),
            brand: None,
            product_family: Some("FREINAGE".into()),
            active: true,
        };
        normalize_agreement(&mut agreement);
        normalize_reference(&mut reference);

        assert_eq!(agreement.brand, None);
        assert_eq!(agreement.product_family.as_deref(), Some("freinage"));
        assert!(agreement.matches(&reference));
    }
}
