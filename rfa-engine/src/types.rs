use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input records
// ---------------------------------------------------------------------------

/// One canonical revenue line: a client's purchases from a supplier for a year.
///
/// Produced by the ingestion boundary; the engine never sees raw import rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevenueEntry {
    pub client_id: String,
    pub supplier: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub product_family: Option<String>,
    pub year: i32,
    pub amount: f64,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// A contiguous revenue range and the percentages paid inside it.
///
/// `maximum == None` marks the unbounded top tier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub minimum: f64,
    pub maximum: Option<f64>,
    pub rebate_percent: f64,
    pub bonus_percent: f64,
}

impl Tier {
    pub fn is_unbounded(&self) -> bool {
        self.maximum.is_none()
    }

    /// Minimum-inclusive, maximum-exclusive membership test.
    pub fn contains(&self, amount: f64) -> bool {
        amount >= self.minimum && self.maximum.map_or(true, |max| amount < max)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.maximum {
            Some(max) => write!(f, "{:.0} - {:.0}", self.minimum, max),
            None => write!(f, "{:.0} +", self.minimum),
        }
    }
}

/// The default tiered rebate schedule assigned to a client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardContract {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub tiers: Vec<Tier>,
    pub active: bool,
}

/// Which slice of a client's supplier revenue an agreement is measured on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgreementScope<'a> {
    Supplier,
    Brand(&'a str),
    Family(&'a str),
}

impl fmt::Display for AgreementScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgreementScope::Supplier => write!(f, "*"),
            AgreementScope::Brand(brand) => write!(f, "brand:{}", brand),
            AgreementScope::Family(family) => write!(f, "family:{}", family),
        }
    }
}

/// Supplemental three-party agreement: a flat extra percentage once the
/// scoped revenue reaches the threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripartiteAgreement {
    pub supplier: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub product_family: Option<String>,
    pub revenue_threshold: f64,
    pub rebate_percent: f64,
    pub active: bool,
}

impl TripartiteAgreement {
    /// Scope of the agreement. Brand wins when both are set; the evaluator
    /// rejects such agreements before they are used.
    pub fn scope(&self) -> AgreementScope<'_> {
        match (self.brand.as_deref(), self.product_family.as_deref()) {
            (Some(brand), _) => AgreementScope::Brand(brand),
            (None, Some(family)) => AgreementScope::Family(family),
            (None, None) => AgreementScope::Supplier,
        }
    }

    /// Stable `supplier/scope` label for logs and reports.
    pub fn label(&self) -> String {
        format!("{}/{}", self.supplier, self.scope())
    }

    /// Same supplier, brand and family as `other`.
    pub fn same_target(&self, other: &TripartiteAgreement) -> bool {
        self.supplier == other.supplier
            && self.brand == other.brand
            && self.product_family == other.product_family
    }

    /// Whether an assignment reference designates this agreement.
    pub fn matches(&self, reference: &TripartiteReference) -> bool {
        self.supplier == reference.supplier
            && self.brand == reference.brand
            && self.product_family == reference.product_family
    }
}

/// Contract and agreement catalogs, immutable for one computation pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RfaConfiguration {
    #[serde(default)]
    pub standard_contracts: Vec<StandardContract>,
    #[serde(default)]
    pub tripartite_agreements: Vec<TripartiteAgreement>,
}

/// A client's pointer to one tripartite agreement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripartiteReference {
    pub supplier: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub product_family: Option<String>,
    pub active: bool,
}

/// Which contract and agreements apply to a client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientContractAssignment {
    pub client_id: String,
    #[serde(default)]
    pub standard_contract_id: Option<String>,
    #[serde(default)]
    pub tripartites: Vec<TripartiteReference>,
}

/// Per-pass options. Passed to the entry point, never read from globals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineOptions {
    pub evaluation_year: i32,
}

// ---------------------------------------------------------------------------
// Derived results
// ---------------------------------------------------------------------------

/// Output of the tier resolver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TierMatch {
    pub tier_index: usize,
    pub tier: Tier,
    /// Distance toward the next tier's minimum, in [0, 100].
    pub progression_percent: f64,
}

/// Standard-contract payout for one (client, supplier) pair.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StandardResult {
    pub contract_id: String,
    pub tier_index: usize,
    pub tier: Tier,
    pub rebate_amount: f64,
    pub bonus_amount: f64,
    pub progression_percent: f64,
}

/// Override payout for one agreement on one (client, supplier) pair.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TripartiteResult {
    pub agreement: TripartiteAgreement,
    pub scoped_revenue: f64,
    pub qualified: bool,
    pub rebate_amount: f64,
    pub progression_percent: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PerSupplierCalculation {
    pub supplier: String,
    pub total_revenue: f64,
    /// `None` when the client has no usable standard contract.
    pub standard_result: Option<StandardResult>,
    pub tripartite_results: Vec<TripartiteResult>,
    /// Standard rebate + standard bonus + every tripartite rebate.
    pub total_rebate: f64,
}

impl PerSupplierCalculation {
    /// Rebate share of this supplier: standard rebate plus overrides, no bonus.
    pub fn rebate_contribution(&self) -> f64 {
        let standard = self
            .standard_result
            .as_ref()
            .map_or(0.0, |s| s.rebate_amount);
        standard + self.tripartite_rebate()
    }

    pub fn bonus_contribution(&self) -> f64 {
        self.standard_result
            .as_ref()
            .map_or(0.0, |s| s.bonus_amount)
    }

    pub fn tripartite_rebate(&self) -> f64 {
        self.tripartite_results
            .iter()
            .map(|t| t.rebate_amount)
            .sum()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClientRebateSummary {
    pub client_id: String,
    pub standard_contract_id: Option<String>,
    /// Standard rebates plus tripartite rebates across all suppliers.
    pub total_rebate: f64,
    /// Standard bonuses across all suppliers.
    pub total_bonus: f64,
    pub per_supplier: Vec<PerSupplierCalculation>,
}

impl ClientRebateSummary {
    /// Everything owed to the client. Equals the sum of per-supplier totals.
    pub fn total_payout(&self) -> f64 {
        self.total_rebate + self.total_bonus
    }

    pub fn total_revenue(&self) -> f64 {
        self.per_supplier.iter().map(|s| s.total_revenue).sum()
    }
}
