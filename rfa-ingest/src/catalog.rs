//! Built-in rebate catalog: the group's 2024 standard contract and the
//! tripartite agreements negotiated with Alliance, DCA, Exadis and ACR.
//!
//! Used when no configuration file is given.

use rfa_engine::{
    ClientContractAssignment, RfaConfiguration, StandardContract, Tier, TripartiteAgreement,
    TripartiteReference,
};

pub const DEFAULT_CONTRACT_ID: &str = "contrat-standard-2024";

// (minimum, maximum, rebate %, bonus %)
const STANDARD_TIERS: &[(f64, Option<f64>, f64, f64)] = &[
    (0.0, Some(20_000.0), 0.0, 0.0),
    (20_000.0, Some(50_000.0), 1.0, 0.5),
    (50_000.0, Some(75_000.0), 1.5, 1.0),
    (75_000.0, Some(100_000.0), 2.0, 1.5),
    (100_000.0, Some(150_000.0), 2.5, 2.0),
    (150_000.0, Some(200_000.0), 3.0, 2.5),
    (200_000.0, None, 3.5, 3.0),
];

enum Scope {
    Brand(&'static str),
    Family(&'static str),
}

// (supplier, scope, threshold, rebate %)
const AGREEMENTS: &[(&str, Scope, f64, f64)] = &[
    ("Alliance", Scope::Brand("SCHAEFFLER"), 20_000.0, 2.0),
    ("Alliance", Scope::Brand("DELPHI"), 20_000.0, 2.0),
    ("Alliance", Scope::Brand("BREMBO"), 20_000.0, 2.0),
    ("Alliance", Scope::Brand("SOGEFI"), 20_000.0, 2.0),
    ("DCA", Scope::Brand("SBS"), 25_000.0, 3.0),
    ("Exadis", Scope::Family("freinage"), 25_000.0, 2.0),
    ("Exadis", Scope::Family("embrayage"), 25_000.0, 3.0),
    ("Exadis", Scope::Family("filtre"), 25_000.0, 2.0),
    ("Exadis", Scope::Family("distribution"), 25_000.0, 2.0),
    ("Exadis", Scope::Family("etancheite moteur"), 5_000.0, 2.0),
    ("Exadis", Scope::Family("thermique"), 5_000.0, 1.5),
    ("ACR", Scope::Family("freinage"), 25_000.0, 2.0),
    ("ACR", Scope::Family("embrayage"), 25_000.0, 3.0),
    ("ACR", Scope::Family("filtre"), 25_000.0, 1.5),
    ("ACR", Scope::Family("distribution"), 25_000.0, 1.5),
];

pub fn default_contract() -> StandardContract {
    StandardContract {
        id: DEFAULT_CONTRACT_ID.to_string(),
        name: "Contrat Standard 2024".to_string(),
        description: "Progressive tiers with group bonus".to_string(),
        tiers: STANDARD_TIERS
            .iter()
            .map(|&(minimum, maximum, rebate_percent, bonus_percent)| Tier {
                minimum,
                maximum,
                rebate_percent,
                bonus_percent,
            })
            .collect(),
        active: true,
    }
}

pub fn default_agreements() -> Vec<TripartiteAgreement> {
    AGREEMENTS
        .iter()
        .map(|(supplier, scope, threshold, percent)| {
            let (brand, product_family) = match scope {
                Scope::Brand(b) => (Some(b.to_string()), None),
                Scope::Family(f) => (None, Some(f.to_string())),
            };
            TripartiteAgreement {
                supplier: supplier.to_string(),
                brand,
                product_family,
                revenue_threshold: *threshold,
                rebate_percent: *percent,
                active: true,
            }
        })
        .collect()
}

pub fn default_configuration() -> RfaConfiguration {
    RfaConfiguration {
        standard_contracts: vec![default_contract()],
        tripartite_agreements: default_agreements(),
    }
}

/// Assign the default contract and an active reference to every agreement
/// of `configuration` to each client.
pub fn default_assignments<'a, I>(
    client_ids: I,
    configuration: &RfaConfiguration,
) -> Vec<ClientContractAssignment>
where
    I: IntoIterator<Item = &'a str>,
{
    let references: Vec<TripartiteReference> = configuration
        .tripartite_agreements
        .iter()
        .map(|a| TripartiteReference {
            supplier: a.supplier.clone(),
            brand: a.brand.clone(),
            product_family: a.product_family.clone(),
            active: true,
        })
        .collect();

    client_ids
        .into_iter()
        .map(|client_id| ClientContractAssignment {
            client_id: client_id.to_string(),
            standard_contract_id: Some(DEFAULT_CONTRACT_ID.to_string()),
            tripartites: references.clone(),
        })
        .collect()
}
