//! JSON rebate setup loader.
//!
//! ```json
//! {
//!   "configuration": {
//!     "standard_contracts": [{ "id": "...", "name": "...", "active": true,
//!       "tiers": [{ "minimum": 0, "maximum": null, "rebate_percent": 2, "bonus_percent": 1 }] }],
//!     "tripartite_agreements": [{ "supplier": "DCA", "brand": "SBS",
//!       "revenue_threshold": 25000, "rebate_percent": 3, "active": true }]
//!   },
//!   "assignments": [{ "client_id": "M0001", "standard_contract_id": "...",
//!     "tripartites": [{ "supplier": "DCA", "brand": "SBS", "active": true }] }],
//!   "family_mapping": { "families": [{ "family": "freinage", "sub_families": ["KITS DE FREIN VL"] }] }
//! }
//! ```
//!
//! A `null` tier maximum is the unbounded top tier. `assignments` and
//! `family_mapping` are optional.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use rfa_engine::{ClientContractAssignment, RfaConfiguration};
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, IngestResult};
use crate::family::FamilyMapping;
use crate::normalize::{normalize_agreement, normalize_assignment, text_key};

/// Everything needed besides revenue to run one computation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RfaSetup {
    pub configuration: RfaConfiguration,
    #[serde(default)]
    pub assignments: Vec<ClientContractAssignment>,
    #[serde(default)]
    pub family_mapping: Option<FamilyMapping>,
}

impl RfaSetup {
    /// The setup's own mapping, or the built-in one.
    pub fn family_mapping(&self) -> FamilyMapping {
        self.family_mapping.clone().unwrap_or_default()
    }

    /// Put agreement, reference and assignment keys in the same canonical
    /// spelling as loaded revenue rows: trimmed, brand upper-cased, family
    /// lower-cased.
    pub fn normalize(&mut self) {
        for contract in &mut self.configuration.standard_contracts {
            contract.id = text_key(&contract.id);
        }
        self.configuration
            .tripartite_agreements
            .iter_mut()
            .for_each(normalize_agreement);
        self.assignments.iter_mut().for_each(normalize_assignment);
    }
}

/// Load a setup and normalize its keys.
pub fn load_setup<R: Read>(reader: R) -> IngestResult<RfaSetup> {
    let mut setup: RfaSetup = serde_json::from_reader(reader)?;
    setup.normalize();
    log::debug!(
        "setup: {} contracts, {} agreements, {} assignments",
        setup.configuration.standard_contracts.len(),
        setup.configuration.tripartite_agreements.len(),
        setup.assignments.len()
    );
    Ok(setup)
}

pub fn load_setup_file(path: impl AsRef<Path>) -> IngestResult<RfaSetup> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_setup(BufReader::new(file))
}
