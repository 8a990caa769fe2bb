//! Batch report: computed summaries together with everything that was
//! rejected, excluded or refused, so totals stay traceable.

use serde::Serialize;

use crate::error::{ConfigurationError, DataIntegrityError, EngineError};
use crate::types::ClientRebateSummary;

/// An input record left out of the computation, by position in its input list.
#[derive(Clone, Debug, PartialEq)]
pub struct RejectedRecord {
    pub index: usize,
    pub error: DataIntegrityError,
}

/// A client whose computation was refused rather than defaulted.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientRefusal {
    pub client_id: String,
    pub error: EngineError,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BatchTotals {
    pub clients: usize,
    pub clients_with_contract: usize,
    pub clients_with_tripartite: usize,
    pub total_rebate: f64,
    pub total_bonus: f64,
}

impl BatchTotals {
    pub fn from_summaries(summaries: &[ClientRebateSummary]) -> Self {
        summaries.iter().fold(Self::default(), |mut totals, s| {
            totals.clients += 1;
            if s.standard_contract_id.is_some() {
                totals.clients_with_contract += 1;
            }
            if s.per_supplier.iter().any(|p| !p.tripartite_results.is_empty()) {
                totals.clients_with_tripartite += 1;
            }
            totals.total_rebate += s.total_rebate;
            totals.total_bonus += s.total_bonus;
            totals
        })
    }

    pub fn total_payout(&self) -> f64 {
        self.total_rebate + self.total_bonus
    }
}

/// Result of one computation pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RebateReport {
    pub evaluation_year: i32,
    /// One summary per computed client, sorted by client id.
    pub summaries: Vec<ClientRebateSummary>,
    /// Revenue entries rejected, indexed into the input entries.
    pub rejected_entries: Vec<RejectedRecord>,
    /// Agreements rejected, indexed into the configuration's agreement list.
    pub rejected_agreements: Vec<RejectedRecord>,
    /// Contracts blocked by validation, in contract-id order.
    pub contract_errors: Vec<ConfigurationError>,
    pub refused_clients: Vec<ClientRefusal>,
    /// Entries belonging to another year.
    pub excluded_entries: usize,
    pub totals: BatchTotals,
}

impl RebateReport {
    pub fn summary(&self, client_id: &str) -> Option<&ClientRebateSummary> {
        self.summaries
            .binary_search_by(|s| s.client_id.as_str().cmp(client_id))
            .ok()
            .map(|i| &self.summaries[i])
    }

    /// Number of inputs that did not contribute to any total.
    pub fn skipped_count(&self) -> usize {
        self.rejected_entries.len() + self.rejected_agreements.len() + self.refused_clients.len()
    }

    pub fn is_clean(&self) -> bool {
        self.skipped_count() == 0 && self.contract_errors.is_empty()
    }
}
