//! Batch entry point.
//!
//! Pipeline flow for one pass:
//! 1. Aggregate in-year revenue, rejecting bad entries
//! 2. Validate every standard contract once (`ContractCatalog`)
//! 3. Check every tripartite agreement once (`AgreementCatalog`)
//! 4. Per client, in parallel: resolve tiers, evaluate overrides, compose
//!    suppliers, summarize
//! 5. Collect summaries, refusals and totals into a `RebateReport`
//!
//! The catalogs are built before any client runs and are read-only after,
//! so client computations share nothing mutable.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;

use crate::aggregation::{aggregate_revenue, ClientRevenue};
use crate::calculator::calculate_supplier;
use crate::error::{EngineError, EngineResult};
use crate::report::{BatchTotals, ClientRefusal, RebateReport, RejectedRecord};
use crate::schedule::{ContractCatalog, ValidatedContract};
use crate::summary::build_summary;
use crate::tripartite::AgreementCatalog;
use crate::types::{
    ClientContractAssignment, ClientRebateSummary, EngineOptions, RevenueEntry, RfaConfiguration,
    TripartiteAgreement,
};

/// Validated configuration and assignments for one computation pass.
pub struct RebateEngine<'a> {
    contracts: ContractCatalog,
    agreements: AgreementCatalog,
    rejected_agreements: Vec<RejectedRecord>,
    assignments: BTreeMap<&'a str, &'a ClientContractAssignment>,
}

impl<'a> RebateEngine<'a> {
    pub fn new(
        configuration: &RfaConfiguration,
        assignments: &'a [ClientContractAssignment],
    ) -> Self {
        let contracts = ContractCatalog::build(&configuration.standard_contracts);
        let (agreements, rejected_agreements) =
            AgreementCatalog::build(&configuration.tripartite_agreements);

        let mut index: BTreeMap<&'a str, &'a ClientContractAssignment> = BTreeMap::new();
        for assignment in assignments {
            if index.contains_key(assignment.client_id.as_str()) {
                log::warn!(
                    "client '{}' has more than one assignment, keeping the first",
                    assignment.client_id
                );
                continue;
            }
            index.insert(assignment.client_id.as_str(), assignment);
        }

        Self {
            contracts,
            agreements,
            rejected_agreements,
            assignments: index,
        }
    }

    pub fn contracts(&self) -> &ContractCatalog {
        &self.contracts
    }

    pub fn assignment(&self, client_id: &str) -> Option<&'a ClientContractAssignment> {
        self.assignments.get(client_id).copied()
    }

    /// The contract whose schedule applies to the client, if any.
    ///
    /// No assignment, no contract id or an inactive contract all degrade to
    /// `None`. An unknown or invalid contract refuses the client.
    fn standard_contract(&self, client_id: &str) -> EngineResult<Option<&ValidatedContract>> {
        let Some(contract_id) = self
            .assignment(client_id)
            .and_then(|a| a.standard_contract_id.as_deref())
        else {
            return Ok(None);
        };

        let contract = self.contracts.get(contract_id)?;
        if !contract.active {
            log::info!(
                "client '{}': standard contract '{}' is inactive, standard payout is zero",
                client_id,
                contract_id
            );
            return Ok(None);
        }
        Ok(Some(contract))
    }

    /// Compute one client's summary. Independent of every other client.
    pub fn compute_client(
        &self,
        client_id: &str,
        revenue: Option<&ClientRevenue>,
    ) -> Result<ClientRebateSummary, ClientRefusal> {
        let refuse = |error: EngineError| {
            log::warn!("client '{}' refused: {}", client_id, error);
            ClientRefusal {
                client_id: client_id.to_string(),
                error,
            }
        };

        let contract = self.standard_contract(client_id).map_err(refuse)?;

        let agreements: Vec<&TripartiteAgreement> = match self.assignment(client_id) {
            Some(assignment) => self.agreements.applicable(assignment).collect(),
            None => Vec::new(),
        };

        let suppliers: BTreeSet<&str> = revenue
            .into_iter()
            .flat_map(|r| r.suppliers.keys().map(String::as_str))
            .chain(agreements.iter().map(|a| a.supplier.as_str()))
            .collect();

        let per_supplier = suppliers
            .into_iter()
            .map(|supplier| calculate_supplier(supplier, revenue, contract, &agreements))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| refuse(e.into()))?;

        let summary = build_summary(client_id, contract.map(|c| c.id.as_str()), per_supplier);
        log::debug!(
            "client '{}': rebate {:.2}, bonus {:.2} over {} suppliers",
            client_id,
            summary.total_rebate,
            summary.total_bonus,
            summary.per_supplier.len()
        );
        Ok(summary)
    }

    /// Run the whole pass over `entries`.
    pub fn run(&self, entries: &[RevenueEntry], options: EngineOptions) -> RebateReport {
        let aggregate = aggregate_revenue(entries, options.evaluation_year);

        let client_ids: Vec<&str> = aggregate
            .clients
            .keys()
            .map(String::as_str)
            .chain(self.assignments.keys().copied())
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .collect();

        let outcomes: Vec<Result<ClientRebateSummary, ClientRefusal>> = client_ids
            .par_iter()
            .map(|client_id| self.compute_client(client_id, aggregate.client(client_id)))
            .collect();

        let mut summaries = Vec::with_capacity(outcomes.len());
        let mut refused_clients = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(summary) => summaries.push(summary),
                Err(refusal) => refused_clients.push(refusal),
            }
        }

        let totals = BatchTotals::from_summaries(&summaries);
        log::info!(
            "year {}: {} clients computed, {} refused, rebate {:.2}, bonus {:.2}",
            options.evaluation_year,
            totals.clients,
            refused_clients.len(),
            totals.total_rebate,
            totals.total_bonus
        );

        RebateReport {
            evaluation_year: options.evaluation_year,
            summaries,
            rejected_entries: aggregate.rejected,
            rejected_agreements: self.rejected_agreements.clone(),
            contract_errors: self.contracts.errors(),
            refused_clients,
            excluded_entries: aggregate.excluded,
            totals,
        }
    }
}

/// Compute every client's rebate summary for one evaluation year.
///
/// Pure: identical inputs always produce an identical report.
pub fn compute_rebates(
    entries: &[RevenueEntry],
    configuration: &RfaConfiguration,
    assignments: &[ClientContractAssignment],
    options: EngineOptions,
) -> RebateReport {
    RebateEngine::new(configuration, assignments).run(entries, options)
}
