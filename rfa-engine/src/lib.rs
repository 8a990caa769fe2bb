//! RFA engine: rebate, bonus and tripartite override payouts for
//! purchasing-group members.
//!
//! The engine is a pure, synchronous function of its inputs:
//! canonical revenue entries, an immutable `RfaConfiguration` and the
//! client assignments. It performs no I/O and keeps no state between calls.
//!
//! Stages, leaves first:
//! - `aggregation` sums revenue per (client, supplier) and per brand/family
//! - `schedule` validates standard-contract tier lists
//! - `tiers` resolves an amount to its tier and progression
//! - `tripartite` evaluates override agreements
//! - `calculator` composes one supplier's line
//! - `summary` totals a client
//! - `engine` runs the whole pass and builds the `RebateReport`

#![forbid(unsafe_code)]

pub mod aggregation;
pub mod calculator;
pub mod engine;
pub mod error;
pub mod math;
pub mod report;
pub mod schedule;
pub mod summary;
pub mod tiers;
pub mod tripartite;
pub mod types;

pub use aggregation::{aggregate_revenue, ClientRevenue, RevenueAggregate, SupplierRevenue};
pub use calculator::{calculate_supplier, compose_supplier};
pub use engine::{compute_rebates, RebateEngine};
pub use error::{ConfigurationError, DataIntegrityError, EngineError, EngineResult};
pub use report::{BatchTotals, ClientRefusal, RebateReport, RejectedRecord};
pub use schedule::{validate_contract, validate_schedule, ContractCatalog, ValidatedContract, ValidatedSchedule};
pub use summary::{build_summary, top_clients};
pub use tiers::{compute_standard, resolve_tier};
pub use tripartite::{check_agreement, evaluate_agreement, AgreementCatalog};
pub use types::{
    AgreementScope, ClientContractAssignment, ClientRebateSummary, EngineOptions,
    PerSupplierCalculation, RevenueEntry, RfaConfiguration, StandardContract, StandardResult, Tier,
    TierMatch, TripartiteAgreement, TripartiteReference, TripartiteResult,
};
