//! Engine error types.
//!
//! Every failure mode has a named variant. No stringly-typed errors.
//!
//! `ConfigurationError` blocks the contract it names. `DataIntegrityError`
//! rejects a single record and is reported alongside the computed totals.

use thiserror::Error;

/// A standard contract whose tier schedule cannot be trusted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("contract '{contract_id}' has no tiers")]
    EmptySchedule { contract_id: String },

    #[error("contract '{contract_id}': first tier starts at {minimum}, must start at 0")]
    FirstTierNotAtZero { contract_id: String, minimum: f64 },

    #[error("contract '{contract_id}', tier {tier_index}: {field} is not a finite number")]
    NonFiniteBound {
        contract_id: String,
        tier_index: usize,
        field: &'static str,
    },

    #[error(
        "contract '{contract_id}', tier {tier_index}: maximum {maximum} is not above minimum {minimum}"
    )]
    InvertedBounds {
        contract_id: String,
        tier_index: usize,
        minimum: f64,
        maximum: f64,
    },

    #[error(
        "contract '{contract_id}', tier {tier_index}: minimum {got} does not continue previous maximum {expected}"
    )]
    NotContiguous {
        contract_id: String,
        tier_index: usize,
        expected: f64,
        got: f64,
    },

    #[error("contract '{contract_id}', tier {tier_index}: only the last tier may be unbounded")]
    UnboundedNotLast {
        contract_id: String,
        tier_index: usize,
    },

    #[error("contract '{contract_id}': last tier must have an unbounded maximum")]
    MissingUnboundedTier { contract_id: String },

    #[error(
        "contract '{contract_id}', tier {tier_index}: {field} {value} outside [0, 100]"
    )]
    PercentOutOfRange {
        contract_id: String,
        tier_index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("standard contract '{contract_id}' is not in the configuration")]
    UnknownContract { contract_id: String },

    #[error("standard contract id '{contract_id}' is declared more than once")]
    DuplicateContract { contract_id: String },
}

impl ConfigurationError {
    /// The contract this error blocks.
    pub fn contract_id(&self) -> &str {
        match self {
            ConfigurationError::EmptySchedule { contract_id }
            | ConfigurationError::FirstTierNotAtZero { contract_id, .. }
            | ConfigurationError::NonFiniteBound { contract_id, .. }
            | ConfigurationError::InvertedBounds { contract_id, .. }
            | ConfigurationError::NotContiguous { contract_id, .. }
            | ConfigurationError::UnboundedNotLast { contract_id, .. }
            | ConfigurationError::MissingUnboundedTier { contract_id }
            | ConfigurationError::PercentOutOfRange { contract_id, .. }
            | ConfigurationError::UnknownContract { contract_id }
            | ConfigurationError::DuplicateContract { contract_id } => contract_id,
        }
    }
}

/// A single input record that cannot take part in the computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataIntegrityError {
    #[error("revenue entry for client '{client_id}' / supplier '{supplier}' has negative amount {amount}")]
    NegativeAmount {
        client_id: String,
        supplier: String,
        amount: f64,
    },

    #[error("revenue entry for client '{client_id}' / supplier '{supplier}' has a non-finite amount")]
    NonFiniteAmount { client_id: String, supplier: String },

    #[error("revenue amount {amount} is not a non-negative number")]
    NegativeRevenue { amount: f64 },

    #[error("tripartite agreement {supplier}/{scope} has negative threshold {threshold}")]
    NegativeThreshold {
        supplier: String,
        scope: String,
        threshold: f64,
    },

    #[error("tripartite agreement {supplier}/{scope} has a non-finite threshold")]
    NonFiniteThreshold { supplier: String, scope: String },

    #[error("tripartite agreement {supplier}/{scope} has rebate percent {value} outside [0, 100]")]
    AgreementPercentOutOfRange {
        supplier: String,
        scope: String,
        value: f64,
    },

    #[error("tripartite agreement {supplier}/{scope} is declared more than once")]
    DuplicateAgreement { supplier: String, scope: String },

    #[error("tripartite agreement for '{supplier}' names both brand '{brand}' and family '{family}'")]
    AmbiguousScope {
        supplier: String,
        brand: String,
        family: String,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    DataIntegrity(#[from] DataIntegrityError),
}

/// Result type alias for fallible engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
