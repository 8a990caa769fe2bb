//! Ingestion boundary for rfa-engine.
//!
//! Turns revenue exports and JSON setups into the canonical inputs the
//! engine consumes. Never computes payouts.

pub mod catalog;
pub mod config_loader;
pub mod error;
pub mod family;
pub mod normalize;
pub mod revenue_loader;

pub use catalog::{default_assignments, default_configuration, DEFAULT_CONTRACT_ID};
pub use config_loader::{load_setup, load_setup_file, RfaSetup};
pub use error::{IngestError, IngestResult};
pub use family::{FamilyMapping, FamilyRule};
pub use revenue_loader::{load_revenue, load_revenue_file, LoadOutcome, RevenueRecord, SkippedRow};
