//! Revenue aggregation.
//!
//! Sums canonical revenue entries per (client, supplier) and, inside each
//! supplier, per brand and per product family for scoped agreements.
//! Entries outside the evaluation year are dropped first; negative or
//! non-finite amounts are rejected and reported while every other entry
//! still aggregates. Sums are kept at full precision.

use std::collections::BTreeMap;

use crate::error::DataIntegrityError;
use crate::report::RejectedRecord;
use crate::types::{AgreementScope, RevenueEntry};

/// Revenue of one client with one supplier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SupplierRevenue {
    pub total: f64,
    pub by_brand: BTreeMap<String, f64>,
    pub by_family: BTreeMap<String, f64>,
}

impl SupplierRevenue {
    fn add(&mut self, entry: &RevenueEntry) {
        self.total += entry.amount;
        if let Some(brand) = entry.brand.as_deref() {
            *self.by_brand.entry(brand.to_string()).or_insert(0.0) += entry.amount;
        }
        if let Some(family) = entry.product_family.as_deref() {
            *self.by_family.entry(family.to_string()).or_insert(0.0) += entry.amount;
        }
    }

    /// Revenue an agreement with the given scope is measured on.
    pub fn scoped(&self, scope: AgreementScope<'_>) -> f64 {
        match scope {
            AgreementScope::Supplier => self.total,
            AgreementScope::Brand(brand) => self.by_brand.get(brand).copied().unwrap_or(0.0),
            AgreementScope::Family(family) => {
                self.by_family.get(family).copied().unwrap_or(0.0)
            }
        }
    }
}

/// All in-year revenue of one client, keyed by supplier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientRevenue {
    pub suppliers: BTreeMap<String, SupplierRevenue>,
}

impl ClientRevenue {
    pub fn supplier(&self, supplier: &str) -> Option<&SupplierRevenue> {
        self.suppliers.get(supplier)
    }

    pub fn supplier_total(&self, supplier: &str) -> f64 {
        self.supplier(supplier).map_or(0.0, |s| s.total)
    }

    pub fn scoped(&self, supplier: &str, scope: AgreementScope<'_>) -> f64 {
        self.supplier(supplier).map_or(0.0, |s| s.scoped(scope))
    }
}

/// Aggregated revenue plus the entries that did not make it in.
#[derive(Clone, Debug, Default)]
pub struct RevenueAggregate {
    pub clients: BTreeMap<String, ClientRevenue>,
    pub rejected: Vec<RejectedRecord>,
    /// Entries dropped because they belong to another year.
    pub excluded: usize,
}

impl RevenueAggregate {
    pub fn client(&self, client_id: &str) -> Option<&ClientRevenue> {
        self.clients.get(client_id)
    }

    pub fn supplier_total(&self, client_id: &str, supplier: &str) -> f64 {
        self.client(client_id)
            .map_or(0.0, |c| c.supplier_total(supplier))
    }
}

/// Aggregate `entries` for `evaluation_year`.
pub fn aggregate_revenue(entries: &[RevenueEntry], evaluation_year: i32) -> RevenueAggregate {
    let mut aggregate = RevenueAggregate::default();

    for (index, entry) in entries.iter().enumerate() {
        if entry.year != evaluation_year {
            aggregate.excluded += 1;
            continue;
        }

        if let Err(error) = check_amount(entry) {
            log::warn!("rejected revenue entry #{}: {}", index, error);
            aggregate.rejected.push(RejectedRecord { index, error });
            continue;
        }

        aggregate
            .clients
            .entry(entry.client_id.clone())
            .or_default()
            .suppliers
            .entry(entry.supplier.clone())
            .or_default()
            .add(entry);
    }

    log::debug!(
        "aggregated {} entries for {}: {} clients, {} rejected, {} out of year",
        entries.len(),
        evaluation_year,
        aggregate.clients.len(),
        aggregate.rejected.len(),
        aggregate.excluded
    );

    aggregate
}

fn check_amount(entry: &RevenueEntry) -> Result<(), DataIntegrityError> {
    if !entry.amount.is_finite() {
        return Err(DataIntegrityError::NonFiniteAmount {
            client_id: entry.client_id.clone(),
            supplier: entry.supplier.clone(),
        });
    }
    if entry.amount < 0.0 {
        return Err(DataIntegrityError::NegativeAmount {
            client_id: entry.client_id.clone(),
            supplier: entry.supplier.clone(),
            amount: entry.amount,
        });
    }
    Ok(())
}
