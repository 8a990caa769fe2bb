//! Per-supplier composition.
//!
//! One standard result plus zero or more tripartite results for a
//! (client, supplier) pair. A missing standard result counts as zero, since a
//! client may rely on tripartite deals alone.

use crate::aggregation::ClientRevenue;
use crate::error::DataIntegrityError;
use crate::schedule::ValidatedContract;
use crate::tiers::compute_standard;
use crate::tripartite::evaluate_agreement;
use crate::types::{PerSupplierCalculation, StandardResult, TripartiteAgreement, TripartiteResult};

/// Compose already-computed results into the supplier's line.
pub fn compose_supplier(
    supplier: &str,
    total_revenue: f64,
    standard_result: Option<StandardResult>,
    tripartite_results: Vec<TripartiteResult>,
) -> PerSupplierCalculation {
    let standard_total = standard_result
        .as_ref()
        .map_or(0.0, |s| s.rebate_amount + s.bonus_amount);
    let tripartite_total: f64 = tripartite_results.iter().map(|t| t.rebate_amount).sum();

    PerSupplierCalculation {
        supplier: supplier.to_string(),
        total_revenue,
        standard_result,
        tripartite_results,
        total_rebate: standard_total + tripartite_total,
    }
}

/// Resolve the standard contract and every applicable agreement for one
/// supplier of one client, then compose them.
///
/// `agreements` may contain agreements for other suppliers; only the ones
/// for `supplier` are evaluated.
pub fn calculate_supplier(
    supplier: &str,
    revenue: Option<&ClientRevenue>,
    contract: Option<&ValidatedContract>,
    agreements: &[&TripartiteAgreement],
) -> Result<PerSupplierCalculation, DataIntegrityError> {
    let total_revenue = revenue.map_or(0.0, |r| r.supplier_total(supplier));

    let standard_result = contract
        .map(|c| compute_standard(total_revenue, c))
        .transpose()?;

    let tripartite_results = agreements
        .iter()
        .filter(|a| a.supplier == supplier)
        .map(|a| {
            let scoped = revenue.map_or(0.0, |r| r.scoped(supplier, a.scope()));
            evaluate_agreement(scoped, a)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let calculation = compose_supplier(supplier, total_revenue, standard_result, tripartite_results);
    log::debug!(
        "supplier {} revenue {:.2} -> total rebate {:.2} ({} overrides)",
        supplier,
        calculation.total_revenue,
        calculation.total_rebate,
        calculation.tripartite_results.len()
    );
    Ok(calculation)
}
