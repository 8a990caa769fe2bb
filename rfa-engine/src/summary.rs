//! Client-level totals.
//!
//! `total_rebate` sums standard and tripartite rebates across suppliers,
//! `total_bonus` sums standard bonuses. Nothing is rounded; display
//! precision belongs to whoever renders the summary.

use std::cmp::Ordering;

use crate::types::{ClientRebateSummary, PerSupplierCalculation};

pub fn build_summary(
    client_id: &str,
    standard_contract_id: Option<&str>,
    per_supplier: Vec<PerSupplierCalculation>,
) -> ClientRebateSummary {
    let total_rebate = per_supplier.iter().map(|p| p.rebate_contribution()).sum();
    let total_bonus = per_supplier.iter().map(|p| p.bonus_contribution()).sum();

    ClientRebateSummary {
        client_id: client_id.to_string(),
        standard_contract_id: standard_contract_id.map(String::from),
        total_rebate,
        total_bonus,
        per_supplier,
    }
}

/// The `k` clients with the largest payout, largest first.
///
/// NaN payouts sort last so they never surface at the top. Ties keep
/// client-id order.
pub fn top_clients(summaries: &[ClientRebateSummary], k: usize) -> Vec<&ClientRebateSummary> {
    let mut ranked: Vec<&ClientRebateSummary> = summaries.iter().collect();
    ranked.sort_by(|a, b| {
        let (pa, pb) = (a.total_payout(), b.total_payout());
        let by_payout = match (pa.is_nan(), pb.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => pb.partial_cmp(&pa).unwrap_or(Ordering::Equal),
        };
        by_payout.then_with(|| a.client_id.cmp(&b.client_id))
    });
    ranked.truncate(k);
    ranked
}
