//! Tier resolution for standard contracts.
//!
//! The matching tier is the one with `minimum <= amount < maximum` (or an
//! unbounded maximum). Validated schedules start at 0 and have no gaps, so
//! every non-negative amount matches exactly one tier.
//!
//! Progression is the distance covered toward the next tier's minimum:
//! `(amount - minimum) / (maximum - minimum) × 100`, clamped to [0, 100].
//! The unbounded top tier always reports 100.

use crate::error::DataIntegrityError;
use crate::math::{percent_of, progress_percent, PERCENT_SCALE};
use crate::schedule::{ValidatedContract, ValidatedSchedule};
use crate::types::{StandardResult, TierMatch};

/// Map a revenue amount onto its tier. Rejects negative and NaN amounts.
pub fn resolve_tier(amount: f64, schedule: &ValidatedSchedule) -> Result<TierMatch, DataIntegrityError> {
    if amount.is_nan() || amount < 0.0 {
        return Err(DataIntegrityError::NegativeRevenue { amount });
    }

    let tiers = schedule.tiers();
    // Validated schedules are non-empty and end unbounded, so the last tier
    // is the only possible fallback.
    let tier_index = tiers
        .iter()
        .position(|t| t.contains(amount))
        .unwrap_or(tiers.len() - 1);
    let tier = tiers[tier_index];

    let progression_percent = match tier.maximum {
        None => PERCENT_SCALE,
        Some(maximum) => progress_percent(amount - tier.minimum, maximum - tier.minimum),
    };

    Ok(TierMatch {
        tier_index,
        tier,
        progression_percent,
    })
}

/// Standard rebate and bonus owed on `amount` under `contract`.
pub fn compute_standard(
    amount: f64,
    contract: &ValidatedContract,
) -> Result<StandardResult, DataIntegrityError> {
    let matched = resolve_tier(amount, &contract.schedule)?;
    Ok(StandardResult {
        contract_id: contract.id.clone(),
        tier_index: matched.tier_index,
        tier: matched.tier,
        rebate_amount: percent_of(amount, matched.tier.rebate_percent),
        bonus_amount: percent_of(amount, matched.tier.bonus_percent),
        progression_percent: matched.progression_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{validate_contract, validate_schedule};
    use crate::types::{StandardContract, Tier};

    fn tier(minimum: f64, maximum: Option<f64>, rebate: f64, bonus: f64) -> Tier {
        Tier {
            minimum,
            maximum,
            rebate_percent: rebate,
            bonus_percent: bonus,
        }
    }

    fn two_tier_schedule() -> ValidatedSchedule {
        validate_schedule(
            "std",
            &[
                tier(0.0, Some(50_000.0), 2.0, 1.0),
                tier(50_000.0, None, 3.0, 1.5),
            ],
        )
        .unwrap()
    }

    fn two_tier_contract() -> ValidatedContract {
        validate_contract(&StandardContract {
            id: "std".into(),
            name: "Standard".into(),
            description: String::new(),
            tiers: two_tier_schedule().tiers().to_vec(),
            active: true,
        })
        .unwrap()
    }

    #[test]
    fn zero_matches_first_tier() {
        let m = resolve_tier(0.0, &two_tier_schedule()).unwrap();
        assert_eq!(m.tier_index, 0);
        assert_eq!(m.tier.minimum, 0.0);
        assert_eq!(m.progression_percent, 0.0);
    }

    #[test]
    fn boundary_amount_belongs_to_upper_tier() {
        let m = resolve_tier(50_000.0, &two_tier_schedule()).unwrap();
        assert_eq!(m.tier_index, 1);
        assert_eq!(m.progression_percent, 100.0);
    }

    #[test]
    fn mid_tier_progression_is_distance_to_next_minimum() {
        let m = resolve_tier(25_000.0, &two_tier_schedule()).unwrap();
        assert_eq!(m.tier_index, 0);
        assert!((m.progression_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn progression_uses_current_tier_width() {
        let schedule = validate_schedule(
            "std",
            &[
                tier(0.0, Some(20_000.0), 0.0, 0.0),
                tier(20_000.0, Some(50_000.0), 1.0, 0.5),
                tier(50_000.0, None, 1.5, 1.0),
            ],
        )
        .unwrap();
        let m = resolve_tier(35_000.0, &schedule).unwrap();
        assert_eq!(m.tier_index, 1);
        assert!((m.progression_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn negative_and_nan_amounts_are_rejected() {
        assert!(matches!(
            resolve_tier(-0.01, &two_tier_schedule()),
            Err(DataIntegrityError::NegativeRevenue { .. })
        ));
        assert!(resolve_tier(f64::NAN, &two_tier_schedule()).is_err());
    }

    #[test]
    fn standard_payout_at_tier_boundary() {
        let result = compute_standard(50_000.0, &two_tier_contract()).unwrap();
        assert!((result.rebate_amount - 1_500.0).abs() < 1e-9);
        assert!((result.bonus_amount - 750.0).abs() < 1e-9);
        assert_eq!(result.progression_percent, 100.0);
        assert_eq!(result.contract_id, "std");
    }

    #[test]
    fn standard_payout_inside_first_tier() {
        let result = compute_standard(25_000.0, &two_tier_contract()).unwrap();
        assert!((result.rebate_amount - 500.0).abs() < 1e-9);
        assert!((result.bonus_amount - 250.0).abs() < 1e-9);
        assert!((result.progression_percent - 50.0).abs() < 1e-9);
    }
}
