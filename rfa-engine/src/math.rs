//! Shared arithmetic for payout and progression figures.

/// Percentages are stored as 0..=100, not as fractions.
pub const PERCENT_SCALE: f64 = 100.0;

/// `amount × percent / 100`, unrounded.
pub fn percent_of(amount: f64, percent: f64) -> f64 {
    amount * percent / PERCENT_SCALE
}

/// `numerator / denominator × 100` clamped to [0, 100].
///
/// A non-positive denominator means the target is already reached.
pub fn progress_percent(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        return PERCENT_SCALE;
    }
    (numerator / denominator * PERCENT_SCALE).clamp(0.0, PERCENT_SCALE)
}
