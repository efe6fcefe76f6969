//! Guarded arithmetic for the save-time reconciliation
//!
//! Reconciling a plan must never fail on bad arithmetic: a collapsed
//! denominator or a non-finite intermediate substitutes a fixed
//! sentinel instead of aborting the save. These helpers make that
//! policy explicit. The provider-group share queries do not use them
//! and signal hard errors instead.

/// Sentinel substituted for a CIR fraction when its denominator collapses.
pub const CIR_FALLBACK: f64 = 0.0001;

/// Divide, substituting `fallback` when the denominator is zero or the
/// quotient is not finite.
#[inline]
pub fn div_or(numerator: f64, denominator: f64, fallback: f64) -> f64 {
    if denominator == 0.0 {
        return fallback;
    }
    let quotient = numerator / denominator;
    if quotient.is_finite() {
        quotient
    } else {
        fallback
    }
}

/// Floor a computed total to a whole number, substituting `fallback`
/// when the value is not finite or negative.
#[inline]
pub fn whole_or(value: f64, fallback: u64) -> u64 {
    if value.is_finite() && value >= 0.0 {
        value as u64
    } else {
        fallback
    }
}

/// Keep a computed rate only when it is finite.
#[inline]
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
