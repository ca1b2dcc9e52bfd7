//! Log-domain sums that cannot overflow.
//!
//! The context-tree mixture never leaves log space: block probabilities
//! shrink geometrically with history length, so the weighted average of two
//! subtree probabilities has to be formed from their logarithms directly.
//! Writing p = exp(hi) and q = exp(lo) with hi ≥ lo,
//!
//! ```text
//! ln(p + q) = hi + ln(1 + exp(lo − hi))
//! ```
//!
//! and the exponent lo − hi is never positive, so the `exp` cannot blow up
//! and `ln_1p` keeps full precision when the small side is negligible.

/// ln(1/2), the prior weight of a node's own estimator in the mixture.
pub const LN_HALF: f64 = -0.693_147_180_559_945_3;

/// ln(exp(a) + exp(b)), factoring the larger operand out of the sum.
///
/// A NEG_INFINITY operand is a zero probability and drops out of the sum.
pub fn log_add_exp(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        return f64::NAN;
    }

    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    if hi == f64::INFINITY {
        return f64::INFINITY;
    }
    if lo == f64::NEG_INFINITY {
        return hi;
    }
    hi + (lo - hi).exp().ln_1p()
}

/// ln(Σᵢ exp(vᵢ)), folding [`log_add_exp`] across the slice.
///
/// An empty slice is an empty sum, so the result is NEG_INFINITY.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    values
        .iter()
        .fold(f64::NEG_INFINITY, |acc, &v| log_add_exp(acc, v))
}
