//! Small numerically-robust helpers shared by both smoothers and the
//! sanity checker, instead of ad hoc epsilon comparisons scattered through
//! the model code.

/// Absolute-error tolerance used throughout the model for probability
/// normalisation checks.
pub const EPS: f64 = 1e-8;

/// True if `a` and `b` differ by less than `tolerance`.
///
/// # Example
/// ```
/// use pg_math::nearly_eq;
/// assert!(nearly_eq(1.0, 1.0 + 1e-10, 1e-8));
/// assert!(!nearly_eq(1.0, 1.1, 1e-8));
/// ```
#[inline]
pub fn nearly_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

/// Divide `num / den`, returning `default` instead of NaN/inf when `den`
/// is zero.
///
/// # Example
/// ```
/// use pg_math::safe_div;
/// assert_eq!(safe_div(4.0, 2.0, 1.0), 2.0);
/// assert_eq!(safe_div(4.0, 0.0, 1.0), 1.0);
/// ```
#[inline]
pub fn safe_div(num: f64, den: f64, default: f64) -> f64 {
    if den == 0.0 {
        default
    } else {
        num / den
    }
}

/// Clamp `x` into `[0, 1]`, guarding against the small floating-point
/// excursions backoff arithmetic tends to produce at the probability-mass
/// boundaries.
#[inline]
pub fn clamp01(x: f64) -> f64 {
    if x < 0.0 {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}

/// Numerically stable `log(sum(exp(values)))`.
///
/// Empty input returns negative infinity (log of zero). A value of
/// positive infinity dominates and is returned as-is. NaN propagates.
///
/// # Example
/// ```
/// use pg_math::log_sum_exp;
/// let lse = log_sum_exp(&[0.0_f64.ln(), 0.0_f64.ln()]);
/// assert!((lse - 2.0_f64.ln()).abs() < 1e-12);
/// ```
pub fn log_sum_exp(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NEG_INFINITY;
    }
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    if max == f64::INFINITY {
        return f64::INFINITY;
    }
    let sum: f64 = values.iter().map(|v| (v - max).exp()).sum();
    max + sum.ln()
}
