//! Boundary tests for the numerics helpers, at the inputs the smoothers
//! actually feed them (zero denominators, all-`-inf` backoff sums,
//! single-element sums).

use pg_math::{clamp01, log_sum_exp, nearly_eq, safe_div, EPS};

#[test]
fn safe_div_zero_denominator_uses_default() {
    assert_eq!(safe_div(1.0, 0.0, -1.0), -1.0);
    assert_eq!(safe_div(0.0, 0.0, 0.0), 0.0);
}

#[test]
fn safe_div_nonzero_denominator_divides_normally() {
    assert_eq!(safe_div(10.0, 4.0, 0.0), 2.5);
}

#[test]
fn clamp01_pulls_backoff_overshoot_into_range() {
    assert_eq!(clamp01(1.0 + 1e-12), 1.0);
    assert_eq!(clamp01(-1e-12), 0.0);
    assert_eq!(clamp01(0.5), 0.5);
}

#[test]
fn log_sum_exp_all_neg_infinity_is_neg_infinity() {
    assert_eq!(log_sum_exp(&[f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY]), f64::NEG_INFINITY);
}

#[test]
fn log_sum_exp_single_element_returns_that_element() {
    assert!(nearly_eq(log_sum_exp(&[-3.5]), -3.5, EPS));
}

#[test]
fn log_sum_exp_empty_input_returns_neg_infinity() {
    assert_eq!(log_sum_exp(&[]), f64::NEG_INFINITY);
}

#[test]
fn nearly_eq_respects_the_tolerance_boundary() {
    assert!(nearly_eq(1.0, 1.0 + EPS / 2.0, EPS));
    assert!(!nearly_eq(1.0, 1.0 + EPS * 2.0, EPS));
}
