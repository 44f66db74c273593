//! Assertion utilities for testing.
//!
//! This module provides helper functions for making assertions in tests,
//! particularly for floating-point comparisons and undefined grid values.

#![allow(dead_code)]

/// Default epsilon for floating-point comparisons
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Assert that two floating-point values are approximately equal.
///
/// # Panics
///
/// Panics if the absolute difference between `actual` and `expected` is greater than `epsilon`.
pub fn assert_approx_eq(actual: f64, expected: f64, epsilon: Option<f64>) {
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    let diff = (actual - expected).abs();

    assert!(
        diff <= epsilon,
        "Values not approximately equal: actual = {}, expected = {}, diff = {}, epsilon = {}",
        actual,
        expected,
        diff,
        epsilon
    );
}

/// Assert that an optional value is defined and approximately equal to `expected`.
pub fn assert_defined_approx_eq(actual: Option<f64>, expected: f64, epsilon: Option<f64>) {
    match actual {
        Some(v) => assert_approx_eq(v, expected, epsilon),
        None => panic!("Value is undefined, expected {}", expected),
    }
}

/// Assert that two slices of optional values agree element-wise: both
/// undefined, or both defined and approximately equal.
///
/// # Panics
///
/// Panics if the slices have different lengths or if any element-wise comparison fails.
pub fn assert_slice_approx_eq(
    actual: &[Option<f64>],
    expected: &[Option<f64>],
    epsilon: Option<f64>,
) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Slices have different lengths: actual = {}, expected = {}",
        actual.len(),
        expected.len()
    );

    let eps = epsilon.unwrap_or(DEFAULT_EPSILON);
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        match (a, e) {
            (None, None) => {}
            (Some(a), Some(e)) => {
                let diff = (a - e).abs();
                assert!(
                    diff <= eps,
                    "Slices differ at index {}: actual = {}, expected = {}, diff = {}, epsilon = {}",
                    i,
                    a,
                    e,
                    diff,
                    eps
                );
            }
            _ => panic!(
                "Slices differ at index {}: actual = {:?}, expected = {:?}",
                i, a, e
            ),
        }
    }
}

/// Assert that a result is within expected bounds.
///
/// # Panics
///
/// Panics if `actual` is less than `min` or greater than `max`.
pub fn assert_in_range(actual: f64, min: f64, max: f64) {
    assert!(
        actual >= min && actual <= max,
        "Value not in range: actual = {}, min = {}, max = {}",
        actual,
        min,
        max
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_approx_eq() {
        assert_approx_eq(1.0, 1.0, None);
        assert_approx_eq(1.0, 1.0 + 1e-12, None);
        assert_approx_eq(1.0, 1.001, Some(0.01));
    }

    #[test]
    fn test_assert_slice_approx_eq() {
        assert_slice_approx_eq(&[Some(1.0), None], &[Some(1.0 + 1e-12), None], None);
        assert_defined_approx_eq(Some(2.0), 2.0, None);
    }

    #[test]
    fn test_assert_in_range() {
        assert_in_range(5.0, 0.0, 10.0);
        assert_in_range(0.0, 0.0, 10.0);
        assert_in_range(10.0, 0.0, 10.0);
    }
}
