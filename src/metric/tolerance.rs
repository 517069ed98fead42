//! Floating-point comparison with relative and absolute tolerance.
//!
//! Two values `a` and `b` are close when `|a - b| <= atol + rtol * |b|`.
//! The comparison is asymmetric in `b`, the reference value.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_ATOL, DEFAULT_RTOL};

/// Relative/absolute tolerance pair threaded through every numeric test.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Relative tolerance (scaled by the reference value).
    pub rtol: f64,

    /// Absolute tolerance.
    pub atol: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            rtol: DEFAULT_RTOL,
            atol: DEFAULT_ATOL,
        }
    }
}

impl Tolerance {
    pub fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol }
    }

    /// Whether `a` is close to the reference value `b`.
    #[inline]
    pub fn is_close(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.atol + self.rtol * b.abs()
    }

    #[inline]
    pub fn is_zero(&self, a: f64) -> bool {
        self.is_close(a, 0.0)
    }

    /// `a >= 0` up to tolerance.
    #[inline]
    pub fn non_negative(&self, a: f64) -> bool {
        a > 0.0 || self.is_zero(a)
    }

    /// `a <= b` up to tolerance.
    #[inline]
    pub fn at_most(&self, a: f64, b: f64) -> bool {
        a < b || self.is_close(a, b)
    }

    /// Snap a blend coefficient to exactly 0 or 1 when it is close to either.
    pub fn snap_unit(&self, a: f64) -> f64 {
        if self.is_zero(a) {
            0.0
        } else if self.is_close(a, 1.0) {
            1.0
        } else {
            a
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let tol = Tolerance::default();
        assert_eq!(tol.rtol, 1e-5);
        assert_eq!(tol.atol, 1e-8);
    }

    #[test]
    fn test_is_close_scales_with_reference() {
        let tol = Tolerance::default();
        assert!(tol.is_close(1000.0, 1000.005));
        assert!(!tol.is_close(1.0, 1.001));
        assert!(tol.is_zero(5e-9));
        assert!(!tol.is_zero(1e-6));
    }

    #[test]
    fn test_non_negative() {
        let tol = Tolerance::default();
        assert!(tol.non_negative(0.0));
        assert!(tol.non_negative(-1e-9));
        assert!(!tol.non_negative(-1e-4));
    }

    #[test]
    fn test_snap_unit() {
        let tol = Tolerance::default();
        assert_eq!(tol.snap_unit(1e-10), 0.0);
        assert_eq!(tol.snap_unit(1.0 - 1e-7), 1.0);
        assert!((tol.snap_unit(0.25) - 0.25).abs() < 1e-15);
    }

    #[test]
    fn test_at_most() {
        let tol = Tolerance::default();
        assert!(tol.at_most(1.0, 2.0));
        assert!(tol.at_most(2.0 + 1e-9, 2.0));
        assert!(!tol.at_most(2.1, 2.0));
    }
}
