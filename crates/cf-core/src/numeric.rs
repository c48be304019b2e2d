use crate::{CfError, CfResult};

/// Floating point type used throughout the network.
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: impl Into<String>) -> CfResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CfError::NonFinite {
            what: what.into(),
            value: v,
        })
    }
}

/// Finite and strictly greater than zero.
pub fn ensure_positive(v: Real, what: impl Into<String>) -> CfResult<Real> {
    let what = what.into();
    let v = ensure_finite(v, what.clone())?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(CfError::OutOfRange {
            what,
            value: v,
            expected: "> 0",
        })
    }
}

/// Finite and greater than or equal to zero.
pub fn ensure_non_negative(v: Real, what: impl Into<String>) -> CfResult<Real> {
    let what = what.into();
    let v = ensure_finite(v, what.clone())?;
    if v >= 0.0 {
        Ok(v)
    } else {
        Err(CfError::OutOfRange {
            what,
            value: v,
            expected: ">= 0",
        })
    }
}

/// Check that `r + k1*q + k2*q^2` stays strictly positive for every flow `q`.
///
/// `r` must already be positive and `k1`, `k2` non-negative. The quadratic
/// has no real root when `k1 == 0` or `k1^2 < 4*r*k2`. Returns `k1`.
pub fn ensure_no_zero_crossing(
    r: Real,
    k1: Real,
    k2: Real,
    what: impl Into<String>,
) -> CfResult<Real> {
    if k1 == 0.0 || k1 * k1 < 4.0 * r * k2 {
        Ok(k1)
    } else {
        Err(CfError::ZeroCrossing {
            what: what.into(),
            r,
            k1,
            k2,
        })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn nearly_equal_is_symmetric(a in -1e6_f64..1e6, b in -1e6_f64..1e6) {
            let tol = Tolerances::default();
            prop_assert_eq!(nearly_equal(a, b, tol), nearly_equal(b, a, tol));
        }
    }
}
