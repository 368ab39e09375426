use crate::DnError;

/// Floating point type used throughout the solver.
pub type Real = f64;

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

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, DnError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(DnError::NonFinite { what, value: v })
    }
}

/// Round half away from zero to `decimals` places.
pub fn round_to(v: Real, decimals: i32) -> Real {
    let scale = 10f64.powi(decimals);
    (v * scale).round() / scale
}

/// Mean of the defined values, `None` when nothing is defined.
pub fn nanmean<I>(values: I) -> Option<Real>
where
    I: IntoIterator<Item = Option<Real>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as Real)
}

/// Largest absolute difference between pairs that are defined on both sides.
pub fn max_abs_diff(a: &[Option<Real>], b: &[Option<Real>]) -> Real {
    a.iter()
        .zip(b)
        .filter_map(|(x, y)| Some((x.as_ref()? - y.as_ref()?).abs()))
        .fold(0.0, Real::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn round_to_five_places() {
        assert_eq!(round_to(1.234_567_8, 5), 1.234_57);
        assert_eq!(round_to(-0.000_004, 5), -0.0);
    }

    #[test]
    fn nanmean_skips_undefined() {
        assert_eq!(nanmean([Some(1.0), None, Some(3.0)]), Some(2.0));
        assert_eq!(nanmean([None, None]), None);
        assert_eq!(nanmean(Vec::<Option<Real>>::new()), None);
    }

    #[test]
    fn max_abs_diff_ignores_half_defined_pairs() {
        let a = [Some(1.0), None, Some(5.0)];
        let b = [Some(1.5), Some(100.0), Some(4.0)];
        assert_eq!(max_abs_diff(&a, &b), 1.0);
    }

    proptest! {
        #[test]
        fn nanmean_is_bounded(values in proptest::collection::vec(-1e6f64..1e6, 1..20)) {
            let mean = nanmean(values.iter().copied().map(Some)).unwrap();
            let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(mean >= lo - 1e-9 && mean <= hi + 1e-9);
        }
    }
}
