use super::bounds::Bounds;
use super::traits::{EvalValue, Range, Values};
use crate::error::{check_dim, Result};
use rand::distributions::Standard;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::Deref;

macro_rules! float_array {
    ($(#[$meta:meta])* $name:ident, $elem:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Vec<$elem>);

        impl $name {
            pub fn new(values: Vec<$elem>) -> Self {
                Self(values)
            }

            pub fn zeros(dim: usize) -> Self {
                Self(vec![0.0; dim])
            }

            /// Every element set to `value`
            pub fn filled(dim: usize, value: $elem) -> Self {
                Self(vec![value; dim])
            }

            pub fn as_slice(&self) -> &[$elem] {
                &self.0
            }

            pub fn into_inner(self) -> Vec<$elem> {
                self.0
            }

            /// Inclusive per-element containment in `[min, max]`
            pub(crate) fn within(&self, min: &Self, max: &Self) -> Result<bool> {
                check_dim(min.dim(), self.dim())?;
                check_dim(min.dim(), max.dim())?;
                Ok(self
                    .iter()
                    .zip(min.iter().zip(max.iter()))
                    .all(|(v, (lo, hi))| lo <= v && v <= hi))
            }

            #[inline]
            fn zip_with(
                &mut self,
                other: &Self,
                op: impl Fn(&mut $elem, $elem),
            ) -> Result<&mut Self> {
                check_dim(self.0.len(), other.0.len())?;
                for (a, &b) in self.0.iter_mut().zip(other.0.iter()) {
                    op(a, b);
                }
                Ok(self)
            }
        }

        impl From<Vec<$elem>> for $name {
            fn from(values: Vec<$elem>) -> Self {
                Self(values)
            }
        }

        impl Deref for $name {
            type Target = [$elem];

            fn deref(&self) -> &[$elem] {
                &self.0
            }
        }

        impl Values for $name {
            fn dim(&self) -> usize {
                self.0.len()
            }

            fn add(&mut self, other: &Self) -> Result<&mut Self> {
                self.zip_with(other, |a, b| *a += b)
            }

            fn sub(&mut self, other: &Self) -> Result<&mut Self> {
                self.zip_with(other, |a, b| *a -= b)
            }

            fn mul(&mut self, other: &Self) -> Result<&mut Self> {
                self.zip_with(other, |a, b| *a *= b)
            }

            fn div(&mut self, other: &Self) -> Result<&mut Self> {
                self.zip_with(other, |a, b| *a /= b)
            }

            fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
                Self((0..self.0.len()).map(|_| rng.sample::<$elem, _>(Standard)).collect())
            }
        }

        impl Bounds<$name> {
            /// Bounds that admit every finite value in `dim` dimensions.
            pub fn unbounded(dim: usize) -> Self {
                Self {
                    min: $name::filled(dim, $elem::NEG_INFINITY),
                    max: $name::filled(dim, $elem::INFINITY),
                }
            }
        }

        impl Range<$name> for Bounds<$name> {
            fn contains(&self, values: &$name) -> Result<bool> {
                values.within(&self.min, &self.max)
            }

            fn type_tag(&self) -> &'static str {
                self.min.type_tag()
            }
        }

        impl EvalValue for $elem {
            fn compare_to(&self, other: &Self) -> Result<Ordering> {
                // NaN never wins against a number
                Ok(match (self.is_nan(), other.is_nan()) {
                    (false, false) => self.partial_cmp(other).unwrap_or(Ordering::Equal),
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (true, true) => Ordering::Equal,
                })
            }

            fn worst() -> Self {
                $elem::INFINITY
            }
        }
    };
}

float_array!(
    /// `Values` over `Vec<f64>`
    Float64Array,
    f64
);

float_array!(
    /// `Values` over `Vec<f32>`
    Float32Array,
    f32
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PsoError;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use test_case::test_case;

    #[test]
    fn clone_is_detached_from_original() {
        let mut a = Float64Array::new(vec![1.0, 2.0, 3.0]);
        let snapshot = a.clone();
        a.add(&Float64Array::filled(3, 10.0)).unwrap();

        assert_eq!(snapshot.as_slice(), &[1.0, 2.0, 3.0]);
        assert_eq!(a.as_slice(), &[11.0, 12.0, 13.0]);
    }

    #[test]
    fn operations_chain_on_receiver() {
        let mut v = Float64Array::new(vec![2.0, 4.0]);
        v.mul(&Float64Array::new(vec![3.0, 0.5]))
            .unwrap()
            .sub(&Float64Array::new(vec![1.0, 1.0]))
            .unwrap()
            .div(&Float64Array::new(vec![5.0, 1.0]))
            .unwrap();

        assert_eq!(v.as_slice(), &[1.0, 1.0]);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let mut a = Float32Array::zeros(2);
        let err = a.add(&Float32Array::zeros(3)).unwrap_err();
        assert!(matches!(
            err,
            PsoError::DimensionMismatch {
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn random_stays_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(7);
        let template = Float64Array::zeros(64);
        let r = template.random(&mut rng);

        assert_eq!(r.dim(), 64);
        assert!(r.iter().all(|&x| (0.0..1.0).contains(&x)));
        // the template itself is untouched
        assert!(template.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn random_is_reproducible_from_seed() {
        let template = Float32Array::zeros(5);
        let a = template.random(&mut StdRng::seed_from_u64(42));
        let b = template.random(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test_case(vec![0.0, 0.0], true; "at min")]
    #[test_case(vec![1.0, 2.0], true; "at max")]
    #[test_case(vec![0.5, 1.0], true; "inside")]
    #[test_case(vec![-0.1, 1.0], false; "below min")]
    #[test_case(vec![0.5, 2.1], false; "above max")]
    #[test_case(vec![f64::NAN, 1.0], false; "nan")]
    fn bounds_are_inclusive(values: Vec<f64>, expected: bool) {
        let bounds = Bounds::new(
            Float64Array::new(vec![0.0, 0.0]),
            Float64Array::new(vec![1.0, 2.0]),
        )
        .unwrap();
        assert_eq!(bounds.contains(&Float64Array::new(values)).unwrap(), expected);
    }

    #[test]
    fn bounds_reject_wrong_length() {
        let bounds = Bounds::<Float64Array>::unbounded(2);
        assert!(matches!(
            bounds.contains(&Float64Array::zeros(3)),
            Err(PsoError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn bounds_require_matching_lengths() {
        let err = Bounds::new(Float64Array::zeros(2), Float64Array::zeros(3)).unwrap_err();
        assert!(matches!(err, PsoError::InvalidArgument(_)));
    }

    #[test]
    fn unbounded_admits_large_values() {
        let bounds = Bounds::<Float64Array>::unbounded(2);
        assert!(bounds.contains(&Float64Array::new(vec![-1e300, 1e300])).unwrap());
    }

    #[test_case(1.0, 2.0, Ordering::Less)]
    #[test_case(2.0, 2.0, Ordering::Equal)]
    #[test_case(3.0, 2.0, Ordering::Greater)]
    #[test_case(f64::NAN, 2.0, Ordering::Greater)]
    #[test_case(2.0, f64::NAN, Ordering::Less)]
    fn eval_value_ordering(a: f64, b: f64, expected: Ordering) {
        assert_eq!(a.compare_to(&b).unwrap(), expected);
    }

    #[test]
    fn worst_loses_to_everything_finite() {
        assert_eq!(f64::worst().compare_to(&1e300).unwrap(), Ordering::Greater);
        assert_eq!(f32::worst().compare_to(&f32::MAX).unwrap(), Ordering::Greater);
    }

    #[test]
    fn serializes_as_plain_list() {
        let v = Float64Array::new(vec![1.5, -2.0]);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "[1.5,-2.0]");
        let back: Float64Array = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }

    proptest! {
        #[test]
        fn add_then_sub_restores(
            pairs in prop::collection::vec((-1e6f64..1e6, -1e6f64..1e6), 1..16)
        ) {
            let (a, b): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
            let a = Float64Array::new(a);
            let b = Float64Array::new(b);

            let mut c = a.clone();
            c.add(&b).unwrap().sub(&b).unwrap();

            for (x, y) in c.iter().zip(a.iter()) {
                prop_assert!((x - y).abs() <= 1e-9 * (1.0 + y.abs()));
            }
        }
    }
}
