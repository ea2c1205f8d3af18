//! Representations chosen at runtime.
//!
//! Generic code never mixes representations, the compiler sees to that. When
//! the representation is only known at runtime (read from config, handed over
//! by a host language) these closed variants keep the checks alive and report
//! mixing as `TypeMismatch`.

use super::bounds::Bounds;
use super::float::{Float32Array, Float64Array};
use super::traits::{EvalValue, Range, Values};
use crate::error::{PsoError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DynValues {
    F64(Float64Array),
    F32(Float32Array),
}

fn mismatch(expected: &DynValues, found: &DynValues) -> PsoError {
    PsoError::TypeMismatch {
        expected: expected.type_tag(),
        found: found.type_tag(),
    }
}

macro_rules! dispatch_binary {
    ($self:ident, $other:ident, $op:ident) => {{
        match (&mut *$self, $other) {
            (DynValues::F64(a), DynValues::F64(b)) => {
                a.$op(b)?;
            }
            (DynValues::F32(a), DynValues::F32(b)) => {
                a.$op(b)?;
            }
            (a, b) => return Err(mismatch(a, b)),
        }
        Ok($self)
    }};
}

impl Values for DynValues {
    fn dim(&self) -> usize {
        match self {
            DynValues::F64(v) => v.dim(),
            DynValues::F32(v) => v.dim(),
        }
    }

    fn type_tag(&self) -> &'static str {
        match self {
            DynValues::F64(v) => v.type_tag(),
            DynValues::F32(v) => v.type_tag(),
        }
    }

    fn add(&mut self, other: &Self) -> Result<&mut Self> {
        dispatch_binary!(self, other, add)
    }

    fn sub(&mut self, other: &Self) -> Result<&mut Self> {
        dispatch_binary!(self, other, sub)
    }

    fn mul(&mut self, other: &Self) -> Result<&mut Self> {
        dispatch_binary!(self, other, mul)
    }

    fn div(&mut self, other: &Self) -> Result<&mut Self> {
        dispatch_binary!(self, other, div)
    }

    fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        match self {
            DynValues::F64(v) => DynValues::F64(v.random(rng)),
            DynValues::F32(v) => DynValues::F32(v.random(rng)),
        }
    }
}

impl Range<DynValues> for Bounds<DynValues> {
    fn contains(&self, values: &DynValues) -> Result<bool> {
        match (&self.min, &self.max, values) {
            (DynValues::F64(min), DynValues::F64(max), DynValues::F64(v)) => {
                v.within(min, max)
            }
            (DynValues::F32(min), DynValues::F32(max), DynValues::F32(v)) => {
                v.within(min, max)
            }
            (min, _, v) => Err(mismatch(min, v)),
        }
    }

    fn type_tag(&self) -> &'static str {
        self.min.type_tag()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DynEval {
    F64(f64),
    F32(f32),
}

impl DynEval {
    fn type_tag(&self) -> &'static str {
        match self {
            DynEval::F64(_) => "f64",
            DynEval::F32(_) => "f32",
        }
    }
}

impl EvalValue for DynEval {
    fn compare_to(&self, other: &Self) -> Result<Ordering> {
        match (self, other) {
            (DynEval::F64(a), DynEval::F64(b)) => a.compare_to(b),
            (DynEval::F32(a), DynEval::F32(b)) => a.compare_to(b),
            (a, b) => Err(PsoError::TypeMismatch {
                expected: a.type_tag(),
                found: b.type_tag(),
            }),
        }
    }

    /// Always the `F64` variant, as no representation is known here. In an
    /// `F32` run this value fails `compare_to` against every real fitness.
    fn worst() -> Self {
        DynEval::F64(f64::INFINITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn f64s(values: &[f64]) -> DynValues {
        DynValues::F64(Float64Array::new(values.to_vec()))
    }

    fn f32s(values: &[f32]) -> DynValues {
        DynValues::F32(Float32Array::new(values.to_vec()))
    }

    #[test]
    fn same_variant_delegates() {
        let mut a = f64s(&[1.0, 2.0]);
        a.add(&f64s(&[0.5, 0.5])).unwrap();
        assert_eq!(a, f64s(&[1.5, 2.5]));
    }

    #[test]
    fn mixed_variants_are_a_type_mismatch() {
        let mut a = f64s(&[1.0]);
        let err = a.mul(&f32s(&[1.0])).unwrap_err();
        assert!(matches!(err, PsoError::TypeMismatch { .. }));
        // receiver untouched
        assert_eq!(a, f64s(&[1.0]));
    }

    #[test]
    fn tags_follow_the_variant() {
        assert_ne!(f64s(&[0.0]).type_tag(), f32s(&[0.0]).type_tag());
        assert_eq!(f64s(&[0.0]).type_tag(), Float64Array::zeros(1).type_tag());
    }

    #[test]
    fn bounds_check_variant_then_length() {
        let bounds = Bounds::new(f64s(&[0.0, 0.0]), f64s(&[1.0, 1.0])).unwrap();
        assert!(bounds.contains(&f64s(&[1.0, 0.0])).unwrap());
        assert!(matches!(
            bounds.contains(&f32s(&[0.5, 0.5])),
            Err(PsoError::TypeMismatch { .. })
        ));
        assert!(matches!(
            bounds.contains(&f64s(&[0.5])),
            Err(PsoError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn bounds_reject_mixed_min_and_max() {
        let err = Bounds::new(f64s(&[0.0]), f32s(&[1.0])).unwrap_err();
        assert!(matches!(err, PsoError::InvalidArgument(_)));
    }

    #[test]
    fn worst_is_only_comparable_in_double_precision() {
        assert_eq!(
            DynEval::worst().compare_to(&DynEval::F64(1e300)).unwrap(),
            Ordering::Greater
        );
        assert!(matches!(
            DynEval::worst().compare_to(&DynEval::F32(1.0)),
            Err(PsoError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn eval_mismatch() {
        assert!(matches!(
            DynEval::F64(1.0).compare_to(&DynEval::F32(1.0)),
            Err(PsoError::TypeMismatch { .. })
        ));
        assert_eq!(
            DynEval::F32(1.0).compare_to(&DynEval::F32(2.0)).unwrap(),
            Ordering::Less
        );
    }
}
