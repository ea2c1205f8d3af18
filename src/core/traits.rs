use crate::error::Result;
use rand::Rng;
use std::cmp::Ordering;
use std::fmt::Debug;

/// Position and velocity vectors of a particle.
///
/// The four arithmetic operations work element-wise, mutate the receiver and
/// hand it back so calls can be chained:
///
/// ```ignore
/// velocity.mul(param.w())?.add(&cognitive)?.add(&social)?;
/// ```
///
/// Callers that still need the untouched operand must `clone()` it first.
pub trait Values: Clone + Debug + Send + Sync + 'static {
    /// Number of dimensions
    fn dim(&self) -> usize;

    /// Tag identifying the concrete representation.
    ///
    /// Vectors taking part in one run must all carry the same tag.
    fn type_tag(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Add `other` into self
    fn add(&mut self, other: &Self) -> Result<&mut Self>;

    /// Subtract `other` from self
    fn sub(&mut self, other: &Self) -> Result<&mut Self>;

    /// Multiply self by `other`
    fn mul(&mut self, other: &Self) -> Result<&mut Self>;

    /// Divide self by `other`
    fn div(&mut self, other: &Self) -> Result<&mut Self>;

    /// New vector of the same shape, each element uniform on [0, 1).
    fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Self;
}

/// Fitness produced by a target function. Lower is better.
pub trait EvalValue: Clone + Debug + Send + Sync + 'static {
    /// `Less` if self is strictly better than `other`.
    fn compare_to(&self, other: &Self) -> Result<Ordering>;

    /// Value reported for an absent input; never better than anything.
    fn worst() -> Self;
}

/// Admissible region of the search space.
pub trait Range<V: Values>: Debug + Send + Sync {
    /// Whether every element of `values` lies inside its interval, inclusive.
    fn contains(&self, values: &V) -> Result<bool>;

    /// Tag of the representation this range accepts.
    fn type_tag(&self) -> &'static str;
}

/// Objective function being minimized.
pub trait TargetFunc<V: Values>: Send + Sync {
    type Output: EvalValue;

    fn eval(&self, values: &V) -> Self::Output;

    /// Evaluate a possibly absent solution; `None` yields the worst value.
    fn eval_or_worst(&self, values: Option<&V>) -> Self::Output {
        values.map_or_else(Self::Output::worst, |v| self.eval(v))
    }
}

impl<V, E, F> TargetFunc<V> for F
where
    V: Values,
    E: EvalValue,
    F: Fn(&V) -> E + Send + Sync,
{
    type Output = E;

    fn eval(&self, values: &V) -> E {
        self(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Float64Array;

    fn sum(v: &Float64Array) -> f64 {
        v.iter().sum()
    }

    #[test]
    fn closures_are_target_functions() {
        let offset = 2.0;
        let f = move |v: &Float64Array| v[0] + offset;
        assert_eq!(f.eval(&Float64Array::new(vec![1.0])), 3.0);
    }

    #[test]
    fn absent_input_evaluates_to_worst() {
        let f = sum;
        assert_eq!(f.eval_or_worst(None::<&Float64Array>), f64::INFINITY);
        assert_eq!(f.eval_or_worst(Some(&Float64Array::filled(3, 1.0))), 3.0);
    }
}
