use crate::core::Values;
use crate::error::{PsoError, Result};

/// PSO coefficients, one entry per dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Param<V> {
    w: V,  // inertia weight
    c1: V, // cognitive, pull toward the personal best
    c2: V, // social, pull toward the global best
}

impl<V: Values> Param<V> {
    pub fn new(w: V, c1: V, c2: V) -> Result<Self> {
        let tag = w.type_tag();
        if c1.type_tag() != tag || c2.type_tag() != tag {
            return Err(PsoError::InvalidArgument(format!(
                "all parameters have to be the same type (w: {}, c1: {}, c2: {})",
                tag,
                c1.type_tag(),
                c2.type_tag()
            )));
        }
        if c1.dim() != w.dim() || c2.dim() != w.dim() {
            return Err(PsoError::InvalidArgument(format!(
                "all parameters have to share one dimension (w: {}, c1: {}, c2: {})",
                w.dim(),
                c1.dim(),
                c2.dim()
            )));
        }
        Ok(Self { w, c1, c2 })
    }

    pub fn w(&self) -> &V {
        &self.w
    }

    pub fn c1(&self) -> &V {
        &self.c1
    }

    pub fn c2(&self) -> &V {
        &self.c2
    }

    pub fn dim(&self) -> usize {
        self.w.dim()
    }

    pub fn type_tag(&self) -> &'static str {
        self.w.type_tag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DynValues, Float32Array, Float64Array};

    #[test]
    fn accepts_matching_coefficients() {
        let param = Param::new(
            Float64Array::filled(2, 0.7),
            Float64Array::filled(2, 1.5),
            Float64Array::filled(2, 1.5),
        )
        .unwrap();
        assert_eq!(param.dim(), 2);
        assert_eq!(param.w().as_slice(), &[0.7, 0.7]);
    }

    #[test]
    fn rejects_mixed_dimensions() {
        let err = Param::new(
            Float64Array::filled(2, 0.7),
            Float64Array::filled(3, 1.5),
            Float64Array::filled(2, 1.5),
        )
        .unwrap_err();
        assert!(matches!(err, PsoError::InvalidArgument(_)));
    }

    #[test]
    fn rejects_mixed_representations() {
        let err = Param::new(
            DynValues::F64(Float64Array::filled(1, 0.7)),
            DynValues::F32(Float32Array::filled(1, 1.5)),
            DynValues::F64(Float64Array::filled(1, 1.5)),
        )
        .unwrap_err();
        assert!(matches!(err, PsoError::InvalidArgument(_)));
    }
}
