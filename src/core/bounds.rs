use super::traits::Values;
use crate::error::{PsoError, Result};

/// Per-dimension `[min, max]` limits. Only tested against, never used to clamp.
///
/// `min[i] <= max[i]` is left to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds<V> {
    pub(crate) min: V,
    pub(crate) max: V,
}

impl<V: Values> Bounds<V> {
    pub fn new(min: V, max: V) -> Result<Self> {
        if min.type_tag() != max.type_tag() {
            return Err(PsoError::InvalidArgument(format!(
                "min and max have to be the same type ({} vs {})",
                min.type_tag(),
                max.type_tag()
            )));
        }
        if min.dim() != max.dim() {
            return Err(PsoError::InvalidArgument(format!(
                "length of min ({}) and max ({}) have to be the same",
                min.dim(),
                max.dim()
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> &V {
        &self.min
    }

    pub fn max(&self) -> &V {
        &self.max
    }

    pub fn dim(&self) -> usize {
        self.min.dim()
    }
}
