pub mod bounds;
pub mod dynamic;
pub mod float;
pub mod traits;

pub use bounds::Bounds;
pub use dynamic::{DynEval, DynValues};
pub use float::{Float32Array, Float64Array};
pub use traits::{EvalValue, Range, TargetFunc, Values};
