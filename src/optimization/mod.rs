pub mod callback;
pub mod param;
pub mod solvers;

pub use callback::{HistoryCallback, HistoryEntry};
pub use param::Param;
pub use solvers::{Particle, Solver};
pub use solvers::{Improvement, NoopCallback, SolveReport, SolverCallback, StopReason, WorkerFailure};
