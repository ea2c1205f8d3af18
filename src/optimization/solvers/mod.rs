mod particle;
mod swarm;
pub mod traits;

pub use particle::Particle;
pub use swarm::Solver;
pub use traits::{
    Improvement, NoopCallback, SolveReport, SolverCallback, StopReason, WorkerFailure,
};
