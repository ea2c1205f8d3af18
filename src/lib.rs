//! Particle swarm optimization with one worker thread per particle.
//!
//! Particles move through a bounded search space and report improved
//! personal bests to a [`Solver`], which tracks the global best and
//! broadcasts it back to the swarm.
//!
//! ```no_run
//! use std::sync::Arc;
//! use swarm_pso::{Bounds, Float64Array, SolverConfig, Solver};
//!
//! let config = SolverConfig::default().with_max_iterations(500).with_seed(1);
//! let bounds = Arc::new(Bounds::<Float64Array>::unbounded(2));
//! let f = |v: &Float64Array| (v[0] - 3.0).powi(2) + (v[1] + 2.0).powi(2);
//!
//! let solver = Solver::new(f, config.swarm(&bounds)?, config.param(2)?)?;
//! let report = solver.start(&crossbeam::channel::never())?;
//! println!("{:?}", report.best);
//! # Ok::<(), swarm_pso::PsoError>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod optimization;

pub use crate::config::SolverConfig;
pub use crate::core::*;
pub use crate::error::{PsoError, Result};
pub use crate::optimization::*;
