use crate::core::{EvalValue, Values};
use crate::error::PsoError;
use std::sync::Arc;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A `true` arrived on the stop channel, or its sender went away
    Signal,
    /// The callback asked to stop
    Callback,
    /// Every particle worker has finished on its own
    SwarmExhausted,
}

/// A particle worker that stopped because of an error.
#[derive(Debug)]
pub struct WorkerFailure {
    pub particle: usize,
    pub error: PsoError,
}

/// Outcome of `Solver::start`
#[derive(Debug)]
pub struct SolveReport<V, E> {
    pub best: Option<V>,
    pub best_value: Option<E>,
    /// Personal-best reports received from the swarm
    pub reports: usize,
    /// Reports that became the new global best
    pub improvements: usize,
    pub stop_reason: StopReason,
    pub failures: Vec<WorkerFailure>,
}

impl<V, E> SolveReport<V, E> {
    pub fn success(&self) -> bool {
        self.best.is_some() && self.failures.is_empty()
    }
}

/// A report that replaced the global best.
#[derive(Debug, Clone)]
pub struct Improvement<V, E> {
    /// 1-based count of improvements in this run
    pub sequence: usize,
    /// Index of the particle that found it
    pub particle: usize,
    pub position: Arc<V>,
    pub value: E,
}

/// Progress hook driven by the coordination loop.
///
/// Called on the coordinator thread, so the swarm keeps running while a
/// callback works but no new global best is adopted until it returns.
pub trait SolverCallback<V: Values, E: EvalValue> {
    /// Called each time the global best improves. An error aborts the run.
    fn on_improvement(&mut self, improvement: &Improvement<V, E>) -> Result<(), String>;

    /// Checked after every processed report.
    fn should_stop(&self) -> bool {
        false
    }
}

/// Callback that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCallback;

impl<V: Values, E: EvalValue> SolverCallback<V, E> for NoopCallback {
    fn on_improvement(&mut self, _improvement: &Improvement<V, E>) -> Result<(), String> {
        Ok(())
    }
}
