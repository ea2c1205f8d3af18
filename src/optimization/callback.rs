use super::solvers::traits::{Improvement, SolverCallback};
use crate::core::{EvalValue, Values};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Global best recorded at one improvement
#[derive(Debug, Clone)]
pub struct HistoryEntry<V, E> {
    pub sequence: usize,
    pub particle: usize,
    pub position: V,
    pub value: E,
    pub elapsed: Duration,
}

/// Records every improvement of the global best and decides when to stop.
///
/// Stops once the global best is strictly better than the target value, or
/// after a fixed number of improvements, whichever comes first.
pub struct HistoryCallback<V, E> {
    verbose: bool,
    target: Option<E>,
    max_improvements: Option<usize>,
    reached_target: bool,
    history: Vec<HistoryEntry<V, E>>,
    start_time: Instant,
}

impl<V: Values, E: EvalValue> HistoryCallback<V, E> {
    pub fn new() -> Self {
        Self {
            verbose: false,
            target: None,
            max_improvements: None,
            reached_target: false,
            history: Vec::new(),
            start_time: Instant::now(),
        }
    }

    /// Log each improvement at info level instead of debug
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Stop once the global best beats `target`
    pub fn with_target(mut self, target: E) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_max_improvements(mut self, max_improvements: usize) -> Self {
        self.max_improvements = Some(max_improvements);
        self
    }

    pub fn history(&self) -> &[HistoryEntry<V, E>] {
        &self.history
    }

    pub fn last(&self) -> Option<&HistoryEntry<V, E>> {
        self.history.last()
    }

    pub fn reached_target(&self) -> bool {
        self.reached_target
    }

    /// Log a summary of the run
    pub fn log_summary(&self) {
        info!(
            improvements = self.history.len(),
            reached_target = self.reached_target,
            elapsed = ?self.start_time.elapsed(),
            "optimization summary"
        );
        if let Some(last) = self.history.last() {
            info!(value = ?last.value, position = ?last.position, "final global best");
        }
        for entry in &self.history {
            debug!(
                sequence = entry.sequence,
                particle = entry.particle,
                value = ?entry.value,
                elapsed = ?entry.elapsed,
                "improvement"
            );
        }
    }
}

impl<V: Values, E: EvalValue> Default for HistoryCallback<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Values, E: EvalValue> SolverCallback<V, E> for HistoryCallback<V, E> {
    fn on_improvement(&mut self, improvement: &Improvement<V, E>) -> Result<(), String> {
        let elapsed = self.start_time.elapsed();

        if let Some(target) = &self.target {
            let ordering = improvement
                .value
                .compare_to(target)
                .map_err(|e| format!("cannot compare against target: {e}"))?;
            self.reached_target = ordering.is_lt();
        }

        if self.verbose {
            info!(
                sequence = improvement.sequence,
                particle = improvement.particle,
                value = ?improvement.value,
                "global best improved"
            );
        }

        self.history.push(HistoryEntry {
            sequence: improvement.sequence,
            particle: improvement.particle,
            position: (*improvement.position).clone(),
            value: improvement.value.clone(),
            elapsed,
        });

        Ok(())
    }

    fn should_stop(&self) -> bool {
        self.reached_target
            || self
                .max_improvements
                .is_some_and(|max| self.history.len() >= max)
    }
}
