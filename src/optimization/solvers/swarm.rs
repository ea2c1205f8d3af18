use super::particle::{Links, Particle, Report};
use super::traits::{
    Improvement, NoopCallback, SolveReport, SolverCallback, StopReason, WorkerFailure,
};
use crate::core::{EvalValue, TargetFunc, Values};
use crate::error::{PsoError, Result};
use crate::optimization::param::Param;
use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::select;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone)]
struct GlobalBest<V, E> {
    position: Arc<V>,
    value: E,
}

struct Coordination {
    stop_reason: StopReason,
    reports: usize,
    improvements: usize,
}

/// Orchestrator of a particle swarm.
///
/// `start` runs one worker thread per particle and coordinates them from the
/// calling thread. Workers send improved personal bests over one shared
/// rendezvous channel; whenever a report beats the global best, the solver
/// sends the new best to every particle's private channel in particle order.
/// That broadcast is sequential, not atomic: for a short while some particles
/// still steer by the previous global best.
pub struct Solver<V: Values, F: TargetFunc<V>> {
    f: F,
    // None while a run owns the particles
    particles: Mutex<Option<Vec<Particle<V, F::Output>>>>,
    swarm_size: usize,
    param: Param<V>,
    best: RwLock<Option<GlobalBest<V, F::Output>>>,
}

impl<V: Values, F: TargetFunc<V>> Solver<V, F> {
    pub fn new(f: F, particles: Vec<Particle<V, F::Output>>, param: Param<V>) -> Result<Self> {
        if particles.is_empty() {
            return Err(PsoError::InvalidArgument(
                "the number of particles has to be more than 0".into(),
            ));
        }
        for (i, p) in particles.iter().enumerate() {
            if p.position().type_tag() != param.type_tag() {
                return Err(PsoError::InvalidArgument(format!(
                    "particle {} is {} but the parameters are {}",
                    i,
                    p.position().type_tag(),
                    param.type_tag()
                )));
            }
            if p.dim() != param.dim() {
                return Err(PsoError::InvalidArgument(format!(
                    "particle {} has {} dimensions but the parameters have {}",
                    i,
                    p.dim(),
                    param.dim()
                )));
            }
        }

        Ok(Self {
            f,
            swarm_size: particles.len(),
            particles: Mutex::new(Some(particles)),
            param,
            best: RwLock::new(None),
        })
    }

    pub fn target_func(&self) -> &F {
        &self.f
    }

    pub fn param(&self) -> &Param<V> {
        &self.param
    }

    pub fn swarm_size(&self) -> usize {
        self.swarm_size
    }

    /// Copy of the particles as they stood after the last run.
    pub fn particles(&self) -> Result<Vec<Particle<V, F::Output>>> {
        self.particles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(PsoError::AlreadyRunning)
    }

    /// Current global best, `None` until the first report arrives.
    pub fn best(&self) -> Option<V> {
        self.read_best().map(|b| (*b.position).clone())
    }

    pub fn best_value(&self) -> Option<F::Output> {
        self.read_best().map(|b| b.value)
    }

    /// Run the swarm until `stop` yields `true` (or its sender is dropped),
    /// or until every particle has used up its iteration limit.
    ///
    /// Pass `crossbeam::channel::never()` to rely on iteration limits alone.
    pub fn start(&self, stop: &Receiver<bool>) -> Result<SolveReport<V, F::Output>> {
        self.start_with_callback(stop, &mut NoopCallback)
    }

    pub fn start_with_callback<C>(
        &self,
        stop: &Receiver<bool>,
        callback: &mut C,
    ) -> Result<SolveReport<V, F::Output>>
    where
        C: SolverCallback<V, F::Output> + ?Sized,
    {
        let mut swarm = self.take_swarm()?;
        info!(
            particles = swarm.len(),
            dim = self.param.dim(),
            "starting particle swarm"
        );

        // A best carried over from an earlier run may never be beaten by the
        // initial reports, so workers get it up front.
        let carried = self.read_best().map(|b| b.position);
        let (report_tx, report_rx) = channel::bounded::<Report<V>>(0);
        let run = crossbeam::scope(|s| {
            let mut broadcasts = Vec::with_capacity(swarm.len());
            let mut workers = Vec::with_capacity(swarm.len());

            for (index, particle) in swarm.iter_mut().enumerate() {
                let (best_tx, best_rx) = channel::unbounded();
                if let Some(best) = &carried {
                    let _ = best_tx.send(Arc::clone(best));
                }
                broadcasts.push(best_tx);
                let links = Links {
                    index,
                    reports: report_tx.clone(),
                    global_best: best_rx,
                };
                let f = &self.f;
                let param = &self.param;
                workers.push(s.spawn(move |_| particle.run(f, param, links)));
            }
            // Only workers hold senders from here on.
            drop(report_tx);

            let outcome = self.coordinate(&report_rx, stop, &broadcasts, callback);

            // Closing the channels is what stops the workers.
            drop(broadcasts);
            drop(report_rx);

            let failures: Vec<WorkerFailure> = workers
                .into_iter()
                .enumerate()
                .filter_map(|(particle, worker)| match worker.join() {
                    Ok(Ok(())) => None,
                    Ok(Err(error)) => {
                        warn!(particle, %error, "particle worker failed");
                        Some(WorkerFailure { particle, error })
                    }
                    Err(_) => {
                        warn!(particle, "particle worker panicked");
                        Some(WorkerFailure {
                            particle,
                            error: PsoError::WorkerPanicked { particle },
                        })
                    }
                })
                .collect();

            (outcome, failures)
        });
        let (outcome, failures) = run.unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        self.restore_swarm(swarm);

        let coordination = outcome?;
        let best = self.read_best();
        info!(
            reason = ?coordination.stop_reason,
            reports = coordination.reports,
            improvements = coordination.improvements,
            failures = failures.len(),
            "particle swarm stopped"
        );

        Ok(SolveReport {
            best: best.as_ref().map(|b| (*b.position).clone()),
            best_value: best.map(|b| b.value),
            reports: coordination.reports,
            improvements: coordination.improvements,
            stop_reason: coordination.stop_reason,
            failures,
        })
    }

    fn coordinate<C>(
        &self,
        reports: &Receiver<Report<V>>,
        stop: &Receiver<bool>,
        broadcasts: &[Sender<Arc<V>>],
        callback: &mut C,
    ) -> Result<Coordination>
    where
        C: SolverCallback<V, F::Output> + ?Sized,
    {
        let mut received = 0;
        let mut improvements = 0;
        let finish = |stop_reason, received, improvements| Coordination {
            stop_reason,
            reports: received,
            improvements,
        };

        loop {
            select! {
                recv(reports) -> report => {
                    let Ok(report) = report else {
                        debug!("every particle worker has finished");
                        return Ok(finish(StopReason::SwarmExhausted, received, improvements));
                    };
                    received += 1;
                    trace!(particle = report.particle, "personal best received");

                    if let Some(improvement) = self.adopt(report, improvements + 1)? {
                        improvements += 1;
                        for tx in broadcasts {
                            // a finished worker has already hung up
                            let _ = tx.send(Arc::clone(&improvement.position));
                        }
                        callback
                            .on_improvement(&improvement)
                            .map_err(PsoError::Callback)?;
                    }

                    if callback.should_stop() {
                        return Ok(finish(StopReason::Callback, received, improvements));
                    }
                }
                recv(stop) -> signal => match signal {
                    Ok(false) => {}
                    Ok(true) | Err(_) => {
                        return Ok(finish(StopReason::Signal, received, improvements));
                    }
                },
            }
        }
    }

    /// Make `report` the global best if it beats the current one.
    fn adopt(
        &self,
        report: Report<V>,
        sequence: usize,
    ) -> Result<Option<Improvement<V, F::Output>>> {
        let value = self.f.eval(&report.position);

        let mut best = self.best.write().unwrap_or_else(PoisonError::into_inner);
        let improved = match best.as_ref() {
            None => true,
            Some(current) => value.compare_to(&current.value)?.is_lt(),
        };
        if !improved {
            return Ok(None);
        }

        let position = Arc::new(report.position);
        *best = Some(GlobalBest {
            position: Arc::clone(&position),
            value: value.clone(),
        });
        debug!(particle = report.particle, sequence, value = ?value, "new global best");

        Ok(Some(Improvement {
            sequence,
            particle: report.particle,
            position,
            value,
        }))
    }

    fn read_best(&self) -> Option<GlobalBest<V, F::Output>> {
        self.best
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn take_swarm(&self) -> Result<Vec<Particle<V, F::Output>>> {
        self.particles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(PsoError::AlreadyRunning)
    }

    fn restore_swarm(&self, swarm: Vec<Particle<V, F::Output>>) {
        *self.particles.lock().unwrap_or_else(PoisonError::into_inner) = Some(swarm);
    }
}
