use crate::core::{EvalValue, Range, TargetFunc, Values};
use crate::error::{PsoError, Result};
use crate::optimization::param::Param;
use crossbeam::channel::{Receiver, Sender, TryRecvError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::trace;

/// Personal best sent from a particle worker to the coordinator.
pub(crate) struct Report<V> {
    pub particle: usize,
    pub position: V,
}

/// Channel ends a particle worker holds for the length of one run.
pub(crate) struct Links<V> {
    pub index: usize,
    pub reports: Sender<Report<V>>,
    pub global_best: Receiver<Arc<V>>,
}

/// One candidate solution moving through the search space.
///
/// The starting position has to lie inside the bounds and becomes the first
/// personal best. While a solver runs, the particle is driven by its own
/// worker thread and talks to the coordinator over channels only.
#[derive(Debug, Clone)]
pub struct Particle<V: Values, E> {
    position: V,
    velocity: V,
    bounds: Arc<dyn Range<V>>,
    eval_value: Option<E>,
    best: V,
    best_value: Option<E>,
    rng: StdRng,
    iterations: u64,
    max_iterations: Option<u64>,
}

impl<V: Values, E: EvalValue> Particle<V, E> {
    pub fn new(position: V, velocity: V, bounds: Arc<dyn Range<V>>) -> Result<Self> {
        if position.type_tag() != velocity.type_tag() {
            return Err(PsoError::InvalidArgument(format!(
                "position and velocity have to be the same type ({} vs {})",
                position.type_tag(),
                velocity.type_tag()
            )));
        }
        if position.type_tag() != bounds.type_tag() {
            return Err(PsoError::InvalidArgument(format!(
                "position and bounds have to be the same type ({} vs {})",
                position.type_tag(),
                bounds.type_tag()
            )));
        }
        if position.dim() != velocity.dim() {
            return Err(PsoError::InvalidArgument(format!(
                "position ({}) and velocity ({}) have to share one dimension",
                position.dim(),
                velocity.dim()
            )));
        }
        let inside = bounds.contains(&position).map_err(|e| {
            PsoError::InvalidArgument(format!("position does not fit the bounds: {e}"))
        })?;
        if !inside {
            return Err(PsoError::InvalidArgument(
                "starting position lies outside the bounds".into(),
            ));
        }

        Ok(Self {
            best: position.clone(),
            position,
            velocity,
            bounds,
            eval_value: None,
            best_value: None,
            rng: StdRng::from_entropy(),
            iterations: 0,
            max_iterations: None,
        })
    }

    /// Seed the particle's random source for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Stop the worker once this many iterations have run in total.
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn position(&self) -> &V {
        &self.position
    }

    pub fn velocity(&self) -> &V {
        &self.velocity
    }

    pub fn bounds(&self) -> &Arc<dyn Range<V>> {
        &self.bounds
    }

    /// Fitness of the current position, once evaluated
    pub fn eval_value(&self) -> Option<&E> {
        self.eval_value.as_ref()
    }

    pub fn best(&self) -> &V {
        &self.best
    }

    pub fn best_value(&self) -> Option<&E> {
        self.best_value.as_ref()
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn dim(&self) -> usize {
        self.position.dim()
    }

    /// Run one PSO iteration against `global_best`.
    ///
    /// Returns the new personal best when this iteration improved on it.
    pub fn step<F>(&mut self, f: &F, param: &Param<V>, global_best: &V) -> Result<Option<V>>
    where
        F: TargetFunc<V, Output = E> + ?Sized,
    {
        // Move, unless that leaves the bounds. Velocity is kept either way.
        let mut candidate = self.position.clone();
        candidate.add(&self.velocity)?;
        if self.bounds.contains(&candidate)? {
            self.position = candidate;
        }

        let mut r1 = self.velocity.random(&mut self.rng);
        let mut r2 = self.velocity.random(&mut self.rng);

        // r1 <- r1*c1*(own best - x)
        let mut cognitive = self.best.clone();
        cognitive.sub(&self.position)?;
        r1.mul(param.c1())?.mul(&cognitive)?;

        // r2 <- r2*c2*(global best - x)
        let mut social = global_best.clone();
        social.sub(&self.position)?;
        r2.mul(param.c2())?.mul(&social)?;

        // v <- w*v + r1 + r2
        self.velocity.mul(param.w())?.add(&r1)?.add(&r2)?;
        self.iterations += 1;

        let value = f.eval(&self.position);
        let best_value = match &self.best_value {
            Some(v) => v.clone(),
            None => f.eval(&self.best),
        };
        let improved = value.compare_to(&best_value)?.is_lt();
        self.eval_value = Some(value.clone());

        if improved {
            self.best = self.position.clone();
            self.best_value = Some(value);
            Ok(Some(self.best.clone()))
        } else {
            self.best_value = Some(best_value);
            Ok(None)
        }
    }

    /// Worker loop. Returns once the coordinator closes either channel or the
    /// iteration limit is reached.
    pub(crate) fn run<F>(&mut self, f: &F, param: &Param<V>, links: Links<V>) -> Result<()>
    where
        F: TargetFunc<V, Output = E> + ?Sized,
    {
        let Links {
            index,
            reports,
            global_best,
        } = links;

        // The starting position is the first personal best on record.
        let first = Report {
            particle: index,
            position: self.best.clone(),
        };
        if reports.send(first).is_err() {
            return Ok(());
        }
        let Ok(mut global) = global_best.recv() else {
            return Ok(());
        };

        loop {
            // Keep only the latest broadcast; a closed channel ends the run.
            loop {
                match global_best.try_recv() {
                    Ok(latest) => global = latest,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return Ok(()),
                }
            }

            if self.max_iterations.is_some_and(|max| self.iterations >= max) {
                trace!(particle = index, iterations = self.iterations, "iteration limit reached");
                return Ok(());
            }

            if let Some(best) = self.step(f, param, &global)? {
                trace!(particle = index, iteration = self.iterations, "new personal best");
                let report = Report {
                    particle: index,
                    position: best,
                };
                if reports.send(report).is_err() {
                    return Ok(());
                }
            }
        }
    }
}
