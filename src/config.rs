use crate::core::{Bounds, EvalValue, Float64Array, Range};
use crate::error::{PsoError, Result};
use crate::optimization::{Param, Particle};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Settings for building a `f64` swarm.
///
/// Coefficients are scalars here and get expanded to one entry per dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub population_size: usize,
    pub inertia: f64,   // w - velocity inertia weight
    pub cognitive: f64, // c1 - personal best influence
    pub social: f64,    // c2 - global best influence
    /// Iteration limit per particle; `None` runs until stopped
    pub max_iterations: Option<u64>,
    /// Base seed; each particle derives its own random source from it
    pub seed: Option<u64>,
    /// Initial velocities lie within ± this fraction of each dimension's range
    pub velocity_fraction: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            inertia: 0.7,
            cognitive: 1.5,
            social: 1.5,
            max_iterations: None,
            seed: None,
            velocity_fraction: 0.1,
        }
    }
}

impl SolverConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Configure swarm size (default: 20)
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Configure PSO parameters (defaults: w=0.7, c1=1.5, c2=1.5)
    pub fn with_pso_params(mut self, inertia: f64, cognitive: f64, social: f64) -> Self {
        self.inertia = inertia;
        self.cognitive = cognitive;
        self.social = social;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_velocity_fraction(mut self, fraction: f64) -> Self {
        self.velocity_fraction = fraction;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(PsoError::InvalidArgument(
                "population_size has to be more than 0".into(),
            ));
        }
        for (name, value) in [
            ("inertia", self.inertia),
            ("cognitive", self.cognitive),
            ("social", self.social),
        ] {
            if !value.is_finite() {
                return Err(PsoError::InvalidArgument(format!(
                    "{name} has to be finite, got {value}"
                )));
            }
        }
        if !(self.velocity_fraction.is_finite() && self.velocity_fraction >= 0.0) {
            return Err(PsoError::InvalidArgument(format!(
                "velocity_fraction has to be finite and non-negative, got {}",
                self.velocity_fraction
            )));
        }
        Ok(())
    }

    /// Coefficients expanded to `dim` dimensions
    pub fn param(&self, dim: usize) -> Result<Param<Float64Array>> {
        Param::new(
            Float64Array::filled(dim, self.inertia),
            Float64Array::filled(dim, self.cognitive),
            Float64Array::filled(dim, self.social),
        )
    }

    /// Particles placed uniformly inside `bounds`.
    ///
    /// Dimensions without a finite range fall back to a unit interval at the
    /// finite edge, or to [0, 1] when both edges are infinite.
    pub fn swarm<E: EvalValue>(
        &self,
        bounds: &Arc<Bounds<Float64Array>>,
    ) -> Result<Vec<Particle<Float64Array, E>>> {
        self.validate()?;

        let intervals = bounds
            .min()
            .iter()
            .zip(bounds.max().iter())
            .enumerate()
            .map(|(i, (&min, &max))| {
                let lo = match (min.is_finite(), max.is_finite()) {
                    (true, _) => min,
                    (false, true) => max - 1.0,
                    (false, false) => 0.0,
                };
                let hi = if max.is_finite() { max } else { lo + 1.0 };
                if lo <= hi {
                    Ok((lo, hi))
                } else {
                    Err(PsoError::InvalidArgument(format!(
                        "bounds of dimension {i} are empty ({min} > {max})"
                    )))
                }
            })
            .collect::<Result<Vec<(f64, f64)>>>()?;

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let shared: Arc<dyn Range<Float64Array>> = bounds.clone();

        (0..self.population_size)
            .map(|_| {
                // Interpolated, as `hi - lo` overflows for very wide bounds.
                let position: Vec<f64> = intervals
                    .iter()
                    .map(|&(lo, hi)| {
                        let u: f64 = rng.gen_range(0.0..=1.0);
                        (lo * (1.0 - u) + hi * u).clamp(lo, hi)
                    })
                    .collect();
                let velocity: Vec<f64> = intervals
                    .iter()
                    .map(|&(lo, hi)| {
                        let half_width = hi / 2.0 - lo / 2.0;
                        let reach = (half_width * 2.0 * self.velocity_fraction).min(f64::MAX);
                        rng.gen_range(-1.0f64..=1.0) * reach
                    })
                    .collect();

                let particle = Particle::new(
                    Float64Array::new(position),
                    Float64Array::new(velocity),
                    Arc::clone(&shared),
                )?
                .with_seed(rng.next_u64());

                Ok(match self.max_iterations {
                    Some(max) => particle.with_max_iterations(max),
                    None => particle,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = SolverConfig::from_json(r#"{ "population_size": 5, "seed": 9 }"#).unwrap();
        assert_eq!(
            config,
            SolverConfig::default()
                .with_population_size(5)
                .with_seed(9)
        );
    }

    #[test]
    fn rejects_empty_population() {
        let err = SolverConfig::from_json(r#"{ "population_size": 0 }"#).unwrap_err();
        assert!(matches!(err, PsoError::InvalidArgument(_)));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = SolverConfig::from_json("{ population_size: ").unwrap_err();
        assert!(matches!(err, PsoError::Config(_)));
    }

    #[test]
    fn param_has_one_entry_per_dimension() {
        let param = SolverConfig::default().param(3).unwrap();
        assert_eq!(param.w().as_slice(), &[0.7, 0.7, 0.7]);
        assert_eq!(param.c2().as_slice(), &[1.5, 1.5, 1.5]);
    }

    #[test]
    fn swarm_starts_inside_bounds() {
        let bounds = Arc::new(
            Bounds::new(
                Float64Array::new(vec![-5.0, 10.0]),
                Float64Array::new(vec![5.0, 12.0]),
            )
            .unwrap(),
        );
        let config = SolverConfig::default()
            .with_population_size(50)
            .with_seed(3)
            .with_max_iterations(10);

        let swarm = config.swarm::<f64>(&bounds).unwrap();

        assert_eq!(swarm.len(), 50);
        for p in &swarm {
            assert!(bounds.contains(p.position()).unwrap());
            assert!(p.velocity().iter().all(|v| v.abs() <= 1.0));
            assert_eq!(p.best(), p.position());
        }
    }

    #[test]
    fn infinite_bounds_use_unit_interval() {
        let bounds = Arc::new(Bounds::<Float64Array>::unbounded(2));
        let swarm = SolverConfig::default()
            .with_seed(1)
            .swarm::<f64>(&bounds)
            .unwrap();
        assert!(swarm
            .iter()
            .all(|p| p.position().iter().all(|x| (0.0..=1.0).contains(x))));
    }

    #[test]
    fn seeded_swarms_are_identical() {
        let bounds = Arc::new(Bounds::<Float64Array>::unbounded(4));
        let config = SolverConfig::default().with_seed(11);
        let a = config.swarm::<f64>(&bounds).unwrap();
        let b = config.swarm::<f64>(&bounds).unwrap();
        let positions = |s: &[Particle<Float64Array, f64>]| {
            s.iter().map(|p| p.position().clone()).collect::<Vec<_>>()
        };
        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn widest_finite_bounds_stay_finite() {
        let bounds = Arc::new(
            Bounds::new(
                Float64Array::filled(2, -f64::MAX),
                Float64Array::filled(2, f64::MAX),
            )
            .unwrap(),
        );
        let swarm = SolverConfig::default()
            .with_seed(1)
            .with_velocity_fraction(2.0)
            .swarm::<f64>(&bounds)
            .unwrap();

        for p in &swarm {
            assert!(bounds.contains(p.position()).unwrap());
            assert!(p.velocity().iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let bounds = Arc::new(
            Bounds::new(Float64Array::new(vec![1.0]), Float64Array::new(vec![0.0])).unwrap(),
        );
        let err = SolverConfig::default().swarm::<f64>(&bounds).unwrap_err();
        assert!(matches!(err, PsoError::InvalidArgument(_)));
    }
}
