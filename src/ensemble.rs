// src/ensemble.rs
//! Ensembles of Independent Sample Paths
//!
//! Paths are evaluated in parallel on a dedicated Rayon pool. Path `i` draws
//! from its own generator seeded with `seed + i`, so an ensemble is
//! reproducible regardless of how many threads run it. The only state shared
//! between paths is the read-only process definition.

use crate::args::RealVec;
use crate::error::{SdeError, SdeResult};
use crate::math_utils::Timer;
use crate::models::ExactProcess;
use crate::options::{OutputRequest, SdeOptions};
use crate::rng::NormalSource;
use crate::solution::Solution;
use rayon::prelude::*;
use statrs::statistics::Statistics;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct EnsembleConfig {
    pub paths: usize,
    pub seed: u64,
    /// Worker threads; one per logical CPU when `None`
    pub threads: Option<usize>,
    pub outputs: OutputRequest,
}

impl EnsembleConfig {
    pub fn validate(&self) -> SdeResult<()> {
        if self.paths == 0 {
            return Err(SdeError::InvalidConfiguration {
                field: "paths".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.threads == Some(0) {
            return Err(SdeError::InvalidConfiguration {
                field: "threads".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.outputs.contains(OutputRequest::EVENTS) {
            return Err(SdeError::TooManyOutputsRequested {
                requested: "events".to_string(),
                reason: "ensembles run without an event function".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        EnsembleConfig {
            paths: 10_000,
            seed: 12345,
            threads: None,
            outputs: OutputRequest::NONE,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Ensemble {
    pub paths: Vec<Solution>,
}

/// Per-dimension statistics of the final states
#[derive(Clone, Debug, PartialEq)]
pub struct EnsembleSummary {
    pub paths: usize,
    pub mean: Vec<f64>,
    /// Unbiased sample variance
    pub variance: Vec<f64>,
}

impl EnsembleSummary {
    /// Standard error of the mean for dimension `k`
    pub fn std_error(&self, k: usize) -> f64 {
        (self.variance[k] / self.paths as f64).sqrt()
    }
}

impl Ensemble {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Final value of dimension `k` on every path
    pub fn terminal_values(&self, k: usize) -> Vec<f64> {
        self.paths.iter().map(|p| p.final_state()[k]).collect()
    }

    pub fn summary(&self) -> EnsembleSummary {
        let dim = self.paths.first().map_or(0, |p| p.dim());
        let (mean, variance) = (0..dim)
            .map(|k| {
                let values = self.terminal_values(k);
                (values.iter().mean(), values.iter().variance())
            })
            .unzip();
        EnsembleSummary {
            paths: self.paths.len(),
            mean,
            variance,
        }
    }
}

/// Evaluate `cfg.paths` independent paths of `process` in parallel
pub fn simulate_ensemble<P>(
    process: &P,
    tspan: impl Into<RealVec>,
    y0: impl Into<RealVec>,
    cfg: &EnsembleConfig,
) -> SdeResult<Ensemble>
where
    P: ExactProcess + Sync,
{
    cfg.validate()?;
    let (tspan, y0) = (tspan.into(), y0.into());
    let threads = cfg.threads.unwrap_or_else(num_cpus::get);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| SdeError::InvalidConfiguration {
            field: "threads".to_string(),
            reason: e.to_string(),
        })?;

    let timer = Timer::new();
    let paths = pool.install(|| {
        (0..cfg.paths)
            .into_par_iter()
            .map(|i| {
                let mut options = SdeOptions::new()
                    .with_rand_fn(NormalSource::for_path(cfg.seed, i as u64))
                    .with_outputs(cfg.outputs);
                process.simulate(&tspan, &y0, &mut options)
            })
            .collect::<SdeResult<Vec<_>>>()
    })?;

    debug!(
        process = process.name(),
        paths = cfg.paths,
        threads,
        elapsed_ms = timer.elapsed_ms(),
        "ensemble complete"
    );
    Ok(Ensemble { paths })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OuProcess;

    #[test]
    fn test_config_validation() {
        assert!(EnsembleConfig::default().validate().is_ok());
        let cfg = EnsembleConfig {
            paths: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = EnsembleConfig {
            threads: Some(0),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = EnsembleConfig {
            outputs: OutputRequest::EVENTS,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(SdeError::TooManyOutputsRequested { .. })
        ));
    }

    #[test]
    fn test_thread_count_does_not_change_paths() {
        let ou = OuProcess::new(1.5, 0.2, 0.4).unwrap();
        let tspan: Vec<f64> = (0..=20).map(|i| i as f64 * 0.05).collect();
        let run = |threads| {
            let cfg = EnsembleConfig {
                paths: 64,
                seed: 9,
                threads: Some(threads),
                ..Default::default()
            };
            simulate_ensemble(&ou, tspan.clone(), 1.0, &cfg).unwrap()
        };

        let single = run(1);
        let multi = run(4);
        for (a, b) in single.paths.iter().zip(&multi.paths) {
            assert_eq!(a.y, b.y);
        }
    }
}
