// src/models/brownian.rs
//! Brownian Motion with Drift
//!
//! Each dimension follows `dY = μ dt + σ dW`. On the sample grid the exact
//! discrete recurrence is
//! ```text
//! Y_{i+1} = Y_i + μ Δt_i + σ dW_i,    Δt_i = tdir · h_i,  dW_i ~ N(0, h_i)
//! ```
//! and the path is its cumulative sum. The degenerate dimensions use the
//! closed form `Y = y0 + μ(t - t0) + σ W(t)` with the missing term dropped.

use super::model::{broadcast_at, ExactProcess};
use crate::args::{RealVec, SolveArgs};
use crate::engine;
use crate::error::{validation::*, SdeResult};
use crate::increments::{accumulate_column, brownian_scales, scale_column};
use crate::options::SdeOptions;
use crate::params::{Coefficient, Regime, RegimeTable};
use crate::solution::Solution;
use ndarray::Array2;
use tracing::debug;

#[derive(Clone, Debug, PartialEq)]
pub struct BrownianMotion {
    /// Drift per unit time
    pub mu: RealVec,
    pub sigma: RealVec,
}

impl BrownianMotion {
    pub fn new(mu: impl Into<RealVec>, sigma: impl Into<RealVec>) -> SdeResult<Self> {
        let (mu, sigma) = (mu.into(), sigma.into());
        validate_finite("mu", mu.values())?;
        validate_finite("sigma", sigma.values())?;
        validate_non_negative("sigma", sigma.values())?;
        Ok(BrownianMotion { mu, sigma })
    }
}

impl ExactProcess for BrownianMotion {
    fn name(&self) -> &'static str {
        "brownian-motion"
    }

    fn simulate(
        &self,
        tspan: &RealVec,
        y0: &RealVec,
        options: &mut SdeOptions,
    ) -> SdeResult<Solution> {
        options.validate()?;
        let mut args = SolveArgs::prepare(tspan, y0)?;
        let n = args.n;
        let mu = Coefficient::normalize("mu", &self.mu, n)?;
        let sigma = Coefficient::normalize_diffusion("sigma", &self.sigma, n)?;
        for c in [&mu, &sigma] {
            args.promote(c.name(), c.precision());
        }

        let table = RegimeTable::build(mu.activity(n), sigma.activity(n));
        debug!(
            process = self.name(),
            n,
            samples = args.samples(),
            scalar_mu = mu.is_scalar(),
            scalar_sigma = sigma.is_scalar(),
            regimes = %table.summary(),
            "evaluating exact path"
        );

        let mut w = engine::draw_noise(&args, &table, options)?;
        let m = args.samples();
        let mut y = Array2::zeros((m, n));

        let noisy = Regime::ALL
            .iter()
            .any(|r| r.is_noisy() && !table.columns(*r).is_empty());
        let scales = if noisy {
            brownian_scales(&args)
        } else {
            Default::default()
        };

        for &k in table.columns(Regime::Full) {
            let (mk, sk) = (mu.at(k), sigma.at(k));
            scale_column(w.column_mut(k), &scales);
            // w still holds increments here; the recurrence consumes them before accumulation
            y[[0, k]] = args.y0[k];
            for i in 0..m - 1 {
                let dt = args.tdir * args.step(i);
                y[[i + 1, k]] = y[[i, k]] + (mk * dt + sk * w[[i + 1, k]]);
            }
            accumulate_column(w.column_mut(k));
        }
        for &k in table.columns(Regime::NoiseOnly) {
            let (y0k, sk) = (args.y0[k], sigma.at(k));
            scale_column(w.column_mut(k), &scales);
            accumulate_column(w.column_mut(k));
            y[[0, k]] = y0k;
            for i in 1..m {
                y[[i, k]] = y0k + sk * w[[i, k]];
            }
        }
        for &k in table.columns(Regime::DriftOnly) {
            let (y0k, mk) = (args.y0[k], mu.at(k));
            y[[0, k]] = y0k;
            for i in 1..m {
                y[[i, k]] = y0k + mk * args.elapsed(i);
            }
        }
        for &k in table.columns(Regime::Constant) {
            y.column_mut(k).fill(args.y0[k]);
        }

        engine::finish(&args, y, w, options)
    }

    fn exact_mean(&self, k: usize, y0: f64, tau: f64) -> f64 {
        y0 + broadcast_at(&self.mu, k) * tau
    }

    fn exact_variance(&self, k: usize, tau: f64) -> f64 {
        let sigma = broadcast_at(&self.sigma, k);
        sigma * sigma * tau.abs()
    }
}

/// Sample a drifted Brownian path; see [`BrownianMotion`]
pub fn sde_bm(
    mu: impl Into<RealVec>,
    sigma: impl Into<RealVec>,
    tspan: impl Into<RealVec>,
    y0: impl Into<RealVec>,
    options: &mut SdeOptions,
) -> SdeResult<Solution> {
    BrownianMotion::new(mu, sigma)?.simulate(&tspan.into(), &y0.into(), options)
}
