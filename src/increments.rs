// src/increments.rs
//! Wiener Increments and Path Accumulation
//!
//! # Buffer Layout
//!
//! The noise buffer `W` is `M x N`. Raw draws are written into rows `1..M`
//! of the noise-active columns, rescaled in place into increments, and then
//! cumulatively summed down each column so that `W[0] = 0` and
//! `W[i] = dW_0 + ... + dW_{i-1}`. Columns of diffusion-free dimensions stay
//! zero throughout.
//!
//! # Scaling
//!
//! Plain Brownian clock:
//! ```text
//! dW_i = tdir * sqrt(h_i) * z_i
//! ```
//!
//! Time-changed clock for a mean-reverting dimension with rate `r`, using
//! elapsed time `τ_i = t_i - t_0`:
//! ```text
//! dW_i = tdir * sqrt(|expm1(2rτ_{i+1}) - expm1(2rτ_i)|) * z_i
//! ```
//! The `expm1` difference avoids the cancellation a naive
//! `exp(a) - exp(b)` suffers when `rτ` is small.
//!
//! # Discounted Clock
//!
//! When `2rτ` would leave the range of `expm1` the time-changed path cannot
//! be stored. Such a column instead carries `V_i = e^{-rτ_i} W_i`, built from
//! the same draws by
//! ```text
//! V_{i+1} = e^{-ρ h_i} V_i + tdir * sqrt(-expm1(-2ρ h_i)) * z_i,   ρ = r * tdir
//! ```
//! which is the same process with the exponential factor already applied.

use crate::args::SolveArgs;
use crate::math_utils::expm1_diff;
use ndarray::{s, Array1, Array2, ArrayView2, ArrayViewMut1};

/// Write the batched draws into rows `1..M` of the noise-active columns
pub fn place_draws(w: &mut Array2<f64>, draws: ArrayView2<f64>, columns: &[usize]) {
    for (j, &k) in columns.iter().enumerate() {
        w.slice_mut(s![1.., k]).assign(&draws.column(j));
    }
}

/// Per-step factors `tdir * sqrt(h_i)` for the Brownian clock
pub fn brownian_scales(args: &SolveArgs) -> Array1<f64> {
    if args.const_step {
        Array1::from_elem(args.steps(), args.tdir * args.h[0].sqrt())
    } else {
        args.h.iter().map(|hi| args.tdir * hi.sqrt()).collect()
    }
}

/// Per-step factors `tdir * sqrt(|Δ expm1(2rτ)|)` for the time-changed clock
pub fn time_change_scales(args: &SolveArgs, rate: f64) -> Array1<f64> {
    (0..args.steps())
        .map(|i| {
            let d = expm1_diff(2.0 * rate * args.elapsed(i + 1), 2.0 * rate * args.elapsed(i));
            args.tdir * d.abs().sqrt()
        })
        .collect()
}

/// Largest `2ρ|τ|` for which the time-changed clock is still stored as is
pub const TIME_CHANGE_LIMIT: f64 = 700.0;

/// Step factors of the discounted clock for one rate
#[derive(Clone, Debug, PartialEq)]
pub struct DiscountedClock {
    /// `e^{-ρ h_i}`
    pub decay: Array1<f64>,
    /// `tdir * sqrt(-expm1(-2ρ h_i))`
    pub scales: Array1<f64>,
}

/// Increment clock of a mean-reverting dimension
#[derive(Clone, Debug, PartialEq)]
pub enum OuClock {
    /// Column holds `W(expm1(2rτ))`
    TimeChanged(Array1<f64>),
    /// Column holds `e^{-rτ} W(expm1(2rτ))`
    Discounted(DiscountedClock),
}

impl OuClock {
    /// Pick the clock for `rate`: discounted once the time change would overflow
    pub fn for_rate(args: &SolveArgs, rate: f64) -> Self {
        let rho = rate * args.tdir;
        let horizon = args.elapsed(args.samples() - 1).abs();
        if rho > 0.0 && 2.0 * rho * horizon > TIME_CHANGE_LIMIT {
            OuClock::Discounted(discounted_clock(args, rho))
        } else {
            OuClock::TimeChanged(time_change_scales(args, rate))
        }
    }

    pub fn is_discounted(&self) -> bool {
        matches!(self, OuClock::Discounted(_))
    }

    /// Turn the raw draws of a column into the path this clock describes
    pub fn integrate(&self, mut column: ArrayViewMut1<f64>) {
        match self {
            OuClock::TimeChanged(scales) => {
                scale_column(column.view_mut(), scales);
                accumulate_column(column);
            }
            OuClock::Discounted(clock) => accumulate_discounted(column, clock),
        }
    }
}

/// Per-step factors of the discounted clock for effective rate `rho > 0`
pub fn discounted_clock(args: &SolveArgs, rho: f64) -> DiscountedClock {
    let decay = (0..args.steps())
        .map(|i| (-rho * args.step(i)).exp())
        .collect();
    let scales = (0..args.steps())
        .map(|i| args.tdir * (-(-2.0 * rho * args.step(i)).exp_m1()).sqrt())
        .collect();
    DiscountedClock { decay, scales }
}

/// Run the discounted recursion down a column of raw draws
pub fn accumulate_discounted(mut column: ArrayViewMut1<f64>, clock: &DiscountedClock) {
    column[0] = 0.0;
    for i in 0..clock.decay.len() {
        column[i + 1] = clock.decay[i] * column[i] + clock.scales[i] * column[i + 1];
    }
}

/// Turn raw draws in rows `1..M` of a column into increments
pub fn scale_column(mut column: ArrayViewMut1<f64>, scales: &Array1<f64>) {
    column
        .slice_mut(s![1..])
        .zip_mut_with(scales, |dw, &scale| *dw *= scale);
}

/// Cumulative sum down a column: increments become the integrated path
pub fn accumulate_column(mut column: ArrayViewMut1<f64>) {
    let mut acc = 0.0;
    for v in column.iter_mut() {
        acc += *v;
        *v = acc;
    }
}

/// Per-step factors shared by every dimension with the same rate.
///
/// With a scalar rate all dimensions hit one entry, so the factors are
/// computed once per run.
#[derive(Debug)]
pub struct RateCache<T = Array1<f64>> {
    entries: Vec<(u64, T)>,
}

impl<T> Default for RateCache<T> {
    fn default() -> Self {
        RateCache {
            entries: Vec::new(),
        }
    }
}

impl<T> RateCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_insert_with<F>(&mut self, rate: f64, build: F) -> &T
    where
        F: FnOnce(f64) -> T,
    {
        let key = rate.to_bits();
        let pos = match self.entries.iter().position(|(k, _)| *k == key) {
            Some(pos) => pos,
            None => {
                self.entries.push((key, build(rate)));
                self.entries.len() - 1
            }
        };
        &self.entries[pos].1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
