// src/models/model.rs
use crate::args::RealVec;
use crate::error::SdeResult;
use crate::options::SdeOptions;
use crate::solution::Solution;

/// A diagonal-noise process whose sample paths are evaluated exactly
pub trait ExactProcess {
    fn name(&self) -> &'static str;

    /// Evaluate one sample path over `tspan` starting from `y0`
    fn simulate(&self, tspan: &RealVec, y0: &RealVec, options: &mut SdeOptions)
        -> SdeResult<Solution>;

    /// E[Y_k(t0 + tau) | Y_k(t0) = y0]
    ///
    /// # Panics
    ///
    /// If `k` is out of range for a coefficient given per dimension.
    fn exact_mean(&self, k: usize, y0: f64, tau: f64) -> f64;

    /// Var[Y_k(t0 + tau) | Y_k(t0) = y0]
    ///
    /// # Panics
    ///
    /// If `k` is out of range for a coefficient given per dimension.
    fn exact_variance(&self, k: usize, tau: f64) -> f64;
}

/// Scalar-or-vector lookup on a raw coefficient; panics when `k` is past a vector's end
pub(crate) fn broadcast_at(values: &RealVec, k: usize) -> f64 {
    let v = values.values();
    if v.len() == 1 {
        v[0]
    } else {
        v[k]
    }
}
