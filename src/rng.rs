// src/rng.rs
//! Random Draws for Exact Path Evaluation
//!
//! # Design Philosophy
//!
//! A run asks for all of its randomness in **one batched call** of shape
//! `(M - 1) x D`, where `D` is the number of diffusion-active dimensions.
//! Seeding a generator once therefore reproduces a whole path bit for bit.
//!
//! Any [`RandomSource`] can stand in for the default standard-normal source,
//! which is how deterministic tests are written. Closures of the form
//! `FnMut(usize, usize) -> Array2<f64>` implement the trait directly.
//!
//! # Contract
//!
//! Given `(count, width)` a source must return a `count x width` array of
//! finite values. [`guarded_draw`] enforces this and maps each failure to a
//! distinct [`GeneratorViolation`].

use crate::error::{GeneratorViolation, SdeResult};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

/// Capability producing a `count x width` block of raw draws
pub trait RandomSource {
    fn generate(&mut self, count: usize, width: usize) -> Result<Array2<f64>, String>;

    /// False only for the built-in standard-normal source
    fn is_user_supplied(&self) -> bool {
        true
    }
}

impl<F> RandomSource for F
where
    F: FnMut(usize, usize) -> Array2<f64>,
{
    fn generate(&mut self, count: usize, width: usize) -> Result<Array2<f64>, String> {
        Ok(self(count, width))
    }
}

/// Default source: independent N(0, 1) draws from a seeded `StdRng`
#[derive(Debug, Clone)]
pub struct NormalSource {
    rng: StdRng,
}

impl NormalSource {
    pub fn from_seed(seed: u64) -> Self {
        NormalSource {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        NormalSource {
            rng: StdRng::from_entropy(),
        }
    }

    /// Independent stream for path `path_id` of an ensemble
    pub fn for_path(base_seed: u64, path_id: u64) -> Self {
        Self::from_seed(base_seed.wrapping_add(path_id))
    }

    pub fn from_options(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }
}

impl RandomSource for NormalSource {
    fn generate(&mut self, count: usize, width: usize) -> Result<Array2<f64>, String> {
        let rng = &mut self.rng;
        Ok(Array2::from_shape_fn((count, width), |_| {
            StandardNormal.sample(rng)
        }))
    }

    fn is_user_supplied(&self) -> bool {
        false
    }
}

/// Invoke a source and check its output against the contract
pub fn guarded_draw(
    source: &mut dyn RandomSource,
    count: usize,
    width: usize,
) -> SdeResult<Array2<f64>> {
    let draws = source
        .generate(count, width)
        .map_err(|reason| GeneratorViolation::Failed { reason })?;

    if draws.is_empty() && count * width > 0 {
        return Err(GeneratorViolation::MissingOutput {
            expected: (count, width),
        }
        .into());
    }
    if draws.dim() != (count, width) {
        return Err(GeneratorViolation::ShapeMismatch {
            expected: (count, width),
            found: draws.dim(),
        }
        .into());
    }
    if let Some(((row, col), &value)) = draws.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(GeneratorViolation::NonFinite { row, col, value }.into());
    }

    Ok(draws)
}
