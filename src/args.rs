// src/args.rs
//! Input Preparation
//!
//! Every real-valued input (coefficients, time grid, initial condition) is
//! carried as a [`RealVec`], which remembers whether the caller supplied
//! single or double precision values. [`SolveArgs::prepare`] validates the
//! time grid and initial condition and derives what the evaluators need:
//!
//! ```text
//! tdir  = sign(t[M-1] - t[0])
//! h[i]  = |t[i+1] - t[i]|,  i = 0..M-2
//! const_step  when every h[i] matches h[0] to within 8·ε·max|t|
//! ```

use crate::error::{SdeError, SdeResult};
use std::fmt;

/// Floating-point precision of a caller-supplied input
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precision {
    Single,
    Double,
}

impl Precision {
    /// Round a value to what this precision can represent
    pub fn round(self, value: f64) -> f64 {
        match self {
            Precision::Single => value as f32 as f64,
            Precision::Double => value,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Single => write!(f, "single"),
            Precision::Double => write!(f, "double"),
        }
    }
}

/// A real vector together with the precision it was supplied in
#[derive(Clone, Debug, PartialEq)]
pub struct RealVec {
    values: Vec<f64>,
    precision: Precision,
}

impl RealVec {
    pub fn double(values: Vec<f64>) -> Self {
        RealVec {
            values,
            precision: Precision::Double,
        }
    }

    pub fn single(values: Vec<f32>) -> Self {
        RealVec {
            values: values.into_iter().map(f64::from).collect(),
            precision: Precision::Single,
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<f64> for RealVec {
    fn from(value: f64) -> Self {
        RealVec::double(vec![value])
    }
}

impl From<f32> for RealVec {
    fn from(value: f32) -> Self {
        RealVec::single(vec![value])
    }
}

impl From<Vec<f64>> for RealVec {
    fn from(values: Vec<f64>) -> Self {
        RealVec::double(values)
    }
}

impl From<Vec<f32>> for RealVec {
    fn from(values: Vec<f32>) -> Self {
        RealVec::single(values)
    }
}

impl From<&[f64]> for RealVec {
    fn from(values: &[f64]) -> Self {
        RealVec::double(values.to_vec())
    }
}

impl From<&[f32]> for RealVec {
    fn from(values: &[f32]) -> Self {
        RealVec::single(values.to_vec())
    }
}

impl<const K: usize> From<[f64; K]> for RealVec {
    fn from(values: [f64; K]) -> Self {
        RealVec::double(values.to_vec())
    }
}

impl<const K: usize> From<[f32; K]> for RealVec {
    fn from(values: [f32; K]) -> Self {
        RealVec::single(values.to_vec())
    }
}

impl From<&RealVec> for RealVec {
    fn from(values: &RealVec) -> Self {
        values.clone()
    }
}

/// Validated run preconditions shared by every evaluator
#[derive(Clone, Debug)]
pub struct SolveArgs {
    /// State dimension
    pub n: usize,
    /// +1 for increasing grids, -1 for decreasing ones
    pub tdir: f64,
    /// Sample times, length M
    pub t: Vec<f64>,
    /// Absolute step lengths, length M-1
    pub h: Vec<f64>,
    pub const_step: bool,
    pub y0: Vec<f64>,
    /// Widest precision among all inputs seen so far
    pub precision: Precision,
    inputs: Vec<(String, Precision)>,
}

impl SolveArgs {
    pub fn prepare(tspan: &RealVec, y0: &RealVec) -> SdeResult<Self> {
        let t = tspan.values();
        if t.len() < 2 {
            return Err(SdeError::InvalidTimeGrid {
                reason: format!("needs at least 2 points, found {}", t.len()),
            });
        }
        if let Some(bad) = t.iter().find(|v| !v.is_finite()) {
            return Err(SdeError::InvalidTimeGrid {
                reason: format!("contains non-finite value {}", bad),
            });
        }

        let tdir = if t[1] > t[0] { 1.0 } else { -1.0 };
        let mut h = Vec::with_capacity(t.len() - 1);
        for (i, pair) in t.windows(2).enumerate() {
            let step = pair[1] - pair[0];
            if step == 0.0 || step.signum() != tdir {
                return Err(SdeError::InvalidTimeGrid {
                    reason: format!("not strictly monotone at index {}", i + 1),
                });
            }
            h.push(step.abs());
        }

        let scale = t[0].abs().max(t[t.len() - 1].abs()).max(1.0);
        let tol = 8.0 * f64::EPSILON * scale;
        let const_step = h.iter().all(|&hi| (hi - h[0]).abs() <= tol);

        if y0.is_empty() {
            return Err(SdeError::InvalidInitialCondition {
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(bad) = y0.values().iter().find(|v| !v.is_finite()) {
            return Err(SdeError::InvalidInitialCondition {
                reason: format!("contains non-finite value {}", bad),
            });
        }

        let precision = tspan.precision().max(y0.precision());
        Ok(SolveArgs {
            n: y0.len(),
            tdir,
            t: t.to_vec(),
            h,
            const_step,
            y0: y0.values().to_vec(),
            precision,
            inputs: vec![
                ("tspan".to_string(), tspan.precision()),
                ("y0".to_string(), y0.precision()),
            ],
        })
    }

    /// Number of samples M
    pub fn samples(&self) -> usize {
        self.t.len()
    }

    /// Number of steps M-1
    pub fn steps(&self) -> usize {
        self.h.len()
    }

    /// Step length used for interval `i`; the first step when spacing is constant
    pub fn step(&self, i: usize) -> f64 {
        if self.const_step {
            self.h[0]
        } else {
            self.h[i]
        }
    }

    /// Signed elapsed time `t[i] - t[0]`
    pub fn elapsed(&self, i: usize) -> f64 {
        self.t[i] - self.t[0]
    }

    /// Fold another input's precision into the promoted precision
    pub fn promote(&mut self, name: &str, precision: Precision) {
        self.precision = self.precision.max(precision);
        self.inputs.push((name.to_string(), precision));
    }

    /// The non-fatal precision warning, if inputs disagree
    pub fn precision_warning(&self) -> Option<SdeError> {
        let mixed = self
            .inputs
            .iter()
            .any(|(_, p)| *p != self.precision);
        if mixed {
            Some(SdeError::PrecisionInconsistency {
                promoted: self.precision,
                inputs: self.inputs.clone(),
            })
        } else {
            None
        }
    }
}
