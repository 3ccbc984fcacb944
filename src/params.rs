// src/params.rs
//! Coefficient Normalization and Regime Dispatch
//!
//! Each coefficient arrives as a scalar (broadcast over all `N` state
//! dimensions) or as a length-`N` vector. Normalization checks the length,
//! keeps the compact form and serves per-dimension lookups.
//!
//! Two activity masks classify every dimension:
//!
//! ```text
//! drift mask  : rate_k  != 0   (theta for OU, mu for BM)
//! noise mask  : sigma_k != 0
//! ```
//!
//! and the pair selects one of four [`Regime`]s. The [`RegimeTable`] groups
//! dimensions by regime so each closed-form rule runs over its own disjoint
//! set of columns.

use crate::args::{Precision, RealVec};
use crate::error::{validation::*, SdeResult};

/// A coefficient broadcast-checked against the state dimension
#[derive(Clone, Debug, PartialEq)]
pub struct Coefficient {
    name: &'static str,
    values: Vec<f64>,
    precision: Precision,
}

impl Coefficient {
    /// Validate a drift-type coefficient (any finite value)
    pub fn normalize(name: &'static str, raw: &RealVec, n: usize) -> SdeResult<Self> {
        validate_finite(name, raw.values())?;
        validate_broadcast_len(name, raw.len(), n)?;
        Ok(Coefficient {
            name,
            values: raw.values().to_vec(),
            precision: raw.precision(),
        })
    }

    /// Validate a diffusion coefficient (finite and >= 0)
    pub fn normalize_diffusion(name: &'static str, raw: &RealVec, n: usize) -> SdeResult<Self> {
        validate_finite(name, raw.values())?;
        validate_broadcast_len(name, raw.len(), n)?;
        validate_non_negative(name, raw.values())?;
        Ok(Coefficient {
            name,
            values: raw.values().to_vec(),
            precision: raw.precision(),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn is_scalar(&self) -> bool {
        self.values.len() == 1
    }

    /// Value for dimension `k`
    #[inline]
    pub fn at(&self, k: usize) -> f64 {
        if self.is_scalar() {
            self.values[0]
        } else {
            self.values[k]
        }
    }

    /// Mask of dimensions where this coefficient is structurally nonzero
    pub fn activity(&self, n: usize) -> ActivityMask {
        ActivityMask((0..n).map(|k| self.at(k) != 0.0).collect())
    }
}

/// How much of a mask is set
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coverage {
    All,
    None,
    Partial,
}

/// Per-dimension flag: is the coefficient structurally nonzero
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivityMask(Vec<bool>);

impl ActivityMask {
    pub fn is_active(&self, k: usize) -> bool {
        self.0[k]
    }

    pub fn coverage(&self) -> Coverage {
        let active = self.0.iter().filter(|&&a| a).count();
        if active == self.0.len() {
            Coverage::All
        } else if active == 0 {
            Coverage::None
        } else {
            Coverage::Partial
        }
    }

    /// Indices of active dimensions, ascending
    pub fn active(&self) -> Vec<usize> {
        (0..self.0.len()).filter(|&k| self.0[k]).collect()
    }
}

/// Closed-form rule selected for a dimension
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Regime {
    /// Nonzero rate, nonzero diffusion
    Full,
    /// Nonzero rate, zero diffusion: deterministic
    DriftOnly,
    /// Zero rate, nonzero diffusion
    NoiseOnly,
    /// Both zero: the state never moves
    Constant,
}

impl Regime {
    pub const ALL: [Regime; 4] = [
        Regime::Full,
        Regime::DriftOnly,
        Regime::NoiseOnly,
        Regime::Constant,
    ];

    pub fn classify(drift_active: bool, noise_active: bool) -> Self {
        match (drift_active, noise_active) {
            (true, true) => Regime::Full,
            (true, false) => Regime::DriftOnly,
            (false, true) => Regime::NoiseOnly,
            (false, false) => Regime::Constant,
        }
    }

    fn slot(self) -> usize {
        match self {
            Regime::Full => 0,
            Regime::DriftOnly => 1,
            Regime::NoiseOnly => 2,
            Regime::Constant => 3,
        }
    }

    pub fn is_noisy(self) -> bool {
        matches!(self, Regime::Full | Regime::NoiseOnly)
    }
}

/// Dimensions grouped by regime, plus the column each noisy dimension
/// reads from the batched random draw
#[derive(Clone, Debug)]
pub struct RegimeTable {
    groups: [Vec<usize>; 4],
    noise_mask: ActivityMask,
    drift_mask: ActivityMask,
}

impl RegimeTable {
    pub fn build(drift: ActivityMask, noise: ActivityMask) -> Self {
        let mut groups: [Vec<usize>; 4] = Default::default();
        for k in 0..drift.0.len() {
            let regime = Regime::classify(drift.is_active(k), noise.is_active(k));
            groups[regime.slot()].push(k);
        }
        RegimeTable {
            groups,
            noise_mask: noise,
            drift_mask: drift,
        }
    }

    pub fn columns(&self, regime: Regime) -> &[usize] {
        &self.groups[regime.slot()]
    }

    /// Dimensions that consume random draws, in draw-column order
    pub fn noise_columns(&self) -> Vec<usize> {
        self.noise_mask.active()
    }

    pub fn drift_mask(&self) -> &ActivityMask {
        &self.drift_mask
    }

    pub fn noise_mask(&self) -> &ActivityMask {
        &self.noise_mask
    }

    /// Short description of the populated groups, for diagnostics
    pub fn summary(&self) -> String {
        Regime::ALL
            .iter()
            .filter(|r| !self.columns(**r).is_empty())
            .map(|r| format!("{:?}={}", r, self.columns(*r).len()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
