// src/solution.rs
use crate::args::Precision;
use crate::error::SdeError;
use crate::events::Event;
use ndarray::{s, Array1, Array2, ArrayView1};

/// Output of one simulated path
#[derive(Clone, Debug)]
pub struct Solution {
    /// Sample times, possibly truncated by a terminal event
    pub t: Array1<f64>,
    /// Trajectory, one row per sample; row 0 is the initial condition
    pub y: Array2<f64>,
    /// Integrated noise actually consumed, when requested. An OU column whose
    /// time change would overflow holds the discounted path `e^{-θτ} W` instead.
    pub w: Option<Array2<f64>>,
    /// Crossings in discovery order, when requested
    pub events: Option<Vec<Event>>,
    /// Set when a terminal event cut the path short
    pub terminated: bool,
    pub precision: Precision,
    /// Non-fatal diagnostics, e.g. mixed input precision
    pub warnings: Vec<SdeError>,
}

impl Solution {
    /// Number of samples
    pub fn len(&self) -> usize {
        self.y.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.y.nrows() == 0
    }

    /// State dimension
    pub fn dim(&self) -> usize {
        self.y.ncols()
    }

    pub fn final_state(&self) -> ArrayView1<'_, f64> {
        self.y.row(self.y.nrows() - 1)
    }

    /// Keep rows `0..=last`
    pub(crate) fn truncate(&mut self, last: usize) {
        self.t = self.t.slice(s![..=last]).to_owned();
        self.y = self.y.slice(s![..=last, ..]).to_owned();
        if let Some(w) = self.w.as_mut() {
            *w = w.slice(s![..=last, ..]).to_owned();
        }
        self.terminated = true;
    }
}
