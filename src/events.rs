// src/events.rs
//! Zero-Crossing Events on a Sampled Path
//!
//! An [`EventFunction`] maps `(t, y)` to a vector of values `g_j(t, y)`
//! together with per-value terminal flags and crossing directions. After the
//! full trajectory has been evaluated, [`scan_events`] walks consecutive
//! sample pairs through an [`EventDetector`], collecting every crossing in
//! `(t[i-1], t[i]]`. The first terminal crossing ends the scan; the caller
//! then slices its buffers to rows `0..=i`.
//!
//! # Crossing Rule
//!
//! With `g0 = g_j(t[i-1])` and `g1 = g_j(t[i])`:
//!
//! ```text
//! Rising  : g0 < 0  and g1 >= 0
//! Falling : g0 > 0  and g1 <= 0
//! Either  : Rising or Falling
//! ```
//!
//! A value resting on zero does not trigger again until it leaves zero.

use crate::error::{SdeError, SdeResult};
use ndarray::{Array1, ArrayView1, ArrayView2};

/// Crossing direction an event responds to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Rising,
    Falling,
    Either,
}

impl Direction {
    /// +1 rising, -1 falling, 0 either
    pub fn from_sign(sign: i8) -> Self {
        match sign.signum() {
            1 => Direction::Rising,
            -1 => Direction::Falling,
            _ => Direction::Either,
        }
    }

    pub fn admits(self, g0: f64, g1: f64) -> bool {
        let rising = g0 < 0.0 && g1 >= 0.0;
        let falling = g0 > 0.0 && g1 <= 0.0;
        match self {
            Direction::Rising => rising,
            Direction::Falling => falling,
            Direction::Either => rising || falling,
        }
    }
}

/// A setting shared by all event values or given per value
#[derive(Clone, Debug, PartialEq)]
pub enum PerEvent<T> {
    All(T),
    Each(Vec<T>),
}

impl<T: Copy> PerEvent<T> {
    /// Setting for event `j`
    ///
    /// # Panics
    ///
    /// If `j` is out of range for an `Each` list.
    pub fn get(&self, j: usize) -> T {
        match self {
            PerEvent::All(v) => *v,
            PerEvent::Each(vs) => vs[j],
        }
    }

    fn fits(&self, count: usize) -> bool {
        match self {
            PerEvent::All(_) => true,
            PerEvent::Each(vs) => vs.len() == count || vs.len() == 1,
        }
    }
}

/// Output of one event function evaluation
#[derive(Clone, Debug, PartialEq)]
pub struct EventValues {
    pub values: Vec<f64>,
    pub terminal: PerEvent<bool>,
    pub direction: PerEvent<Direction>,
}

impl EventValues {
    /// Single value, terminal, any direction
    pub fn terminal(value: f64) -> Self {
        EventValues {
            values: vec![value],
            terminal: PerEvent::All(true),
            direction: PerEvent::All(Direction::Either),
        }
    }

    /// Single value, non-terminal, any direction
    pub fn watch(value: f64) -> Self {
        EventValues {
            values: vec![value],
            terminal: PerEvent::All(false),
            direction: PerEvent::All(Direction::Either),
        }
    }

    fn is_terminal(&self, j: usize) -> bool {
        match &self.terminal {
            PerEvent::Each(vs) if vs.len() == 1 => vs[0],
            other => other.get(j),
        }
    }

    fn direction(&self, j: usize) -> Direction {
        match &self.direction {
            PerEvent::Each(vs) if vs.len() == 1 => vs[0],
            other => other.get(j),
        }
    }
}

/// User-defined scalar functions of the trajectory
pub trait EventFunction {
    fn evaluate(&mut self, t: f64, y: ArrayView1<f64>) -> EventValues;
}

impl<F> EventFunction for F
where
    F: FnMut(f64, ArrayView1<f64>) -> EventValues,
{
    fn evaluate(&mut self, t: f64, y: ArrayView1<f64>) -> EventValues {
        self(t, y)
    }
}

/// A detected crossing
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub time: f64,
    pub state: Array1<f64>,
    /// Which event value crossed zero
    pub index: usize,
    /// Sample row that closes the bracketing interval
    pub step: usize,
}

/// Where a crossing is reported inside its bracketing interval
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EventLocation {
    /// At the sample that closes the interval
    #[default]
    Sample,
    /// Linear interpolation of time and state to the zero of `g`
    Interpolated,
}

/// Crossings found in one interval
#[derive(Clone, Debug, Default)]
pub struct Detection {
    pub events: Vec<Event>,
    pub terminal: bool,
}

/// Finds crossings in `(t[step-1], t[step]]`, carrying its own state between calls
pub trait EventDetector {
    fn detect(&mut self, step: usize, t: f64, y: ArrayView1<f64>) -> SdeResult<Detection>;
}

/// Sign-change detector over an [`EventFunction`]
pub struct ZeroCrossing<'a> {
    func: &'a mut dyn EventFunction,
    location: EventLocation,
    prev_t: f64,
    prev_y: Array1<f64>,
    prev_values: Vec<f64>,
}

impl<'a> ZeroCrossing<'a> {
    /// Evaluate the function at the initial point to seed the carried state
    pub fn new(
        func: &'a mut dyn EventFunction,
        location: EventLocation,
        t0: f64,
        y0: ArrayView1<f64>,
    ) -> SdeResult<Self> {
        let initial = func.evaluate(t0, y0);
        check_values(&initial, None)?;
        Ok(ZeroCrossing {
            func,
            location,
            prev_t: t0,
            prev_y: y0.to_owned(),
            prev_values: initial.values,
        })
    }
}

impl EventDetector for ZeroCrossing<'_> {
    fn detect(&mut self, step: usize, t: f64, y: ArrayView1<f64>) -> SdeResult<Detection> {
        let current = self.func.evaluate(t, y);
        check_values(&current, Some(self.prev_values.len()))?;

        let mut detection = Detection::default();
        for (j, (&g0, &g1)) in self.prev_values.iter().zip(&current.values).enumerate() {
            if !current.direction(j).admits(g0, g1) {
                continue;
            }
            let (time, state) = match self.location {
                EventLocation::Sample => (t, y.to_owned()),
                EventLocation::Interpolated => {
                    let frac = g0 / (g0 - g1);
                    let time = self.prev_t + frac * (t - self.prev_t);
                    let state = &self.prev_y + &((&y - &self.prev_y) * frac);
                    (time, state)
                }
            };
            detection.terminal |= current.is_terminal(j);
            detection.events.push(Event {
                time,
                state,
                index: j,
                step,
            });
        }

        self.prev_t = t;
        self.prev_y.assign(&y);
        self.prev_values = current.values;
        Ok(detection)
    }
}

fn check_values(values: &EventValues, expected: Option<usize>) -> SdeResult<()> {
    let count = values.values.len();
    if let Some(expected) = expected {
        if count != expected {
            return Err(SdeError::EventFunctionContract {
                reason: format!("returned {} values, previously {}", count, expected),
            });
        }
    }
    if let Some(bad) = values.values.iter().find(|v| !v.is_finite()) {
        return Err(SdeError::EventFunctionContract {
            reason: format!("returned non-finite value {}", bad),
        });
    }
    if !values.terminal.fits(count) {
        return Err(SdeError::EventFunctionContract {
            reason: format!("terminal flags must be scalar or length {}", count),
        });
    }
    if !values.direction.fits(count) {
        return Err(SdeError::EventFunctionContract {
            reason: format!("directions must be scalar or length {}", count),
        });
    }
    Ok(())
}

/// Result of scanning a trajectory for events
#[derive(Clone, Debug, Default)]
pub struct EventScan {
    pub events: Vec<Event>,
    /// Last row to keep when a terminal event fired
    pub terminated_at: Option<usize>,
}

/// Walk rows `1..M` of `y` through the detector, stopping at the first terminal event
pub fn scan_events(
    detector: &mut dyn EventDetector,
    t: &[f64],
    y: ArrayView2<f64>,
) -> SdeResult<EventScan> {
    let mut scan = EventScan::default();
    for i in 1..t.len() {
        let detection = detector.detect(i, t[i], y.row(i))?;
        scan.events.extend(detection.events);
        if detection.terminal {
            scan.terminated_at = Some(i);
            break;
        }
    }
    Ok(scan)
}
