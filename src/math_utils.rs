// src/math_utils.rs

/// `exp(a) - exp(b)` computed as `expm1(a) - expm1(b)`, accurate when both are small
#[inline]
pub fn expm1_diff(a: f64, b: f64) -> f64 {
    a.exp_m1() - b.exp_m1()
}

pub struct Timer {
    start_time: std::time::Instant,
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            start_time: std::time::Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
