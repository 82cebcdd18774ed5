use statrs::function::erf;
use std::f64::consts::SQRT_2;
use std::time::Instant;

pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf::erf(x / SQRT_2))
}

pub struct Timer {
    start_time: Instant,
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            start_time: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Timer::new()
    }
}

/// Run `f` and return its value with the wall-clock seconds it took
pub fn timed<T, F: FnOnce() -> T>(f: F) -> (T, f64) {
    let timer = Timer::new();
    let value = f();
    (value, timer.elapsed_secs())
}
