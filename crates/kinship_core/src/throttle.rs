/// Fixed-interval gate for the contagion pipeline.
///
/// Elapsed simulation time accumulates across calls; once it reaches the
/// interval the whole accumulated span is handed out and the counter restarts.
#[derive(Debug, Clone, PartialEq)]
pub struct Throttle {
    interval: f64,
    accumulated: f64,
}

impl Throttle {
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            accumulated: 0.0,
        }
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Time accumulated since the last run.
    pub fn pending(&self) -> f64 {
        self.accumulated
    }

    /// Adds `dt` seconds. Returns the time elapsed since the previous run when
    /// the interval has been reached, `None` otherwise. Negative or non-finite
    /// steps are ignored.
    pub fn advance(&mut self, dt: f64) -> Option<f64> {
        if dt.is_finite() && dt > 0.0 {
            self.accumulated += dt;
        }
        if self.accumulated >= self.interval {
            Some(std::mem::take(&mut self.accumulated))
        } else {
            None
        }
    }
}
