//! Continuous-time Exponential Moving Average.
//!
//! alpha = 1 - exp(-dt/window), EMA[i] = P[i]*alpha + EMA[i-1]*(1-alpha).
//! Seeded with the first observation, so there is no warmup.
//!
//! Evaluated as EMA[i-1] + alpha*(P[i] - EMA[i-1]) so that a constant input
//! reproduces itself exactly.

/// Time between consecutive observations.
pub const SAMPLE_INTERVAL: f64 = 1.0;

pub fn smoothing_factor(dt: f64, window: f64) -> f64 {
    1.0 - (-dt / window).exp()
}

pub fn ema_step(value: f64, previous: f64, dt: f64, window: f64) -> f64 {
    let alpha = smoothing_factor(dt, window);
    previous + alpha * (value - previous)
}

/// An incrementally built EMA over a fixed window.
#[derive(Debug, Clone, PartialEq)]
pub struct EmaTrack {
    window: f64,
    values: Vec<f64>,
}

impl EmaTrack {
    pub fn new(window: f64) -> Self {
        EmaTrack {
            window,
            values: Vec::new(),
        }
    }

    /// Smooth `value` against the last entry and append the result.
    pub fn push(&mut self, value: f64) -> f64 {
        let previous = self.values.last().copied().unwrap_or(value);
        let smoothed = ema_step(value, previous, SAMPLE_INTERVAL, self.window);
        self.values.push(smoothed);
        smoothed
    }

    pub fn window(&self) -> f64 {
        self.window
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
