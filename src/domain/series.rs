//! Price series with incrementally derived EMA tracks.

use tracing::warn;

use crate::domain::error::TrendplotError;
use crate::domain::indicator::ema::EmaTrack;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub index: usize,
    pub value: f64,
}

/// Append-only price series. `prices`, `ema_short` and `ema_long` always have
/// the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    prices: Vec<PricePoint>,
    ema_short: EmaTrack,
    ema_long: EmaTrack,
    min: f64,
    max: f64,
}

impl Series {
    pub fn new(window_short: f64, window_long: f64) -> Self {
        Series {
            prices: Vec::new(),
            ema_short: EmaTrack::new(window_short),
            ema_long: EmaTrack::new(window_long),
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Build a series from raw values, skipping non-finite ones.
    pub fn from_prices<I>(window_short: f64, window_long: f64, prices: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut series = Series::new(window_short, window_long);
        for value in prices {
            if let Err(e) = series.add_price(value) {
                warn!("skipping price: {e}");
            }
        }
        series
    }

    /// Append one close price. Non-finite values are rejected and leave the
    /// series untouched.
    pub fn add_price(&mut self, close_price: f64) -> Result<(), TrendplotError> {
        if !close_price.is_finite() {
            return Err(TrendplotError::InvalidValue { value: close_price });
        }

        self.prices.push(PricePoint {
            index: self.prices.len(),
            value: close_price,
        });
        self.ema_short.push(close_price);
        self.ema_long.push(close_price);

        self.min = self.min.min(close_price);
        self.max = self.max.max(close_price);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.prices
    }

    pub fn price(&self, index: usize) -> Option<f64> {
        self.prices.get(index).map(|p| p.value)
    }

    pub fn prices(&self) -> Vec<f64> {
        self.prices.iter().map(|p| p.value).collect()
    }

    pub fn ema_short(&self) -> &[f64] {
        self.ema_short.values()
    }

    pub fn ema_long(&self) -> &[f64] {
        self.ema_long.values()
    }

    pub fn window_short(&self) -> f64 {
        self.ema_short.window()
    }

    pub fn window_long(&self) -> f64 {
        self.ema_long.window()
    }

    /// Observed (min, max) price, `None` until the first append.
    pub fn range(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            None
        } else {
            Some((self.min, self.max))
        }
    }
}
