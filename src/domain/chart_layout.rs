//! Pixel geometry for the price chart.
//!
//! Prices map linearly from [min, max] onto [0, canvas_height], inverted so
//! that higher prices sit nearer the top. One sample per pixel column.

use tracing::trace;

use crate::domain::error::TrendplotError;
use crate::domain::series::Series;
use crate::domain::trend::{TrendEstimator, TrendFit};

#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub canvas_height: u32,
    pub max_width: u32,
    /// Samples per trend window.
    pub trend_lookback: usize,
    /// Trend lines with a residual at or above this are hidden.
    pub residual_threshold: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            canvas_height: 2000,
            max_width: 4000,
            trend_lookback: 25,
            residual_threshold: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelScale {
    height: f64,
    min: f64,
    scale: f64,
}

impl PixelScale {
    pub fn new(min: f64, max: f64, canvas_height: u32) -> Self {
        let height = canvas_height as f64;
        let range = max - min;
        let scale = if range > 0.0 { height / range } else { 0.0 };
        PixelScale { height, min, scale }
    }

    /// Vertical pixel coordinate of `price`. A flat series sits mid-canvas.
    pub fn y(&self, price: f64) -> f64 {
        if self.scale == 0.0 {
            return self.height / 2.0;
        }
        self.height - (price - self.min) * self.scale
    }

    pub fn y_px(&self, price: f64) -> i32 {
        self.y(price).round() as i32
    }
}

pub fn canvas_width(series_len: usize, max_width: u32) -> u32 {
    u32::try_from(series_len).unwrap_or(u32::MAX).min(max_width)
}

/// Full opacity for a clean fit, zero otherwise.
pub fn trend_opacity(residual_std: f64, threshold: f64) -> f64 {
    if residual_std < threshold { 1.0 } else { 0.0 }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendSegment {
    pub fit: TrendFit,
    pub opacity: f64,
}

impl TrendSegment {
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }

    /// Endpoints in data space: (start, fit(start)) to (stop, fit(stop)).
    pub fn endpoints(&self) -> ((f64, f64), (f64, f64)) {
        let x0 = self.fit.start as f64;
        let x1 = self.fit.stop as f64;
        ((x0, self.fit.value_at(x0)), (x1, self.fit.value_at(x1)))
    }
}

/// One segment per column `i` past the lookback, fitted over `[i - lookback, i)`.
pub fn trend_segments(
    estimator: &TrendEstimator<'_>,
    series: &Series,
    width: u32,
    config: &ChartConfig,
) -> Result<Vec<TrendSegment>, TrendplotError> {
    let lookback = config.trend_lookback;
    let end = (width as usize).min(series.len());
    let mut segments = Vec::new();

    for i in (lookback + 1)..end {
        let fit = estimator.fit_trailing(i, lookback)?;
        trace!(
            index = i,
            price = series.price(i).unwrap_or_default(),
            slope = fit.slope,
            intercept = fit.intercept,
            residual_std = fit.residual_std,
            "trend"
        );
        segments.push(TrendSegment {
            fit,
            opacity: trend_opacity(fit.residual_std, config.residual_threshold),
        });
    }
    Ok(segments)
}

/// Geometry shared by every drawing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub width: u32,
    pub height: u32,
    pub scale: PixelScale,
    pub segments: Vec<TrendSegment>,
}

impl ChartLayout {
    pub fn compute(
        series: &Series,
        estimator: &TrendEstimator<'_>,
        config: &ChartConfig,
    ) -> Result<Self, TrendplotError> {
        let (min, max) = series.range().ok_or_else(|| TrendplotError::EmptySeries {
            source_name: "chart".into(),
        })?;
        let width = canvas_width(series.len(), config.max_width);
        let scale = PixelScale::new(min, max, config.canvas_height);
        let segments = trend_segments(estimator, series, width, config)?;

        Ok(ChartLayout {
            width,
            height: config.canvas_height,
            scale,
            segments,
        })
    }
}
