//! Least-squares trend estimation over a window of the price series.
//!
//! x is the sample index, y the price. Slope and intercept come from the
//! closed-form normal equations; residual_std is the root-mean-square
//! residual, sqrt(sum((y - (m*x + c))^2) / n).

use crate::domain::error::TrendplotError;
use crate::domain::series::Series;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendFit {
    pub start: usize,
    pub stop: usize,
    pub slope: f64,
    pub intercept: f64,
    pub residual_std: f64,
}

impl TrendFit {
    /// Fitted price at index `x`.
    pub fn value_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fits lines over windows of a borrowed series.
pub struct TrendEstimator<'a> {
    series: &'a Series,
}

impl<'a> TrendEstimator<'a> {
    pub fn new(series: &'a Series) -> Self {
        TrendEstimator { series }
    }

    /// Fit the window `[start, stop)`.
    pub fn fit(&self, start: usize, stop: usize) -> Result<TrendFit, TrendplotError> {
        if stop > self.series.len() {
            return Err(TrendplotError::WindowOutOfRange {
                start,
                stop,
                len: self.series.len(),
            });
        }
        if stop < start + 2 {
            return Err(TrendplotError::InsufficientData { start, stop });
        }

        let points = &self.series.points()[start..stop];
        fit_points(start, stop, points.iter().map(|p| (p.index as f64, p.value)))
    }

    /// Fit the `lookback` samples ending just before `end`.
    pub fn fit_trailing(&self, end: usize, lookback: usize) -> Result<TrendFit, TrendplotError> {
        let start = end.saturating_sub(lookback);
        self.fit(start, end)
    }
}

fn fit_points<I>(start: usize, stop: usize, points: I) -> Result<TrendFit, TrendplotError>
where
    I: Iterator<Item = (f64, f64)> + Clone,
{
    let n = (stop - start) as f64;
    let (sum_x, sum_y, sum_xx, sum_xy) = points.clone().fold(
        (0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxx, sxy), (x, y)| (sx + x, sy + y, sxx + x * x, sxy + x * y),
    );

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return Err(TrendplotError::InsufficientData { start, stop });
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;

    let squared: f64 = points
        .map(|(x, y)| {
            let residual = y - (slope * x + intercept);
            residual * residual
        })
        .sum();

    Ok(TrendFit {
        start,
        stop,
        slope,
        intercept,
        residual_std: (squared / n).sqrt(),
    })
}
