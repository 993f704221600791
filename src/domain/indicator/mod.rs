//! Technical indicators derived from the price series.
//!
//! - [`ema::EmaTrack`]: incrementally built exponential moving average
//! - [`Crossover`]: fast/slow moving-average crossing detection

pub mod ema;

use std::fmt;

/// Direction of a fast/slow moving-average crossing between two samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossover {
    /// Fast moved from at-or-below to above slow.
    Bullish,
    /// Fast moved from at-or-above to below slow.
    Bearish,
}

impl Crossover {
    /// The current pair must be strictly separated; the previous pair may be
    /// equal, so two tracks seeded with the same value can cross on the first
    /// move.
    pub fn detect(prev_fast: f64, prev_slow: f64, fast: f64, slow: f64) -> Option<Crossover> {
        if prev_fast <= prev_slow && fast > slow {
            Some(Crossover::Bullish)
        } else if prev_fast >= prev_slow && fast < slow {
            Some(Crossover::Bearish)
        } else {
            None
        }
    }
}

impl fmt::Display for Crossover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crossover::Bullish => write!(f, "bullish"),
            Crossover::Bearish => write!(f, "bearish"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_bullish() {
        assert_eq!(Crossover::detect(1.0, 2.0, 3.0, 2.5), Some(Crossover::Bullish));
    }

    #[test]
    fn detect_bearish() {
        assert_eq!(Crossover::detect(3.0, 2.0, 1.0, 2.5), Some(Crossover::Bearish));
    }

    #[test]
    fn touching_is_not_a_cross() {
        assert_eq!(Crossover::detect(1.0, 2.0, 2.0, 2.0), None);
        assert_eq!(Crossover::detect(2.0, 2.0, 2.0, 2.0), None);
    }

    #[test]
    fn leaving_equality_is_a_cross() {
        assert_eq!(Crossover::detect(2.0, 2.0, 3.0, 2.0), Some(Crossover::Bullish));
        assert_eq!(Crossover::detect(2.0, 2.0, 1.0, 2.0), Some(Crossover::Bearish));
    }

    #[test]
    fn no_cross_when_order_kept() {
        assert_eq!(Crossover::detect(1.0, 2.0, 1.5, 2.5), None);
        assert_eq!(Crossover::detect(3.0, 2.0, 3.5, 2.5), None);
    }

    #[test]
    fn display() {
        assert_eq!(Crossover::Bullish.to_string(), "bullish");
        assert_eq!(Crossover::Bearish.to_string(), "bearish");
    }
}
