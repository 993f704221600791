//! Strategy parameters and named parameter profiles.

use std::fmt;
use std::str::FromStr;

/// Named window presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// EMA windows 5 / 20.
    #[default]
    Standard,
    /// EMA windows 3 / 17.
    Fast,
}

impl Profile {
    /// (window_short, window_long)
    pub fn windows(self) -> (f64, f64) {
        match self {
            Profile::Standard => (5.0, 20.0),
            Profile::Fast => (3.0, 17.0),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Standard => write!(f, "standard"),
            Profile::Fast => write!(f, "fast"),
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Profile::Standard),
            "fast" => Ok(Profile::Fast),
            other => Err(format!("unknown profile '{other}' (expected standard or fast)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub window_short: f64,
    pub window_long: f64,
    pub initial_balance: f64,
    /// Fraction of the traded value lost on each buy and each sell.
    pub trans_cost_rate: f64,
    /// Percent below the entry price.
    pub stop_loss_pct: f64,
    /// Percent above the entry price.
    pub take_profit_pct: f64,
    pub enable_crossover_exit: bool,
}

impl StrategyConfig {
    pub fn for_profile(profile: Profile) -> Self {
        let (window_short, window_long) = profile.windows();
        StrategyConfig {
            window_short,
            window_long,
            initial_balance: 1000.0,
            trans_cost_rate: 0.001,
            stop_loss_pct: 0.5,
            take_profit_pct: 2.0,
            enable_crossover_exit: false,
        }
    }

    pub fn stop_loss_price(&self, entry_price: f64) -> f64 {
        entry_price * (1.0 - self.stop_loss_pct / 100.0)
    }

    pub fn take_profit_price(&self, entry_price: f64) -> f64 {
        entry_price * (1.0 + self.take_profit_pct / 100.0)
    }

    /// Multiplier applied to traded value on each side of a trade.
    pub fn cost_factor(&self) -> f64 {
        1.0 - self.trans_cost_rate
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::for_profile(Profile::default())
    }
}
