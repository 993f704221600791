//! Configuration validation.
//!
//! Runs on fully resolved configs, after flags, INI values and profile
//! defaults have been merged.

use crate::domain::chart_layout::ChartConfig;
use crate::domain::error::TrendplotError;
use crate::domain::strategy::StrategyConfig;

pub fn validate_strategy_config(config: &StrategyConfig) -> Result<(), TrendplotError> {
    validate_window("window_short", config.window_short)?;
    validate_window("window_long", config.window_long)?;
    validate_initial_balance(config.initial_balance)?;
    validate_trans_cost_rate(config.trans_cost_rate)?;
    validate_stop_loss(config.stop_loss_pct)?;
    validate_take_profit(config.take_profit_pct)?;
    Ok(())
}

pub fn validate_chart_config(config: &ChartConfig) -> Result<(), TrendplotError> {
    if config.canvas_height == 0 {
        return Err(invalid("chart", "canvas_height", "canvas_height must be positive"));
    }
    if config.max_width == 0 {
        return Err(invalid("chart", "max_width", "max_width must be positive"));
    }
    if config.trend_lookback < 2 {
        return Err(invalid(
            "chart",
            "trend_lookback",
            "trend_lookback must be at least 2",
        ));
    }
    if !config.residual_threshold.is_finite() || config.residual_threshold < 0.0 {
        return Err(invalid(
            "chart",
            "residual_threshold",
            "residual_threshold must be non-negative",
        ));
    }
    Ok(())
}

/// A delimiter must be exactly one ASCII character.
pub fn parse_delimiter(value: &str) -> Result<u8, TrendplotError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c as u8),
        _ => Err(invalid(
            "input",
            "delimiter",
            "delimiter must be a single ASCII character",
        )),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> TrendplotError {
    TrendplotError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_window(key: &str, value: f64) -> Result<(), TrendplotError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid("strategy", key, &format!("{key} must be positive")));
    }
    Ok(())
}

fn validate_initial_balance(value: f64) -> Result<(), TrendplotError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "strategy",
            "initial_balance",
            "initial_balance must be positive",
        ));
    }
    Ok(())
}

fn validate_trans_cost_rate(value: f64) -> Result<(), TrendplotError> {
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "strategy",
            "trans_cost_rate",
            "trans_cost_rate must be in [0, 1)",
        ));
    }
    Ok(())
}

fn validate_stop_loss(value: f64) -> Result<(), TrendplotError> {
    if !(0.0..100.0).contains(&value) {
        return Err(invalid(
            "strategy",
            "stop_loss_pct",
            "stop_loss_pct must be in [0, 100)",
        ));
    }
    Ok(())
}

fn validate_take_profit(value: f64) -> Result<(), TrendplotError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(
            "strategy",
            "take_profit_pct",
            "take_profit_pct must be non-negative",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid_key(result: Result<(), TrendplotError>, expected: &str) {
        match result {
            Err(TrendplotError::ConfigInvalid { key, .. }) => assert_eq!(key, expected),
            other => panic!("expected ConfigInvalid for {expected}, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate_strategy_config(&StrategyConfig::default()).is_ok());
        assert!(validate_chart_config(&ChartConfig::default()).is_ok());
    }

    #[test]
    fn rejects_non_positive_windows() {
        let config = StrategyConfig {
            window_short: 0.0,
            ..StrategyConfig::default()
        };
        assert_invalid_key(validate_strategy_config(&config), "window_short");

        let config = StrategyConfig {
            window_long: f64::NAN,
            ..StrategyConfig::default()
        };
        assert_invalid_key(validate_strategy_config(&config), "window_long");
    }

    #[test]
    fn rejects_bad_balance_and_costs() {
        let config = StrategyConfig {
            initial_balance: -5.0,
            ..StrategyConfig::default()
        };
        assert_invalid_key(validate_strategy_config(&config), "initial_balance");

        let config = StrategyConfig {
            trans_cost_rate: 1.0,
            ..StrategyConfig::default()
        };
        assert_invalid_key(validate_strategy_config(&config), "trans_cost_rate");
    }

    #[test]
    fn rejects_bad_thresholds() {
        let config = StrategyConfig {
            stop_loss_pct: 100.0,
            ..StrategyConfig::default()
        };
        assert_invalid_key(validate_strategy_config(&config), "stop_loss_pct");

        let config = StrategyConfig {
            take_profit_pct: -1.0,
            ..StrategyConfig::default()
        };
        assert_invalid_key(validate_strategy_config(&config), "take_profit_pct");
    }

    #[test]
    fn rejects_bad_chart_config() {
        let config = ChartConfig {
            canvas_height: 0,
            ..ChartConfig::default()
        };
        assert_invalid_key(validate_chart_config(&config), "canvas_height");

        let config = ChartConfig {
            trend_lookback: 1,
            ..ChartConfig::default()
        };
        assert_invalid_key(validate_chart_config(&config), "trend_lookback");

        let config = ChartConfig {
            max_width: 0,
            ..ChartConfig::default()
        };
        assert_invalid_key(validate_chart_config(&config), "max_width");
    }

    #[test]
    fn delimiter_parsing() {
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert_eq!(parse_delimiter("\t").unwrap(), b'\t');
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter(",,").is_err());
        assert!(parse_delimiter("é").is_err());
    }
}
