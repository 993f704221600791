//! Crossover strategy simulation.
//!
//! Walks the aligned price/EMA arrays once, in index order, starting at index 1
//! (a crossover needs the previous pair). Each step is a pure function of the
//! current [`Position`] and the step inputs; [`StrategyEngine`] threads the
//! position through the series and records the trade log.
//!
//! Entry: bullish crossover while flat. Exit while holding, checked in order:
//! stop-loss (price <= stop), take-profit (price > target), and, when enabled,
//! bearish crossover. There is no forced exit at the end of the series.

use std::fmt;

use tracing::{debug, info, warn};

use crate::domain::error::TrendplotError;
use crate::domain::indicator::Crossover;
use crate::domain::position::Position;
use crate::domain::series::Series;
use crate::domain::strategy::StrategyConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    Crossover,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "stop-loss"),
            ExitReason::TakeProfit => write!(f, "take-profit"),
            ExitReason::Crossover => write!(f, "crossover"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeKind {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TradeEvent {
    Buy {
        index: usize,
        price: f64,
        /// Units acquired.
        amount: f64,
        /// Balance spent, before costs.
        spent: f64,
    },
    Sell {
        index: usize,
        price: f64,
        /// Balance after the sale, net of costs.
        balance: f64,
        reason: ExitReason,
        /// Stop-loss that was active when the exit fired.
        stop_loss: f64,
        /// Realized change against the balance spent on the matching buy.
        return_pct: f64,
    },
}

impl TradeEvent {
    pub fn index(&self) -> usize {
        match self {
            TradeEvent::Buy { index, .. } | TradeEvent::Sell { index, .. } => *index,
        }
    }

    pub fn price(&self) -> f64 {
        match self {
            TradeEvent::Buy { price, .. } | TradeEvent::Sell { price, .. } => *price,
        }
    }

    pub fn kind(&self) -> TradeKind {
        match self {
            TradeEvent::Buy { .. } => TradeKind::Buy,
            TradeEvent::Sell { .. } => TradeKind::Sell,
        }
    }

    /// True for a sale that filled below its stop-loss.
    pub fn sold_below_stop(&self) -> bool {
        match self {
            TradeEvent::Sell {
                price, stop_loss, ..
            } => price < stop_loss,
            TradeEvent::Buy { .. } => false,
        }
    }
}

/// Everything a single decision step looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInput {
    pub index: usize,
    pub price: f64,
    pub prev_ema_short: f64,
    pub prev_ema_long: f64,
    pub ema_short: f64,
    pub ema_long: f64,
}

impl StepInput {
    /// Inputs for index `i` of `series`; `None` for index 0 or past the end.
    pub fn from_series(series: &Series, i: usize) -> Option<StepInput> {
        if i == 0 || i >= series.len() {
            return None;
        }
        let short = series.ema_short();
        let long = series.ema_long();
        Some(StepInput {
            index: i,
            price: series.price(i)?,
            prev_ema_short: short[i - 1],
            prev_ema_long: long[i - 1],
            ema_short: short[i],
            ema_long: long[i],
        })
    }

    pub fn crossover(&self) -> Option<Crossover> {
        Crossover::detect(
            self.prev_ema_short,
            self.prev_ema_long,
            self.ema_short,
            self.ema_long,
        )
    }
}

/// Decide one step. Returns the next position and the trade it produced, if
/// any. An unusable price leaves the caller's position unchanged.
pub fn step(
    position: Position,
    input: &StepInput,
    config: &StrategyConfig,
) -> Result<(Position, Option<TradeEvent>), TrendplotError> {
    let price = input.price;
    if !price.is_finite() || price <= 0.0 {
        return Err(TrendplotError::InvalidPrice {
            index: input.index,
            price,
        });
    }

    match position {
        Position::Flat { balance } => {
            if input.crossover() != Some(Crossover::Bullish) || balance <= 0.0 {
                return Ok((position, None));
            }

            let amount = balance * config.cost_factor() / price;
            let next = Position::Holding {
                amount,
                stop_loss: config.stop_loss_price(price),
                take_profit: config.take_profit_price(price),
                entry_balance: balance,
            };
            let event = TradeEvent::Buy {
                index: input.index,
                price,
                amount,
                spent: balance,
            };
            Ok((next, Some(event)))
        }
        Position::Holding {
            amount,
            stop_loss,
            entry_balance,
            ..
        } => {
            let reason = if position.should_stop_loss(price) {
                ExitReason::StopLoss
            } else if position.should_take_profit(price) {
                ExitReason::TakeProfit
            } else if config.enable_crossover_exit
                && input.crossover() == Some(Crossover::Bearish)
            {
                ExitReason::Crossover
            } else {
                return Ok((position, None));
            };

            let balance = amount * config.cost_factor() * price;
            let return_pct = (balance - entry_balance) / entry_balance * 100.0;
            let event = TradeEvent::Sell {
                index: input.index,
                price,
                balance,
                reason,
                stop_loss,
                return_pct,
            };
            Ok((Position::flat(balance), Some(event)))
        }
    }
}

/// Result of a full run.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub events: Vec<TradeEvent>,
    pub final_position: Position,
    /// Steps skipped because of an unusable price.
    pub skipped_steps: usize,
}

/// Owns the position and the trade log for one run.
#[derive(Debug, Clone)]
pub struct StrategyEngine {
    config: StrategyConfig,
    position: Position,
    events: Vec<TradeEvent>,
    skipped_steps: usize,
    last_index: Option<usize>,
}

impl StrategyEngine {
    pub fn new(config: StrategyConfig) -> Self {
        let position = Position::flat(config.initial_balance);
        StrategyEngine {
            config,
            position,
            events: Vec::new(),
            skipped_steps: 0,
            last_index: None,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn events(&self) -> &[TradeEvent] {
        &self.events
    }

    /// Apply one step. Indices must be strictly increasing across calls.
    pub fn advance(&mut self, input: &StepInput) -> Result<Option<TradeEvent>, TrendplotError> {
        debug_assert!(
            self.last_index.is_none_or(|last| input.index > last),
            "steps must be visited in increasing index order"
        );
        self.last_index = Some(input.index);

        let (next, event) = step(self.position, input, &self.config)?;
        self.position = next;

        if let Some(event) = event {
            log_trade(&event);
            self.events.push(event);
        }
        Ok(event)
    }

    /// Simulate over every decision index of `series`.
    pub fn run(mut self, series: &Series) -> Simulation {
        for i in 1..series.len() {
            let Some(input) = StepInput::from_series(series, i) else {
                continue;
            };
            if let Err(e) = self.advance(&input) {
                debug_assert!(e.is_recoverable(), "step failed with {e}");
                warn!("skipping step: {e}");
                self.skipped_steps += 1;
            }
        }

        debug!(
            events = self.events.len(),
            skipped = self.skipped_steps,
            "simulation finished"
        );
        self.finish()
    }

    pub fn finish(self) -> Simulation {
        Simulation {
            events: self.events,
            final_position: self.position,
            skipped_steps: self.skipped_steps,
        }
    }
}

fn log_trade(event: &TradeEvent) {
    match event {
        TradeEvent::Buy {
            index,
            price,
            spent,
            ..
        } => info!(index, price, "buy balance: {spent:.6}"),
        TradeEvent::Sell {
            index,
            price,
            balance,
            reason,
            return_pct,
            ..
        } => info!(
            index,
            price,
            %reason,
            "sell balance: {balance:.6} {return_pct:.2}%"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn input(index: usize, price: f64, prev: (f64, f64), cur: (f64, f64)) -> StepInput {
        StepInput {
            index,
            price,
            prev_ema_short: prev.0,
            prev_ema_long: prev.1,
            ema_short: cur.0,
            ema_long: cur.1,
        }
    }

    fn holding_at(price: f64, config: &StrategyConfig) -> Position {
        Position::Holding {
            amount: config.initial_balance * config.cost_factor() / price,
            stop_loss: config.stop_loss_price(price),
            take_profit: config.take_profit_price(price),
            entry_balance: config.initial_balance,
        }
    }

    #[test]
    fn buy_on_bullish_crossover() {
        let config = StrategyConfig::default();
        let (next, event) = step(
            Position::flat(1000.0),
            &input(3, 50.0, (9.0, 10.0), (11.0, 10.0)),
            &config,
        )
        .unwrap();

        let expected_amount = 1000.0 * 0.999 / 50.0;
        assert!(next.is_holding());
        assert_relative_eq!(next.amount(), expected_amount, epsilon = 1e-12);
        assert_relative_eq!(next.stop_loss(), 49.75, epsilon = 1e-12);
        assert_relative_eq!(next.take_profit(), 51.0, epsilon = 1e-12);

        match event {
            Some(TradeEvent::Buy {
                index,
                price,
                amount,
                spent,
            }) => {
                assert_eq!(index, 3);
                assert_eq!(price, 50.0);
                assert_relative_eq!(amount, expected_amount, epsilon = 1e-12);
                assert_eq!(spent, 1000.0);
            }
            other => panic!("expected buy, got {other:?}"),
        }
    }

    #[test]
    fn no_buy_without_crossover() {
        let config = StrategyConfig::default();
        let (next, event) = step(
            Position::flat(1000.0),
            &input(3, 50.0, (11.0, 10.0), (12.0, 10.0)),
            &config,
        )
        .unwrap();
        assert_eq!(next, Position::flat(1000.0));
        assert!(event.is_none());
    }

    #[test]
    fn no_buy_with_empty_balance() {
        let config = StrategyConfig::default();
        let (next, event) = step(
            Position::flat(0.0),
            &input(3, 50.0, (9.0, 10.0), (11.0, 10.0)),
            &config,
        )
        .unwrap();
        assert!(next.is_flat());
        assert!(event.is_none());
    }

    #[test]
    fn holding_ignores_bullish_crossover() {
        let config = StrategyConfig::default();
        let pos = holding_at(50.0, &config);
        let (next, event) = step(pos, &input(4, 50.5, (9.0, 10.0), (11.0, 10.0)), &config).unwrap();
        assert_eq!(next, pos);
        assert!(event.is_none());
    }

    #[test]
    fn sell_on_stop_loss() {
        let config = StrategyConfig::default();
        let pos = holding_at(100.0, &config);
        let (next, event) = step(pos, &input(7, 99.4, (1.0, 1.0), (1.0, 1.0)), &config).unwrap();

        assert!(next.is_flat());
        let expected_balance = pos.amount() * 0.999 * 99.4;
        assert_relative_eq!(next.balance(), expected_balance, epsilon = 1e-9);
        match event {
            Some(TradeEvent::Sell {
                reason,
                stop_loss,
                return_pct,
                ..
            }) => {
                assert_eq!(reason, ExitReason::StopLoss);
                assert_relative_eq!(stop_loss, 99.5, epsilon = 1e-12);
                assert_relative_eq!(
                    return_pct,
                    (expected_balance - 1000.0) / 1000.0 * 100.0,
                    epsilon = 1e-9
                );
            }
            other => panic!("expected sell, got {other:?}"),
        }
    }

    #[test]
    fn sell_on_take_profit() {
        let config = StrategyConfig::default();
        let pos = holding_at(100.0, &config);

        let (_, event) = step(pos, &input(5, 101.9, (1.0, 1.0), (1.0, 1.0)), &config).unwrap();
        assert!(event.is_none());

        let (next, event) = step(pos, &input(5, 102.5, (1.0, 1.0), (1.0, 1.0)), &config).unwrap();
        assert!(next.is_flat());
        assert!(matches!(
            event,
            Some(TradeEvent::Sell {
                reason: ExitReason::TakeProfit,
                ..
            })
        ));
    }

    #[test]
    fn crossover_exit_disabled_by_default() {
        let config = StrategyConfig::default();
        let pos = holding_at(100.0, &config);
        let (next, event) = step(pos, &input(5, 100.0, (11.0, 10.0), (9.0, 10.0)), &config).unwrap();
        assert!(next.is_holding());
        assert!(event.is_none());
    }

    #[test]
    fn crossover_exit_when_enabled() {
        let config = StrategyConfig {
            enable_crossover_exit: true,
            ..StrategyConfig::default()
        };
        let pos = holding_at(100.0, &config);
        let (next, event) = step(pos, &input(5, 100.0, (11.0, 10.0), (9.0, 10.0)), &config).unwrap();
        assert!(next.is_flat());
        assert!(matches!(
            event,
            Some(TradeEvent::Sell {
                reason: ExitReason::Crossover,
                ..
            })
        ));
    }

    #[test]
    fn stop_loss_takes_priority_over_crossover() {
        let config = StrategyConfig {
            enable_crossover_exit: true,
            ..StrategyConfig::default()
        };
        let pos = holding_at(100.0, &config);
        let (_, event) = step(pos, &input(5, 90.0, (11.0, 10.0), (9.0, 10.0)), &config).unwrap();
        assert!(matches!(
            event,
            Some(TradeEvent::Sell {
                reason: ExitReason::StopLoss,
                ..
            })
        ));
    }

    #[test]
    fn invalid_price_is_rejected() {
        let config = StrategyConfig::default();
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = step(
                Position::flat(1000.0),
                &input(2, bad, (9.0, 10.0), (11.0, 10.0)),
                &config,
            )
            .unwrap_err();
            assert!(matches!(err, TrendplotError::InvalidPrice { index: 2, .. }));
        }
    }

    #[test]
    fn engine_skips_invalid_step_without_state_change() {
        let mut engine = StrategyEngine::new(StrategyConfig::default());
        let result = engine.advance(&input(1, 0.0, (9.0, 10.0), (11.0, 10.0)));
        assert!(result.is_err());
        assert_eq!(*engine.position(), Position::flat(1000.0));
        assert!(engine.events().is_empty());

        let event = engine
            .advance(&input(2, 10.0, (9.0, 10.0), (11.0, 10.0)))
            .unwrap();
        assert!(matches!(event, Some(TradeEvent::Buy { index: 2, .. })));
        assert_eq!(engine.events().len(), 1);
    }

    #[test]
    fn sold_below_stop_marks_gap_down_exits() {
        let below = TradeEvent::Sell {
            index: 1,
            price: 98.0,
            balance: 980.0,
            reason: ExitReason::StopLoss,
            stop_loss: 99.5,
            return_pct: -2.0,
        };
        let at = TradeEvent::Sell {
            index: 1,
            price: 99.5,
            balance: 995.0,
            reason: ExitReason::StopLoss,
            stop_loss: 99.5,
            return_pct: -0.5,
        };
        assert!(below.sold_below_stop());
        assert!(!at.sold_below_stop());
        assert_eq!(below.kind(), TradeKind::Sell);
        assert_eq!(below.index(), 1);
    }

    #[test]
    fn step_input_from_series() {
        let series = Series::from_prices(2.0, 5.0, [10.0, 11.0, 12.0]);
        assert!(StepInput::from_series(&series, 0).is_none());
        assert!(StepInput::from_series(&series, 3).is_none());

        let input = StepInput::from_series(&series, 2).unwrap();
        assert_eq!(input.index, 2);
        assert_eq!(input.price, 12.0);
        assert_eq!(input.prev_ema_short, series.ema_short()[1]);
        assert_eq!(input.ema_long, series.ema_long()[2]);
    }

    #[test]
    fn exit_reason_display() {
        assert_eq!(ExitReason::StopLoss.to_string(), "stop-loss");
        assert_eq!(ExitReason::TakeProfit.to_string(), "take-profit");
        assert_eq!(ExitReason::Crossover.to_string(), "crossover");
    }
}
