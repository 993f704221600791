//! End-of-run statistics.

use super::engine::{ExitReason, Simulation, TradeEvent};

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub samples: usize,
    pub buys: usize,
    pub sells: usize,
    pub stop_loss_exits: usize,
    pub take_profit_exits: usize,
    pub crossover_exits: usize,
    pub initial_balance: f64,
    /// Cash balance, or holdings valued at the last price when still holding.
    pub final_equity: f64,
    pub total_return_pct: f64,
    pub holding_at_end: bool,
}

impl RunSummary {
    pub fn compute(
        simulation: &Simulation,
        initial_balance: f64,
        samples: usize,
        last_price: Option<f64>,
    ) -> Self {
        let mut buys = 0usize;
        let mut sells = 0usize;
        let mut stop_loss_exits = 0usize;
        let mut take_profit_exits = 0usize;
        let mut crossover_exits = 0usize;

        for event in &simulation.events {
            match event {
                TradeEvent::Buy { .. } => buys += 1,
                TradeEvent::Sell { reason, .. } => {
                    sells += 1;
                    match reason {
                        ExitReason::StopLoss => stop_loss_exits += 1,
                        ExitReason::TakeProfit => take_profit_exits += 1,
                        ExitReason::Crossover => crossover_exits += 1,
                    }
                }
            }
        }

        let position = &simulation.final_position;
        let final_equity = match last_price {
            Some(price) => position.market_value(price),
            None => position.balance(),
        };

        let total_return_pct = if initial_balance > 0.0 {
            (final_equity - initial_balance) / initial_balance * 100.0
        } else {
            0.0
        };

        RunSummary {
            samples,
            buys,
            sells,
            stop_loss_exits,
            take_profit_exits,
            crossover_exits,
            initial_balance,
            final_equity,
            total_return_pct,
            holding_at_end: position.is_holding(),
        }
    }
}
