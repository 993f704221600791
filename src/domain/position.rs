//! Simulation position state.

/// Either all cash or all units; never both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    Flat {
        balance: f64,
    },
    Holding {
        amount: f64,
        stop_loss: f64,
        take_profit: f64,
        /// Balance spent on the entry, before costs.
        entry_balance: f64,
    },
}

impl Position {
    pub fn flat(balance: f64) -> Self {
        Position::Flat { balance }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, Position::Flat { .. })
    }

    pub fn is_holding(&self) -> bool {
        matches!(self, Position::Holding { .. })
    }

    /// Cash balance; zero while holding.
    pub fn balance(&self) -> f64 {
        match self {
            Position::Flat { balance } => *balance,
            Position::Holding { .. } => 0.0,
        }
    }

    /// Units held; zero while flat.
    pub fn amount(&self) -> f64 {
        match self {
            Position::Flat { .. } => 0.0,
            Position::Holding { amount, .. } => *amount,
        }
    }

    /// Active stop-loss price; zero while flat.
    pub fn stop_loss(&self) -> f64 {
        match self {
            Position::Flat { .. } => 0.0,
            Position::Holding { stop_loss, .. } => *stop_loss,
        }
    }

    pub fn take_profit(&self) -> f64 {
        match self {
            Position::Flat { .. } => 0.0,
            Position::Holding { take_profit, .. } => *take_profit,
        }
    }

    pub fn should_stop_loss(&self, price: f64) -> bool {
        match self {
            Position::Flat { .. } => false,
            Position::Holding { stop_loss, .. } => price <= *stop_loss,
        }
    }

    pub fn should_take_profit(&self, price: f64) -> bool {
        match self {
            Position::Flat { .. } => false,
            Position::Holding { take_profit, .. } => price > *take_profit,
        }
    }

    /// Value at `price`, before exit costs.
    pub fn market_value(&self, price: f64) -> f64 {
        match self {
            Position::Flat { balance } => *balance,
            Position::Holding { amount, .. } => amount * price,
        }
    }
}
