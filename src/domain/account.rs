//! Account balance and high-water mark.

#[derive(Debug, Clone, PartialEq)]
pub struct AccountState {
    pub initial_capital: f64,
    pub balance: f64,
    pub max_balance: f64,
}

impl AccountState {
    pub fn new(initial_capital: f64) -> Self {
        AccountState {
            initial_capital,
            balance: initial_capital,
            max_balance: initial_capital,
        }
    }

    pub fn apply_pnl(&mut self, pnl: f64) {
        self.balance += pnl;
    }

    pub fn update_high_water_mark(&mut self) {
        if self.balance > self.max_balance {
            self.max_balance = self.balance;
        }
    }

    /// True once the balance has fallen below `max_balance * (1 - max_drawdown_pct)`.
    pub fn drawdown_breached(&self, max_drawdown_pct: f64) -> bool {
        self.balance < self.max_balance * (1.0 - max_drawdown_pct)
    }

    /// Drawdown of the current balance from the high-water mark, as a fraction.
    pub fn current_drawdown(&self) -> f64 {
        if self.max_balance > 0.0 {
            (self.max_balance - self.balance) / self.max_balance
        } else {
            0.0
        }
    }
}
