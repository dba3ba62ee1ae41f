//! Performance summary over the trade list.

use super::account::AccountState;
use super::position::Trade;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_trades: usize,
    pub total_profit: f64,
    pub average_profit: f64,
    /// (max_balance - final_balance) / max_balance. Uses the final balance, not the
    /// lowest balance seen during the run.
    pub max_drawdown: f64,
    /// mean(P&L) / stddev(P&L), single period, no risk-free adjustment.
    pub sharpe_ratio: f64,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub win_rate: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub final_balance: f64,
    pub max_balance: f64,
}

impl Summary {
    pub fn compute(trades: &[Trade], account: &AccountState) -> Self {
        let pnls: Vec<f64> = trades.iter().map(|t| t.pnl).collect();
        let total_trades = pnls.len();
        let total_profit: f64 = pnls.iter().sum();
        let average_profit = if total_trades > 0 {
            total_profit / total_trades as f64
        } else {
            0.0
        };

        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;

        for &pnl in &pnls {
            if pnl > 0.0 {
                trades_won += 1;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                trades_lost += 1;
                largest_loss = largest_loss.max(pnl.abs());
            }
        }

        let win_rate = if total_trades > 0 {
            trades_won as f64 / total_trades as f64
        } else {
            0.0
        };

        Summary {
            total_trades,
            total_profit,
            average_profit,
            max_drawdown: account.current_drawdown(),
            sharpe_ratio: sharpe_like(&pnls),
            trades_won,
            trades_lost,
            win_rate,
            largest_win,
            largest_loss,
            final_balance: account.balance,
            max_balance: account.max_balance,
        }
    }
}

/// Mean over sample standard deviation; 0 when fewer than two values or zero spread.
pub fn sharpe_like(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    if stddev > 0.0 { mean / stddev } else { 0.0 }
}
