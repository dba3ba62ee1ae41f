//! Trade execution and fill simulation.
//!
//! Entry/exit prices with slippage, fractional sizing, stop placement and
//! net P&L after transaction cost.

use chrono::NaiveDate;

use super::config::SimulationConfig;
use super::position::{ExitReason, Position, Trade};

/// Long entry (buy): execution_price = market_price * (1 + slippage_pct)
pub fn apply_slippage_long_entry(market_price: f64, slippage_pct: f64) -> f64 {
    market_price * (1.0 + slippage_pct)
}

/// Long exit (sell): execution_price = market_price * (1 - slippage_pct)
pub fn apply_slippage_long_exit(market_price: f64, slippage_pct: f64) -> f64 {
    market_price * (1.0 - slippage_pct)
}

/// Units bought with `balance * position_fraction` at `entry_price`. Fractional units allowed.
pub fn position_size(balance: f64, position_fraction: f64, entry_price: f64) -> f64 {
    if entry_price > 0.0 {
        balance * position_fraction / entry_price
    } else {
        0.0
    }
}

/// entry_price * (1 - stop_loss_factor * volatility)
pub fn static_stop_loss(entry_price: f64, stop_loss_factor: f64, volatility: f64) -> f64 {
    entry_price * (1.0 - stop_loss_factor * volatility)
}

/// Transaction cost always reduces P&L: net = raw - cost_pct * |raw|.
pub fn net_pnl(raw_pnl: f64, transaction_cost_pct: f64) -> f64 {
    raw_pnl - transaction_cost_pct * raw_pnl.abs()
}

/// Open a long position of `size` units at `close`.
///
/// 1. Apply slippage to the entry price
/// 2. Place the volatility-scaled static stop
/// 3. Seed the trailing stop when trailing mode is enabled
///
/// `size` comes from [`position_size`] and stays fixed for the life of the position.
pub fn enter_long(
    date: NaiveDate,
    close: f64,
    volatility: f64,
    size: f64,
    config: &SimulationConfig,
) -> Position {
    let entry_price = apply_slippage_long_entry(close, config.slippage_pct);
    let stop_loss = static_stop_loss(entry_price, config.stop_loss_factor, volatility);
    let trailing_stop = config
        .trailing_stop_enabled
        .then(|| entry_price * (1.0 - config.trailing_stop_pct));

    Position {
        entry_date: date,
        entry_price,
        size,
        stop_loss,
        trailing_stop,
    }
}

/// Close `position` at `close`, returning the trade with the balance it leaves behind.
///
/// `balance` is the account balance before the close; the caller applies `trade.pnl`.
pub fn exit_position(
    position: &Position,
    date: NaiveDate,
    close: f64,
    reason: ExitReason,
    balance: f64,
    config: &SimulationConfig,
) -> Trade {
    let exit_price = apply_slippage_long_exit(close, config.slippage_pct);
    let raw = (exit_price - position.entry_price) * position.size;
    let pnl = net_pnl(raw, config.transaction_cost_pct);

    Trade {
        entry_date: position.entry_date,
        exit_date: date,
        entry_price: position.entry_price,
        exit_price,
        size: position.size,
        pnl,
        balance: balance + pnl,
        exit_reason: reason,
    }
}
