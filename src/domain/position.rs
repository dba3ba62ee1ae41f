//! Position tracking and completed trades.

use chrono::NaiveDate;
use std::fmt;

/// An open long position. Flat is represented by the absence of a `Position`.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub size: f64,
    pub stop_loss: f64,
    pub trailing_stop: Option<f64>,
}

impl Position {
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        (price - self.entry_price) * self.size
    }

    /// Ratchet the trailing stop to `close * (1 - pct)` if that is higher. Returns the new level.
    pub fn ratchet_trailing_stop(&mut self, close: f64, trailing_stop_pct: f64) -> Option<f64> {
        if let Some(stop) = self.trailing_stop.as_mut() {
            let candidate = close * (1.0 - trailing_stop_pct);
            if candidate > *stop {
                *stop = candidate;
            }
        }
        self.trailing_stop
    }

    pub fn should_trailing_stop(&self, close: f64) -> bool {
        self.trailing_stop.is_some_and(|stop| close < stop)
    }

    pub fn should_stop_loss(&self, close: f64) -> bool {
        close < self.stop_loss
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Signal,
    TrailingStop,
    StopLoss,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Signal => write!(f, "signal"),
            ExitReason::TrailingStop => write!(f, "trailing stop"),
            ExitReason::StopLoss => write!(f, "stop loss"),
        }
    }
}

/// One completed round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub size: f64,
    pub pnl: f64,
    pub balance: f64,
    pub exit_reason: ExitReason,
}
