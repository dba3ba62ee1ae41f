//! Simulation event log entries.
//!
//! Every open, close, halt and skipped bar is recorded as an event. `Display`
//! renders the human-readable log line.

use chrono::NaiveDate;
use std::fmt;

use super::error::BarSkip;
use super::position::ExitReason;

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    Open {
        index: usize,
        date: NaiveDate,
        price: f64,
        size: f64,
        stop_loss: f64,
        trailing_stop: Option<f64>,
        balance: f64,
    },
    Close {
        index: usize,
        date: NaiveDate,
        price: f64,
        size: f64,
        pnl: f64,
        balance: f64,
        reason: ExitReason,
        /// Stop level that fired, for stop exits.
        trigger: Option<f64>,
    },
    Halt {
        index: usize,
        date: NaiveDate,
        balance: f64,
        max_balance: f64,
    },
    Skip {
        index: usize,
        date: NaiveDate,
        reason: BarSkip,
    },
}

impl SimulationEvent {
    pub fn index(&self) -> usize {
        match self {
            SimulationEvent::Open { index, .. }
            | SimulationEvent::Close { index, .. }
            | SimulationEvent::Halt { index, .. }
            | SimulationEvent::Skip { index, .. } => *index,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, SimulationEvent::Open { .. })
    }

    pub fn is_close(&self) -> bool {
        matches!(self, SimulationEvent::Close { .. })
    }
}

impl fmt::Display for SimulationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationEvent::Open {
                date,
                price,
                size,
                stop_loss,
                trailing_stop,
                balance,
                ..
            } => {
                write!(
                    f,
                    "{date} OPEN  long {size:.4} @ {price:.4} stop={stop_loss:.4}"
                )?;
                if let Some(trail) = trailing_stop {
                    write!(f, " trail={trail:.4}")?;
                }
                write!(f, " balance={balance:.2}")
            }
            SimulationEvent::Close {
                date,
                price,
                size,
                pnl,
                balance,
                reason,
                trigger,
                ..
            } => {
                write!(f, "{date} CLOSE ({reason}) {size:.4} @ {price:.4}")?;
                if let Some(level) = trigger {
                    write!(f, " trigger={level:.4}")?;
                }
                write!(f, " pnl={pnl:.2} balance={balance:.2}")
            }
            SimulationEvent::Halt {
                date,
                balance,
                max_balance,
                ..
            } => write!(
                f,
                "{date} HALT  drawdown limit breached, balance={balance:.2} max_balance={max_balance:.2}"
            ),
            SimulationEvent::Skip { date, reason, .. } => write!(f, "{date} SKIP  {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn open_line_has_price_size_and_balance() {
        let event = SimulationEvent::Open {
            index: 4,
            date: date(),
            price: 101.5,
            size: 9.85,
            stop_loss: 95.0,
            trailing_stop: Some(99.47),
            balance: 10_000.0,
        };
        assert_eq!(
            event.to_string(),
            "2024-03-01 OPEN  long 9.8500 @ 101.5000 stop=95.0000 trail=99.4700 balance=10000.00"
        );
        assert!(event.is_open());
        assert_eq!(event.index(), 4);
    }

    #[test]
    fn close_line_includes_reason_and_trigger() {
        let event = SimulationEvent::Close {
            index: 9,
            date: date(),
            price: 97.0,
            size: 2.0,
            pnl: -9.0,
            balance: 991.0,
            reason: ExitReason::TrailingStop,
            trigger: Some(98.0),
        };
        let line = event.to_string();
        assert!(line.contains("CLOSE (trailing stop)"));
        assert!(line.contains("trigger=98.0000"));
        assert!(line.contains("balance=991.00"));
        assert!(event.is_close());
    }

    #[test]
    fn skip_line_has_reason() {
        let event = SimulationEvent::Skip {
            index: 0,
            date: date(),
            reason: BarSkip::MissingIndicator {
                index: 0,
                indicator: "volatility",
            },
        };
        assert_eq!(
            event.to_string(),
            "2024-03-01 SKIP  volatility undefined at bar 0"
        );
    }
}
