//! Bar-by-bar strategy simulation.
//!
//! A fresh [`SimulationEngine`] is created per run. It owns the loop state
//! (account, open position, trade list, event log) and processes one
//! [`AnnotatedBar`] at a time in a fixed order:
//!
//! 1. Recompute the hypothetical entry size
//! 2. Drawdown circuit breaker (halts the whole run)
//! 3. Open long when flat and short EMA > long EMA
//! 4. Close long when short EMA < long EMA
//! 5. Trailing stop (or static stop when trailing is disabled)
//! 6. Update the high-water mark
//!
//! A bar whose inputs are undefined is skipped as a whole and the loop continues.

use tracing::{debug, info, warn};

use super::account::AccountState;
use super::bar::{is_strictly_ordered, Bar};
use super::config::SimulationConfig;
use super::error::{BarSkip, EmacrossError};
use super::event::SimulationEvent;
use super::execution::{apply_slippage_long_entry, enter_long, exit_position, position_size};
use super::indicator::{compute_indicators, AnnotatedBar, AnnotatedSeries};
use super::position::{ExitReason, Position, Trade};

/// What happened to a single bar.
#[derive(Debug, Clone, PartialEq)]
pub enum BarOutcome {
    Processed,
    Skipped(BarSkip),
    Halted,
}

#[derive(Debug, Clone)]
struct LoopState {
    account: AccountState,
    position: Option<Position>,
    trades: Vec<Trade>,
    events: Vec<SimulationEvent>,
    halted_at: Option<usize>,
    bars_processed: usize,
    bars_skipped: usize,
}

#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub series: AnnotatedSeries,
    pub trades: Vec<Trade>,
    pub events: Vec<SimulationEvent>,
    pub account: AccountState,
    /// Position still open when the series ended. Not part of `trades`.
    pub open_position: Option<Position>,
    /// Bar index at which the drawdown circuit breaker fired.
    pub halted_at: Option<usize>,
    pub bars_processed: usize,
    pub bars_skipped: usize,
}

impl SimulationResult {
    pub fn open_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_open()).count()
    }

    pub fn close_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_close()).count()
    }
}

pub struct SimulationEngine<'a> {
    config: &'a SimulationConfig,
    state: LoopState,
}

impl<'a> SimulationEngine<'a> {
    pub fn new(config: &'a SimulationConfig) -> Self {
        SimulationEngine {
            config,
            state: LoopState {
                account: AccountState::new(config.initial_capital),
                position: None,
                trades: Vec::new(),
                events: Vec::new(),
                halted_at: None,
                bars_processed: 0,
                bars_skipped: 0,
            },
        }
    }

    pub fn account(&self) -> &AccountState {
        &self.state.account
    }

    pub fn position(&self) -> Option<&Position> {
        self.state.position.as_ref()
    }

    pub fn is_halted(&self) -> bool {
        self.state.halted_at.is_some()
    }

    /// Process one bar. Bars offered after a halt are ignored and report `Halted`.
    pub fn process_bar(&mut self, index: usize, bar: &AnnotatedBar) -> BarOutcome {
        if self.is_halted() {
            return BarOutcome::Halted;
        }

        let volatility = match check_bar(index, bar) {
            Ok(v) => v,
            Err(reason) => {
                if self.halt_if_breached(index, bar) {
                    return BarOutcome::Halted;
                }
                let event = SimulationEvent::Skip {
                    index,
                    date: bar.date,
                    reason: reason.clone(),
                };
                debug!("{event}");
                self.state.events.push(event);
                self.state.bars_skipped += 1;
                return BarOutcome::Skipped(reason);
            }
        };
        let config = self.config;

        let entry_price = apply_slippage_long_entry(bar.close, config.slippage_pct);
        let size = position_size(
            self.state.account.balance,
            config.position_fraction,
            entry_price,
        );

        if self.halt_if_breached(index, bar) {
            return BarOutcome::Halted;
        }

        if self.state.position.is_none() && bar.short_ema > bar.long_ema {
            let position = enter_long(bar.date, bar.close, volatility, size, config);
            let event = SimulationEvent::Open {
                index,
                date: bar.date,
                price: position.entry_price,
                size: position.size,
                stop_loss: position.stop_loss,
                trailing_stop: position.trailing_stop,
                balance: self.state.account.balance,
            };
            debug!("{event}");
            self.state.events.push(event);
            self.state.position = Some(position);
        }

        if self.state.position.is_some() && bar.short_ema < bar.long_ema {
            self.close_position(index, bar, ExitReason::Signal, None);
        }

        if let Some(position) = self.state.position.as_mut() {
            if config.trailing_stop_enabled {
                let level = position.ratchet_trailing_stop(bar.close, config.trailing_stop_pct);
                if position.should_trailing_stop(bar.close) {
                    self.close_position(index, bar, ExitReason::TrailingStop, level);
                }
            } else if position.should_stop_loss(bar.close) {
                let level = position.stop_loss;
                self.close_position(index, bar, ExitReason::StopLoss, Some(level));
            }
        }

        self.state.account.update_high_water_mark();
        self.state.bars_processed += 1;
        BarOutcome::Processed
    }

    /// Drawdown circuit breaker. Checked on skipped bars too, since it only needs the balance.
    fn halt_if_breached(&mut self, index: usize, bar: &AnnotatedBar) -> bool {
        if !self.state.account.drawdown_breached(self.config.max_drawdown_pct) {
            return false;
        }
        let event = SimulationEvent::Halt {
            index,
            date: bar.date,
            balance: self.state.account.balance,
            max_balance: self.state.account.max_balance,
        };
        info!("{event}");
        self.state.events.push(event);
        self.state.halted_at = Some(index);
        true
    }

    fn close_position(
        &mut self,
        index: usize,
        bar: &AnnotatedBar,
        reason: ExitReason,
        trigger: Option<f64>,
    ) {
        let Some(position) = self.state.position.take() else {
            return;
        };

        let trade = exit_position(
            &position,
            bar.date,
            bar.close,
            reason,
            self.state.account.balance,
            self.config,
        );
        self.state.account.apply_pnl(trade.pnl);

        let event = SimulationEvent::Close {
            index,
            date: bar.date,
            price: trade.exit_price,
            size: trade.size,
            pnl: trade.pnl,
            balance: self.state.account.balance,
            reason,
            trigger,
        };
        debug!("{event}");
        self.state.events.push(event);
        self.state.trades.push(trade);
    }

    pub fn finish(self, series: AnnotatedSeries) -> SimulationResult {
        let state = self.state;
        if let Some(position) = &state.position {
            debug!(
                "position opened {} @ {:.4} still open at end of series",
                position.entry_date, position.entry_price
            );
        }
        SimulationResult {
            series,
            trades: state.trades,
            events: state.events,
            account: state.account,
            open_position: state.position,
            halted_at: state.halted_at,
            bars_processed: state.bars_processed,
            bars_skipped: state.bars_skipped,
        }
    }
}

/// Inputs needed to act on a bar. Returns the bar's volatility.
fn check_bar(index: usize, bar: &AnnotatedBar) -> Result<f64, BarSkip> {
    for (field, value) in [
        ("close", bar.close),
        ("short EMA", bar.short_ema),
        ("long EMA", bar.long_ema),
    ] {
        if !value.is_finite() {
            return Err(BarSkip::NonFinite { index, field });
        }
    }

    match bar.volatility {
        None => Err(BarSkip::MissingIndicator {
            index,
            indicator: "volatility",
        }),
        Some(v) if !v.is_finite() => Err(BarSkip::NonFinite {
            index,
            field: "volatility",
        }),
        Some(v) => Ok(v),
    }
}

/// Walk an annotated series with a fresh engine.
pub fn run_simulation(series: AnnotatedSeries, config: &SimulationConfig) -> SimulationResult {
    let mut engine = SimulationEngine::new(config);

    for (index, bar) in series.bars.iter().enumerate() {
        if engine.process_bar(index, bar) == BarOutcome::Halted {
            break;
        }
    }

    engine.finish(series)
}

/// Compute indicators for `bars` and simulate. An empty series is a no-op run.
pub fn simulate(
    bars: &[Bar],
    config: &SimulationConfig,
) -> Result<SimulationResult, EmacrossError> {
    if bars.is_empty() {
        warn!("empty price series; nothing to simulate");
    }
    if !is_strictly_ordered(bars) {
        return Err(EmacrossError::Data {
            reason: "bar dates must be strictly ascending".into(),
        });
    }
    let series = compute_indicators(bars, config.windows())?;
    Ok(run_simulation(series, config))
}
