//! Exhaustive grid search over simulation parameters.
//!
//! Each combination recomputes indicators on the shared base series, runs a
//! fresh simulation and is scored by the Sharpe-like ratio. The best score wins
//! with strict `>`, so ties keep the configuration found first. Runs that
//! produce no trades are not eligible.

use tracing::{debug, info, warn};

use super::bar::Bar;
use super::config::{SearchGrid, SimulationConfig};
use super::metrics::Summary;
use super::simulation::simulate;

#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Scored(Summary),
    NoTrades,
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchEntry {
    pub config: SimulationConfig,
    pub evaluation: Evaluation,
}

impl SearchEntry {
    pub fn score(&self) -> Option<f64> {
        match &self.evaluation {
            Evaluation::Scored(summary) => Some(summary.sharpe_ratio),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// `None` when no combination traded or the series was empty.
    pub best: Option<SimulationConfig>,
    /// `f64::NEG_INFINITY` when `best` is `None`.
    pub best_score: f64,
    pub best_summary: Option<Summary>,
    pub entries: Vec<SearchEntry>,
}

impl SearchOutcome {
    fn empty() -> Self {
        SearchOutcome {
            best: None,
            best_score: f64::NEG_INFINITY,
            best_summary: None,
            entries: Vec::new(),
        }
    }
}

pub fn grid_search(bars: &[Bar], base: &SimulationConfig, grid: &SearchGrid) -> SearchOutcome {
    let mut outcome = SearchOutcome::empty();

    if bars.is_empty() {
        warn!("grid search: empty price series, nothing to optimize");
        return outcome;
    }

    let configs = grid.configs(base);
    info!(
        "grid search: {} combinations over {} bars",
        configs.len(),
        bars.len()
    );

    for config in configs {
        let evaluation = match simulate(bars, &config) {
            Ok(result) => {
                if result.trades.is_empty() {
                    Evaluation::NoTrades
                } else {
                    Evaluation::Scored(Summary::compute(&result.trades, &result.account))
                }
            }
            Err(e) => {
                warn!(
                    "grid search: skipping short={} long={} ({})",
                    config.short_window, config.long_window, e
                );
                Evaluation::Rejected(e.to_string())
            }
        };

        if let Evaluation::Scored(summary) = &evaluation {
            debug!(
                "short={} long={} stop_loss_factor={} trailing_stop_pct={} -> sharpe {:.4} over {} trades",
                config.short_window,
                config.long_window,
                config.stop_loss_factor,
                config.trailing_stop_pct,
                summary.sharpe_ratio,
                summary.total_trades
            );
            if summary.sharpe_ratio > outcome.best_score {
                outcome.best_score = summary.sharpe_ratio;
                outcome.best = Some(config.clone());
                outcome.best_summary = Some(summary.clone());
            }
        }

        outcome.entries.push(SearchEntry { config, evaluation });
    }

    match &outcome.best {
        Some(best) => info!(
            "grid search: best short={} long={} stop_loss_factor={} trailing_stop_pct={} sharpe {:.4}",
            best.short_window,
            best.long_window,
            best.stop_loss_factor,
            best.trailing_stop_pct,
            outcome.best_score
        ),
        None => warn!("grid search: no combination produced any trades"),
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar::new(start + chrono::Duration::days(i as i64), close))
            .collect()
    }

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + 10.0 * ((i as f64) * 0.3).sin() + i as f64 * 0.05)
            .collect()
    }

    fn base() -> SimulationConfig {
        SimulationConfig {
            volatility_window: 3,
            stop_loss_factor: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn empty_series_fails_open() {
        let outcome = grid_search(&[], &base(), &SearchGrid::default());
        assert!(outcome.best.is_none());
        assert_eq!(outcome.best_score, f64::NEG_INFINITY);
        assert!(outcome.entries.is_empty());
    }

    #[test]
    fn evaluates_every_combination() {
        let bars = make_bars(&wave(120));
        let grid = SearchGrid {
            short_windows: vec![3, 5],
            long_windows: vec![10, 20],
            stop_loss_factors: vec![0.0],
            trailing_stop_pcts: vec![0.02, 0.05],
        };
        let outcome = grid_search(&bars, &base(), &grid);
        assert_eq!(outcome.entries.len(), 8);
        assert!(outcome.best.is_some());

        let best_entry_score = outcome
            .entries
            .iter()
            .filter_map(SearchEntry::score)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(outcome.best_score, best_entry_score);
    }

    #[test]
    fn window_longer_than_series_is_rejected_not_fatal() {
        let bars = make_bars(&wave(30));
        let grid = SearchGrid {
            short_windows: vec![3],
            long_windows: vec![10, 50],
            stop_loss_factors: vec![0.0],
            trailing_stop_pcts: vec![0.05],
        };
        let outcome = grid_search(&bars, &base(), &grid);
        assert_eq!(outcome.entries.len(), 2);
        assert!(matches!(outcome.entries[1].evaluation, Evaluation::Rejected(_)));
    }

    #[test]
    fn no_trades_anywhere_fails_open() {
        let prices: Vec<f64> = (0..40).map(|i| 200.0 - i as f64).collect();
        let bars = make_bars(&prices);
        let grid = SearchGrid {
            short_windows: vec![3],
            long_windows: vec![10],
            stop_loss_factors: vec![0.0],
            trailing_stop_pcts: vec![0.05],
        };
        let outcome = grid_search(&bars, &base(), &grid);
        assert!(outcome.best.is_none());
        assert_eq!(outcome.best_score, f64::NEG_INFINITY);
        assert_eq!(outcome.entries[0].evaluation, Evaluation::NoTrades);
    }
}
