//! Simulation and search parameters.
//!
//! All percentages are fractions (0.02 means 2%).

use chrono::NaiveDate;

use crate::domain::indicator::IndicatorWindows;

/// Parameters for one simulation run. Immutable for the duration of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub initial_capital: f64,
    pub short_window: usize,
    pub long_window: usize,
    pub volatility_window: usize,
    pub stop_loss_factor: f64,
    pub trailing_stop_pct: f64,
    pub trailing_stop_enabled: bool,
    pub transaction_cost_pct: f64,
    pub slippage_pct: f64,
    pub max_drawdown_pct: f64,
    pub position_fraction: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            initial_capital: 100_000.0,
            short_window: 5,
            long_window: 20,
            volatility_window: 20,
            stop_loss_factor: 2.0,
            trailing_stop_pct: 0.02,
            trailing_stop_enabled: true,
            transaction_cost_pct: 0.001,
            slippage_pct: 0.0005,
            max_drawdown_pct: 0.2,
            position_fraction: 0.1,
        }
    }
}

impl SimulationConfig {
    pub fn windows(&self) -> IndicatorWindows {
        IndicatorWindows {
            short: self.short_window,
            long: self.long_window,
            volatility: self.volatility_window,
        }
    }
}

/// Where the price series comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRequest {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub interval: String,
}

/// Values swept by the parameter search. Iterated in declaration order, outermost first.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchGrid {
    pub short_windows: Vec<usize>,
    pub long_windows: Vec<usize>,
    pub stop_loss_factors: Vec<f64>,
    pub trailing_stop_pcts: Vec<f64>,
}

impl Default for SearchGrid {
    fn default() -> Self {
        SearchGrid {
            short_windows: vec![5, 10, 15],
            long_windows: vec![20, 30, 50],
            stop_loss_factors: vec![1.0, 2.0],
            trailing_stop_pcts: vec![0.02, 0.05],
        }
    }
}

impl SearchGrid {
    pub fn size(&self) -> usize {
        self.short_windows.len()
            * self.long_windows.len()
            * self.stop_loss_factors.len()
            * self.trailing_stop_pcts.len()
    }

    /// Every combination applied to `base`, in grid iteration order.
    pub fn configs(&self, base: &SimulationConfig) -> Vec<SimulationConfig> {
        let mut configs = Vec::with_capacity(self.size());

        for &short in &self.short_windows {
            for &long in &self.long_windows {
                for &stop_loss_factor in &self.stop_loss_factors {
                    for &trailing_stop_pct in &self.trailing_stop_pcts {
                        configs.push(SimulationConfig {
                            short_window: short,
                            long_window: long,
                            stop_loss_factor,
                            trailing_stop_pct,
                            ..base.clone()
                        });
                    }
                }
            }
        }

        configs
    }
}
