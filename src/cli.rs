//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config::{DataRequest, SearchGrid, SimulationConfig};
use crate::domain::config_validation::{
    parse_date, parse_list, validate_data_config, validate_search_config,
    validate_simulation_config,
};
use crate::domain::error::EmacrossError;
use crate::domain::indicator::crossover_markers;
use crate::domain::metrics::Summary;
use crate::domain::search::{grid_search, Evaluation};
use crate::domain::simulation::{simulate, SimulationResult};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::SeriesSource;
use crate::ports::report_port::SeriesReportPort;

const SEARCH_KEYS: [&str; 4] = [
    "short_windows",
    "long_windows",
    "stop_loss_factors",
    "trailing_stop_pcts",
];

#[derive(Parser, Debug)]
#[command(name = "emacross", about = "EMA crossover backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Simulate one configuration
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Override [data] symbol
        #[arg(long)]
        symbol: Option<String>,
        /// Write the annotated series CSV here
        #[arg(long)]
        series_output: Option<PathBuf>,
    },
    /// Grid search over the [search] section
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_tracing();
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            series_output,
        } => run_backtest(&config, symbol.as_deref(), series_output.as_ref()),
        Command::Optimize { config } => run_optimize(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

/// Install the stderr subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = EmacrossError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_simulation_config(adapter: &dyn ConfigPort) -> SimulationConfig {
    let defaults = SimulationConfig::default();
    SimulationConfig {
        initial_capital: adapter.get_double(
            "simulation",
            "initial_capital",
            defaults.initial_capital,
        ),
        short_window: adapter.get_usize("simulation", "short_window", defaults.short_window),
        long_window: adapter.get_usize("simulation", "long_window", defaults.long_window),
        volatility_window: adapter.get_usize(
            "simulation",
            "volatility_window",
            defaults.volatility_window,
        ),
        stop_loss_factor: adapter.get_double(
            "simulation",
            "stop_loss_factor",
            defaults.stop_loss_factor,
        ),
        trailing_stop_pct: adapter.get_double(
            "simulation",
            "trailing_stop_pct",
            defaults.trailing_stop_pct,
        ),
        trailing_stop_enabled: adapter.get_bool(
            "simulation",
            "trailing_stop",
            defaults.trailing_stop_enabled,
        ),
        transaction_cost_pct: adapter.get_double(
            "simulation",
            "transaction_cost_pct",
            defaults.transaction_cost_pct,
        ),
        slippage_pct: adapter.get_double("simulation", "slippage_pct", defaults.slippage_pct),
        max_drawdown_pct: adapter.get_double(
            "simulation",
            "max_drawdown_pct",
            defaults.max_drawdown_pct,
        ),
        position_fraction: adapter.get_double(
            "simulation",
            "position_fraction",
            defaults.position_fraction,
        ),
    }
}

pub fn build_data_request(
    adapter: &dyn ConfigPort,
    symbol_override: Option<&str>,
) -> Result<DataRequest, EmacrossError> {
    let symbol = match symbol_override {
        Some(s) => s.to_string(),
        None => adapter
            .get_string("data", "symbol")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| EmacrossError::missing("data", "symbol"))?,
    };

    let start_date = parse_date(adapter.get_string("data", "start_date").as_deref(), "start_date")?;
    let end_date = parse_date(adapter.get_string("data", "end_date").as_deref(), "end_date")?;
    if start_date >= end_date {
        return Err(EmacrossError::invalid(
            "data",
            "start_date",
            "start_date must be before end_date",
        ));
    }

    Ok(DataRequest {
        symbol: symbol.trim().to_string(),
        start_date,
        end_date,
        interval: adapter
            .get_string("data", "interval")
            .unwrap_or_else(|| "1d".to_string()),
    })
}

pub fn has_search_section(adapter: &dyn ConfigPort) -> bool {
    SEARCH_KEYS
        .iter()
        .any(|key| adapter.get_string("search", key).is_some())
}

/// The configured grid, or the default grid when no `[search]` keys are present.
pub fn build_search_grid(adapter: &dyn ConfigPort) -> Result<SearchGrid, EmacrossError> {
    if !has_search_section(adapter) {
        return Ok(SearchGrid::default());
    }
    Ok(SearchGrid {
        short_windows: parse_list(adapter, "search", "short_windows")?,
        long_windows: parse_list(adapter, "search", "long_windows")?,
        stop_loss_factors: parse_list(adapter, "search", "stop_loss_factors")?,
        trailing_stop_pcts: parse_list(adapter, "search", "trailing_stop_pcts")?,
    })
}

fn data_source(adapter: &dyn ConfigPort) -> CsvAdapter {
    let dir = adapter
        .get_string("data", "data_dir")
        .unwrap_or_else(|| ".".to_string());
    CsvAdapter::new(PathBuf::from(dir))
}

fn validate_run_config(adapter: &dyn ConfigPort) -> Result<(), EmacrossError> {
    validate_data_config(adapter)?;
    validate_simulation_config(adapter)
}

fn run_backtest(
    config_path: &PathBuf,
    symbol_override: Option<&str>,
    series_output: Option<&PathBuf>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_simulation_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    let request = match build_data_request(&adapter, symbol_override) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let sim_config = build_simulation_config(&adapter);

    let bars = data_source(&adapter).fetch_or_empty(&request);
    eprintln!(
        "Running backtest: {} ({}), {} bars, {} to {}",
        request.symbol,
        request.interval,
        bars.len(),
        request.start_date,
        request.end_date
    );

    let result = match simulate(&bars, &sim_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    for event in &result.events {
        println!("{event}");
    }
    print_summary(&result, &Summary::compute(&result.trades, &result.account));

    let output = series_output
        .map(|p| p.display().to_string())
        .or_else(|| adapter.get_string("report", "series_output"));
    if let Some(path) = output {
        let markers = crossover_markers(&result.series);
        if let Err(e) = CsvReportAdapter.write_series(&result.series, &markers, &path) {
            eprintln!("error: failed to write series: {e}");
            return (&e).into();
        }
        eprintln!("\nSeries written to: {}", path);
    }

    ExitCode::SUCCESS
}

fn print_summary(result: &SimulationResult, summary: &Summary) {
    let last_close = result.series.bars.last().map(|b| b.close);
    eprintln!("\n=== Summary ===");
    eprintln!("Total Trades:     {}", summary.total_trades);
    eprintln!("Total Profit:     {:.2}", summary.total_profit);
    eprintln!("Average Profit:   {:.2}", summary.average_profit);
    eprintln!("Win Rate:         {:.1}%", summary.win_rate * 100.0);
    eprintln!("Largest Win:      {:.2}", summary.largest_win);
    eprintln!("Largest Loss:     {:.2}", summary.largest_loss);
    eprintln!("Max Drawdown:     -{:.1}%", summary.max_drawdown * 100.0);
    eprintln!("Sharpe Ratio:     {:.4}", summary.sharpe_ratio);
    eprintln!("Final Balance:    {:.2}", summary.final_balance);
    eprintln!(
        "Bars:             {} processed, {} skipped",
        result.bars_processed, result.bars_skipped
    );
    if let Some(index) = result.halted_at {
        eprintln!("Halted:           bar {} (drawdown limit)", index);
    }
    if let Some(position) = &result.open_position {
        eprintln!(
            "Open Position:    {:.4} @ {:.4} since {}",
            position.size, position.entry_price, position.entry_date
        );
        if let Some(close) = last_close {
            eprintln!("Unrealized P&L:   {:.2}", position.unrealized_pnl(close));
        }
    }
}

fn run_optimize(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_run_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if has_search_section(&adapter) {
        if let Err(e) = validate_search_config(&adapter) {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    let (request, grid) = match build_data_request(&adapter, None)
        .and_then(|r| build_search_grid(&adapter).map(|g| (r, g)))
    {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let base = build_simulation_config(&adapter);

    let bars = data_source(&adapter).fetch_or_empty(&request);
    eprintln!(
        "Optimizing {} ({}): {} combinations over {} bars",
        request.symbol,
        request.interval,
        grid.size(),
        bars.len()
    );

    let outcome = grid_search(&bars, &base, &grid);

    let rejected = outcome
        .entries
        .iter()
        .filter(|e| matches!(e.evaluation, Evaluation::Rejected(_)))
        .count();
    let untraded = outcome
        .entries
        .iter()
        .filter(|e| e.evaluation == Evaluation::NoTrades)
        .count();

    eprintln!("\n=== Search Results ===");
    eprintln!("Evaluated:        {}", outcome.entries.len());
    eprintln!("No Trades:        {}", untraded);
    eprintln!("Rejected:         {}", rejected);

    match (&outcome.best, &outcome.best_summary) {
        (Some(best), Some(summary)) => {
            eprintln!("\n=== Best Configuration ===");
            eprintln!("short_window      = {}", best.short_window);
            eprintln!("long_window       = {}", best.long_window);
            eprintln!("stop_loss_factor  = {}", best.stop_loss_factor);
            eprintln!("trailing_stop_pct = {}", best.trailing_stop_pct);
            eprintln!("Sharpe Ratio:     {:.4}", outcome.best_score);
            eprintln!("Total Trades:     {}", summary.total_trades);
            eprintln!("Total Profit:     {:.2}", summary.total_profit);
        }
        _ => eprintln!("\nNo configuration produced any trades"),
    }

    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_run_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let sim = build_simulation_config(&adapter);
    eprintln!("\nSimulation:");
    eprintln!(
        "  windows: short={} long={} volatility={}",
        sim.short_window, sim.long_window, sim.volatility_window
    );
    if sim.trailing_stop_enabled {
        eprintln!("  exit: trailing stop {:.2}%", sim.trailing_stop_pct * 100.0);
    } else {
        eprintln!("  exit: static stop at {} x volatility", sim.stop_loss_factor);
    }

    if has_search_section(&adapter) {
        if let Err(e) = validate_search_config(&adapter) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        match build_search_grid(&adapter) {
            Ok(grid) => eprintln!("\nSearch: {} combinations", grid.size()),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn simulation_config_defaults_when_section_missing() {
        let config = build_simulation_config(&adapter("[data]\nsymbol = SPY\n"));
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn simulation_config_reads_trailing_toggle() {
        let config = build_simulation_config(&adapter(
            "[simulation]\ntrailing_stop = false\nshort_window = 3\n",
        ));
        assert!(!config.trailing_stop_enabled);
        assert_eq!(config.short_window, 3);
    }

    #[test]
    fn data_request_symbol_override() {
        let a = adapter("[data]\nsymbol = SPY\nstart_date = 2024-01-01\nend_date = 2024-06-30\n");
        let request = build_data_request(&a, Some("QQQ")).unwrap();
        assert_eq!(request.symbol, "QQQ");
        assert_eq!(request.interval, "1d");
    }

    #[test]
    fn data_request_missing_symbol() {
        let a = adapter("[data]\nstart_date = 2024-01-01\nend_date = 2024-06-30\n");
        let err = build_data_request(&a, None).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn search_grid_falls_back_to_default() {
        let grid = build_search_grid(&adapter("[data]\nsymbol = SPY\n")).unwrap();
        assert_eq!(grid, SearchGrid::default());
    }

    #[test]
    fn partial_search_section_is_an_error() {
        let a = adapter("[search]\nshort_windows = 3, 5\n");
        assert!(matches!(
            build_search_grid(&a),
            Err(EmacrossError::ConfigMissing { .. })
        ));
    }
}
