//! Configuration validation.
//!
//! Validates config fields before any simulation runs so bad windows or
//! percentages fail fast instead of surfacing as skipped bars.

use crate::domain::error::EmacrossError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::str::FromStr;

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), EmacrossError> {
    match config.get_string("data", "symbol") {
        Some(s) if !s.trim().is_empty() => {}
        _ => return Err(EmacrossError::missing("data", "symbol")),
    }
    validate_dates(config)
}

const SIMULATION_WINDOWS: [&str; 3] = ["short_window", "long_window", "volatility_window"];
const SIMULATION_FLOATS: [&str; 7] = [
    "initial_capital",
    "stop_loss_factor",
    "trailing_stop_pct",
    "transaction_cost_pct",
    "slippage_pct",
    "max_drawdown_pct",
    "position_fraction",
];

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), EmacrossError> {
    for key in SIMULATION_WINDOWS {
        check_parses::<i64>(config, "simulation", key, "an integer")?;
    }
    for key in SIMULATION_FLOATS {
        check_parses::<f64>(config, "simulation", key, "a number")?;
    }
    if let Some(raw) = config.get_string("simulation", "trailing_stop") {
        if parse_bool(&raw).is_none() {
            return Err(EmacrossError::invalid(
                "simulation",
                "trailing_stop",
                format!("cannot parse '{}' as a boolean", raw.trim()),
            ));
        }
    }

    if config.get_double("simulation", "initial_capital", 100_000.0) <= 0.0 {
        return Err(EmacrossError::invalid(
            "simulation",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }

    for key in SIMULATION_WINDOWS {
        if config.get_int("simulation", key, 1) < 1 {
            return Err(EmacrossError::invalid(
                "simulation",
                key,
                format!("{} must be at least 1", key),
            ));
        }
    }

    for key in ["stop_loss_factor", "transaction_cost_pct", "slippage_pct"] {
        if config.get_double("simulation", key, 0.0) < 0.0 {
            return Err(EmacrossError::invalid(
                "simulation",
                key,
                format!("{} must be non-negative", key),
            ));
        }
    }

    for key in ["trailing_stop_pct", "max_drawdown_pct"] {
        let value = config.get_double("simulation", key, 0.0);
        if !(0.0..1.0).contains(&value) {
            return Err(EmacrossError::invalid(
                "simulation",
                key,
                format!("{} must be between 0 and 1", key),
            ));
        }
    }

    let fraction = config.get_double("simulation", "position_fraction", 0.1);
    if fraction <= 0.0 || fraction > 1.0 {
        return Err(EmacrossError::invalid(
            "simulation",
            "position_fraction",
            "position_fraction must be in (0, 1]",
        ));
    }

    Ok(())
}

pub fn validate_search_config(config: &dyn ConfigPort) -> Result<(), EmacrossError> {
    for key in ["short_windows", "long_windows"] {
        let windows: Vec<usize> = parse_list(config, "search", key)?;
        if windows.contains(&0) {
            return Err(EmacrossError::invalid(
                "search",
                key,
                "windows must be at least 1",
            ));
        }
    }

    let factors: Vec<f64> = parse_list(config, "search", "stop_loss_factors")?;
    if factors.iter().any(|f| *f < 0.0) {
        return Err(EmacrossError::invalid(
            "search",
            "stop_loss_factors",
            "factors must be non-negative",
        ));
    }

    let pcts: Vec<f64> = parse_list(config, "search", "trailing_stop_pcts")?;
    if pcts.iter().any(|p| !(0.0..1.0).contains(p)) {
        return Err(EmacrossError::invalid(
            "search",
            "trailing_stop_pcts",
            "percentages must be between 0 and 1",
        ));
    }

    Ok(())
}

/// A present value must parse as `T`; absent keys fall back to defaults elsewhere.
fn check_parses<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    expected: &str,
) -> Result<(), EmacrossError> {
    match config.get_string(section, key) {
        Some(raw) if raw.trim().parse::<T>().is_err() => Err(EmacrossError::invalid(
            section,
            key,
            format!("cannot parse '{}' as {}", raw.trim(), expected),
        )),
        _ => Ok(()),
    }
}

/// Boolean spellings accepted in config files.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Parse a comma-separated list. A missing key is an error; blank items are ignored.
pub fn parse_list<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Vec<T>, EmacrossError> {
    let raw = config
        .get_string(section, key)
        .ok_or_else(|| EmacrossError::missing(section, key))?;

    let values = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<T>().map_err(|_| {
                EmacrossError::invalid(section, key, format!("cannot parse list item '{}'", s))
            })
        })
        .collect::<Result<Vec<T>, _>>()?;

    if values.is_empty() {
        return Err(EmacrossError::invalid(section, key, "list is empty"));
    }
    Ok(values)
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), EmacrossError> {
    let start_str = config.get_string("data", "start_date");
    let end_str = config.get_string("data", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date >= end_date {
        return Err(EmacrossError::invalid(
            "data",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, EmacrossError> {
    match value {
        None => Err(EmacrossError::missing("data", field)),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            EmacrossError::invalid(
                "data",
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}
