//! Technical indicators and the annotated series they produce.
//!
//! - `IndicatorType`: indicator identity + parameters, used in log lines and skip reasons
//! - `IndicatorWindows`: the three windows a configuration asks for
//! - `AnnotatedSeries`: closes aligned with short EMA, long EMA and volatility
//! - `crossover_markers`: buy/sell points for chart consumers

pub mod ema;
pub mod stddev;

use chrono::NaiveDate;
use std::fmt;
use tracing::debug;

use crate::domain::bar::Bar;
use crate::domain::error::EmacrossError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Stddev(usize),
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorWindows {
    pub short: usize,
    pub long: usize,
    pub volatility: usize,
}

impl IndicatorWindows {
    pub fn indicators(&self) -> [IndicatorType; 3] {
        [
            IndicatorType::Ema(self.short),
            IndicatorType::Ema(self.long),
            IndicatorType::Stddev(self.volatility),
        ]
    }

    /// Rejects zero windows and, for a non-empty series, windows longer than the series.
    pub fn validate(&self, series_len: usize) -> Result<(), EmacrossError> {
        for (key, window) in [
            ("short_window", self.short),
            ("long_window", self.long),
            ("volatility_window", self.volatility),
        ] {
            if window < 1 {
                return Err(EmacrossError::invalid("simulation", key, "must be at least 1"));
            }
            if series_len > 0 && window > series_len {
                return Err(EmacrossError::invalid(
                    "simulation",
                    key,
                    format!("window {} exceeds series length {}", window, series_len),
                ));
            }
        }
        Ok(())
    }
}

/// One bar with its derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedBar {
    pub date: NaiveDate,
    pub close: f64,
    pub short_ema: f64,
    pub long_ema: f64,
    pub volatility: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedSeries {
    pub windows: IndicatorWindows,
    pub bars: Vec<AnnotatedBar>,
}

impl AnnotatedSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Compute short/long EMA and rolling volatility for `bars`.
///
/// An empty input yields an empty series so callers can treat missing data as a no-op.
pub fn compute_indicators(
    bars: &[Bar],
    windows: IndicatorWindows,
) -> Result<AnnotatedSeries, EmacrossError> {
    windows.validate(bars.len())?;
    debug!(
        "computing {} over {} bars",
        windows
            .indicators()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        bars.len()
    );

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let short = ema::calculate_ema(&closes, windows.short);
    let long = ema::calculate_ema(&closes, windows.long);
    let volatility = stddev::calculate_stddev(&closes, windows.volatility);

    let annotated = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| AnnotatedBar {
            date: bar.date,
            close: bar.close,
            short_ema: short[i],
            long_ema: long[i],
            volatility: volatility[i],
        })
        .collect();

    Ok(AnnotatedSeries {
        windows,
        bars: annotated,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Buy,
    Sell,
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerKind::Buy => write!(f, "buy"),
            MarkerKind::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub index: usize,
    pub date: NaiveDate,
    pub price: f64,
    pub kind: MarkerKind,
}

/// Points where the short EMA crosses the long EMA.
///
/// Buy when short moves from <= long to > long, sell when it moves from >= long to < long.
pub fn crossover_markers(series: &AnnotatedSeries) -> Vec<Marker> {
    series
        .bars
        .windows(2)
        .enumerate()
        .filter_map(|(i, w)| {
            let (prev, curr) = (&w[0], &w[1]);
            let kind = if curr.short_ema > curr.long_ema && prev.short_ema <= prev.long_ema {
                MarkerKind::Buy
            } else if curr.short_ema < curr.long_ema && prev.short_ema >= prev.long_ema {
                MarkerKind::Sell
            } else {
                return None;
            };
            Some(Marker {
                index: i + 1,
                date: curr.date,
                price: curr.close,
                kind,
            })
        })
        .collect()
}
