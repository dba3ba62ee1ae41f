#![allow(dead_code)]

use chrono::NaiveDate;
use emacross::domain::bar::Bar;
use emacross::domain::error::EmacrossError;
use emacross::ports::data_port::SeriesSource;
use std::collections::HashMap;

pub struct MockSeriesSource {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockSeriesSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl SeriesSource for MockSeriesSource {
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        interval: &str,
    ) -> Result<Vec<Bar>, EmacrossError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(EmacrossError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(bars) => Ok(bars
                .iter()
                .filter(|b| b.date >= start_date && b.date <= end_date)
                .cloned()
                .collect()),
            None => Err(EmacrossError::NoData {
                symbol: symbol.to_string(),
                interval: interval.to_string(),
            }),
        }
    }
}

pub fn day(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64)
}

/// One bar per consecutive day starting 2024-01-01.
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar::new(day(i), close))
        .collect()
}

/// `n` closes rising linearly from `from` to `to` inclusive.
pub fn rising_closes(n: usize, from: f64, to: f64) -> Vec<f64> {
    let step = (to - from) / (n - 1) as f64;
    (0..n).map(|i| from + step * i as f64).collect()
}

/// Slope-1 ramp from 100 to `peak`, then a single bar `crash_pct` below the peak.
pub fn spike_then_crash(peak: f64, crash_pct: f64) -> Vec<f64> {
    let mut closes: Vec<f64> = (0..=(peak - 100.0) as usize)
        .map(|i| 100.0 + i as f64)
        .collect();
    closes.push(peak * (1.0 - crash_pct));
    closes
}

pub fn wave(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + 10.0 * ((i as f64) * 0.3).sin() + i as f64 * 0.05)
        .collect()
}

pub fn csv_content(bars: &[Bar]) -> String {
    let mut content = String::from("date,close\n");
    for bar in bars {
        content.push_str(&format!("{},{}\n", bar.date.format("%Y-%m-%d"), bar.close));
    }
    content
}
