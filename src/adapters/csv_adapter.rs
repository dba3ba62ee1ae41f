//! CSV file series source.
//!
//! Reads `{SYMBOL}_{interval}.csv` from a base directory. The header must name a
//! `date` column (YYYY-MM-DD) and a `close` column; other columns are ignored.

use crate::domain::bar::Bar;
use crate::domain::error::EmacrossError;
use crate::ports::data_port::SeriesSource;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, interval: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, interval))
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, EmacrossError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| EmacrossError::Data {
            reason: format!("missing {} column", name),
        })
}

impl SeriesSource for CsvAdapter {
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        interval: &str,
    ) -> Result<Vec<Bar>, EmacrossError> {
        let path = self.csv_path(symbol, interval);
        if !path.exists() {
            return Err(EmacrossError::NoData {
                symbol: symbol.to_string(),
                interval: interval.to_string(),
            });
        }
        let content = fs::read_to_string(&path).map_err(|e| EmacrossError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| EmacrossError::Data {
                reason: format!("CSV header error: {}", e),
            })?
            .clone();
        let date_col = column_index(&headers, "date")?;
        let close_col = column_index(&headers, "close")?;

        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| EmacrossError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(date_col).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                EmacrossError::Data {
                    reason: format!("invalid date '{}': {}", date_str, e),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            let close_str = record.get(close_col).unwrap_or_default().trim();
            let close: f64 = close_str.parse().map_err(|e| EmacrossError::Data {
                reason: format!("invalid close value '{}': {}", close_str, e),
            })?;
            if !close.is_finite() || close <= 0.0 {
                return Err(EmacrossError::Data {
                    reason: format!("close must be positive on {}, got {}", date, close),
                });
            }

            bars.push(Bar::new(date, close));
        }

        bars.sort_by_key(|b| b.date);
        if let Some(w) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(EmacrossError::Data {
                reason: format!("duplicate date {}", w[0].date),
            });
        }
        Ok(bars)
    }
}
