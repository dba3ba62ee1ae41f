//! Annotated series CSV writer for external charting tools.
//!
//! One row per bar: `date,close,short_ema,long_ema,volatility,marker`. The
//! volatility and marker columns are empty where undefined.

use crate::domain::error::EmacrossError;
use crate::domain::indicator::{AnnotatedSeries, Marker};
use crate::ports::report_port::SeriesReportPort;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Serialize)]
struct SeriesRow {
    date: String,
    close: f64,
    short_ema: f64,
    long_ema: f64,
    volatility: Option<f64>,
    marker: Option<String>,
}

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    /// Render the series to any writer.
    pub fn write_to<W: std::io::Write>(
        writer: W,
        series: &AnnotatedSeries,
        markers: &[Marker],
    ) -> Result<(), EmacrossError> {
        let by_index: HashMap<usize, &Marker> = markers.iter().map(|m| (m.index, m)).collect();
        let mut wtr = csv::Writer::from_writer(writer);

        for (i, bar) in series.bars.iter().enumerate() {
            let row = SeriesRow {
                date: bar.date.format("%Y-%m-%d").to_string(),
                close: bar.close,
                short_ema: bar.short_ema,
                long_ema: bar.long_ema,
                volatility: bar.volatility,
                marker: by_index.get(&i).map(|m| m.kind.to_string()),
            };
            wtr.serialize(row).map_err(|e| EmacrossError::Data {
                reason: format!("CSV write error: {}", e),
            })?;
        }

        wtr.flush()?;
        Ok(())
    }
}

impl SeriesReportPort for CsvReportAdapter {
    fn write_series(
        &self,
        series: &AnnotatedSeries,
        markers: &[Marker],
        output_path: &str,
    ) -> Result<(), EmacrossError> {
        let file = std::fs::File::create(output_path)?;
        Self::write_to(file, series, markers)
    }
}
