//! Price series source port trait.

use crate::domain::bar::Bar;
use crate::domain::config::DataRequest;
use crate::domain::error::EmacrossError;
use chrono::NaiveDate;
use tracing::warn;

pub trait SeriesSource {
    /// Closes for `symbol` between `start_date` and `end_date` inclusive, ascending by date.
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        interval: &str,
    ) -> Result<Vec<Bar>, EmacrossError>;

    /// Fetch, turning any failure into an empty series. Callers treat empty as a no-op.
    fn fetch_or_empty(&self, request: &DataRequest) -> Vec<Bar> {
        match self.fetch_series(
            &request.symbol,
            request.start_date,
            request.end_date,
            &request.interval,
        ) {
            Ok(bars) => {
                if bars.is_empty() {
                    warn!(
                        "no bars for {} ({}) between {} and {}",
                        request.symbol, request.interval, request.start_date, request.end_date
                    );
                }
                bars
            }
            Err(e) => {
                warn!("series fetch for {} failed: {}", request.symbol, e);
                Vec::new()
            }
        }
    }
}
