//! Price bar and series representation.

use chrono::NaiveDate;

/// One time step of the input series.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub close: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// True when timestamps are strictly ascending (ordered and unique).
pub fn is_strictly_ordered(bars: &[Bar]) -> bool {
    bars.windows(2).all(|w| w[0].date < w[1].date)
}
