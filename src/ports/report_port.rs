//! Chart/report output port trait.

use crate::domain::error::EmacrossError;
use crate::domain::indicator::{AnnotatedSeries, Marker};

/// Consumer of the annotated series and its crossover markers.
pub trait SeriesReportPort {
    fn write_series(
        &self,
        series: &AnnotatedSeries,
        markers: &[Marker],
        output_path: &str,
    ) -> Result<(), EmacrossError>;
}
