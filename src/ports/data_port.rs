//! Data access port trait.

use crate::domain::error::SigtraderError;
use crate::domain::frame::TimeSeriesFrame;

pub trait DataPort {
    /// Load the full frame for a named series.
    fn fetch_frame(&self, series: &str) -> Result<TimeSeriesFrame, SigtraderError>;

    fn list_series(&self) -> Result<Vec<String>, SigtraderError>;
}
