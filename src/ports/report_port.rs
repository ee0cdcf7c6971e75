//! Result output port trait.

use crate::domain::error::SigtraderError;
use crate::domain::frame::TimeSeriesFrame;
use std::path::Path;

/// Port for writing a derived frame somewhere a reporting tool can read it.
pub trait ReportPort {
    fn write(&self, frame: &TimeSeriesFrame, output_path: &Path) -> Result<(), SigtraderError>;
}
