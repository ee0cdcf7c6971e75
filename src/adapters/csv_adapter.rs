//! CSV file data and report adapter.
//!
//! Each series lives in `<base_path>/<series>.csv`. One column holds the date
//! index; every other column is read as `f64`, with empty cells and the usual
//! NaN spellings read as missing.

use crate::domain::error::SigtraderError;
use crate::domain::frame::TimeSeriesFrame;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATE_COLUMN: &str = "Date";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

const MISSING_MARKERS: [&str; 6] = ["", "nan", "na", "n/a", "null", "none"];

pub struct CsvAdapter {
    base_path: PathBuf,
    date_column: String,
    date_format: String,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let base_path = config
            .get_string("data", "dir")
            .unwrap_or_else(|| ".".to_string());
        let mut adapter = Self::new(PathBuf::from(base_path));
        if let Some(column) = config.get_string("data", "date_column") {
            adapter.date_column = column;
        }
        if let Some(format) = config.get_string("data", "date_format") {
            adapter.date_format = format;
        }
        adapter
    }

    pub fn with_base_path(mut self, base_path: PathBuf) -> Self {
        self.base_path = base_path;
        self
    }

    pub fn with_date_column(mut self, column: &str) -> Self {
        self.date_column = column.to_string();
        self
    }

    pub fn with_date_format(mut self, format: &str) -> Self {
        self.date_format = format.to_string();
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn csv_path(&self, series: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", series))
    }

    /// Parse CSV text into a frame. Rows are sorted by date.
    pub fn parse_frame(&self, content: &str) -> Result<TimeSeriesFrame, SigtraderError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| SigtraderError::Data {
                reason: format!("CSV header error: {}", e),
            })?
            .clone();

        let mut seen = HashSet::new();
        if let Some(dup) = headers.iter().find(|h| !seen.insert(*h)) {
            return Err(SigtraderError::Data {
                reason: format!("duplicate column {:?} in CSV header", dup),
            });
        }

        let date_idx = headers
            .iter()
            .position(|h| h == self.date_column)
            .ok_or_else(|| SigtraderError::missing_column(&self.date_column))?;

        let value_columns: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != date_idx)
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        let mut rows: Vec<(NaiveDate, Vec<Option<f64>>)> = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| SigtraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(date_idx).unwrap_or_default();
            let date = NaiveDate::parse_from_str(date_str, &self.date_format).map_err(|e| {
                SigtraderError::Data {
                    reason: format!("invalid date {:?} on data row {}: {}", date_str, line + 1, e),
                }
            })?;

            let mut values = Vec::with_capacity(value_columns.len());
            for (i, name) in &value_columns {
                values.push(parse_cell(record.get(*i).unwrap_or_default(), name, line + 1)?);
            }
            rows.push((date, values));
        }

        rows.sort_by_key(|(date, _)| *date);

        let index: Vec<NaiveDate> = rows.iter().map(|(d, _)| *d).collect();
        let mut frame = TimeSeriesFrame::new(index)?;
        for (col, (_, name)) in value_columns.iter().enumerate() {
            let values = rows.iter().map(|(_, v)| v[col]).collect();
            frame.set_column(name, values)?;
        }
        Ok(frame)
    }

    /// Render a frame as CSV text: the date column first, then every frame
    /// column in order. Missing cells are written empty.
    pub fn render_frame(&self, frame: &TimeSeriesFrame) -> Result<String, SigtraderError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        let names: Vec<&str> = frame.column_names().collect();

        let mut header = vec![self.date_column.as_str()];
        header.extend(names.iter().copied());
        wtr.write_record(&header).map_err(csv_write_error)?;

        let columns: Vec<&[Option<f64>]> = names
            .iter()
            .filter_map(|name| frame.column(name))
            .collect();

        for (row, date) in frame.index().iter().enumerate() {
            let mut record = Vec::with_capacity(columns.len() + 1);
            record.push(date.format(&self.date_format).to_string());
            for column in &columns {
                record.push(column[row].map(|v| v.to_string()).unwrap_or_default());
            }
            wtr.write_record(&record).map_err(csv_write_error)?;
        }

        let bytes = wtr.into_inner().map_err(|e| SigtraderError::Data {
            reason: format!("CSV flush error: {}", e),
        })?;
        String::from_utf8(bytes).map_err(|e| SigtraderError::Data {
            reason: format!("CSV output is not UTF-8: {}", e),
        })
    }
}

fn parse_cell(raw: &str, column: &str, line: usize) -> Result<Option<f64>, SigtraderError> {
    if MISSING_MARKERS.contains(&raw.to_lowercase().as_str()) {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|e| SigtraderError::Data {
            reason: format!("invalid {} value {:?} on data row {}: {}", column, raw, line, e),
        })
}

fn csv_write_error(e: csv::Error) -> SigtraderError {
    SigtraderError::Data {
        reason: format!("CSV write error: {}", e),
    }
}

impl DataPort for CsvAdapter {
    fn fetch_frame(&self, series: &str) -> Result<TimeSeriesFrame, SigtraderError> {
        let path = self.csv_path(series);
        let content = fs::read_to_string(&path).inspect_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "failed to read series");
        })?;
        let frame = self.parse_frame(&content)?;
        tracing::debug!(
            path = %path.display(),
            rows = frame.len(),
            "loaded series"
        );
        Ok(frame)
    }

    fn list_series(&self) -> Result<Vec<String>, SigtraderError> {
        let entries = fs::read_dir(&self.base_path).inspect_err(|e| {
            tracing::warn!(path = %self.base_path.display(), error = %e, "failed to list series");
        })?;

        let mut series = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    series.push(stem.to_string_lossy().into_owned());
                }
            }
        }

        series.sort();
        Ok(series)
    }
}

impl ReportPort for CsvAdapter {
    fn write(&self, frame: &TimeSeriesFrame, output_path: &Path) -> Result<(), SigtraderError> {
        let content = self.render_frame(frame)?;
        fs::write(output_path, content)?;
        tracing::debug!(path = %output_path.display(), rows = frame.len(), "wrote frame");
        Ok(())
    }
}
