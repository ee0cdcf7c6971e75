#![allow(dead_code)]

use chrono::NaiveDate;
use sigtrader::domain::error::SigtraderError;
use sigtrader::domain::frame::{CLOSE, MACD, MACD_SIGNAL, RSI, SIGNAL, TimeSeriesFrame};
use sigtrader::ports::data_port::DataPort;
use sigtrader::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct MockDataPort {
    pub frames: HashMap<String, TimeSeriesFrame>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            frames: HashMap::new(),
        }
    }

    pub fn with_frame(mut self, series: &str, frame: TimeSeriesFrame) -> Self {
        self.frames.insert(series.to_string(), frame);
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_frame(&self, series: &str) -> Result<TimeSeriesFrame, SigtraderError> {
        self.frames
            .get(series)
            .cloned()
            .ok_or_else(|| SigtraderError::Data {
                reason: format!("no series {}", series),
            })
    }

    fn list_series(&self) -> Result<Vec<String>, SigtraderError> {
        let mut names: Vec<String> = self.frames.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// Records every frame written instead of touching disk.
#[derive(Default)]
pub struct RecordingReportPort {
    pub written: RefCell<Vec<(PathBuf, TimeSeriesFrame)>>,
}

impl ReportPort for RecordingReportPort {
    fn write(&self, frame: &TimeSeriesFrame, output_path: &Path) -> Result<(), SigtraderError> {
        self.written
            .borrow_mut()
            .push((output_path.to_path_buf(), frame.clone()));
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn daily_index(n: usize) -> Vec<NaiveDate> {
    let start = date(2024, 1, 1);
    (0..n)
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect()
}

pub fn price_frame(close: &[f64]) -> TimeSeriesFrame {
    TimeSeriesFrame::new(daily_index(close.len()))
        .unwrap()
        .with_values(CLOSE, close)
        .unwrap()
}

pub fn signal_frame(close: &[f64], signal: &[f64]) -> TimeSeriesFrame {
    price_frame(close).with_values(SIGNAL, signal).unwrap()
}

pub fn indicator_frame(close: &[f64], macd: &[f64], macd_signal: &[f64], rsi: &[f64]) -> TimeSeriesFrame {
    price_frame(close)
        .with_values(MACD, macd)
        .unwrap()
        .with_values(MACD_SIGNAL, macd_signal)
        .unwrap()
        .with_values(RSI, rsi)
        .unwrap()
}

/// Close = [100, 102, 101, 105] with indicators that produce a single buy on
/// the second row.
pub fn reference_frame() -> TimeSeriesFrame {
    indicator_frame(
        &[100.0, 102.0, 101.0, 105.0],
        &[-0.2, 0.3, 0.4, 0.5],
        &[0.0, 0.1, 0.2, 0.3],
        &[45.0, 28.0, 35.0, 50.0],
    )
}

pub fn column(frame: &TimeSeriesFrame, name: &str) -> Vec<Option<f64>> {
    frame.column(name).unwrap().to_vec()
}
