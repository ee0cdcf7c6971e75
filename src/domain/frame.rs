//! Date-indexed column store shared by signal generation and backtesting.
//!
//! A [`TimeSeriesFrame`] holds a strictly ascending date index and a list of
//! named `f64` columns. Every cell is an `Option<f64>`; `None` marks a missing
//! value. Columns keep insertion order so written output is stable.

use super::error::SigtraderError;
use chrono::NaiveDate;

pub const CLOSE: &str = "Close";
pub const MACD: &str = "MACD";
pub const MACD_SIGNAL: &str = "MACD_Signal";
pub const RSI: &str = "RSI";
pub const SIGNAL: &str = "Signal";
pub const POSITION: &str = "Position";
pub const DAILY_RETURN: &str = "Daily_Return";
pub const STRATEGY_RETURN: &str = "Strategy_Return";
pub const PORTFOLIO_VALUE: &str = "Portfolio_Value";

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesFrame {
    index: Vec<NaiveDate>,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl TimeSeriesFrame {
    /// Create an empty-columned frame over `index`.
    ///
    /// The index must be strictly ascending.
    pub fn new(index: Vec<NaiveDate>) -> Result<Self, SigtraderError> {
        if let Some(row) = index.windows(2).position(|w| w[0] >= w[1]) {
            return Err(SigtraderError::UnorderedIndex { row: row + 1 });
        }
        Ok(Self {
            index,
            columns: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Like [`column`](Self::column) but fails fast when the column is absent.
    pub fn require(&self, name: &str) -> Result<&[Option<f64>], SigtraderError> {
        self.column(name)
            .ok_or_else(|| SigtraderError::missing_column(name))
    }

    pub fn value(&self, name: &str, row: usize) -> Option<f64> {
        self.column(name).and_then(|c| c.get(row).copied().flatten())
    }

    /// Add or overwrite a column. NaN cells are stored as missing.
    pub fn set_column(
        &mut self,
        name: &str,
        values: Vec<Option<f64>>,
    ) -> Result<(), SigtraderError> {
        if values.len() != self.index.len() {
            return Err(SigtraderError::ColumnLength {
                column: name.to_string(),
                expected: self.index.len(),
                actual: values.len(),
            });
        }
        let values: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();

        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name.to_string(), values)),
        }
        Ok(())
    }

    /// Builder form of [`set_column`](Self::set_column).
    pub fn with_column(
        mut self,
        name: &str,
        values: Vec<Option<f64>>,
    ) -> Result<Self, SigtraderError> {
        self.set_column(name, values)?;
        Ok(self)
    }

    /// Convenience for fully populated columns.
    pub fn with_values(self, name: &str, values: &[f64]) -> Result<Self, SigtraderError> {
        self.with_column(name, values.iter().copied().map(Some).collect())
    }
}
