//! MACD/RSI signal generation.
//!
//! Each row is classified independently:
//! - buy (+1) when MACD is above its signal line and RSI is oversold,
//! - sell (-1) when MACD is below its signal line and RSI is overbought,
//! - hold (0) otherwise, including rows with any missing input.

use super::error::SigtraderError;
use super::frame::{MACD, MACD_SIGNAL, RSI, SIGNAL, TimeSeriesFrame};
use crate::ports::config_port::ConfigPort;
use std::fmt;

pub const DEFAULT_OVERSOLD: f64 = 30.0;
pub const DEFAULT_OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Sell,
    Hold,
    Buy,
}

impl Signal {
    pub fn as_f64(self) -> f64 {
        match self {
            Signal::Sell => -1.0,
            Signal::Hold => 0.0,
            Signal::Buy => 1.0,
        }
    }

    /// Interpret a stored signal cell. Anything other than exactly -1, 0 or 1
    /// is not a signal.
    pub fn from_value(value: f64) -> Option<Self> {
        if value == 1.0 {
            Some(Signal::Buy)
        } else if value == -1.0 {
            Some(Signal::Sell)
        } else if value == 0.0 {
            Some(Signal::Hold)
        } else {
            None
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Sell => write!(f, "sell"),
            Signal::Hold => write!(f, "hold"),
            Signal::Buy => write!(f, "buy"),
        }
    }
}

/// RSI bounds. Both comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalThresholds {
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            oversold: DEFAULT_OVERSOLD,
            overbought: DEFAULT_OVERBOUGHT,
        }
    }
}

impl SignalThresholds {
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        Self {
            oversold: config.get_double("signal", "oversold", DEFAULT_OVERSOLD),
            overbought: config.get_double("signal", "overbought", DEFAULT_OVERBOUGHT),
        }
    }
}

pub fn classify(
    macd: Option<f64>,
    macd_signal: Option<f64>,
    rsi: Option<f64>,
    thresholds: &SignalThresholds,
) -> Signal {
    match (macd, macd_signal, rsi) {
        (Some(m), Some(s), Some(r)) if m > s && r < thresholds.oversold => Signal::Buy,
        (Some(m), Some(s), Some(r)) if m < s && r > thresholds.overbought => Signal::Sell,
        _ => Signal::Hold,
    }
}

/// Return a copy of `frame` with the `Signal` column added or overwritten.
pub fn generate_macd_rsi_signals(
    frame: &TimeSeriesFrame,
    thresholds: &SignalThresholds,
) -> Result<TimeSeriesFrame, SigtraderError> {
    let macd = frame.require(MACD)?;
    let macd_signal = frame.require(MACD_SIGNAL)?;
    let rsi = frame.require(RSI)?;

    let signals: Vec<Signal> = macd
        .iter()
        .zip(macd_signal)
        .zip(rsi)
        .map(|((&m, &s), &r)| classify(m, s, r, thresholds))
        .collect();

    tracing::debug!(
        rows = signals.len(),
        buys = signals.iter().filter(|s| **s == Signal::Buy).count(),
        sells = signals.iter().filter(|s| **s == Signal::Sell).count(),
        latest = %signals.last().copied().unwrap_or(Signal::Hold),
        "generated MACD/RSI signals"
    );

    let mut out = frame.clone();
    out.set_column(SIGNAL, signals.iter().map(|s| Some(s.as_f64())).collect())?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn frame(macd: &[f64], macd_signal: &[f64], rsi: &[f64]) -> TimeSeriesFrame {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let idx = (0..macd.len())
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect();
        TimeSeriesFrame::new(idx)
            .unwrap()
            .with_values(MACD, macd)
            .unwrap()
            .with_values(MACD_SIGNAL, macd_signal)
            .unwrap()
            .with_values(RSI, rsi)
            .unwrap()
    }

    #[test]
    fn classify_buy_when_bullish_and_oversold() {
        let t = SignalThresholds::default();
        assert_eq!(classify(Some(1.0), Some(0.5), Some(25.0), &t), Signal::Buy);
    }

    #[test]
    fn classify_sell_when_bearish_and_overbought() {
        let t = SignalThresholds::default();
        assert_eq!(classify(Some(0.2), Some(0.5), Some(75.0), &t), Signal::Sell);
    }

    #[test]
    fn classify_hold_on_threshold_boundaries() {
        let t = SignalThresholds::default();
        assert_eq!(classify(Some(1.0), Some(0.5), Some(30.0), &t), Signal::Hold);
        assert_eq!(classify(Some(0.2), Some(0.5), Some(70.0), &t), Signal::Hold);
    }

    #[test]
    fn classify_hold_when_lines_equal() {
        let t = SignalThresholds::default();
        assert_eq!(classify(Some(0.5), Some(0.5), Some(10.0), &t), Signal::Hold);
        assert_eq!(classify(Some(0.5), Some(0.5), Some(90.0), &t), Signal::Hold);
    }

    #[test]
    fn classify_hold_when_crossover_and_rsi_disagree() {
        let t = SignalThresholds::default();
        // bullish MACD but overbought RSI
        assert_eq!(classify(Some(1.0), Some(0.5), Some(80.0), &t), Signal::Hold);
        // bearish MACD but oversold RSI
        assert_eq!(classify(Some(0.2), Some(0.5), Some(20.0), &t), Signal::Hold);
    }

    #[test]
    fn classify_hold_on_missing_input() {
        let t = SignalThresholds::default();
        assert_eq!(classify(None, Some(0.5), Some(10.0), &t), Signal::Hold);
        assert_eq!(classify(Some(1.0), None, Some(10.0), &t), Signal::Hold);
        assert_eq!(classify(Some(1.0), Some(0.5), None, &t), Signal::Hold);
    }

    #[test]
    fn custom_thresholds_move_the_bounds() {
        let t = SignalThresholds {
            oversold: 40.0,
            overbought: 60.0,
        };
        assert_eq!(classify(Some(1.0), Some(0.5), Some(35.0), &t), Signal::Buy);
        assert_eq!(classify(Some(0.1), Some(0.5), Some(65.0), &t), Signal::Sell);
    }

    #[test]
    fn generate_adds_signal_column() {
        let input = frame(
            &[1.0, 0.2, 1.0, 0.5],
            &[0.5, 0.5, 0.5, 0.5],
            &[25.0, 75.0, 50.0, 10.0],
        );
        let out = generate_macd_rsi_signals(&input, &SignalThresholds::default()).unwrap();
        assert_eq!(
            out.column(SIGNAL).unwrap(),
            &[Some(1.0), Some(-1.0), Some(0.0), Some(0.0)]
        );
    }

    #[test]
    fn generate_leaves_input_untouched() {
        let input = frame(&[1.0], &[0.5], &[25.0]);
        let before = input.clone();
        let _ = generate_macd_rsi_signals(&input, &SignalThresholds::default()).unwrap();
        assert_eq!(input, before);
        assert!(!input.has_column(SIGNAL));
    }

    #[test]
    fn generate_overwrites_existing_signal() {
        let input = frame(&[1.0, 1.0], &[0.5, 0.5], &[25.0, 50.0])
            .with_values(SIGNAL, &[-1.0, -1.0])
            .unwrap();
        let out = generate_macd_rsi_signals(&input, &SignalThresholds::default()).unwrap();
        assert_eq!(out.column(SIGNAL).unwrap(), &[Some(1.0), Some(0.0)]);
    }

    #[test]
    fn generate_fails_fast_on_missing_rsi() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let input = TimeSeriesFrame::new(vec![start])
            .unwrap()
            .with_values(MACD, &[1.0])
            .unwrap()
            .with_values(MACD_SIGNAL, &[0.5])
            .unwrap();
        let err = generate_macd_rsi_signals(&input, &SignalThresholds::default()).unwrap_err();
        assert!(matches!(err, SigtraderError::MissingColumn { column } if column == RSI));
    }

    #[test]
    fn signal_value_round_trip() {
        for s in [Signal::Sell, Signal::Hold, Signal::Buy] {
            assert_eq!(Signal::from_value(s.as_f64()), Some(s));
        }
        assert_eq!(Signal::from_value(0.5), None);
    }

    #[test]
    fn signal_display_names() {
        assert_eq!(Signal::Buy.to_string(), "buy");
        assert_eq!(Signal::Sell.to_string(), "sell");
        assert_eq!(format!("{}", Signal::Hold), "hold");
    }
}
