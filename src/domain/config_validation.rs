//! Configuration validation.
//!
//! Checks every configured value before any data is loaded. Absent keys fall
//! back to their defaults and are valid.

use super::error::SigtraderError;
use super::signal::{DEFAULT_OVERBOUGHT, DEFAULT_OVERSOLD};
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    validate_data_section(config)?;
    validate_thresholds(config)?;
    validate_signal_column(config)?;
    Ok(())
}

fn validate_data_section(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    for key in ["dir", "date_column", "date_format"] {
        if let Some(value) = config.get_string("data", key) {
            if value.trim().is_empty() {
                return Err(SigtraderError::ConfigInvalid {
                    section: "data".to_string(),
                    key: key.to_string(),
                    reason: format!("{} must not be empty", key),
                });
            }
        }
    }
    Ok(())
}

fn validate_thresholds(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let oversold = parse_threshold(config, "oversold", DEFAULT_OVERSOLD)?;
    let overbought = parse_threshold(config, "overbought", DEFAULT_OVERBOUGHT)?;

    if oversold >= overbought {
        return Err(SigtraderError::ConfigInvalid {
            section: "signal".to_string(),
            key: "oversold".to_string(),
            reason: "oversold must be below overbought".to_string(),
        });
    }
    Ok(())
}

fn parse_threshold(
    config: &dyn ConfigPort,
    key: &str,
    default: f64,
) -> Result<f64, SigtraderError> {
    let value = match config.get_string("signal", key) {
        None => return Ok(default),
        Some(raw) => raw.trim().parse::<f64>().map_err(|_| SigtraderError::ConfigInvalid {
            section: "signal".to_string(),
            key: key.to_string(),
            reason: format!("{} must be a number", key),
        })?,
    };

    if !(0.0..=100.0).contains(&value) {
        return Err(SigtraderError::ConfigInvalid {
            section: "signal".to_string(),
            key: key.to_string(),
            reason: format!("{} must be between 0 and 100", key),
        });
    }
    Ok(value)
}

fn validate_signal_column(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    match config.get_string("backtest", "signal_column") {
        Some(s) if s.trim().is_empty() => Err(SigtraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "signal_column".to_string(),
            reason: "signal_column must not be empty".to_string(),
        }),
        _ => Ok(()),
    }
}
