//! Signal-following return backtest.
//!
//! Derived columns are computed in a fixed order over the whole series:
//! Position, Daily_Return, Strategy_Return, Portfolio_Value. A signal seen on
//! row `t` only earns returns from row `t + 1` onwards.

use super::error::SigtraderError;
use super::frame::{
    CLOSE, DAILY_RETURN, PORTFOLIO_VALUE, POSITION, SIGNAL, STRATEGY_RETURN, TimeSeriesFrame,
};
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacktestConfig {
    pub signal_column: String,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            signal_column: SIGNAL.to_string(),
        }
    }
}

impl BacktestConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let signal_column = config
            .get_string("backtest", "signal_column")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| SIGNAL.to_string());
        Self { signal_column }
    }
}

/// Return a copy of `frame` with Position, Daily_Return, Strategy_Return and
/// Portfolio_Value added or overwritten.
///
/// Fails before producing any output if Close or the signal column is absent,
/// if a non-positive close would be used as a return divisor, or if any
/// derived value would be infinite or NaN.
pub fn run_backtest(
    frame: &TimeSeriesFrame,
    config: &BacktestConfig,
) -> Result<TimeSeriesFrame, SigtraderError> {
    let signal = frame.require(&config.signal_column)?;
    let close = frame.require(CLOSE)?;

    if frame.is_empty() {
        tracing::warn!("backtesting an empty frame");
    }

    if let Some(row) = signal.iter().position(|s| s.is_some_and(|v| !v.is_finite())) {
        return Err(SigtraderError::NonFiniteValue {
            column: config.signal_column.clone(),
            row,
        });
    }

    let position = carry_forward_positions(signal);
    let daily_return = pct_change(close)?;
    let strategy_return = lagged_returns(&position, &daily_return)?;
    let portfolio_value = compound(&strategy_return)?;

    tracing::debug!(
        rows = frame.len(),
        signal_column = %config.signal_column,
        final_value = portfolio_value.last().copied().unwrap_or(1.0),
        "backtest complete"
    );

    let mut out = frame.clone();
    out.set_column(POSITION, position.into_iter().map(Some).collect())?;
    out.set_column(DAILY_RETURN, daily_return)?;
    out.set_column(STRATEGY_RETURN, strategy_return)?;
    out.set_column(PORTFOLIO_VALUE, portfolio_value.into_iter().map(Some).collect())?;
    Ok(out)
}

/// Hold the most recent nonzero signal. Zero and missing signals leave the
/// position unchanged; the position is 0 until the first nonzero signal.
pub fn carry_forward_positions(signal: &[Option<f64>]) -> Vec<f64> {
    signal
        .iter()
        .scan(0.0_f64, |held, s| {
            if let Some(v) = s.filter(|v| *v != 0.0) {
                *held = v;
            }
            Some(*held)
        })
        .collect()
}

fn non_finite(column: &str, row: usize) -> SigtraderError {
    SigtraderError::NonFiniteValue {
        column: column.to_string(),
        row,
    }
}

/// Fractional change from the previous close. Missing at row 0 and wherever
/// either close is missing.
///
/// An infinite close, or a positive close so small that dividing by it
/// overflows, is rejected rather than written out.
pub fn pct_change(close: &[Option<f64>]) -> Result<Vec<Option<f64>>, SigtraderError> {
    let mut out = Vec::with_capacity(close.len());
    if close.is_empty() {
        return Ok(out);
    }
    out.push(None);

    for (row, pair) in close.windows(2).enumerate() {
        let change = match (pair[0], pair[1]) {
            (Some(prev), Some(_)) if prev <= 0.0 => {
                return Err(SigtraderError::NonPositiveClose { row, close: prev });
            }
            (Some(prev), Some(cur)) => {
                let r = (cur - prev) / prev;
                if !r.is_finite() {
                    return Err(non_finite(DAILY_RETURN, row + 1));
                }
                Some(r)
            }
            _ => None,
        };
        out.push(change);
    }
    Ok(out)
}

/// Return earned on row `t` by the position held at `t - 1`.
pub fn lagged_returns(
    position: &[f64],
    daily_return: &[Option<f64>],
) -> Result<Vec<Option<f64>>, SigtraderError> {
    let mut out = Vec::with_capacity(daily_return.len());
    if daily_return.is_empty() {
        return Ok(out);
    }
    out.push(None);

    for (row, (held, r)) in position.iter().zip(&daily_return[1..]).enumerate() {
        let earned = r.map(|r| held * r);
        if earned.is_some_and(|v| !v.is_finite()) {
            return Err(non_finite(STRATEGY_RETURN, row + 1));
        }
        out.push(earned);
    }
    Ok(out)
}

/// Running product of `1 + r`, counting missing returns as 0.
pub fn compound(strategy_return: &[Option<f64>]) -> Result<Vec<f64>, SigtraderError> {
    let mut value = 1.0_f64;
    let mut out = Vec::with_capacity(strategy_return.len());
    for (row, r) in strategy_return.iter().enumerate() {
        value *= 1.0 + r.unwrap_or(0.0);
        if !value.is_finite() {
            return Err(non_finite(PORTFOLIO_VALUE, row));
        }
        out.push(value);
    }
    Ok(out)
}
