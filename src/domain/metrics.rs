//! Summary statistics over a backtested frame.

use super::error::SigtraderError;
use super::frame::{PORTFOLIO_VALUE, POSITION, TimeSeriesFrame};
use super::signal::Signal;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSummary {
    pub periods: usize,
    pub final_value: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    pub buy_signals: usize,
    pub sell_signals: usize,
    pub position_changes: usize,
    pub exposure: f64,
}

impl BacktestSummary {
    pub fn compute(
        frame: &TimeSeriesFrame,
        signal_column: &str,
    ) -> Result<Self, SigtraderError> {
        let signal = frame.require(signal_column)?;
        let position = frame.require(POSITION)?;
        let value: Vec<f64> = frame
            .require(PORTFOLIO_VALUE)?
            .iter()
            .map(|v| v.unwrap_or(1.0))
            .collect();

        let periods = frame.len();
        let final_value = value.last().copied().unwrap_or(1.0);
        let total_return = final_value - 1.0;

        let years = periods as f64 / TRADING_DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 && final_value > 0.0 {
            final_value.powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let mut buy_signals = 0usize;
        let mut sell_signals = 0usize;
        for s in signal.iter().flatten().filter_map(|v| Signal::from_value(*v)) {
            match s {
                Signal::Buy => buy_signals += 1,
                Signal::Sell => sell_signals += 1,
                Signal::Hold => {}
            }
        }

        let held: Vec<f64> = position.iter().map(|p| p.unwrap_or(0.0)).collect();
        let position_changes = held.windows(2).filter(|w| w[0] != w[1]).count();
        let exposure = if periods > 0 {
            held.iter().filter(|p| **p != 0.0).count() as f64 / periods as f64
        } else {
            0.0
        };

        Ok(Self {
            periods,
            final_value,
            total_return,
            annualized_return,
            max_drawdown: compute_drawdown(&value),
            buy_signals,
            sell_signals,
            position_changes,
            exposure,
        })
    }
}

/// Largest peak-to-trough decline as a fraction of the peak.
fn compute_drawdown(value: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0_f64;
    for &v in value {
        if v > peak {
            peak = v;
        }
        if peak > 0.0 {
            let dd = (peak - v) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}
