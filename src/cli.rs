//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestConfig, run_backtest};
use crate::domain::config_validation::validate_config;
use crate::domain::error::SigtraderError;
use crate::domain::frame::TimeSeriesFrame;
use crate::domain::metrics::BacktestSummary;
use crate::domain::signal::{SignalThresholds, generate_macd_rsi_signals};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "sigtrader", about = "MACD/RSI signal generator and backtester")]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify each row of a series as buy, sell or hold
    Signals {
        #[arg(long)]
        series: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate signals and backtest them
    Backtest {
        #[arg(long)]
        series: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        signal_column: Option<String>,
        /// Backtest the signal column already present in the input
        #[arg(long)]
        use_existing_signals: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List the series available in the data directory
    ListSeries {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Signals {
            series,
            config,
            data_dir,
            output,
        } => run_signals(&series, config.as_ref(), data_dir, output),
        Command::Backtest {
            series,
            config,
            data_dir,
            output,
            signal_column,
            use_existing_signals,
        } => run_backtest_command(
            &series,
            config.as_ref(),
            data_dir,
            output,
            signal_column,
            use_existing_signals,
        ),
        Command::Validate { config } => run_validate(&config),
        Command::ListSeries { config, data_dir } => run_list_series(config.as_ref(), data_dir),
    }
}

fn fail(err: SigtraderError) -> ExitCode {
    tracing::error!(error = %err, "command failed");
    eprintln!("error: {err}");
    (&err).into()
}

/// Load and validate the configuration, or an empty one when no path is given.
pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, SigtraderError> {
    let adapter = match path {
        Some(p) => {
            tracing::info!(path = %p.display(), "loading config");
            FileConfigAdapter::from_file(p)?
        }
        None => FileConfigAdapter::empty(),
    };
    validate_config(&adapter)?;
    Ok(adapter)
}

pub fn build_data_adapter(config: &dyn ConfigPort, data_dir: Option<PathBuf>) -> CsvAdapter {
    let adapter = CsvAdapter::from_config(config);
    match data_dir {
        Some(dir) => adapter.with_base_path(dir),
        None => adapter,
    }
}

pub fn default_output(series: &str, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}_{}.csv", series, suffix))
}

/// Load a series, attach signals and write the result.
pub fn run_signals_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    series: &str,
    thresholds: &SignalThresholds,
    output: &Path,
) -> Result<TimeSeriesFrame, SigtraderError> {
    let frame = data_port.fetch_frame(series)?;
    tracing::info!(series, rows = frame.len(), "loaded series");

    let signals = generate_macd_rsi_signals(&frame, thresholds)?;
    report_port.write(&signals, output)?;
    tracing::info!(path = %output.display(), "signals written");
    Ok(signals)
}

/// Load a series, optionally attach signals, backtest, write the result and
/// summarise it.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    series: &str,
    thresholds: &SignalThresholds,
    bt_config: &BacktestConfig,
    use_existing_signals: bool,
    output: &Path,
) -> Result<(TimeSeriesFrame, BacktestSummary), SigtraderError> {
    let frame = data_port.fetch_frame(series)?;
    tracing::info!(series, rows = frame.len(), "loaded series");

    let with_signals = if use_existing_signals {
        frame
    } else {
        generate_macd_rsi_signals(&frame, thresholds)?
    };

    let result = run_backtest(&with_signals, bt_config)?;
    let summary = BacktestSummary::compute(&result, &bt_config.signal_column)?;

    report_port.write(&result, output)?;
    tracing::info!(path = %output.display(), "backtest written");
    Ok((result, summary))
}

pub fn print_summary(series: &str, summary: &BacktestSummary) {
    eprintln!("\n=== Backtest: {} ===", series);
    eprintln!("Periods:          {}", summary.periods);
    eprintln!("Final Value:      {:.4}", summary.final_value);
    eprintln!("Total Return:     {:.2}%", summary.total_return * 100.0);
    eprintln!(
        "Annualized:       {:.2}%",
        summary.annualized_return * 100.0
    );
    eprintln!("Max Drawdown:     -{:.1}%", summary.max_drawdown * 100.0);
    eprintln!("Buy Signals:      {}", summary.buy_signals);
    eprintln!("Sell Signals:     {}", summary.sell_signals);
    eprintln!("Position Changes: {}", summary.position_changes);
    eprintln!("Exposure:         {:.1}%", summary.exposure * 100.0);
}

fn run_signals(
    series: &str,
    config_path: Option<&PathBuf>,
    data_dir: Option<PathBuf>,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let adapter = build_data_adapter(&config, data_dir);
    let thresholds = SignalThresholds::from_config(&config);
    let output = output.unwrap_or_else(|| default_output(series, "signals"));

    match run_signals_pipeline(&adapter, &adapter, series, &thresholds, &output) {
        Ok(_) => {
            eprintln!("Signals written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_backtest_command(
    series: &str,
    config_path: Option<&PathBuf>,
    data_dir: Option<PathBuf>,
    output: Option<PathBuf>,
    signal_column: Option<String>,
    use_existing_signals: bool,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let adapter = build_data_adapter(&config, data_dir);
    let thresholds = SignalThresholds::from_config(&config);
    let mut bt_config = BacktestConfig::from_config(&config);
    if let Some(column) = signal_column {
        bt_config.signal_column = column;
    }
    let output = output.unwrap_or_else(|| default_output(series, "backtest"));

    match run_backtest_pipeline(
        &adapter,
        &adapter,
        series,
        &thresholds,
        &bt_config,
        use_existing_signals,
        &output,
    ) {
        Ok((_, summary)) => {
            print_summary(series, &summary);
            eprintln!("\nResults written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    match load_config(Some(config_path)) {
        Ok(config) => {
            let thresholds = SignalThresholds::from_config(&config);
            let bt_config = BacktestConfig::from_config(&config);
            eprintln!("Configuration {} is valid", config_path.display());
            eprintln!("  oversold:      {}", thresholds.oversold);
            eprintln!("  overbought:    {}", thresholds.overbought);
            eprintln!("  signal column: {}", bt_config.signal_column);
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_list_series(config_path: Option<&PathBuf>, data_dir: Option<PathBuf>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let adapter = build_data_adapter(&config, data_dir);

    match adapter.list_series() {
        Ok(series) if series.is_empty() => {
            eprintln!("No series found in {}", adapter.base_path().display());
            ExitCode::SUCCESS
        }
        Ok(series) => {
            for name in &series {
                println!("{}", name);
            }
            eprintln!("{} series found", series.len());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}
