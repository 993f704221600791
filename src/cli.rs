//! CLI definition, configuration resolution and pipeline dispatch.
//!
//! Every option can come from a flag or from the INI file given with
//! `--config`; flags win over the file, and the file wins over the profile
//! defaults.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::{CsvAdapter, DEFAULT_PRICE_COLUMN};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::png_adapter::PngAdapter;
use crate::adapters::raster_chart::Renderer;
use crate::domain::chart_layout::ChartConfig;
use crate::domain::config_validation::{
    parse_delimiter, validate_chart_config, validate_strategy_config,
};
use crate::domain::engine::{StrategyEngine, TradeEvent};
use crate::domain::error::TrendplotError;
use crate::domain::series::Series;
use crate::domain::strategy::{Profile, StrategyConfig};
use crate::domain::summary::RunSummary;
use crate::domain::trend::TrendEstimator;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use crate::ports::raster_port::RasterPort;

pub const DEFAULT_OUTPUT: &str = "trendplot.png";

#[derive(Parser, Debug, Default)]
#[command(
    name = "trendplot",
    about = "Simulate an EMA crossover strategy over a price series and chart it"
)]
pub struct Cli {
    /// Input CSV file
    #[arg(short, long)]
    pub filename: Option<PathBuf>,
    /// CSV delimiter (one character)
    #[arg(short, long)]
    pub delimiter: Option<String>,
    /// 0-based column holding the close price
    #[arg(long)]
    pub price_column: Option<usize>,
    /// Output PNG path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// INI file with [input], [strategy] and [chart] sections
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Window presets: standard (5/20) or fast (3/17)
    #[arg(short, long)]
    pub profile: Option<Profile>,
    #[arg(long)]
    pub window_short: Option<f64>,
    #[arg(long)]
    pub window_long: Option<f64>,
    #[arg(long)]
    pub initial_balance: Option<f64>,
    /// Fraction lost on each buy and sell
    #[arg(long)]
    pub trans_cost_rate: Option<f64>,
    /// Percent below entry
    #[arg(long)]
    pub stop_loss_pct: Option<f64>,
    /// Percent above entry
    #[arg(long)]
    pub take_profit_pct: Option<f64>,
    /// Also exit on a bearish crossover
    #[arg(long)]
    pub enable_crossover_exit: bool,
    #[arg(long)]
    pub canvas_height: Option<u32>,
    #[arg(long)]
    pub max_width: Option<u32>,
    #[arg(long)]
    pub trend_lookback: Option<usize>,
    #[arg(long)]
    pub residual_threshold: Option<f64>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub filename: PathBuf,
    pub delimiter: u8,
    pub price_column: usize,
    pub output: PathBuf,
    pub strategy: StrategyConfig,
    pub chart: ChartConfig,
}

/// What a run produced, besides the image file.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub summary: RunSummary,
    pub events: Vec<TradeEvent>,
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

fn execute(cli: &Cli) -> Result<RunReport, TrendplotError> {
    let adapter = match &cli.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path)?
        }
        None => FileConfigAdapter::empty(),
    };

    let config = build_run_config(cli, &adapter)?;
    let prices = CsvAdapter::new(config.filename.clone(), config.delimiter)
        .with_price_column(config.price_column);

    run_pipeline(&prices, &PngAdapter::new(), &config)
}

pub fn build_run_config(cli: &Cli, config: &dyn ConfigPort) -> Result<RunConfig, TrendplotError> {
    let filename = cli
        .filename
        .clone()
        .or_else(|| config.get_string("input", "filename").map(PathBuf::from))
        .ok_or_else(|| TrendplotError::ConfigMissing {
            section: "input".into(),
            key: "filename".into(),
        })?;

    let delimiter = match cli
        .delimiter
        .clone()
        .or_else(|| config.get_string("input", "delimiter"))
    {
        Some(d) => parse_delimiter(&d)?,
        None => b',',
    };

    let price_column = match cli.price_column {
        Some(c) => c,
        None => get_unsigned::<usize>(config, "input", "price_column")?
            .unwrap_or(DEFAULT_PRICE_COLUMN),
    };

    let output = cli
        .output
        .clone()
        .or_else(|| config.get_string("input", "output").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let strategy = build_strategy_config(cli, config)?;
    validate_strategy_config(&strategy)?;

    let chart = build_chart_config(cli, config)?;
    validate_chart_config(&chart)?;

    Ok(RunConfig {
        filename,
        delimiter,
        price_column,
        output,
        strategy,
        chart,
    })
}

pub fn build_strategy_config(
    cli: &Cli,
    config: &dyn ConfigPort,
) -> Result<StrategyConfig, TrendplotError> {
    let profile = match cli.profile {
        Some(p) => p,
        None => match config.get_string("strategy", "profile") {
            Some(s) => s.parse().map_err(|reason| TrendplotError::ConfigInvalid {
                section: "strategy".into(),
                key: "profile".into(),
                reason,
            })?,
            None => Profile::default(),
        },
    };
    let base = StrategyConfig::for_profile(profile);

    let double = |flag: Option<f64>, key: &str, default: f64| -> Result<f64, TrendplotError> {
        match flag {
            Some(v) => Ok(v),
            None => Ok(config.get_double("strategy", key)?.unwrap_or(default)),
        }
    };

    let enable_crossover_exit = cli.enable_crossover_exit
        || config
            .get_bool("strategy", "enable_crossover_exit")?
            .unwrap_or(base.enable_crossover_exit);

    Ok(StrategyConfig {
        window_short: double(cli.window_short, "window_short", base.window_short)?,
        window_long: double(cli.window_long, "window_long", base.window_long)?,
        initial_balance: double(cli.initial_balance, "initial_balance", base.initial_balance)?,
        trans_cost_rate: double(cli.trans_cost_rate, "trans_cost_rate", base.trans_cost_rate)?,
        stop_loss_pct: double(cli.stop_loss_pct, "stop_loss_pct", base.stop_loss_pct)?,
        take_profit_pct: double(cli.take_profit_pct, "take_profit_pct", base.take_profit_pct)?,
        enable_crossover_exit,
    })
}

pub fn build_chart_config(cli: &Cli, config: &dyn ConfigPort) -> Result<ChartConfig, TrendplotError> {
    let base = ChartConfig::default();

    let canvas_height = match cli.canvas_height {
        Some(v) => v,
        None => get_unsigned::<u32>(config, "chart", "canvas_height")?.unwrap_or(base.canvas_height),
    };
    let max_width = match cli.max_width {
        Some(v) => v,
        None => get_unsigned::<u32>(config, "chart", "max_width")?.unwrap_or(base.max_width),
    };
    let trend_lookback = match cli.trend_lookback {
        Some(v) => v,
        None => get_unsigned::<usize>(config, "chart", "trend_lookback")?
            .unwrap_or(base.trend_lookback),
    };
    let residual_threshold = match cli.residual_threshold {
        Some(v) => v,
        None => config
            .get_double("chart", "residual_threshold")?
            .unwrap_or(base.residual_threshold),
    };

    Ok(ChartConfig {
        canvas_height,
        max_width,
        trend_lookback,
        residual_threshold,
    })
}

fn get_unsigned<T: TryFrom<i64>>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, TrendplotError> {
    match config.get_int(section, key)? {
        None => Ok(None),
        Some(v) => T::try_from(v)
            .map(Some)
            .map_err(|_| TrendplotError::ConfigInvalid {
                section: section.into(),
                key: key.into(),
                reason: format!("{v} is out of range"),
            }),
    }
}

/// Ingest, simulate, render and encode.
pub fn run_pipeline(
    price_port: &dyn PricePort,
    raster_port: &dyn RasterPort,
    config: &RunConfig,
) -> Result<RunReport, TrendplotError> {
    // Stage 1: Load prices
    let source_name = price_port.source_name();
    info!("Reading prices from {}", source_name);
    let batch = price_port.read_closes()?;

    let mut series = Series::new(config.strategy.window_short, config.strategy.window_long);
    for close in batch.closes {
        match series.add_price(close) {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => warn!("skipping price: {e}"),
            Err(e) => return Err(e),
        }
    }
    let Some((min, max)) = series.range() else {
        return Err(TrendplotError::EmptySeries { source_name });
    };
    info!(
        samples = series.len(),
        skipped_rows = batch.skipped_rows,
        min,
        max,
        "Loaded series"
    );

    // Stage 2: Simulate
    let simulation = StrategyEngine::new(config.strategy.clone()).run(&series);

    // Stage 3: Render and encode; the canvas lives only for this block.
    {
        let estimator = TrendEstimator::new(&series);
        let raster = Renderer::new(config.chart.clone()).render(
            &series,
            &simulation.events,
            &estimator,
        )?;
        info!(
            width = raster.width,
            height = raster.height,
            "Writing chart to {}",
            config.output.display()
        );
        raster_port.write(&raster, &config.output)?;
    }

    // Stage 4: Summary
    let last_price = series.len().checked_sub(1).and_then(|i| series.price(i));
    let summary = RunSummary::compute(
        &simulation,
        config.strategy.initial_balance,
        series.len(),
        last_price,
    );
    log_summary(&summary);

    Ok(RunReport {
        summary,
        events: simulation.events,
    })
}

fn log_summary(summary: &RunSummary) {
    info!("=== Results ===");
    info!("Samples:          {}", summary.samples);
    info!("Buys / Sells:     {} / {}", summary.buys, summary.sells);
    info!(
        "Exits:            {} stop-loss, {} take-profit, {} crossover",
        summary.stop_loss_exits, summary.take_profit_exits, summary.crossover_exits
    );
    info!("Final equity:     {:.2}", summary.final_equity);
    info!("Total return:     {:.2}%", summary.total_return_pct);
    if summary.holding_at_end {
        info!("Still holding at end of series (valued at last price)");
    }
}
