#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use trendplot::cli::RunConfig;
use trendplot::domain::chart_layout::ChartConfig;
use trendplot::domain::error::TrendplotError;
use trendplot::domain::raster::Raster;
use trendplot::domain::series::Series;
use trendplot::domain::strategy::StrategyConfig;
use trendplot::ports::price_port::{PriceBatch, PricePort};
use trendplot::ports::raster_port::RasterPort;

pub struct MockPricePort {
    pub closes: Vec<f64>,
    pub skipped_rows: usize,
    pub error: Option<String>,
}

impl MockPricePort {
    pub fn new(closes: Vec<f64>) -> Self {
        Self {
            closes,
            skipped_rows: 0,
            error: None,
        }
    }

    pub fn with_error(reason: &str) -> Self {
        Self {
            closes: Vec::new(),
            skipped_rows: 0,
            error: Some(reason.to_string()),
        }
    }
}

impl PricePort for MockPricePort {
    fn source_name(&self) -> String {
        "mock".to_string()
    }

    fn read_closes(&self) -> Result<PriceBatch, TrendplotError> {
        if let Some(reason) = &self.error {
            return Err(TrendplotError::Input {
                reason: reason.clone(),
            });
        }
        Ok(PriceBatch {
            closes: self.closes.clone(),
            skipped_rows: self.skipped_rows,
        })
    }
}

/// Captures every raster handed to it instead of encoding.
pub struct MockRasterPort {
    pub writes: RefCell<Vec<(Raster, PathBuf)>>,
}

impl MockRasterPort {
    pub fn new() -> Self {
        Self {
            writes: RefCell::new(Vec::new()),
        }
    }
}

impl RasterPort for MockRasterPort {
    fn write(&self, raster: &Raster, path: &Path) -> Result<(), TrendplotError> {
        self.writes
            .borrow_mut()
            .push((raster.clone(), path.to_path_buf()));
        Ok(())
    }
}

pub fn small_chart() -> ChartConfig {
    ChartConfig {
        canvas_height: 120,
        max_width: 400,
        ..ChartConfig::default()
    }
}

pub fn run_config(strategy: StrategyConfig) -> RunConfig {
    RunConfig {
        filename: PathBuf::from("mock.csv"),
        delimiter: b',',
        price_column: 7,
        output: PathBuf::from("out.png"),
        strategy,
        chart: small_chart(),
    }
}

pub fn fast_windows() -> StrategyConfig {
    StrategyConfig {
        window_short: 2.0,
        window_long: 5.0,
        ..StrategyConfig::default()
    }
}

/// Ten flat samples followed by a jump.
pub fn step_up_prices() -> Vec<f64> {
    let mut prices = vec![10.0; 9];
    prices.push(12.0);
    prices
}

pub fn series_of(config: &StrategyConfig, prices: &[f64]) -> Series {
    Series::from_prices(config.window_short, config.window_long, prices.iter().copied())
}

pub fn csv_line(close: f64) -> String {
    format!("2024-01-15,10:00,1,2,0.5,1.5,100,{close}\n")
}

pub const CSV_HEADER: &str = "date,time,open,high,low,vwap,volume,close\n";
