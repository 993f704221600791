//! Delimited text price adapter.
//!
//! The first row is a header. Each data row must have at least
//! `price_column + 1` fields; the close price is read from `price_column`
//! (0-based, default 7). Rows that fail are logged and skipped.

use crate::domain::error::TrendplotError;
use crate::ports::price_port::{PriceBatch, PricePort};
use std::path::PathBuf;
use tracing::{debug, warn};

pub const DEFAULT_PRICE_COLUMN: usize = 7;

pub struct CsvAdapter {
    path: PathBuf,
    delimiter: u8,
    price_column: usize,
}

impl CsvAdapter {
    pub fn new(path: PathBuf, delimiter: u8) -> Self {
        Self {
            path,
            delimiter,
            price_column: DEFAULT_PRICE_COLUMN,
        }
    }

    pub fn with_price_column(mut self, price_column: usize) -> Self {
        self.price_column = price_column;
        self
    }

    fn parse_close(&self, record: &csv::StringRecord) -> Result<f64, String> {
        let field = record.get(self.price_column).ok_or_else(|| {
            format!(
                "expected at least {} fields, found {}",
                self.price_column + 1,
                record.len()
            )
        })?;
        let close: f64 = field
            .trim()
            .parse()
            .map_err(|e| format!("invalid close value '{}': {}", field, e))?;
        if !close.is_finite() {
            return Err(format!("non-finite close value '{}'", field));
        }
        Ok(close)
    }
}

impl PricePort for CsvAdapter {
    fn source_name(&self) -> String {
        self.path.display().to_string()
    }

    fn read_closes(&self) -> Result<PriceBatch, TrendplotError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| TrendplotError::Input {
                reason: format!("failed to read {}: {}", self.path.display(), e),
            })?;

        let mut batch = PriceBatch::default();

        for (row, result) in rdr.records().enumerate() {
            // Header is line 1.
            let line = row + 2;
            let record = match result {
                Ok(record) => record,
                Err(e) if e.is_io_error() => {
                    return Err(TrendplotError::Input {
                        reason: format!("failed to read {}: {}", self.path.display(), e),
                    });
                }
                Err(e) => {
                    warn!(line, "skipping row: CSV parse error: {e}");
                    batch.skipped_rows += 1;
                    continue;
                }
            };

            match self.parse_close(&record) {
                Ok(close) => batch.closes.push(close),
                Err(reason) => {
                    warn!(line, "skipping row: {reason}");
                    batch.skipped_rows += 1;
                }
            }
        }

        debug!(
            source = %self.path.display(),
            rows = batch.closes.len(),
            skipped = batch.skipped_rows,
            "read prices"
        );
        Ok(batch)
    }
}
