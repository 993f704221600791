//! Price ingestion port trait.

use crate::domain::error::TrendplotError;

/// Close prices in time order, plus how many input rows were dropped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceBatch {
    pub closes: Vec<f64>,
    pub skipped_rows: usize,
}

pub trait PricePort {
    /// Human-readable name of the source, used in diagnostics.
    fn source_name(&self) -> String;

    /// Read every usable close price. Row-level problems are skipped and
    /// counted; only a source that cannot be read at all is an error.
    fn read_closes(&self) -> Result<PriceBatch, TrendplotError>;
}
