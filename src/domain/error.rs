//! Domain error types.

/// Top-level error type for trendplot.
#[derive(Debug, thiserror::Error)]
pub enum TrendplotError {
    #[error("input error: {reason}")]
    Input { reason: String },

    #[error("no valid price rows in {source_name}")]
    EmptySeries { source_name: String },

    #[error("invalid value {value}: prices must be finite")]
    InvalidValue { value: f64 },

    #[error("invalid price {price} at index {index}")]
    InvalidPrice { index: usize, price: f64 },

    #[error("insufficient data for trend fit: window [{start}, {stop}) needs at least 2 points")]
    InsufficientData { start: usize, stop: usize },

    #[error("trend window [{start}, {stop}) out of range for series of length {len}")]
    WindowOutOfRange { start: usize, stop: usize, len: usize },

    #[error("encoding error: {reason}")]
    Encoding { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrendplotError {
    /// Per-row and per-step errors that are logged and skipped rather than
    /// aborting the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TrendplotError::InvalidValue { .. } | TrendplotError::InvalidPrice { .. }
        )
    }
}

impl From<&TrendplotError> for std::process::ExitCode {
    fn from(err: &TrendplotError) -> Self {
        let code: u8 = match err {
            TrendplotError::Io(_) | TrendplotError::Input { .. } => 1,
            TrendplotError::ConfigParse { .. }
            | TrendplotError::ConfigMissing { .. }
            | TrendplotError::ConfigInvalid { .. } => 2,
            TrendplotError::EmptySeries { .. } => 3,
            TrendplotError::Encoding { .. } => 4,
            TrendplotError::InvalidValue { .. }
            | TrendplotError::InvalidPrice { .. }
            | TrendplotError::InsufficientData { .. }
            | TrendplotError::WindowOutOfRange { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
