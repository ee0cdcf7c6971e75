//! Domain error types.

/// Top-level error type for sigtrader.
#[derive(Debug, thiserror::Error)]
pub enum SigtraderError {
    #[error("missing required column {column}")]
    MissingColumn { column: String },

    #[error("non-positive close {close} at row {row} cannot be used as a return divisor")]
    NonPositiveClose { row: usize, close: f64 },

    #[error("{column} is not finite at row {row}")]
    NonFiniteValue { column: String, row: usize },

    #[error("column {column} has {actual} rows, frame index has {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("index is not strictly ascending at row {row}")]
    UnorderedIndex { row: usize },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SigtraderError {
    pub fn missing_column(column: &str) -> Self {
        SigtraderError::MissingColumn {
            column: column.to_string(),
        }
    }
}

impl From<&SigtraderError> for std::process::ExitCode {
    fn from(err: &SigtraderError) -> Self {
        let code: u8 = match err {
            SigtraderError::Io(_) => 1,
            SigtraderError::ConfigParse { .. } | SigtraderError::ConfigInvalid { .. } => 2,
            SigtraderError::Data { .. }
            | SigtraderError::ColumnLength { .. }
            | SigtraderError::UnorderedIndex { .. } => 3,
            SigtraderError::MissingColumn { .. } => 4,
            SigtraderError::NonPositiveClose { .. } | SigtraderError::NonFiniteValue { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
