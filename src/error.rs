use thiserror::Error;

/// Convenience result type for processor operations.
pub type ProcessorResult<T> = Result<T, ProcessorError>;

/// Error type returned by ingestion and extraction.
///
/// Every variant is fatal to the call that produced it. Row-level faults (an unparsable
/// timestamp or numeric cell) are never errors; they are reported as
/// [`crate::types::Diagnostic`]s alongside the successful output.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The header row could not be read.
    #[error("failed to read header: {0}")]
    Header(#[source] csv::Error),

    /// A data row is malformed at the CSV level (quoting, unequal field counts, ...).
    #[error("failed to read lines: {0}")]
    Rows(#[source] csv::Error),

    /// Fewer than two header columns, or no data rows.
    #[error("no data")]
    NoData,

    /// Header column 0 is not the timestamp column.
    #[error("first column must be 'time', found '{found}'")]
    MissingTimeColumn { found: String },

    /// A header has no path separator, so it cannot be split into (path, field).
    #[error("header '{header}' expected to be fully-qualified")]
    UnqualifiedHeader { header: String },

    /// A header is absent from the caller-supplied allow-list.
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    /// Fingerprinting the payload failed.
    #[error("error computing payload fingerprint: {0}")]
    Hashing(#[source] std::io::Error),

    /// The configured `time_format` is not a valid format string.
    #[error("invalid time format '{format}': {message}")]
    InvalidTimeFormat { format: String, message: String },
}

/// Coarse classification of [`ProcessorError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The payload cannot be shaped at all (bad CSV, missing columns, unqualified headers).
    Structural,
    /// The payload is well formed but rejected by a caller-supplied contract.
    Validation,
    /// Internal fingerprinting failure.
    Hashing,
    /// Invalid processor configuration.
    Config,
}

impl ProcessorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcessorError::Header(_)
            | ProcessorError::Rows(_)
            | ProcessorError::NoData
            | ProcessorError::MissingTimeColumn { .. }
            | ProcessorError::UnqualifiedHeader { .. } => ErrorKind::Structural,
            ProcessorError::UnknownField { .. } => ErrorKind::Validation,
            ProcessorError::Hashing(_) => ErrorKind::Hashing,
            ProcessorError::InvalidTimeFormat { .. } => ErrorKind::Config,
        }
    }
}
