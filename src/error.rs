use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Errors raised by the chart core.
///
/// None of these are fatal: the caller keeps the last valid dataset and
/// render plan and surfaces the message as a recoverable notice.
#[derive(Error, Debug)]
pub enum ChartError {
    /// Row-based ingestion received no rows (or rows without any field).
    #[error("no rows to load")]
    EmptyInput,

    /// Free-text ingestion could not establish a header, or (in strict
    /// mode) a data row did not match the header width.
    #[error("malformed input at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// A column name that is not part of the current dataset.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// Export was asked for a format the renderer cannot snapshot.
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// A spreadsheet edit that would break a dataset invariant.
    #[error("invalid edit: {0}")]
    InvalidEdit(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for chart core operations.
pub type ChartResult<T> = Result<T, ChartError>;
