use thiserror::Error;

/// Boxed error returned by user-supplied aggregation callables
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type definitions
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid window specification: {0}")]
    InvalidWindowSpec(String),

    #[error("Invalid function specification: {0}")]
    InvalidFunctionSpec(String),

    #[error("Column not found: {0}")]
    MissingColumn(String),

    #[error("Unknown aggregation: {0}")]
    UnknownAggregation(String),

    #[error("Aggregation failed for column '{column}', window {window}, group {group}: {source}")]
    AggregationFailure {
        column: String,
        window: usize,
        group: String,
        #[source]
        source: BoxError,
    },

    #[error("Invalid input type: {0}")]
    InvalidInputType(String),

    #[error("Duplicate column name: {0}")]
    DuplicateColumnName(String),

    #[error("Inconsistent row count: expected {expected}, found {found}")]
    InconsistentRowCount { expected: usize, found: usize },

    #[error("Index out of bounds: index {index}, size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("Type error: {0}")]
    Type(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("IO error")]
    Io(#[source] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl Error {
    /// Wrap a callable error with the window that triggered it
    pub fn aggregation_failure(
        column: &str,
        window: usize,
        group: impl Into<String>,
        source: BoxError,
    ) -> Self {
        Error::AggregationFailure {
            column: column.to_string(),
            window,
            group: group.into(),
            source,
        }
    }
}
