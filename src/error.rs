use indicatif::style::TemplateError;
use thiserror::Error;

pub type GymResult<T> = Result<T, GymError>;

#[derive(Debug, Error)]
pub enum GymError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Io(#[from] IoError),
}

/// Errors occurring within Agent logic or execution.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Agent logic error: {0}")]
    Logic(String),

    #[error("Invalid input to agent: {0}")]
    InvalidInput(String),

    #[error("Missing observation field: {0}")]
    MissingObservationField(String),
}

/// Errors related to data loading, parsing, and the market series schema.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Missing required column: '{0}'")]
    MissingColumn(String),

    #[error("Feature column set is empty")]
    NoFeatureColumns,

    #[error("Market series too short: {len} rows, at least 2 required")]
    SeriesTooShort { len: usize },

    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Missing value in column '{column}' at row {row}")]
    MissingValue { column: String, row: usize },

    #[error("Row index {index} out of bounds for series of length {len}")]
    RowOutOfBounds { index: usize, len: usize },

    #[error("Non-finite value in column '{column}' at row {row}")]
    NonFiniteValue { column: String, row: usize },

    #[error("Non-positive price in column '{column}' at row {row}")]
    NonPositivePrice { column: String, row: usize },

    #[error("Timestamps not strictly increasing at row {0}")]
    UnorderedTimestamps(usize),

    #[error("Failed timestamp conversion: {0}")]
    TimestampConversion(String),

    #[error("Data frame error: {0}")]
    DataFrame(#[from] polars::error::PolarsError),
}

/// Errors related to the Gym Environment configuration and execution loop.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("Invalid environment state: {0}")]
    InvalidState(String),

    #[error("Invalid environment configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "Degenerate valuation: portfolio value {value} is non-positive, reward is undefined"
    )]
    DegenerateValuation { value: f64 },

    #[error("Progress bar error")]
    ProgressBar(#[from] TemplateError),
}

/// Errors related to File I/O and serialization of reports and tables.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("IO operation failed")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write data: {0}")]
    WriteFailed(String),

    #[error("Failed to read data: {0}")]
    ReadFailed(String),
}
