use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrendError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task failed: {0}")]
    TaskFailed(String),
}
