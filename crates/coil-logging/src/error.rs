//! Logging setup errors

use thiserror::Error;

/// Errors that can occur while installing the logging subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid filter directive: {0}")]
    InvalidDirective(#[from] tracing_subscriber::filter::ParseError),

    #[error("Invalid logging config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Failed to create log appender: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),

    #[error("Failed to open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("A global subscriber is already installed: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Result type for logging setup
pub type LoggingResult<T> = Result<T, LoggingError>;
