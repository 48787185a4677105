//! Shared error type for configuration and logging setup

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Opening the log file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file unreadable or malformed, or an invalid setting
    #[error("Configuration error: {0}")]
    Config(String),

    /// A global tracing subscriber could not be installed
    #[error("Logging error: {0}")]
    Logging(String),
}
