//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("store error: {0}")]
    Store(String),

    /// Malformed user input (e.g. an `addhero` payload). Shown to the user.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Write attempted by a caller other than the configured admin.
    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("comms error: {0}")]
    Comms(String),
}
