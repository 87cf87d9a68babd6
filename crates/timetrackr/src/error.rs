//! Error types for timetrackr operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimeTrackrError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Default timezone is already configured")]
    AlreadyConfigured,
}

pub type Result<T> = std::result::Result<T, TimeTrackrError>;
