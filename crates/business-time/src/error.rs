//! Error types for business-time operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusinessTimeError {
    /// A bounded `next`/`previous` search ran out of room without finding an interval.
    #[error("Rule exhausted: {0}")]
    RuleExhausted(String),

    /// Two durations bound to different rules were combined.
    #[error("Rule mismatch: cannot combine durations of different rules")]
    RuleMismatch,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
}

pub type Result<T> = std::result::Result<T, BusinessTimeError>;
