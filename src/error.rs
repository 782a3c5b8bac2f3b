//! Error taxonomy.
//!
//! Every failure aborts the call that raised it: no operation in this crate
//! returns a partial period or interval alongside an error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PeriodError {
    /// A value could not be coerced to an [`Instant`](crate::Instant).
    #[error("Invalid date: {value}")]
    InvalidDate { value: String },

    /// A duration could not be parsed, or stepping by it did not advance the clock.
    #[error("Invalid duration '{duration}': {reason}")]
    InvalidDuration { duration: String, reason: String },

    /// A period request is malformed or under-specified.
    #[error("Invalid period ({reason})")]
    InvalidPeriodSpec { reason: String },

    /// An interval could not be constructed from the supplied endpoints.
    #[error("Invalid interval ({reason})")]
    InvalidIntervalSpec { reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PeriodError {
    pub(crate) fn invalid_date(value: impl Into<String>) -> Self {
        Self::InvalidDate {
            value: value.into(),
        }
    }

    pub(crate) fn invalid_duration(duration: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidDuration {
            duration: duration.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_period(reason: impl Into<String>) -> Self {
        Self::InvalidPeriodSpec {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_interval(reason: impl Into<String>) -> Self {
        Self::InvalidIntervalSpec {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PeriodError>;
