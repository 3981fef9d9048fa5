//! Error types.
//!
//! Only construction and configuration can fail. Matching, shortage
//! resolution and rule evaluation report infeasibility as data
//! ([`Shortage`](crate::models::Shortage), [`Violation`](crate::models::Violation)).

use thiserror::Error;

/// Rejected model construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("operator name must not be empty")]
    EmptyOperatorName,

    #[error("desk name must not be empty")]
    EmptyDeskName,

    #[error("slot hour {0} is outside 0..=23")]
    InvalidSlotHour(u32),

    #[error("malformed slot label '{0}' (expected hNN)")]
    MalformedSlotLabel(String),

    #[error("slot {slot} must have a positive duration, got {hours}")]
    NonPositiveDuration { slot: String, hours: f64 },

    #[error("calendar contains slot {0} twice")]
    DuplicateSlot(String),
}

/// Rejected constraint configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("line {line}: cannot parse '{text}': {reason}")]
    InvalidLine {
        line: usize,
        text: String,
        reason: String,
    },

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}
