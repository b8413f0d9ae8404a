//! The `error` module defines the error type shared by every fallible
//! operation in `signalbus`.
//!
//! Missing subscriptions, duplicate subscriptions and topics without
//! subscribers are not errors; those calls are no-ops.

use thiserror::Error;

/// Errors raised by the bus and its configuration layer.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BusError {
    /// A required argument was missing or empty at the call site.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the offending argument.
        name: &'static str,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// Configuration could not be loaded or deserialized.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl BusError {
    pub(crate) fn empty_topic() -> Self {
        BusError::InvalidArgument {
            name: "topic",
            reason: "must not be empty",
        }
    }
}
