// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Quirl bot.

use thiserror::Error;

/// The primary error type used across all Quirl adapter traits and core operations.
#[derive(Debug, Error)]
pub enum QuirlError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel adapter errors (connection failure, delivery failure, rate limiting).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Artifact generator errors (encoding failure, render failure, I/O).
    #[error("generation error: {message}")]
    Generation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A user-supplied value was rejected (size out of range, unparseable input).
    #[error("validation error: {0}")]
    Validation(String),

    /// The user is not a member of the mandatory gate channel.
    #[error("access denied: not a member of {channel}")]
    GateDenied { channel: String },

    /// A non-administrator invoked an administrator operation.
    #[error("not authorized")]
    Unauthorized,

    /// Requested adapter was not found.
    #[error("adapter not found: {adapter_type}/{name}")]
    AdapterNotFound { adapter_type: String, name: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl QuirlError {
    /// Shorthand for a channel error without an underlying source.
    pub fn channel(message: impl Into<String>) -> Self {
        QuirlError::Channel {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a generation error without an underlying source.
    pub fn generation(message: impl Into<String>) -> Self {
        QuirlError::Generation {
            message: message.into(),
            source: None,
        }
    }
}
