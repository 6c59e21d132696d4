// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes: path presence, size bounds, admin id syntax.

use crate::diagnostic::ConfigError;
use crate::model::QuirlConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &QuirlConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // The conversation flow's lower size bound is fixed at 100; a max below
    // that would make every size selection unsatisfiable.
    if config.limits.max_size < 100 {
        errors.push(ConfigError::Validation {
            message: format!(
                "limits.max_size must be at least 100, got {}",
                config.limits.max_size
            ),
        });
    }

    if config.broadcast.pace_ms > 10_000 {
        errors.push(ConfigError::Validation {
            message: format!(
                "broadcast.pace_ms must be at most 10000, got {}",
                config.broadcast.pace_ms
            ),
        });
    }

    for admin in &config.telegram.admins {
        if admin.trim().parse::<i64>().is_err() {
            errors.push(ConfigError::Validation {
                message: format!("telegram.admins entry `{admin}` is not a numeric user id"),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
