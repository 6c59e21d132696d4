// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./quirl.toml` > `~/.config/quirl/quirl.toml`
//! > `/etc/quirl/quirl.toml` with environment variable overrides via the
//! `QUIRL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::QuirlConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/quirl/quirl.toml` (system-wide)
/// 3. `~/.config/quirl/quirl.toml` (user XDG config)
/// 4. `./quirl.toml` (local directory)
/// 5. `QUIRL_*` environment variables
pub fn load_config() -> Result<QuirlConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuirlConfig::default()))
        .merge(Toml::file("/etc/quirl/quirl.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("quirl/quirl.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("quirl.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<QuirlConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuirlConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<QuirlConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuirlConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `QUIRL_TELEGRAM_BOT_TOKEN` must map to
/// `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("QUIRL_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: QUIRL_TELEGRAM_BOT_TOKEN -> "telegram_bot_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("limits_", "limits.", 1)
            .replacen("broadcast_", "broadcast.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn loads_defaults_from_empty_string() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.agent.name, "quirl");
        assert_eq!(config.limits.max_size, 16000);
    }

    #[test]
    fn string_config_overrides_defaults() {
        let config = load_config_from_str("[limits]\nmax_size = 4000\n").unwrap();
        assert_eq!(config.limits.max_size, 4000);
        // Untouched sections keep defaults.
        assert_eq!(config.broadcast.pace_ms, 50);
    }

    #[test]
    #[serial]
    fn env_var_overrides_section_key() {
        // SAFETY: serialized test, no concurrent env access.
        unsafe { std::env::set_var("QUIRL_TELEGRAM_BOT_TOKEN", "999:env-token") };
        let config = load_config().unwrap();
        unsafe { std::env::remove_var("QUIRL_TELEGRAM_BOT_TOKEN") };
        assert_eq!(config.telegram.bot_token.as_deref(), Some("999:env-token"));
    }

    #[test]
    #[serial]
    fn env_var_maps_underscore_keys_correctly() {
        unsafe { std::env::set_var("QUIRL_STORAGE_DATABASE_PATH", "/tmp/env.db") };
        let config = load_config().unwrap();
        unsafe { std::env::remove_var("QUIRL_STORAGE_DATABASE_PATH") };
        assert_eq!(config.storage.database_path, "/tmp/env.db");
    }
}
