// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Quirl bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Quirl configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuirlConfig {
    /// Bot identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Artifact size limits.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Broadcast fan-out pacing.
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Bot identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "quirl".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` disables the Telegram adapter.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Numeric user ids (as strings) granted administrator access.
    #[serde(default)]
    pub admins: Vec<String>,
}

/// Artifact size limit configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum artifact edge length in pixels. The lower bound is fixed
    /// at 100; large sizes cost the generator proportional memory.
    #[serde(default = "default_max_size")]
    pub max_size: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
        }
    }
}

fn default_max_size() -> u32 {
    16000
}

/// Broadcast fan-out configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BroadcastConfig {
    /// Delay inserted between per-recipient delivery attempts, in
    /// milliseconds. A rate limit, not a correctness requirement.
    #[serde(default = "default_pace_ms")]
    pub pace_ms: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            pace_ms: default_pace_ms(),
        }
    }
}

fn default_pace_ms() -> u64 {
    50
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("quirl").join("quirl.db"))
        .and_then(|p| p.to_str().map(|s| s.to_string()))
        .unwrap_or_else(|| "quirl.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

impl TelegramConfig {
    /// Parses the configured admin list into numeric user ids.
    ///
    /// Entries that fail to parse are rejected by validation before this
    /// is ever called at runtime.
    pub fn admin_ids(&self) -> Vec<i64> {
        self.admins
            .iter()
            .filter_map(|a| a.trim().parse::<i64>().ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = QuirlConfig::default();
        assert_eq!(config.agent.name, "quirl");
        assert_eq!(config.agent.log_level, "info");
        assert_eq!(config.limits.max_size, 16000);
        assert_eq!(config.broadcast.pace_ms, 50);
        assert!(config.telegram.bot_token.is_none());
        assert!(config.telegram.admins.is_empty());
        assert!(config.storage.wal_mode);
    }

    #[test]
    fn toml_round_trip() {
        let toml_str = r#"
[agent]
name = "qr-bot"
log_level = "debug"

[telegram]
bot_token = "123:abc"
admins = ["7752032178"]

[limits]
max_size = 8000

[broadcast]
pace_ms = 10

[storage]
database_path = "/tmp/quirl.db"
"#;
        let config: QuirlConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.agent.name, "qr-bot");
        assert_eq!(config.telegram.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.telegram.admin_ids(), vec![7752032178]);
        assert_eq!(config.limits.max_size, 8000);
        assert_eq!(config.broadcast.pace_ms, 10);
        assert_eq!(config.storage.database_path, "/tmp/quirl.db");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml_str = r#"
[agent]
naem = "typo"
"#;
        assert!(toml::from_str::<QuirlConfig>(toml_str).is_err());
    }

    #[test]
    fn admin_ids_skips_garbage() {
        let config = TelegramConfig {
            bot_token: None,
            admins: vec!["123".into(), "not-a-number".into(), " 456 ".into()],
        };
        assert_eq!(config.admin_ids(), vec![123, 456]);
    }
}
