// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the persistence layer (SQLite, mocks).

use async_trait::async_trait;

use crate::error::QuirlError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{LogEntry, UserId, UserRecord};

/// Adapter for user records, the append-only action log, and settings.
///
/// Each operation is atomic at single-row granularity; callers never need
/// cross-row transactions.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection).
    async fn initialize(&self) -> Result<(), QuirlError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), QuirlError>;

    /// Creates or overwrites a user record.
    async fn upsert_user(&self, record: &UserRecord) -> Result<(), QuirlError>;

    /// Appends an action log entry. Entries are never mutated or deleted.
    async fn append_log(&self, entry: &LogEntry) -> Result<(), QuirlError>;

    /// Total number of known users.
    async fn count_users(&self) -> Result<i64, QuirlError>;

    /// Most recent log entries, newest first, bounded by `limit`.
    async fn recent_logs(&self, limit: i64) -> Result<Vec<LogEntry>, QuirlError>;

    /// Reads a setting value; `None` when the key was never set.
    async fn get_setting(&self, key: &str) -> Result<Option<String>, QuirlError>;

    /// Creates or overwrites a setting value.
    async fn set_setting(&self, key: &str, value: &str) -> Result<(), QuirlError>;

    /// Snapshot of all known user ids (the broadcast recipient list).
    async fn list_user_ids(&self) -> Result<Vec<UserId>, QuirlError>;
}
