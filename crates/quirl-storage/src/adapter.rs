// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use quirl_config::model::StorageConfig;
use quirl_core::types::{LogEntry, UserId, UserRecord};
use quirl_core::{AdapterType, HealthStatus, PluginAdapter, QuirlError, StorageAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, QuirlError> {
        self.db.get().ok_or_else(|| QuirlError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, QuirlError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), QuirlError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), QuirlError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| QuirlError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), QuirlError> {
        self.db()?.close().await
    }

    async fn upsert_user(&self, record: &UserRecord) -> Result<(), QuirlError> {
        queries::users::upsert_user(self.db()?, record).await
    }

    async fn append_log(&self, entry: &LogEntry) -> Result<(), QuirlError> {
        queries::logs::append_log(self.db()?, entry).await
    }

    async fn count_users(&self) -> Result<i64, QuirlError> {
        queries::users::count_users(self.db()?).await
    }

    async fn recent_logs(&self, limit: i64) -> Result<Vec<LogEntry>, QuirlError> {
        queries::logs::recent_logs(self.db()?, limit).await
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>, QuirlError> {
        queries::settings::get_setting(self.db()?, key).await
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), QuirlError> {
        queries::settings::set_setting(self.db()?, key, value).await
    }

    async fn list_user_ids(&self) -> Result<Vec<UserId>, QuirlError> {
        queries::users::list_user_ids(self.db()?).await
    }
}
