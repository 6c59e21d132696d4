// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User record operations: upsert, count, recipient listing.

use quirl_core::QuirlError;
use quirl_core::types::{UserId, UserRecord};
use rusqlite::params;

use crate::database::Database;

/// Create or overwrite a user record. Records are never deleted.
pub async fn upsert_user(db: &Database, record: &UserRecord) -> Result<(), QuirlError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO users (user_id, username, first_name, last_name, joined_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id.0,
                    record.username,
                    record.first_name,
                    record.last_name,
                    record.joined_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Total number of known users.
pub async fn count_users(db: &Database) -> Result<i64, QuirlError> {
    db.connection()
        .call(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Snapshot of all known user ids, used as the broadcast recipient list.
pub async fn list_user_ids(db: &Database) -> Result<Vec<UserId>, QuirlError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare("SELECT user_id FROM users")?;
            let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
            let mut ids = Vec::new();
            for row in rows {
                ids.push(UserId(row?));
            }
            Ok(ids)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
