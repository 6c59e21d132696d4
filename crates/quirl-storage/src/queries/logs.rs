// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only action log operations.

use std::str::FromStr;

use quirl_core::QuirlError;
use quirl_core::types::{LogAction, LogEntry, Style, UserId};
use rusqlite::params;

use crate::database::Database;

/// Maximum stored length of a log entry's free-text payload, in chars.
const MAX_CONTENT_CHARS: usize = 1000;

/// Append a log entry. The free-text payload is truncated to a bounded
/// length at write time; entries are never mutated or deleted.
pub async fn append_log(db: &Database, entry: &LogEntry) -> Result<(), QuirlError> {
    let entry = entry.clone();
    let content = truncate_chars(&entry.content, MAX_CONTENT_CHARS);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO logs (user_id, username, action, content, style, size, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    entry.user_id.0,
                    entry.username,
                    entry.action.to_string(),
                    content,
                    entry.style.map(|s| s.to_string()),
                    entry.size,
                    entry.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Most recent log entries, newest first, bounded by `limit`.
pub async fn recent_logs(db: &Database, limit: i64) -> Result<Vec<LogEntry>, QuirlError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, username, action, content, style, size, created_at
                 FROM logs ORDER BY id DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], |row| {
                let action: String = row.get(3)?;
                let style: Option<String> = row.get(5)?;
                Ok(LogEntry {
                    id: row.get(0)?,
                    user_id: UserId(row.get(1)?),
                    username: row.get(2)?,
                    // Unknown tags would mean a schema/code mismatch; fall
                    // back rather than fail the whole listing.
                    action: LogAction::from_str(&action).unwrap_or(LogAction::Start),
                    content: row.get(4)?,
                    style: style.and_then(|s| Style::from_str(&s).ok()),
                    size: row.get(6)?,
                    created_at: row.get(7)?,
                })
            })?;
            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?);
            }
            Ok(entries)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Truncate a string to at most `max` chars without splitting a char.
fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn make_entry(user_id: i64, action: LogAction, content: &str) -> LogEntry {
        LogEntry {
            id: 0,
            user_id: UserId(user_id),
            username: Some("tester".to_string()),
            action,
            content: content.to_string(),
            style: Some(Style::Red),
            size: Some(300),
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn append_and_read_back() {
        let (db, _dir) = setup_db().await;
        append_log(&db, &make_entry(1, LogAction::Generate, "hello"))
            .await
            .unwrap();

        let entries = recent_logs(&db, 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, LogAction::Generate);
        assert_eq!(entries[0].content, "hello");
        assert_eq!(entries[0].style, Some(Style::Red));
        assert_eq!(entries[0].size, Some(300));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn recent_logs_newest_first_with_limit() {
        let (db, _dir) = setup_db().await;
        for i in 0..5 {
            append_log(&db, &make_entry(i, LogAction::Start, &format!("entry-{i}")))
                .await
                .unwrap();
        }

        let entries = recent_logs(&db, 3).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].content, "entry-4");
        assert_eq!(entries[1].content, "entry-3");
        assert_eq!(entries[2].content, "entry-2");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn content_is_truncated_to_bound() {
        let (db, _dir) = setup_db().await;
        let long = "x".repeat(5000);
        append_log(&db, &make_entry(1, LogAction::ContentSent, &long))
            .await
            .unwrap();

        let entries = recent_logs(&db, 1).await.unwrap();
        assert_eq!(entries[0].content.chars().count(), 1000);
        db.close().await.unwrap();
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "é".repeat(1200);
        let t = truncate_chars(&s, 1000);
        assert_eq!(t.chars().count(), 1000);
        // Short strings pass through untouched.
        assert_eq!(truncate_chars("abc", 1000), "abc");
    }
}
