// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Full-stack test harness: a real SQLite database in a temp directory,
//! mock channel and generator adapters, and a wired [`Engine`].

use std::sync::Arc;

use tempfile::TempDir;

use quirl_config::QuirlConfig;
use quirl_core::QuirlError;
use quirl_core::StorageAdapter;
use quirl_core::types::{
    ChatRef, Command, ContentPayload, EventKind, FileRef, InboundEvent, UserId, UserMeta,
};
use quirl_engine::Engine;
use quirl_storage::SqliteStorage;

use crate::mock_channel::MockChannel;
use crate::mock_generator::MockGenerator;

/// Admin user id configured by default in harness configs.
pub const ADMIN_ID: i64 = 9000;

pub struct TestHarness {
    pub channel: Arc<MockChannel>,
    pub storage: Arc<SqliteStorage>,
    pub generator: Arc<MockGenerator>,
    pub engine: Engine,
    _tmp: TempDir,
}

impl TestHarness {
    /// Harness with default config: pace 0, [`ADMIN_ID`] as sole admin.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Harness with a caller-tweaked config. The database path is always
    /// replaced with one inside the harness temp directory.
    pub async fn with_config(tweak: impl FnOnce(&mut QuirlConfig)) -> Self {
        let tmp = tempfile::tempdir().expect("temp dir");
        let mut config = QuirlConfig::default();
        config.broadcast.pace_ms = 0;
        config.telegram.admins = vec![ADMIN_ID.to_string()];
        tweak(&mut config);
        config.storage.database_path = tmp
            .path()
            .join("quirl.db")
            .to_string_lossy()
            .into_owned();

        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await.expect("storage init");
        let channel = Arc::new(MockChannel::new());
        let generator = Arc::new(MockGenerator::new());
        let engine = Engine::new(
            channel.clone(),
            storage.clone(),
            generator.clone(),
            &config,
        );

        Self {
            channel,
            storage,
            generator,
            engine,
            _tmp: tmp,
        }
    }

    /// Handles one event synchronously through the routing layer,
    /// bypassing the per-user mailboxes.
    pub async fn handle(&self, ev: InboundEvent) -> Result<(), QuirlError> {
        self.engine.handlers().dispatch(&ev).await
    }
}

/// A plain user identity for tests.
pub fn user(id: i64) -> UserMeta {
    UserMeta {
        id: UserId(id),
        username: Some(format!("user{id}")),
        first_name: Some("Test".to_string()),
        last_name: None,
    }
}

/// A `/start` or `/admin` command event from `id`'s private chat.
pub fn command(id: i64, cmd: Command) -> InboundEvent {
    InboundEvent {
        user: user(id),
        chat: ChatRef(id),
        kind: EventKind::Command(cmd),
    }
}

/// A text message event.
pub fn text(id: i64, body: &str) -> InboundEvent {
    InboundEvent {
        user: user(id),
        chat: ChatRef(id),
        kind: EventKind::Content(ContentPayload::Text(body.to_string())),
    }
}

/// A photo message event carrying a platform file reference.
pub fn photo(id: i64, file_ref: &str) -> InboundEvent {
    InboundEvent {
        user: user(id),
        chat: ChatRef(id),
        kind: EventKind::Content(ContentPayload::Photo(FileRef(file_ref.to_string()))),
    }
}

/// An inline menu selection event.
pub fn selection(id: i64, data: &str) -> InboundEvent {
    InboundEvent {
        user: user(id),
        chat: ChatRef(id),
        kind: EventKind::Selection(data.to_string()),
    }
}
