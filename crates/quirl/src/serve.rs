// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `quirl serve` command implementation.
//!
//! Wires the SQLite storage adapter, the Telegram channel adapter, and the
//! QR generator into the workflow engine, then runs the engine until a
//! shutdown signal arrives.

use std::sync::Arc;

use tracing::{error, info, warn};

use quirl_artifact::QrGenerator;
use quirl_config::QuirlConfig;
use quirl_core::{ChannelAdapter, GeneratorAdapter, QuirlError, StorageAdapter};
use quirl_engine::{Engine, shutdown};
use quirl_storage::SqliteStorage;
use quirl_telegram::TelegramChannel;

/// Runs the `quirl serve` command.
pub async fn run_serve(config: QuirlConfig) -> Result<(), QuirlError> {
    init_tracing(&config.agent.log_level);

    info!(agent = config.agent.name.as_str(), "starting quirl serve");

    // Storage first: nothing else is useful if the database won't open.
    let storage: Arc<dyn StorageAdapter> = {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        Arc::new(storage)
    };

    let mut telegram = TelegramChannel::new(&config.telegram).map_err(|e| {
        error!(error = %e, "failed to initialize Telegram channel");
        eprintln!("error: Telegram bot token required. Set telegram.bot_token or QUIRL_TELEGRAM_BOT_TOKEN.");
        e
    })?;
    telegram.connect().await?;
    let channel: Arc<dyn ChannelAdapter> = Arc::new(telegram);

    let generator: Arc<dyn GeneratorAdapter> = Arc::new(QrGenerator::new());

    if config.telegram.admins.is_empty() {
        warn!("no admins configured; the /admin panel is unreachable");
    }

    let engine = Engine::new(channel, storage, generator, &config);

    let cancel = shutdown::install_signal_handler();
    engine.run(cancel).await?;

    info!("quirl serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("quirl={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
