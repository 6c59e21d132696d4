// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Quirl workflow engine.
//!
//! Wires the conversation state machine, the admin router, the gate
//! policy and the broadcast controller behind a single event loop.
//! Events are dispatched through per-user mailboxes: each user's events
//! are handled strictly in arrival order, while different users proceed
//! in parallel.

pub mod admin;
pub mod broadcast;
pub mod conversation;
pub mod gate;
pub mod menus;
pub mod session;
pub mod shutdown;

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use quirl_artifact::ArtifactPipeline;
use quirl_config::QuirlConfig;
use quirl_core::types::{
    Command, EventKind, InboundEvent, OutboundMessage, UserId,
};
use quirl_core::{ChannelAdapter, GeneratorAdapter, QuirlError, StorageAdapter};

pub use crate::admin::AdminRouter;
pub use crate::broadcast::BroadcastController;
pub use crate::conversation::ConversationMachine;
pub use crate::gate::{GATE_CHANNEL_KEY, GateDecision, GatePolicy};
pub use crate::session::{Session, SessionState, SessionStore};

const MAILBOX_CAPACITY: usize = 32;

/// Shared handlers behind the per-user workers.
pub struct Handlers {
    conversation: ConversationMachine,
    admin: AdminRouter,
}

impl Handlers {
    /// Routes one event to the admin router or the conversation machine.
    ///
    /// Admin routing wins for the `/admin` command, for `admin:` and
    /// `broadcast:` selections, and for plain content while the sender has
    /// an admin flow in progress. Everything else is a conversation event.
    pub async fn dispatch(&self, ev: &InboundEvent) -> Result<(), QuirlError> {
        let admin_routed = match &ev.kind {
            EventKind::Command(Command::Admin) => true,
            EventKind::Command(Command::Start) => {
                // /start abandons any half-finished admin flow; the event
                // itself belongs to the conversation machine.
                self.admin.reset_flow(ev.user.id);
                false
            }
            EventKind::Selection(data) => {
                data.starts_with("admin:") || data.starts_with("broadcast:")
            }
            EventKind::Content(_) => self.admin.has_active_flow(ev.user.id),
        };
        if admin_routed {
            self.admin.handle(ev).await
        } else {
            self.conversation.handle(ev).await
        }
    }

    pub fn conversation(&self) -> &ConversationMachine {
        &self.conversation
    }

    pub fn admin(&self) -> &AdminRouter {
        &self.admin
    }
}

/// The top-level engine: receives events from the channel adapter and
/// fans them out to per-user workers.
pub struct Engine {
    channel: Arc<dyn ChannelAdapter>,
    storage: Arc<dyn StorageAdapter>,
    handlers: Arc<Handlers>,
    workers: DashMap<UserId, mpsc::Sender<InboundEvent>>,
}

impl Engine {
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        storage: Arc<dyn StorageAdapter>,
        generator: Arc<dyn GeneratorAdapter>,
        config: &QuirlConfig,
    ) -> Self {
        let pipeline = Arc::new(ArtifactPipeline::new(
            generator,
            channel.clone(),
            config.limits.max_size,
        ));
        let gate = GatePolicy::new(storage.clone(), channel.clone());
        let conversation =
            ConversationMachine::new(storage.clone(), channel.clone(), gate, pipeline);
        let broadcast = BroadcastController::new(
            storage.clone(),
            channel.clone(),
            Duration::from_millis(config.broadcast.pace_ms),
        );
        let admins = config
            .telegram
            .admin_ids()
            .into_iter()
            .map(UserId)
            .collect();
        let admin = AdminRouter::new(admins, storage.clone(), channel.clone(), broadcast);

        Self {
            channel,
            storage,
            handlers: Arc::new(Handlers {
                conversation,
                admin,
            }),
            workers: DashMap::new(),
        }
    }

    pub fn handlers(&self) -> &Arc<Handlers> {
        &self.handlers
    }

    /// Runs the event loop until `cancel` fires, then closes storage.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), QuirlError> {
        info!("engine running");
        loop {
            tokio::select! {
                event = self.channel.receive() => match event {
                    Ok(ev) => self.dispatch(ev).await,
                    Err(e) => {
                        warn!(error = %e, "inbound receive failed");
                        // Back off so a dead transport cannot spin the loop.
                        tokio::time::sleep(Duration::from_millis(250)).await;
                    }
                },
                _ = cancel.cancelled() => {
                    info!("shutdown requested");
                    break;
                }
            }
        }
        self.storage.close().await?;
        info!("engine stopped");
        Ok(())
    }

    /// Delivers one event into the sender's mailbox, spawning the worker
    /// on first contact (or again after a mailbox was dropped).
    pub async fn dispatch(&self, ev: InboundEvent) {
        let user = ev.user.id;
        let ev = match self.workers.get(&user).map(|e| e.value().clone()) {
            Some(tx) => match tx.send(ev).await {
                Ok(()) => return,
                Err(mpsc::error::SendError(ev)) => ev,
            },
            None => ev,
        };
        let tx = self.spawn_worker();
        if tx.send(ev).await.is_err() {
            error!(%user, "worker mailbox rejected first event");
        }
        self.workers.insert(user, tx);
    }

    fn spawn_worker(&self) -> mpsc::Sender<InboundEvent> {
        let (tx, mut rx) = mpsc::channel::<InboundEvent>(MAILBOX_CAPACITY);
        let handlers = self.handlers.clone();
        let channel = self.channel.clone();
        tokio::spawn(async move {
            while let Some(ev) = rx.recv().await {
                let chat = ev.chat;
                let user = ev.user.id;
                if let Err(e) = handlers.dispatch(&ev).await {
                    // Failure boundary: one user's error never takes the
                    // engine down.
                    error!(%user, error = %e, "event handling failed");
                    let _ = channel
                        .send(OutboundMessage::text(
                            chat,
                            "Something went wrong. Please try again.",
                        ))
                        .await;
                }
            }
        });
        tx
    }
}
