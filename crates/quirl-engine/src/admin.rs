// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Administrator router: panel menu, user count, recent logs, gate
//! channel management, and broadcast initiation.
//!
//! Authorization is re-checked on every event. A non-admin reaching this
//! router (for example by pressing a stale admin button) gets a refusal
//! and any leftover admin state is cleared.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{info, warn};

use quirl_core::types::{ContentPayload, EventKind, InboundEvent, OutboundMessage, UserId};
use quirl_core::{ChannelAdapter, QuirlError, StorageAdapter};

use crate::broadcast::BroadcastController;
use crate::gate::GATE_CHANNEL_KEY;
use crate::menus;

const LOG_VIEW_LIMIT: i64 = 50;

/// Where an admin currently is in an admin flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum AdminState {
    #[default]
    Idle,
    AwaitingChannel,
    AwaitingBroadcastContent,
    AwaitingConfirmation(ContentPayload),
}

/// Routes administrator commands, selections and flow input.
pub struct AdminRouter {
    admins: Vec<UserId>,
    states: DashMap<UserId, AdminState>,
    storage: Arc<dyn StorageAdapter>,
    channel: Arc<dyn ChannelAdapter>,
    broadcast: BroadcastController,
}

impl AdminRouter {
    pub fn new(
        admins: Vec<UserId>,
        storage: Arc<dyn StorageAdapter>,
        channel: Arc<dyn ChannelAdapter>,
        broadcast: BroadcastController,
    ) -> Self {
        Self {
            admins,
            states: DashMap::new(),
            storage,
            channel,
            broadcast,
        }
    }

    pub fn is_admin(&self, user: UserId) -> bool {
        self.admins.contains(&user)
    }

    /// Whether the user has an admin flow in progress (so plain content
    /// must be routed here instead of the conversation machine).
    pub fn has_active_flow(&self, user: UserId) -> bool {
        self.states
            .get(&user)
            .map(|s| *s.value() != AdminState::Idle)
            .unwrap_or(false)
    }

    /// Drops any in-progress flow for `user`. `/start` abandons admin work
    /// and hands the dialogue back to the QR conversation.
    pub fn reset_flow(&self, user: UserId) {
        self.states.remove(&user);
    }

    /// Handles one admin-routed event.
    pub async fn handle(&self, ev: &InboundEvent) -> Result<(), QuirlError> {
        if !self.is_admin(ev.user.id) {
            self.states.remove(&ev.user.id);
            warn!(user = %ev.user.id, "admin operation refused");
            self.channel
                .send(OutboundMessage::text(ev.chat, "You are not authorized."))
                .await?;
            return Ok(());
        }

        match &ev.kind {
            EventKind::Command(_) => self.show_panel(ev).await,
            EventKind::Selection(data) => self.on_selection(ev, data).await,
            EventKind::Content(payload) => self.on_content(ev, payload).await,
        }
    }

    async fn show_panel(&self, ev: &InboundEvent) -> Result<(), QuirlError> {
        self.channel
            .send(OutboundMessage::with_menu(
                ev.chat,
                "Admin panel:",
                menus::admin_menu(),
            ))
            .await?;
        Ok(())
    }

    async fn on_selection(&self, ev: &InboundEvent, data: &str) -> Result<(), QuirlError> {
        match data {
            "admin:users" => {
                let count = self.storage.count_users().await?;
                self.channel
                    .send(OutboundMessage::text(
                        ev.chat,
                        format!("Total users: {count}"),
                    ))
                    .await?;
            }
            "admin:logs" => {
                let logs = self.storage.recent_logs(LOG_VIEW_LIMIT).await?;
                self.channel
                    .send(OutboundMessage::text(ev.chat, render_logs(&logs)))
                    .await?;
            }
            "admin:set_channel" => {
                self.states.insert(ev.user.id, AdminState::AwaitingChannel);
                self.channel
                    .send(OutboundMessage::text(
                        ev.chat,
                        "Send the gate channel as @username or a numeric chat id \
                         (like -1001234567890).",
                    ))
                    .await?;
            }
            "admin:unset_channel" => {
                self.storage.set_setting(GATE_CHANNEL_KEY, "").await?;
                info!(admin = %ev.user.id, "gate channel unset");
                self.channel
                    .send(OutboundMessage::text(
                        ev.chat,
                        "Gate channel removed. The bot is open to everyone.",
                    ))
                    .await?;
            }
            "admin:broadcast" => {
                self.states
                    .insert(ev.user.id, AdminState::AwaitingBroadcastContent);
                self.channel
                    .send(OutboundMessage::text(
                        ev.chat,
                        "Send the broadcast message (text, photo, video or document).",
                    ))
                    .await?;
            }
            "broadcast:send" => self.on_broadcast_confirm(ev).await?,
            "broadcast:cancel" => {
                self.states.insert(ev.user.id, AdminState::Idle);
                self.channel
                    .send(OutboundMessage::text(ev.chat, "Broadcast cancelled."))
                    .await?;
            }
            _ => {
                self.show_panel(ev).await?;
            }
        }
        Ok(())
    }

    async fn on_content(&self, ev: &InboundEvent, payload: &ContentPayload) -> Result<(), QuirlError> {
        let state = self
            .states
            .get(&ev.user.id)
            .map(|s| s.value().clone())
            .unwrap_or_default();
        match state {
            AdminState::AwaitingChannel => {
                let ContentPayload::Text(text) = payload else {
                    self.channel
                        .send(OutboundMessage::text(
                            ev.chat,
                            "Send the channel as text (@username or a chat id).",
                        ))
                        .await?;
                    return Ok(());
                };
                let channel = text.trim().to_string();
                self.storage.set_setting(GATE_CHANNEL_KEY, &channel).await?;
                self.states.insert(ev.user.id, AdminState::Idle);
                info!(admin = %ev.user.id, %channel, "gate channel set");
                self.channel
                    .send(OutboundMessage::text(
                        ev.chat,
                        format!("Gate channel set to: {channel}"),
                    ))
                    .await?;
            }
            AdminState::AwaitingBroadcastContent => {
                self.states
                    .insert(ev.user.id, AdminState::AwaitingConfirmation(payload.clone()));
                self.channel
                    .send(OutboundMessage::with_menu(
                        ev.chat,
                        format!("Broadcast this {}?", payload.kind()),
                        menus::confirm_menu(),
                    ))
                    .await?;
            }
            AdminState::Idle | AdminState::AwaitingConfirmation(_) => {
                self.show_panel(ev).await?;
            }
        }
        Ok(())
    }

    async fn on_broadcast_confirm(&self, ev: &InboundEvent) -> Result<(), QuirlError> {
        let payload = match self.states.remove(&ev.user.id) {
            Some((_, AdminState::AwaitingConfirmation(payload))) => payload,
            other => {
                if let Some((user, state)) = other {
                    self.states.insert(user, state);
                }
                self.channel
                    .send(OutboundMessage::text(
                        ev.chat,
                        "Nothing to send. Start a broadcast from the admin panel.",
                    ))
                    .await?;
                return Ok(());
            }
        };
        self.states.insert(ev.user.id, AdminState::Idle);
        info!(admin = %ev.user.id, kind = payload.kind(), "broadcast launched");
        self.broadcast.spawn(ev.chat, ev.user.clone(), payload);
        Ok(())
    }
}

/// Formats the log view, newest first, one line per entry.
fn render_logs(logs: &[quirl_core::types::LogEntry]) -> String {
    if logs.is_empty() {
        return "No logs yet.".to_string();
    }
    let mut out = String::from("Recent logs:\n");
    for entry in logs {
        let username = entry.username.as_deref().unwrap_or("-");
        let size = entry
            .size
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{}. user={} @{} action={} size={} time={}\n",
            entry.id, entry.user_id, username, entry.action, size, entry.created_at
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quirl_core::types::{LogAction, LogEntry, Style};

    #[test]
    fn render_logs_empty() {
        assert_eq!(render_logs(&[]), "No logs yet.");
    }

    #[test]
    fn render_logs_formats_one_line_per_entry() {
        let logs = vec![
            LogEntry {
                id: 2,
                user_id: UserId(10),
                username: Some("alice".into()),
                action: LogAction::Generate,
                content: "hello".into(),
                style: Some(Style::Red),
                size: Some(300),
                created_at: "2026-01-01T00:00:00Z".into(),
            },
            LogEntry {
                id: 1,
                user_id: UserId(11),
                username: None,
                action: LogAction::Start,
                content: String::new(),
                style: None,
                size: None,
                created_at: "2026-01-01T00:00:00Z".into(),
            },
        ];
        let out = render_logs(&logs);
        assert!(out.contains("2. user=10 @alice action=generate size=300"));
        assert!(out.contains("1. user=11 @- action=start size=-"));
    }
}
