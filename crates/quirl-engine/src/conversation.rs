// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user conversation state machine: collect content, pick a style,
//! pick a size, generate, deliver, reset.
//!
//! Invariants: the gate is re-checked at `/start` and at content
//! submission; the session is cleared after every generation attempt,
//! success or failure; a content event is consumed only in the state that
//! expects it, everything else falls through to the help reply.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use quirl_artifact::{ArtifactPipeline, MIN_SIZE};
use quirl_core::types::{
    Command, ContentPayload, EventKind, InboundEvent, LogAction, LogEntry, OutboundMessage, Style,
    UserMeta, UserRecord,
};
use quirl_core::{ChannelAdapter, QuirlError, StorageAdapter};

use crate::gate::{GateDecision, GatePolicy};
use crate::menus;
use crate::session::{SessionState, SessionStore};

const HELP_TEXT: &str =
    "Send text, a photo, a video or a document to create a QR code.\nUse /start to begin.";

/// Drives the QR workflow for ordinary users.
pub struct ConversationMachine {
    sessions: SessionStore,
    storage: Arc<dyn StorageAdapter>,
    channel: Arc<dyn ChannelAdapter>,
    gate: GatePolicy,
    pipeline: Arc<ArtifactPipeline>,
}

impl ConversationMachine {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        channel: Arc<dyn ChannelAdapter>,
        gate: GatePolicy,
        pipeline: Arc<ArtifactPipeline>,
    ) -> Self {
        Self {
            sessions: SessionStore::new(),
            storage,
            channel,
            gate,
            pipeline,
        }
    }

    /// Handles one inbound event for a non-admin interaction.
    pub async fn handle(&self, ev: &InboundEvent) -> Result<(), QuirlError> {
        match &ev.kind {
            EventKind::Command(Command::Start) => self.on_start(ev).await,
            EventKind::Command(Command::Admin) => self.send_help(ev).await,
            EventKind::Selection(data) => self.on_selection(ev, data).await,
            EventKind::Content(payload) => match self.sessions.state(ev.user.id) {
                SessionState::AwaitingContent => self.on_content(ev, payload).await,
                SessionState::AwaitingSize => {
                    if let ContentPayload::Text(text) = payload {
                        self.on_custom_size(ev, text).await
                    } else {
                        self.send_help(ev).await
                    }
                }
                SessionState::Idle | SessionState::AwaitingStyle => self.send_help(ev).await,
            },
        }
    }

    async fn on_start(&self, ev: &InboundEvent) -> Result<(), QuirlError> {
        self.remember_user(&ev.user).await?;
        self.log(&ev.user, LogAction::Start, String::new(), None, None)
            .await;

        match self.gate.check(ev.user.id).await {
            GateDecision::Denied { channel } => {
                self.send_gate_prompt(ev, &channel).await?;
            }
            GateDecision::Allowed => {
                self.sessions.with_mut(ev.user.id, |s| {
                    s.clear();
                    s.state = SessionState::AwaitingContent;
                });
                self.channel
                    .send(OutboundMessage::text(
                        ev.chat,
                        "Welcome! Send me text, a photo, a video or a document and I will \
                         turn it into a QR code.",
                    ))
                    .await?;
            }
        }
        Ok(())
    }

    async fn on_selection(&self, ev: &InboundEvent, data: &str) -> Result<(), QuirlError> {
        if data == "gate:verify" {
            return self.on_gate_verify(ev).await;
        }
        if data == "gate:info" {
            self.channel
                .send(OutboundMessage::text(
                    ev.chat,
                    "Join the required channel, then press the verify button.",
                ))
                .await?;
            return Ok(());
        }
        if let Some(name) = data.strip_prefix("style:") {
            return self.on_style(ev, name).await;
        }
        if let Some(value) = data.strip_prefix("size:") {
            return self.on_size_selection(ev, value).await;
        }
        debug!(data, "unrecognized selection");
        self.send_help(ev).await
    }

    async fn on_gate_verify(&self, ev: &InboundEvent) -> Result<(), QuirlError> {
        match self.gate.check(ev.user.id).await {
            GateDecision::Allowed => {
                self.sessions.with_mut(ev.user.id, |s| {
                    s.clear();
                    s.state = SessionState::AwaitingContent;
                });
                self.channel
                    .send(OutboundMessage::text(
                        ev.chat,
                        "Verified. Send me text, a photo, a video or a document to create \
                         a QR code.",
                    ))
                    .await?;
            }
            GateDecision::Denied { channel } => {
                self.send_gate_prompt(ev, &channel).await?;
            }
        }
        Ok(())
    }

    async fn on_content(
        &self,
        ev: &InboundEvent,
        payload: &ContentPayload,
    ) -> Result<(), QuirlError> {
        self.remember_user(&ev.user).await?;

        if let GateDecision::Denied { channel } = self.gate.check(ev.user.id).await {
            self.log(
                &ev.user,
                LogAction::Blocked,
                payload.kind().to_string(),
                None,
                None,
            )
            .await;
            return self.send_gate_prompt(ev, &channel).await;
        }

        let content = match payload {
            ContentPayload::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return self.send_unreadable(ev).await;
                }
                text.to_string()
            }
            ContentPayload::Photo(file_ref)
            | ContentPayload::Video(file_ref)
            | ContentPayload::Document(file_ref) => {
                match self.channel.resolve_media(file_ref).await {
                    Ok(location) => location,
                    Err(e) => {
                        warn!(error = %e, "media resolution failed");
                        return self.send_unreadable(ev).await;
                    }
                }
            }
        };

        self.log(
            &ev.user,
            LogAction::ContentSent,
            content.clone(),
            None,
            None,
        )
        .await;

        self.sessions.with_mut(ev.user.id, |s| {
            s.content = Some(content);
            s.state = SessionState::AwaitingStyle;
        });

        self.channel
            .send(OutboundMessage::with_menu(
                ev.chat,
                "Choose a QR color:",
                menus::style_menu(),
            ))
            .await?;
        Ok(())
    }

    async fn on_style(&self, ev: &InboundEvent, name: &str) -> Result<(), QuirlError> {
        if self.sessions.state(ev.user.id) != SessionState::AwaitingStyle {
            return self.send_help(ev).await;
        }
        let Ok(style) = Style::from_str(name) else {
            debug!(name, "unknown style selection");
            return self.send_help(ev).await;
        };

        self.sessions.with_mut(ev.user.id, |s| {
            s.style = Some(style);
            s.state = SessionState::AwaitingSize;
        });

        self.channel
            .send(OutboundMessage::with_menu(
                ev.chat,
                format!("Color selected: {style}.\nNow choose the size (px):"),
                menus::size_menu(self.pipeline.max_size()),
            ))
            .await?;
        Ok(())
    }

    async fn on_size_selection(&self, ev: &InboundEvent, value: &str) -> Result<(), QuirlError> {
        if self.sessions.state(ev.user.id) != SessionState::AwaitingSize {
            return self.send_help(ev).await;
        }
        if value == "custom" {
            self.channel
                .send(OutboundMessage::text(
                    ev.chat,
                    format!(
                        "Send the size in pixels ({MIN_SIZE}-{}):",
                        self.pipeline.max_size()
                    ),
                ))
                .await?;
            return Ok(());
        }
        match value.parse::<u32>() {
            Ok(size) => self.on_size(ev, size).await,
            Err(_) => {
                debug!(value, "unparseable size selection");
                self.send_help(ev).await
            }
        }
    }

    async fn on_custom_size(&self, ev: &InboundEvent, text: &str) -> Result<(), QuirlError> {
        match text.trim().parse::<u32>() {
            Ok(size) => self.on_size(ev, size).await,
            Err(_) => {
                self.channel
                    .send(OutboundMessage::text(
                        ev.chat,
                        "Please send a number (size in pixels).",
                    ))
                    .await?;
                Ok(())
            }
        }
    }

    /// Validates the size and runs the generation round. The session is
    /// cleared after the attempt regardless of outcome.
    async fn on_size(&self, ev: &InboundEvent, size: u32) -> Result<(), QuirlError> {
        if !self.pipeline.size_in_range(size) {
            self.channel
                .send(OutboundMessage::text(
                    ev.chat,
                    format!(
                        "Size must be between {MIN_SIZE} and {} px.",
                        self.pipeline.max_size()
                    ),
                ))
                .await?;
            return Ok(());
        }

        let session = self.sessions.snapshot(ev.user.id);
        let (Some(content), Some(style)) = (session.content, session.style) else {
            // Size arrived without collected inputs; restart the flow.
            self.sessions.clear(ev.user.id);
            return self.send_help(ev).await;
        };

        self.log(
            &ev.user,
            LogAction::Generate,
            content.clone(),
            Some(style),
            Some(size as i64),
        )
        .await;

        let result = self
            .pipeline
            .produce_and_deliver(ev.chat, &content, style, size)
            .await;
        self.sessions.clear(ev.user.id);

        if let Err(e) = result {
            warn!(user = %ev.user.id, error = %e, "generation round failed");
            self.channel
                .send(OutboundMessage::text(
                    ev.chat,
                    "Could not generate the QR code. Use /start to try again.",
                ))
                .await?;
        }
        Ok(())
    }

    async fn send_gate_prompt(&self, ev: &InboundEvent, channel: &str) -> Result<(), QuirlError> {
        let text = if channel.is_empty() {
            "You must join the required channel to use this bot.".to_string()
        } else {
            format!("You must join {channel} to use this bot.")
        };
        self.channel
            .send(OutboundMessage::with_menu(
                ev.chat,
                text,
                menus::gate_menu(channel),
            ))
            .await?;
        Ok(())
    }

    async fn send_unreadable(&self, ev: &InboundEvent) -> Result<(), QuirlError> {
        self.channel
            .send(OutboundMessage::text(
                ev.chat,
                "I could not read that. Send text, a photo, a video or a document.",
            ))
            .await?;
        Ok(())
    }

    async fn send_help(&self, ev: &InboundEvent) -> Result<(), QuirlError> {
        self.channel
            .send(OutboundMessage::text(ev.chat, HELP_TEXT))
            .await?;
        Ok(())
    }

    /// Overwrites the user record on every interaction.
    async fn remember_user(&self, user: &UserMeta) -> Result<(), QuirlError> {
        self.storage
            .upsert_user(&UserRecord {
                id: user.id,
                username: user.username.clone(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                joined_at: Utc::now().to_rfc3339(),
            })
            .await
    }

    /// Fire-and-forget action log append. A logging failure never blocks
    /// the conversation.
    async fn log(
        &self,
        user: &UserMeta,
        action: LogAction,
        content: String,
        style: Option<Style>,
        size: Option<i64>,
    ) {
        let entry = LogEntry {
            id: 0,
            user_id: user.id,
            username: user.username.clone(),
            action,
            content,
            style,
            size,
            created_at: Utc::now().to_rfc3339(),
        };
        if let Err(e) = self.storage.append_log(&entry).await {
            warn!(user = %user.id, %action, error = %e, "action log append failed");
        }
    }
}
