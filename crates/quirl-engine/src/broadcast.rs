// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broadcast fan-out controller.
//!
//! Delivery is sequential over a snapshot of the recipient list taken at
//! launch, with a fixed pace between attempts. One recipient's failure
//! never aborts the run; the initiating admin gets a started notice and a
//! final sent/failed report.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use chrono::Utc;
use quirl_core::types::{
    ChatRef, ContentPayload, LogAction, LogEntry, MediaSource, OutboundBody, OutboundMessage,
    UserMeta,
};
use quirl_core::{ChannelAdapter, StorageAdapter};

/// Launches and runs broadcast fan-outs in the background.
#[derive(Clone)]
pub struct BroadcastController {
    storage: Arc<dyn StorageAdapter>,
    channel: Arc<dyn ChannelAdapter>,
    pace: Duration,
}

impl BroadcastController {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        channel: Arc<dyn ChannelAdapter>,
        pace: Duration,
    ) -> Self {
        Self {
            storage,
            channel,
            pace,
        }
    }

    /// Starts a fan-out in a background task; the admin's conversation is
    /// not blocked while deliveries run.
    pub fn spawn(
        &self,
        admin_chat: ChatRef,
        admin: UserMeta,
        payload: ContentPayload,
    ) -> JoinHandle<(u64, u64)> {
        let controller = self.clone();
        tokio::spawn(async move { controller.run_fanout(admin_chat, admin, payload).await })
    }

    /// Runs one fan-out to completion, returning `(sent, failed)` counts.
    pub async fn run_fanout(
        &self,
        admin_chat: ChatRef,
        admin: UserMeta,
        payload: ContentPayload,
    ) -> (u64, u64) {
        let recipients = match self.storage.list_user_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "broadcast aborted: recipient list unavailable");
                let _ = self
                    .channel
                    .send(OutboundMessage::text(
                        admin_chat,
                        "Broadcast failed: could not load the recipient list.",
                    ))
                    .await;
                return (0, 0);
            }
        };

        let _ = self
            .channel
            .send(OutboundMessage::text(
                admin_chat,
                format!("Broadcast started to {} users...", recipients.len()),
            ))
            .await;

        let mut sent: u64 = 0;
        let mut failed: u64 = 0;
        for user_id in &recipients {
            let msg = outbound_for(&payload, ChatRef(user_id.0));
            match self.channel.send(msg).await {
                Ok(_) => sent += 1,
                Err(e) => {
                    // Blocked bots and deleted accounts land here.
                    debug!(user = %user_id, error = %e, "broadcast delivery failed");
                    failed += 1;
                }
            }
            if !self.pace.is_zero() {
                tokio::time::sleep(self.pace).await;
            }
        }

        info!(recipients = recipients.len(), sent, failed, "broadcast finished");
        let _ = self
            .channel
            .send(OutboundMessage::text(
                admin_chat,
                format!("Broadcast finished. Sent: {sent}, Failed: {failed}"),
            ))
            .await;

        let entry = LogEntry {
            id: 0,
            user_id: admin.id,
            username: admin.username.clone(),
            action: LogAction::BroadcastSent,
            content: format!("type={} sent={sent} failed={failed}", payload.kind()),
            style: None,
            size: None,
            created_at: Utc::now().to_rfc3339(),
        };
        if let Err(e) = self.storage.append_log(&entry).await {
            warn!(error = %e, "broadcast log append failed");
        }

        (sent, failed)
    }
}

/// Caption attached to every media fan-out delivery.
const BROADCAST_CAPTION: &str = "\u{1F4E2} Broadcast";

/// Builds the per-recipient outbound message. Media is re-sent by its
/// platform file reference, never re-uploaded.
fn outbound_for(payload: &ContentPayload, chat: ChatRef) -> OutboundMessage {
    let body = match payload {
        ContentPayload::Text(text) => OutboundBody::Text {
            text: text.clone(),
            menu: None,
        },
        ContentPayload::Photo(file_ref) => OutboundBody::Photo {
            source: MediaSource::FileRef(file_ref.clone()),
            caption: Some(BROADCAST_CAPTION.to_string()),
        },
        ContentPayload::Video(file_ref) => OutboundBody::Video {
            source: MediaSource::FileRef(file_ref.clone()),
            caption: Some(BROADCAST_CAPTION.to_string()),
        },
        ContentPayload::Document(file_ref) => OutboundBody::Document {
            source: MediaSource::FileRef(file_ref.clone()),
            caption: Some(BROADCAST_CAPTION.to_string()),
        },
    };
    OutboundMessage { chat, body }
}
