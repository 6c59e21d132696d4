// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! An in-memory channel adapter for tests.
//!
//! Inbound events are injected by the test; outbound messages are
//! recorded and can be awaited. Membership answers and per-chat delivery
//! failures are scriptable.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::{Notify, mpsc};

use quirl_core::types::{
    AdapterType, ChannelCapabilities, ChatRef, FileRef, HealthStatus, InboundEvent,
    MembershipStatus, MessageId, OutboundBody, OutboundMessage, UserId,
};
use quirl_core::{ChannelAdapter, PluginAdapter, QuirlError};

/// Scriptable channel adapter. All state is interior-mutable so it can be
/// shared as `Arc<MockChannel>` with the engine and the test body.
pub struct MockChannel {
    inbound_tx: mpsc::UnboundedSender<InboundEvent>,
    inbound_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<InboundEvent>>,
    sent: Mutex<Vec<OutboundMessage>>,
    sent_notify: Notify,
    memberships: Mutex<HashMap<(String, UserId), MembershipStatus>>,
    default_membership: Mutex<MembershipStatus>,
    failing_chats: Mutex<HashSet<i64>>,
}

impl MockChannel {
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Self {
            inbound_tx,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            sent: Mutex::new(Vec::new()),
            sent_notify: Notify::new(),
            memberships: Mutex::new(HashMap::new()),
            default_membership: Mutex::new(MembershipStatus::Member),
            failing_chats: Mutex::new(HashSet::new()),
        }
    }

    /// Queues an inbound event for [`ChannelAdapter::receive`].
    pub fn inject(&self, ev: InboundEvent) {
        let _ = self.inbound_tx.send(ev);
    }

    /// Snapshot of everything sent so far.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Text bodies of everything sent so far, in order.
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|m| match m.body {
                OutboundBody::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// The most recent sent message, panicking when nothing was sent.
    pub fn last_sent(&self) -> OutboundMessage {
        self.sent
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no messages sent")
    }

    /// Waits until at least `count` messages have been sent.
    pub async fn wait_for_sent(&self, count: usize) {
        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
        loop {
            let notified = self.sent_notify.notified();
            if self.sent.lock().unwrap().len() >= count {
                return;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                panic!(
                    "timed out waiting for {count} sent messages (got {})",
                    self.sent.lock().unwrap().len()
                );
            }
        }
    }

    /// Scripts a membership answer for one (channel, user) pair.
    pub fn set_membership(&self, channel: &str, user: UserId, status: MembershipStatus) {
        self.memberships
            .lock()
            .unwrap()
            .insert((channel.to_string(), user), status);
    }

    /// Membership answer used when no pair-specific script exists.
    pub fn set_default_membership(&self, status: MembershipStatus) {
        *self.default_membership.lock().unwrap() = status;
    }

    /// Makes every delivery to `chat` fail from now on.
    pub fn fail_chat(&self, chat: ChatRef) {
        self.failing_chats.lock().unwrap().insert(chat.0);
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, QuirlError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), QuirlError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    fn capabilities(&self) -> ChannelCapabilities {
        ChannelCapabilities {
            supports_menus: true,
            supports_photos: true,
            supports_videos: true,
            supports_documents: true,
            max_message_length: Some(4096),
        }
    }

    async fn connect(&mut self) -> Result<(), QuirlError> {
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, QuirlError> {
        if self.failing_chats.lock().unwrap().contains(&msg.chat.0) {
            return Err(QuirlError::channel(format!(
                "delivery to chat {} refused",
                msg.chat.0
            )));
        }
        let id = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(msg);
            sent.len()
        };
        self.sent_notify.notify_waiters();
        Ok(MessageId(id.to_string()))
    }

    async fn receive(&self) -> Result<InboundEvent, QuirlError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| QuirlError::channel("inbound queue closed"))
    }

    async fn resolve_media(&self, file_ref: &FileRef) -> Result<String, QuirlError> {
        Ok(format!("https://files.example/{}", file_ref.0))
    }

    async fn membership(
        &self,
        channel: &str,
        user: UserId,
    ) -> Result<MembershipStatus, QuirlError> {
        let scripted = self
            .memberships
            .lock()
            .unwrap()
            .get(&(channel.to_string(), user))
            .copied();
        Ok(scripted.unwrap_or(*self.default_membership.lock().unwrap()))
    }
}
