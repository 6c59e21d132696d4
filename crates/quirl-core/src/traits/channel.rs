// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for the messaging transport (Telegram, mocks).

use async_trait::async_trait;

use crate::error::QuirlError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    ChannelCapabilities, FileRef, InboundEvent, MembershipStatus, MessageId, OutboundMessage,
    UserId,
};

/// Adapter for the bidirectional messaging transport.
///
/// The workflow engine never sees platform types; content is resolved into
/// tagged [`InboundEvent`]s at this boundary and outbound messages are
/// channel-agnostic until delivery.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Returns the capabilities supported by this channel.
    fn capabilities(&self) -> ChannelCapabilities;

    /// Establishes the connection to the messaging platform (long polling).
    async fn connect(&mut self) -> Result<(), QuirlError>;

    /// Sends a message through the channel.
    ///
    /// Delivery failures are recoverable: the caller decides whether to
    /// surface them to the user (artifact path) or count them (broadcast).
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, QuirlError>;

    /// Receives the next inbound event from the channel.
    async fn receive(&self) -> Result<InboundEvent, QuirlError>;

    /// Resolves a platform file reference to a dereferenceable URL, or the
    /// opaque reference id when the platform exposes no path.
    async fn resolve_media(&self, file_ref: &FileRef) -> Result<String, QuirlError>;

    /// Queries the user's membership status in a channel (`@username` or
    /// numeric chat id). Errors mean the channel is invalid or unreachable.
    async fn membership(
        &self,
        channel: &str,
        user: UserId,
    ) -> Result<MembershipStatus, QuirlError>;
}
