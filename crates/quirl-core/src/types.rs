// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Quirl workflow engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use strum::{Display, EnumIter, EnumString};

/// Unique identifier for an end user (and their private conversation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the chat an outbound message is delivered to.
///
/// For private conversations this equals the numeric user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatRef(pub i64);

/// Unique identifier for a delivered message, assigned by the channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Opaque platform file reference for media content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRef(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
    Generator,
}

/// QR fill color chosen by the user.
///
/// Rendered lowercase on the wire (`style:red` callback data) and in logs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Black,
    Red,
    Green,
    Blue,
    Yellow,
    Pink,
    Purple,
    Gray,
    Brown,
}

/// Membership status of a user in a gate channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipStatus {
    Member,
    Administrator,
    Owner,
    Restricted,
    Left,
    Kicked,
    Unknown,
}

impl MembershipStatus {
    /// Whether this status satisfies the mandatory-channel gate.
    pub fn grants_access(self) -> bool {
        matches!(
            self,
            MembershipStatus::Member | MembershipStatus::Administrator | MembershipStatus::Owner
        )
    }
}

/// Sender identity attached to every inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMeta {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Inbound content, resolved once at the channel boundary into a tagged variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPayload {
    Text(String),
    Photo(FileRef),
    Video(FileRef),
    Document(FileRef),
}

impl ContentPayload {
    /// Short tag used in broadcast summaries and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentPayload::Text(_) => "text",
            ContentPayload::Photo(_) => "photo",
            ContentPayload::Video(_) => "video",
            ContentPayload::Document(_) => "document",
        }
    }
}

/// Commands recognized by the workflow engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Admin,
}

/// The kind of inbound event, matched exhaustively by the state machines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A recognized slash command.
    Command(Command),
    /// Message content (text or a media reference).
    Content(ContentPayload),
    /// An inline menu selection (callback data).
    Selection(String),
}

/// An inbound event received from a channel adapter.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub user: UserMeta,
    pub chat: ChatRef,
    pub kind: EventKind,
}

/// Where outbound media comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// A freshly rendered artifact on local disk.
    Path(PathBuf),
    /// Re-send by platform file reference (broadcast path).
    FileRef(FileRef),
}

/// A single inline menu button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuButton {
    pub label: String,
    pub action: MenuAction,
}

/// What pressing a menu button does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Delivered back as [`EventKind::Selection`] with this data.
    Callback(String),
    /// Opens an external link.
    Url(String),
}

impl MenuButton {
    pub fn callback(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: MenuAction::Callback(data.into()),
        }
    }

    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: MenuAction::Url(url.into()),
        }
    }
}

/// Rows of inline buttons attached to an outbound text message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    pub rows: Vec<Vec<MenuButton>>,
}

impl Menu {
    pub fn new(rows: Vec<Vec<MenuButton>>) -> Self {
        Self { rows }
    }
}

/// Body of an outbound message.
#[derive(Debug, Clone)]
pub enum OutboundBody {
    Text {
        text: String,
        menu: Option<Menu>,
    },
    Photo {
        source: MediaSource,
        caption: Option<String>,
    },
    Video {
        source: MediaSource,
        caption: Option<String>,
    },
    Document {
        source: MediaSource,
        caption: Option<String>,
    },
}

/// An outbound message to be delivered via a channel adapter.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub chat: ChatRef,
    pub body: OutboundBody,
}

impl OutboundMessage {
    /// Plain text message without a menu.
    pub fn text(chat: ChatRef, text: impl Into<String>) -> Self {
        Self {
            chat,
            body: OutboundBody::Text {
                text: text.into(),
                menu: None,
            },
        }
    }

    /// Text message with an inline menu attached.
    pub fn with_menu(chat: ChatRef, text: impl Into<String>, menu: Menu) -> Self {
        Self {
            chat,
            body: OutboundBody::Text {
                text: text.into(),
                menu: Some(menu),
            },
        }
    }
}

/// Capabilities reported by a channel adapter.
#[derive(Debug, Clone)]
pub struct ChannelCapabilities {
    pub supports_menus: bool,
    pub supports_photos: bool,
    pub supports_videos: bool,
    pub supports_documents: bool,
    pub max_message_length: Option<usize>,
}

/// A persisted user record, overwritten on every interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// RFC 3339 UTC timestamp of first contact (kept current on upsert).
    pub joined_at: String,
}

/// Action tags recorded in the append-only action log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LogAction {
    Start,
    ContentSent,
    Generate,
    Blocked,
    BroadcastSent,
}

/// An append-only action log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Row id; 0 until assigned by storage.
    pub id: i64,
    pub user_id: UserId,
    pub username: Option<String>,
    pub action: LogAction,
    /// Free-text payload, truncated to a bounded length at write time.
    pub content: String,
    pub style: Option<Style>,
    pub size: Option<i64>,
    /// RFC 3339 UTC timestamp.
    pub created_at: String,
}
