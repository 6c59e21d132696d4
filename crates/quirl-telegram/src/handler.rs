// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound event extraction.
//!
//! Converts Telegram messages and callback queries into channel-agnostic
//! [`InboundEvent`]s. Only private chats are processed; unsupported
//! message types are dropped.

use teloxide::types::{CallbackQuery, ChatKind, Message, User};
use tracing::debug;

use quirl_core::types::{
    ChatRef, Command, ContentPayload, EventKind, FileRef, InboundEvent, UserId, UserMeta,
};

/// Whether the message comes from a private (DM) chat.
///
/// Group, supergroup, and channel messages return `false`.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Parses a leading slash command, tolerating the `@botname` suffix.
pub fn parse_command(text: &str) -> Option<Command> {
    let first = text.split_whitespace().next()?;
    let bare = first.split('@').next()?;
    match bare {
        "/start" => Some(Command::Start),
        "/admin" => Some(Command::Admin),
        _ => None,
    }
}

fn to_user_meta(user: &User) -> UserMeta {
    UserMeta {
        id: UserId(user.id.0 as i64),
        username: user.username.clone(),
        first_name: Some(user.first_name.clone()),
        last_name: user.last_name.clone(),
    }
}

/// Converts a Telegram message into an [`InboundEvent`].
///
/// Returns `None` for messages without a sender (channel posts) and for
/// unsupported content types (stickers, locations, voice).
pub fn to_inbound_event(msg: &Message) -> Option<InboundEvent> {
    let from = msg.from.as_ref()?;
    let user = to_user_meta(from);
    let chat = ChatRef(msg.chat.id.0);

    let kind = if let Some(text) = msg.text() {
        match parse_command(text) {
            Some(cmd) => EventKind::Command(cmd),
            None => EventKind::Content(ContentPayload::Text(text.to_string())),
        }
    } else if let Some(photos) = msg.photo() {
        // Telegram lists multiple sizes; the last one is the largest.
        let largest = photos.last()?;
        EventKind::Content(ContentPayload::Photo(FileRef(largest.file.id.0.clone())))
    } else if let Some(video) = msg.video() {
        EventKind::Content(ContentPayload::Video(FileRef(video.file.id.0.clone())))
    } else if let Some(doc) = msg.document() {
        EventKind::Content(ContentPayload::Document(FileRef(doc.file.id.0.clone())))
    } else {
        debug!(msg_id = msg.id.0, "ignoring unsupported message type");
        return None;
    };

    Some(InboundEvent { user, chat, kind })
}

/// Converts a callback query into a [`EventKind::Selection`] event.
///
/// Queries without callback data are dropped. The chat falls back to the
/// presser's private chat when the original message is gone.
pub fn callback_to_event(q: &CallbackQuery) -> Option<InboundEvent> {
    let data = q.data.clone()?;
    let user = to_user_meta(&q.from);
    let chat = q
        .message
        .as_ref()
        .map(|m| ChatRef(m.chat().id.0))
        .unwrap_or(ChatRef(user.id.0));

    Some(InboundEvent {
        user,
        chat,
        kind: EventKind::Selection(data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a mock private chat message from JSON, matching Telegram Bot
    /// API structure.
    fn make_private_message(user_id: u64, username: Option<&str>, text: &str) -> Message {
        let from = if let Some(uname) = username {
            serde_json::json!({
                "id": user_id,
                "is_bot": false,
                "first_name": "Test",
                "username": uname,
            })
        } else {
            serde_json::json!({
                "id": user_id,
                "is_bot": false,
                "first_name": "Test",
            })
        };

        let json = serde_json::json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": {
                "id": user_id as i64,
                "type": "private",
                "first_name": "Test",
            },
            "from": from,
            "text": text,
        });

        serde_json::from_value(json).expect("failed to deserialize mock message")
    }

    fn make_group_message(user_id: u64, text: &str) -> Message {
        let json = serde_json::json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": {
                "id": -100123i64,
                "type": "supergroup",
                "title": "Test Group",
            },
            "from": {
                "id": user_id,
                "is_bot": false,
                "first_name": "Test",
            },
            "text": text,
        });

        serde_json::from_value(json).expect("failed to deserialize mock group message")
    }

    fn make_photo_message(user_id: u64) -> Message {
        let json = serde_json::json!({
            "message_id": 2,
            "date": 1700000000i64,
            "chat": {
                "id": user_id as i64,
                "type": "private",
                "first_name": "Test",
            },
            "from": {
                "id": user_id,
                "is_bot": false,
                "first_name": "Test",
            },
            "photo": [
                {
                    "file_id": "small-file",
                    "file_unique_id": "u1",
                    "width": 90,
                    "height": 90,
                    "file_size": 100,
                },
                {
                    "file_id": "large-file",
                    "file_unique_id": "u2",
                    "width": 800,
                    "height": 800,
                    "file_size": 40000,
                },
            ],
        });

        serde_json::from_value(json).expect("failed to deserialize mock photo message")
    }

    fn make_callback_query(user_id: u64, data: &str) -> CallbackQuery {
        let json = serde_json::json!({
            "id": "42",
            "from": {
                "id": user_id,
                "is_bot": false,
                "first_name": "Test",
                "username": "tester",
            },
            "chat_instance": "ci",
            "data": data,
            "message": {
                "message_id": 7,
                "date": 1700000000i64,
                "chat": {
                    "id": user_id as i64,
                    "type": "private",
                    "first_name": "Test",
                },
                "text": "Choose a QR color:",
            },
        });

        serde_json::from_value(json).expect("failed to deserialize mock callback query")
    }

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_command("/start"), Some(Command::Start));
        assert_eq!(parse_command("/admin"), Some(Command::Admin));
        assert_eq!(parse_command("/start@quirl_bot"), Some(Command::Start));
        assert_eq!(parse_command("/start extra args"), Some(Command::Start));
        assert_eq!(parse_command("/unknown"), None);
        assert_eq!(parse_command("hello"), None);
    }

    #[test]
    fn dm_detection() {
        assert!(is_dm(&make_private_message(1, None, "hi")));
        assert!(!is_dm(&make_group_message(1, "hi")));
    }

    #[test]
    fn text_message_becomes_content_event() {
        let msg = make_private_message(12345, Some("alice"), "hello world");
        let ev = to_inbound_event(&msg).unwrap();
        assert_eq!(ev.user.id, UserId(12345));
        assert_eq!(ev.user.username.as_deref(), Some("alice"));
        assert_eq!(ev.chat, ChatRef(12345));
        assert_eq!(
            ev.kind,
            EventKind::Content(ContentPayload::Text("hello world".into()))
        );
    }

    #[test]
    fn start_command_is_recognized() {
        let msg = make_private_message(12345, None, "/start");
        let ev = to_inbound_event(&msg).unwrap();
        assert_eq!(ev.kind, EventKind::Command(Command::Start));
    }

    #[test]
    fn photo_message_picks_largest_size() {
        let msg = make_photo_message(12345);
        let ev = to_inbound_event(&msg).unwrap();
        assert_eq!(
            ev.kind,
            EventKind::Content(ContentPayload::Photo(FileRef("large-file".into())))
        );
    }

    #[test]
    fn callback_query_becomes_selection() {
        let q = make_callback_query(12345, "style:red");
        let ev = callback_to_event(&q).unwrap();
        assert_eq!(ev.user.id, UserId(12345));
        assert_eq!(ev.chat, ChatRef(12345));
        assert_eq!(ev.kind, EventKind::Selection("style:red".into()));
    }
}
