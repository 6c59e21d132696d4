// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Quirl bot.
//!
//! Implements [`ChannelAdapter`] over the Telegram Bot API via teloxide:
//! long polling for messages and callback queries, inline keyboards,
//! media delivery by path or file reference, and gate-channel membership
//! lookups.

pub mod handler;
pub mod outbound;

use async_trait::async_trait;
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::{ChatMemberStatus, FileId, Recipient};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use quirl_config::model::TelegramConfig;
use quirl_core::types::{
    AdapterType, ChannelCapabilities, FileRef, HealthStatus, InboundEvent, MembershipStatus,
    MessageId, OutboundBody, OutboundMessage, UserId,
};
use quirl_core::{ChannelAdapter, PluginAdapter, QuirlError};

/// Telegram channel adapter implementing [`ChannelAdapter`].
///
/// Connects via long polling, converts private-chat messages and callback
/// queries into [`InboundEvent`]s, and delivers channel-agnostic outbound
/// messages.
pub struct TelegramChannel {
    bot: Bot,
    token: String,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Creates a new Telegram channel adapter.
    ///
    /// Requires `config.bot_token` to be set and non-empty.
    pub fn new(config: &TelegramConfig) -> Result<Self, QuirlError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            QuirlError::Config("telegram.bot_token is required for the Telegram adapter".into())
        })?;
        if token.is_empty() {
            return Err(QuirlError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            token: token.to_string(),
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, QuirlError> {
        // Validate the token by calling getMe.
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), QuirlError> {
        debug!("Telegram channel shutting down");
        // The polling task is dropped with the adapter; graceful shutdown
        // stops calling receive() first.
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
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
        if self.polling_handle.is_some() {
            return Ok(()); // Already connected
        }

        let bot = self.bot.clone();
        let msg_tx = self.inbound_tx.clone();
        let cb_tx = self.inbound_tx.clone();

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let message_branch = Update::filter_message().endpoint(move |msg: Message| {
                let tx = msg_tx.clone();
                async move {
                    if !handler::is_dm(&msg) {
                        debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
                        return respond(());
                    }
                    if let Some(ev) = handler::to_inbound_event(&msg)
                        && tx.send(ev).await.is_err()
                    {
                        warn!("inbound queue closed, dropping message");
                    }
                    respond(())
                }
            });

            let callback_branch =
                Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
                    let tx = cb_tx.clone();
                    async move {
                        // Stop the client-side spinner before routing.
                        if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
                            debug!(error = %e, "answer_callback_query failed");
                        }
                        if let Some(ev) = handler::callback_to_event(&q)
                            && tx.send(ev).await.is_err()
                        {
                            warn!("inbound queue closed, dropping callback");
                        }
                        respond(())
                    }
                });

            let tree = dptree::entry()
                .branch(message_branch)
                .branch(callback_branch);

            Dispatcher::builder(bot, tree)
                .default_handler(|_| async {}) // Silently ignore other updates
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, QuirlError> {
        let chat = Recipient::Id(ChatId(msg.chat.0));
        let sent = match msg.body {
            OutboundBody::Text { text, menu } => {
                let mut req = self.bot.send_message(chat, text);
                if let Some(menu) = menu {
                    req = req.reply_markup(outbound::to_markup(&menu));
                }
                req.await.map_err(send_error)?
            }
            OutboundBody::Photo { source, caption } => {
                let mut req = self.bot.send_photo(chat, outbound::to_input_file(&source));
                if let Some(caption) = caption {
                    req = req.caption(caption);
                }
                req.await.map_err(send_error)?
            }
            OutboundBody::Video { source, caption } => {
                let mut req = self.bot.send_video(chat, outbound::to_input_file(&source));
                if let Some(caption) = caption {
                    req = req.caption(caption);
                }
                req.await.map_err(send_error)?
            }
            OutboundBody::Document { source, caption } => {
                let mut req = self
                    .bot
                    .send_document(chat, outbound::to_input_file(&source));
                if let Some(caption) = caption {
                    req = req.caption(caption);
                }
                req.await.map_err(send_error)?
            }
        };
        Ok(MessageId(sent.id.0.to_string()))
    }

    async fn receive(&self) -> Result<InboundEvent, QuirlError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| QuirlError::channel("Telegram inbound queue closed"))
    }

    async fn resolve_media(&self, file_ref: &FileRef) -> Result<String, QuirlError> {
        let file = self
            .bot
            .get_file(FileId(file_ref.0.clone()))
            .await
            .map_err(|e| QuirlError::Channel {
                message: format!("failed to resolve file: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(format!(
            "https://api.telegram.org/file/bot{}/{}",
            self.token, file.path
        ))
    }

    async fn membership(
        &self,
        channel: &str,
        user: UserId,
    ) -> Result<MembershipStatus, QuirlError> {
        let recipient = if let Some(name) = channel.strip_prefix('@') {
            Recipient::ChannelUsername(format!("@{name}"))
        } else {
            let id = channel.trim().parse::<i64>().map_err(|_| {
                QuirlError::channel(format!("invalid gate channel reference: {channel}"))
            })?;
            Recipient::Id(ChatId(id))
        };

        let user_id = u64::try_from(user.0)
            .map_err(|_| QuirlError::channel(format!("invalid user id: {user}")))?;

        let member = self
            .bot
            .get_chat_member(recipient, teloxide::types::UserId(user_id))
            .await
            .map_err(|e| QuirlError::Channel {
                message: format!("membership lookup failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(match member.kind.status() {
            ChatMemberStatus::Owner => MembershipStatus::Owner,
            ChatMemberStatus::Administrator => MembershipStatus::Administrator,
            ChatMemberStatus::Member => MembershipStatus::Member,
            ChatMemberStatus::Restricted => MembershipStatus::Restricted,
            ChatMemberStatus::Left => MembershipStatus::Left,
            ChatMemberStatus::Banned => MembershipStatus::Kicked,
        })
    }
}

fn send_error(e: teloxide::RequestError) -> QuirlError {
    QuirlError::Channel {
        message: format!("failed to send message: {e}"),
        source: Some(Box::new(e)),
    }
}
