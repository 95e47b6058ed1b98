//! Telegram Bot API adapter
//!
//! Thin client over the HTTPS Bot API plus the long-polling loop that turns
//! updates into [`CommandInvocation`]s. The bot token is part of every
//! method URL, so request errors are stripped of their URL before they can
//! reach a log line.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::commands::{BotCommand, CommandInvocation, CommandSource};
use crate::config::{AppConfig, ChatId};
use crate::error::{Result, WardenError};
use crate::supervisor::{Button, MessageSink, OutgoingMessage};

/// Timeout for ordinary (non long-poll) API calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Back-off after a failed getUpdates call
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: ChatId,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Serialize)]
struct GetUpdatesRequest {
    offset: i64,
    timeout: u64,
    allowed_updates: [&'static str; 2],
}

#[derive(Serialize)]
struct AnswerCallbackQueryRequest<'a> {
    callback_query_id: &'a str,
}

#[derive(Serialize)]
struct Empty {}

/// Telegram Bot API client
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    api_base: String,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_base: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(&config.telegram.api_url, &config.bot_token)
    }

    async fn call<P, T>(&self, method: &str, params: &P, timeout: Duration) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .client
            .post(format!("{}/{}", self.api_base, method))
            .timeout(timeout)
            .json(params)
            .send()
            .await
            .map_err(|e| WardenError::Http(e.without_url()))?;

        // Error replies still carry a JSON body with `ok: false`
        let body: ApiResponse<T> = resp
            .json()
            .await
            .map_err(|e| WardenError::Http(e.without_url()))?;

        match (body.ok, body.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(WardenError::TelegramApi {
                method: method.to_string(),
                description: body
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }

    /// Verify the token and return the bot account
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &Empty {}, REQUEST_TIMEOUT).await
    }

    /// Long-poll for updates with id >= `offset`
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: ["message", "callback_query"],
        };
        // leave the server room to answer before our own deadline fires
        let deadline = Duration::from_secs(timeout_secs) + Duration::from_secs(10);
        self.call("getUpdates", &request, deadline).await
    }

    pub async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        let request = SendMessageRequest {
            chat_id,
            text,
            reply_markup,
        };
        let _: IgnoredAny = self.call("sendMessage", &request, REQUEST_TIMEOUT).await?;
        Ok(())
    }

    /// Stop the client-side spinner on a pressed button
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()> {
        let request = AnswerCallbackQueryRequest { callback_query_id };
        let _: IgnoredAny = self
            .call("answerCallbackQuery", &request, REQUEST_TIMEOUT)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl MessageSink for TelegramClient {
    async fn deliver(&self, chat: ChatId, message: &OutgoingMessage) -> Result<()> {
        self.send_message(chat, &message.text, keyboard_markup(&message.buttons))
            .await
    }
}

/// Render button rows as an inline keyboard; `None` when there are no buttons
pub fn keyboard_markup(rows: &[Vec<Button>]) -> Option<InlineKeyboardMarkup> {
    if rows.iter().all(|row| row.is_empty()) {
        return None;
    }

    let inline_keyboard = rows
        .iter()
        .filter(|row| !row.is_empty())
        .map(|row| {
            row.iter()
                .map(|button| InlineKeyboardButton {
                    text: button.label.clone(),
                    callback_data: button.command.callback_data().to_string(),
                })
                .collect()
        })
        .collect();

    Some(InlineKeyboardMarkup { inline_keyboard })
}

/// Map an update to a command invocation. Typed text and button presses
/// produce the same [`BotCommand`]; anything else is ignored.
pub fn invocation_from_update(update: &Update) -> Option<CommandInvocation> {
    if let Some(message) = &update.message {
        let from = message.from.as_ref().filter(|user| !user.is_bot)?;
        let command = BotCommand::from_text(message.text.as_deref()?)?;
        return Some(CommandInvocation {
            sender: from.id,
            chat: message.chat.id,
            command,
            source: CommandSource::Text,
        });
    }

    if let Some(query) = &update.callback_query {
        let data = query.data.as_deref()?;
        let chat = query
            .message
            .as_ref()
            .map(|message| message.chat.id)
            .unwrap_or(query.from.id);
        return Some(CommandInvocation {
            sender: query.from.id,
            chat,
            command: BotCommand::from_callback(data),
            source: CommandSource::Button,
        });
    }

    None
}

/// Long-polling loop feeding the command channel
pub struct UpdatePoller {
    client: Arc<TelegramClient>,
    poll_timeout_secs: u64,
    offset: i64,
}

impl UpdatePoller {
    pub fn new(client: Arc<TelegramClient>, poll_timeout_secs: u64) -> Self {
        Self {
            client,
            poll_timeout_secs,
            offset: 0,
        }
    }

    /// Poll until the receiving side of `tx` is dropped
    pub async fn run(mut self, tx: mpsc::Sender<CommandInvocation>) {
        info!("Polling Telegram for updates");

        loop {
            let updates = match self
                .client
                .get_updates(self.offset, self.poll_timeout_secs)
                .await
            {
                Ok(updates) => updates,
                Err(e) => {
                    warn!("Failed to fetch updates: {}", e);
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                self.offset = self.offset.max(update.update_id + 1);

                if let Some(query) = &update.callback_query {
                    if let Err(e) = self.client.answer_callback_query(&query.id).await {
                        debug!("Failed to answer callback query {}: {}", query.id, e);
                    }
                }

                let Some(invocation) = invocation_from_update(&update) else {
                    continue;
                };
                if tx.send(invocation).await.is_err() {
                    info!("Command channel closed, poller stopped");
                    return;
                }
            }
        }
    }
}
