//! Bot commands and the two adapters that produce them
//!
//! Typed text and button payloads both resolve to [`BotCommand`], so the
//! router has one code path per command regardless of how it arrived.

use crate::config::{ChatId, UserId};

/// Bare-word remediation trigger accepted alongside `/revive`
pub const REVIVE_WORD: &str = "оживити";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// Usage text with the command keyboard
    Help,
    /// Echo the sender's Telegram ID
    ShowId,
    /// Current outage flag plus a fresh probe (privileged)
    Status,
    /// Run the remediation workflow (privileged)
    Revive,
    /// Slash command or button payload we do not recognise
    Unknown(String),
}

impl BotCommand {
    /// Parse a typed message. Returns `None` for plain chat text.
    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.to_lowercase() == REVIVE_WORD {
            return Some(BotCommand::Revive);
        }

        let command = text.strip_prefix('/')?;
        let name = command.split_whitespace().next().unwrap_or_default();
        // "/status@WardenBot" in group chats
        let name = name.split('@').next().unwrap_or_default().to_lowercase();

        Some(match name.as_str() {
            "help" | "start" => BotCommand::Help,
            "mysecretid" => BotCommand::ShowId,
            "status" => BotCommand::Status,
            "revive" => BotCommand::Revive,
            _ => BotCommand::Unknown(name),
        })
    }

    /// Parse an inline button payload
    pub fn from_callback(data: &str) -> Self {
        match data {
            "help" => BotCommand::Help,
            "mysecretid" => BotCommand::ShowId,
            "status" => BotCommand::Status,
            "revive" => BotCommand::Revive,
            other => BotCommand::Unknown(other.to_string()),
        }
    }

    /// Payload carried by a button for this command
    pub fn callback_data(&self) -> &str {
        match self {
            BotCommand::Help => "help",
            BotCommand::ShowId => "mysecretid",
            BotCommand::Status => "status",
            BotCommand::Revive => "revive",
            BotCommand::Unknown(raw) => raw,
        }
    }

    pub fn requires_privilege(&self) -> bool {
        matches!(self, BotCommand::Status | BotCommand::Revive)
    }
}

/// Where an invocation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    Text,
    Button,
}

/// One inbound command, not persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub sender: UserId,
    pub chat: ChatId,
    pub command: BotCommand,
    pub source: CommandSource,
}
