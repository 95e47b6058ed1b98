//! Inbound command handling

pub mod command;
pub mod router;

pub use command::{BotCommand, CommandInvocation, CommandSource, REVIVE_WORD};
pub use router::{help_message, CommandRouter, Route};
