//! Command Router
//!
//! Resolves an invocation to a route, enforcing the privileged-sender
//! allow-list, and runs the matching handler.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::{BotCommand, CommandInvocation};
use crate::config::{AppConfig, UserId};
use crate::messages;
use crate::probe::Prober;
use crate::supervisor::{Button, Notifier, OutageState, OutgoingMessage, RemediationWorkflow};

/// Handler selected for an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Help,
    ShowId,
    Status,
    Remediate,
    /// Privileged command from a sender outside the allow-list
    Denied,
    Unknown,
}

pub struct CommandRouter {
    privileged: HashSet<UserId>,
    remediation: Arc<RemediationWorkflow>,
    prober: Arc<dyn Prober>,
    state: Arc<OutageState>,
    notifier: Arc<Notifier>,
}

impl CommandRouter {
    pub fn new(
        privileged: impl IntoIterator<Item = UserId>,
        remediation: Arc<RemediationWorkflow>,
        prober: Arc<dyn Prober>,
        state: Arc<OutageState>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            privileged: privileged.into_iter().collect(),
            remediation,
            prober,
            state,
            notifier,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        remediation: Arc<RemediationWorkflow>,
        prober: Arc<dyn Prober>,
        state: Arc<OutageState>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self::new(
            config.privileged_users_sublist.iter().copied(),
            remediation,
            prober,
            state,
            notifier,
        )
    }

    pub fn is_privileged(&self, sender: UserId) -> bool {
        self.privileged.contains(&sender)
    }

    /// Pick the handler for `command` sent by `sender`
    pub fn resolve(&self, sender: UserId, command: &BotCommand) -> Route {
        if command.requires_privilege() && !self.is_privileged(sender) {
            return Route::Denied;
        }

        match command {
            BotCommand::Help => Route::Help,
            BotCommand::ShowId => Route::ShowId,
            BotCommand::Status => Route::Status,
            BotCommand::Revive => Route::Remediate,
            BotCommand::Unknown(_) => Route::Unknown,
        }
    }

    /// Resolve and run the handler; returns the route taken
    pub async fn dispatch(&self, invocation: &CommandInvocation) -> Route {
        let route = self.resolve(invocation.sender, &invocation.command);
        debug!(
            sender = invocation.sender,
            chat = invocation.chat,
            source = ?invocation.source,
            ?route,
            "Dispatching command"
        );

        match route {
            Route::Help => {
                self.notifier.send_to(invocation.chat, help_message()).await;
            }
            Route::ShowId => {
                self.notifier
                    .send_to(invocation.chat, messages::your_id(invocation.sender))
                    .await;
            }
            Route::Status => {
                let known_down = self.state.is_down().await;
                let live = self.prober.probe().await;
                self.notifier
                    .send_to(invocation.chat, messages::status_report(known_down, &live))
                    .await;
            }
            Route::Remediate => {
                info!("Received revive command from user {}", invocation.sender);
                let outcome = self.remediation.run(invocation.chat).await;
                info!(?outcome, "Remediation finished");
            }
            Route::Denied => {
                info!(
                    "User {} is not allowed to run {:?}",
                    invocation.sender, invocation.command
                );
                self.notifier
                    .send_to(invocation.chat, messages::NOT_PERMITTED)
                    .await;
            }
            Route::Unknown => {
                self.notifier
                    .send_to(invocation.chat, messages::UNKNOWN_COMMAND)
                    .await;
            }
        }

        route
    }

    /// Handle invocations one at a time until the channel closes
    pub async fn serve(self: Arc<Self>, mut rx: mpsc::Receiver<CommandInvocation>) {
        info!("Command router started");
        while let Some(invocation) = rx.recv().await {
            self.dispatch(&invocation).await;
        }
        info!("Command channel closed, router stopped");
    }
}

/// Help text with one button per command
pub fn help_message() -> OutgoingMessage {
    OutgoingMessage::text(messages::HELP).with_buttons(vec![
        vec![
            Button::new("Статус", BotCommand::Status),
            Button::new("Оживити", BotCommand::Revive),
        ],
        vec![
            Button::new("Мій ID", BotCommand::ShowId),
            Button::new("Довідка", BotCommand::Help),
        ],
    ])
}
