//! Test doubles shared by unit and integration tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::config::ChatId;
use crate::error::{Result, WardenError};
use crate::probe::{ProbeReport, ProbeStatus, Prober};
use crate::supervisor::{MessageSink, OutgoingMessage};

/// Sink that records every delivered message
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<(ChatId, OutgoingMessage)>>,
    failing: Vec<ChatId>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(chats: &[ChatId]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: chats.to_vec(),
        }
    }

    pub fn sent(&self) -> Vec<(ChatId, OutgoingMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn chats(&self) -> Vec<ChatId> {
        self.sent().into_iter().map(|(chat, _)| chat).collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, m)| m.text).collect()
    }

    pub fn count_text(&self, text: &str) -> usize {
        self.texts().iter().filter(|t| t.as_str() == text).count()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn deliver(&self, chat: ChatId, message: &OutgoingMessage) -> Result<()> {
        if self.failing.contains(&chat) {
            return Err(WardenError::Internal(format!("chat {chat} unreachable")));
        }
        self.sent.lock().unwrap().push((chat, message.clone()));
        Ok(())
    }
}

/// Prober that replays a fixed sequence of verdicts. Once the script is
/// used up it repeats the fallback, or panics when there is none.
pub struct ScriptedProber {
    script: Mutex<VecDeque<ProbeStatus>>,
    fallback: Option<ProbeStatus>,
    calls: AtomicUsize,
}

impl ScriptedProber {
    pub fn new(script: &[ProbeStatus]) -> Self {
        Self {
            script: Mutex::new(script.iter().copied().collect()),
            fallback: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_fallback(script: &[ProbeStatus], fallback: ProbeStatus) -> Self {
        Self {
            fallback: Some(fallback),
            ..Self::new(script)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self) -> ProbeReport {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .or(self.fallback)
            .expect("script exhausted with no fallback");
        match next {
            ProbeStatus::Up => ProbeReport::up(),
            ProbeStatus::Down => ProbeReport::down("HTTP 503"),
        }
    }
}
