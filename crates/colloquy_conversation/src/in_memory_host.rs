//! In-memory host for tests and local runs.

use async_trait::async_trait;
use colloquy_core::{OutgoingMessage, Values};
use colloquy_error::{ColloquyResult, HostError, HostErrorKind};
use colloquy_interface::{BotSession, TurnContext};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Something the engine or a hook handed to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// Sent through the turn context
    Sent(OutgoingMessage),
    /// Sent as the body of a prompt
    Prompted {
        /// Prompt the message started
        prompt_id: String,
        /// Rendered prompt
        message: OutgoingMessage,
    },
    /// Sent by a hook through a bot session
    Side(OutgoingMessage),
}

impl Delivery {
    /// The delivered message.
    pub fn message(&self) -> &OutgoingMessage {
        match self {
            Self::Sent(message) | Self::Side(message) => message,
            Self::Prompted { message, .. } => message,
        }
    }
}

type Log = Arc<Mutex<Vec<Delivery>>>;

/// A [`TurnContext`] that records everything in memory.
///
/// Prompts must be registered before use, mirroring a host dialog set.
///
/// # Examples
///
/// ```
/// use colloquy_conversation::InMemoryTurnContext;
///
/// let ctx = InMemoryTurnContext::new("conv-1");
/// ctx.register_prompt("colloquy_text_prompt");
/// assert!(ctx.texts().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryTurnContext {
    conversation_id: String,
    log: Log,
    prompts: Arc<Mutex<HashSet<String>>>,
    ended: Arc<Mutex<Vec<Option<String>>>>,
    replaced: Arc<Mutex<Vec<(String, Values)>>>,
}

impl InMemoryTurnContext {
    /// Empty host for `conversation_id` with no prompts registered.
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            log: Arc::default(),
            prompts: Arc::default(),
            ended: Arc::default(),
            replaced: Arc::default(),
        }
    }

    /// Register a prompt id.
    pub fn register_prompt(&self, prompt_id: impl Into<String>) {
        self.prompts.lock().insert(prompt_id.into());
    }

    /// Every delivery so far, in order.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.log.lock().clone()
    }

    /// Text of every delivery so far, in order.
    pub fn texts(&self) -> Vec<String> {
        self.log
            .lock()
            .iter()
            .map(|d| d.message().text.clone())
            .collect()
    }

    /// Drain the log, returning the delivered texts.
    pub fn take_texts(&self) -> Vec<String> {
        self.log
            .lock()
            .drain(..)
            .map(|d| d.message().text.clone())
            .collect()
    }

    /// Results passed to `end_dialog`, one per call.
    pub fn ended(&self) -> Vec<Option<String>> {
        self.ended.lock().clone()
    }

    /// Replacement requests, one per call.
    pub fn replaced(&self) -> Vec<(String, Values)> {
        self.replaced.lock().clone()
    }
}

#[async_trait]
impl TurnContext for InMemoryTurnContext {
    async fn send_message(&self, message: &OutgoingMessage) -> ColloquyResult<()> {
        debug!(text = %message.text, "Sending message");
        self.log.lock().push(Delivery::Sent(message.clone()));
        Ok(())
    }

    async fn prompt(&self, prompt_id: &str, message: &OutgoingMessage) -> ColloquyResult<()> {
        if !self.prompts.lock().contains(prompt_id) {
            let kind = HostErrorKind::PromptNotRegistered(prompt_id.to_string());
            return Err(HostError::new(kind).into());
        }
        self.log.lock().push(Delivery::Prompted {
            prompt_id: prompt_id.to_string(),
            message: message.clone(),
        });
        Ok(())
    }

    async fn spawn(&self) -> ColloquyResult<Arc<dyn BotSession>> {
        Ok(Arc::new(RecordingSession {
            conversation_id: self.conversation_id.clone(),
            log: Arc::clone(&self.log),
        }))
    }

    async fn end_dialog(&self, result: Option<&str>) -> ColloquyResult<()> {
        self.ended.lock().push(result.map(str::to_string));
        Ok(())
    }

    async fn replace_dialog(&self, dialog_id: &str, options: Values) -> ColloquyResult<()> {
        self.replaced.lock().push((dialog_id.to_string(), options));
        Ok(())
    }
}

/// Bot session writing into its parent context's log.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    conversation_id: String,
    log: Log,
}

#[async_trait]
impl BotSession for RecordingSession {
    async fn say(&self, message: OutgoingMessage) -> ColloquyResult<()> {
        self.log.lock().push(Delivery::Side(message));
        Ok(())
    }

    fn conversation_id(&self) -> &str {
        &self.conversation_id
    }
}
