//! Capabilities the host framework supplies to the engine.

use async_trait::async_trait;
use colloquy_core::{OutgoingMessage, Values};
use colloquy_error::ColloquyResult;
use std::sync::Arc;

/// A session-scoped handle hooks and handlers use to reach the host.
///
/// Spawned fresh for each hook batch, so implementations should be cheap to create.
#[async_trait]
pub trait BotSession: Send + Sync {
    /// Send a side message outside the scripted flow.
    async fn say(&self, message: OutgoingMessage) -> ColloquyResult<()>;

    /// Identifier of the conversation this session belongs to.
    fn conversation_id(&self) -> &str;
}

/// Per-turn view of the host framework.
///
/// The host creates one for every delivered turn and must serialize turns per
/// conversation; the engine never runs two turns of one dialog concurrently.
#[async_trait]
pub trait TurnContext: Send + Sync {
    /// Deliver a rendered message. No reply is awaited.
    async fn send_message(&self, message: &OutgoingMessage) -> ColloquyResult<()>;

    /// Start the prompt registered under `prompt_id` with a rendered message.
    ///
    /// The dialog suspends after this returns; the reply arrives on the next turn.
    async fn prompt(&self, prompt_id: &str, message: &OutgoingMessage) -> ColloquyResult<()>;

    /// Spawn a session handle for hooks and handlers.
    async fn spawn(&self) -> ColloquyResult<Arc<dyn BotSession>>;

    /// Pop the running dialog off the host's dialog stack.
    async fn end_dialog(&self, result: Option<&str>) -> ColloquyResult<()>;

    /// Replace the running dialog with `dialog_id`, started with `options`.
    async fn replace_dialog(&self, dialog_id: &str, options: Values) -> ColloquyResult<()>;
}
