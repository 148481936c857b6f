//! Colloquy - scripted conversations for chat bots
//!
//! Colloquy runs multi-turn conversational flows authored as scripts: named
//! threads of messages and questions, executed one user turn at a time against
//! state the host framework persists between turns.
//!
//! # Features
//!
//! - **Threads**: Named, ordered sequences of lines with jumps between them
//! - **Captures**: Replies stored in variables, optionally accumulated
//! - **Branching**: String and regex options, fallback options, custom handlers
//! - **Hooks**: Before-thread, on-change and after-dialog callbacks
//! - **Templates**: `{{vars.name}}` placeholders in text and attachments
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use colloquy::{Activity, CollectSpec, Conversation, ConversationConfig, DialogState, Script, Values};
//!
//! let mut script = Script::new();
//! script.say("Hi");
//! script.ask("Name?", CollectSpec::capture("name"));
//! script.say("Hi {{vars.name}}");
//!
//! let conversation = Conversation::new("greet", script, ConversationConfig::load()?)?;
//!
//! // `ctx` is the host's TurnContext for this turn
//! let mut state = DialogState::default();
//! conversation.begin_dialog(&ctx, &mut state, Values::new()).await?;
//! conversation.continue_dialog(&ctx, &mut state, &Activity::message("Ada")).await?;
//! ```
//!
//! # Architecture
//!
//! Colloquy is organized as a workspace with focused crates:
//!
//! - `colloquy-core` - Messages, activities and dialog state
//! - `colloquy-interface` - Host traits (`TurnContext`, `BotSession`)
//! - `colloquy-error` - Error types
//! - `colloquy-conversation` - Scripts, templates, hooks and the step engine
//!
//! This crate (`colloquy`) re-exports everything for convenience.

pub use colloquy_conversation::*;
pub use colloquy_core::*;
pub use colloquy_error::*;
pub use colloquy_interface::*;
