//! Scripted conversation engine for Colloquy.
//!
//! A [`Script`] is a set of named threads, each an ordered list of [`Line`]s.
//! A [`Conversation`] walks a script one user turn at a time: it sends
//! messages, asks questions, captures replies into variables, branches on
//! them and hands control back to the host whenever it needs to wait.
//!
//! # Example
//!
//! ```rust,ignore
//! use colloquy_conversation::{
//!     CollectSpec, Conversation, ConversationConfig, InMemoryTurnContext, Script,
//! };
//! use colloquy_core::{Activity, DialogState, Values};
//!
//! let mut script = Script::new();
//! script.ask("What's your name?", CollectSpec::capture("name"));
//! script.say("Nice to meet you, {{vars.name}}");
//!
//! let conversation = Conversation::new("greet", script, ConversationConfig::default())?;
//! let ctx = InMemoryTurnContext::new("conv-1");
//! ctx.register_prompt(conversation.config().prompt_id());
//!
//! let mut state = DialogState::default();
//! conversation.begin_dialog(&ctx, &mut state, Values::new()).await?;
//! conversation
//!     .continue_dialog(&ctx, &mut state, &Activity::message("Ada"))
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod conversation;
mod dispatch;
mod hooks;
mod in_memory_host;
mod line;
mod script;
mod step;
mod template;

pub use config::ConversationConfig;
pub use conversation::{Conversation, STATUS_KEY};
pub use dispatch::{Transition, dispatch_action, dispatch_handler};
pub use hooks::{BranchHandler, Convo, ConvoFuture, HookRegistry};
pub use in_memory_host::{Delivery, InMemoryTurnContext, RecordingSession};
pub use line::{
    BranchOutcome, CollectOption, CollectSpec, CollectSpecBuilder, ControlAction, Line,
    MessageBody, MessageBodyBuilder, PatternKind,
};
pub use script::{DEFAULT_THREAD, Script};
pub use step::{StepContext, StepPosition};
pub use template::TemplateRenderer;
