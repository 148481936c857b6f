//! Trait definitions for the Colloquy host interface.
//!
//! The conversation engine never talks to a messaging platform directly. A host
//! turn-delivery framework implements [`TurnContext`] for each incoming turn and
//! [`BotSession`] for the handles given to hooks.

mod traits;
mod types;

pub use traits::{BotSession, TurnContext};
pub use types::{DialogReason, DialogTurnResult, DialogTurnStatus};
