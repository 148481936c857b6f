//! Normalized incoming activities.

use serde::{Deserialize, Serialize};

/// Kind of activity delivered by a channel adapter.
///
/// # Examples
///
/// ```
/// use colloquy_core::ActivityKind;
///
/// assert_eq!(format!("{}", ActivityKind::Message), "message");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A user-authored message
    #[display("message")]
    Message,
    /// Membership or conversation metadata changed
    #[display("conversation_update")]
    ConversationUpdate,
    /// The user is typing
    #[display("typing")]
    Typing,
    /// Platform-specific event
    #[display("event")]
    Event,
}

/// An activity already translated out of a platform's wire format.
///
/// # Examples
///
/// ```
/// use colloquy_core::{Activity, ActivityKind};
///
/// let activity = Activity::message("hello");
/// assert_eq!(activity.kind, ActivityKind::Message);
/// assert_eq!(activity.text.as_deref(), Some("hello"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Activity kind
    pub kind: ActivityKind,
    /// Message text, if any
    #[serde(default)]
    pub text: Option<String>,
}

impl Activity {
    /// A message activity carrying `text`.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            kind: ActivityKind::Message,
            text: Some(text.into()),
        }
    }

    /// A non-message activity with no text.
    pub fn of_kind(kind: ActivityKind) -> Self {
        Self { kind, text: None }
    }

    /// Whether this activity is a user message.
    pub fn is_message(&self) -> bool {
        self.kind == ActivityKind::Message
    }
}
