//! Rendered outgoing message types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A suggested reply button.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuickReply {
    /// Label shown to the user
    pub title: String,
    /// Text posted back when the button is pressed
    pub payload: String,
}

/// A fully rendered message ready to hand to the host framework.
///
/// # Examples
///
/// ```
/// use colloquy_core::OutgoingMessage;
///
/// let message = OutgoingMessage::text("Hello Ada");
/// assert_eq!(message.text, "Hello Ada");
/// assert!(message.suggested_actions.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Message text (already rendered)
    pub text: String,
    /// Suggested actions built from the line's quick replies
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_actions: Vec<QuickReply>,
    /// Native attachments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Value>,
    /// Channel-specific payload
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub channel_data: Map<String, Value>,
}

impl OutgoingMessage {
    /// A plain text message.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}
