//! Persisted per-conversation dialog state.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Captured variables and dialog options, keyed by name.
pub type Values = BTreeMap<String, Value>;

/// Terminal status written to `values._status` when a dialog ends by action.
///
/// # Examples
///
/// ```
/// use colloquy_core::EndStatus;
///
/// assert_eq!(EndStatus::Canceled.to_string(), "canceled");
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
pub enum EndStatus {
    /// The script ran to completion
    #[display("completed")]
    Completed,
    /// The script was stopped
    #[display("canceled")]
    Canceled,
    /// The host reported that the user went quiet
    #[display("timeout")]
    Timeout,
}

/// The state a host framework stores for one running dialog.
///
/// The engine is the only writer. Hosts persist it between turns as opaque JSON.
///
/// # Examples
///
/// ```
/// use colloquy_core::DialogState;
///
/// let state = DialogState::new("default", Default::default());
/// let json = serde_json::to_value(&state).unwrap();
/// assert_eq!(json["stepIndex"], 0);
/// assert_eq!(json["thread"], "default");
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogState {
    /// Current thread name
    pub thread: String,
    /// Position within the current thread
    pub step_index: usize,
    /// Captured values; survive thread switches for the life of the dialog
    #[serde(default)]
    pub values: Values,
    /// Parameters supplied when the dialog began
    #[serde(default)]
    pub options: Values,
    /// The next turn re-runs the line at `step_index` instead of the one after it
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub replay: bool,
}

impl DialogState {
    /// Fresh state positioned at index 0 of `thread`, with `values` seeded from `options`.
    pub fn new(thread: impl Into<String>, options: Values) -> Self {
        Self {
            thread: thread.into(),
            step_index: 0,
            values: options.clone(),
            options,
            replay: false,
        }
    }

    /// Index of the line the next turn resumes at.
    ///
    /// # Examples
    ///
    /// ```
    /// use colloquy_core::DialogState;
    ///
    /// let mut state = DialogState::new("default", Default::default());
    /// assert_eq!(state.resume_index(), 1);
    /// state.replay = true;
    /// assert_eq!(state.resume_index(), 0);
    /// ```
    pub fn resume_index(&self) -> usize {
        if self.replay {
            self.step_index
        } else {
            self.step_index + 1
        }
    }

    /// Whether the dialog has yet to enter a thread.
    pub fn is_started(&self) -> bool {
        !self.thread.is_empty()
    }

    /// A captured value rendered as text, if present.
    pub fn value_text(&self, key: &str) -> Option<String> {
        self.values.get(key).map(render_value)
    }
}

/// Renders a stored value the way templates print it.
///
/// Strings print verbatim, arrays print their elements joined by `,`, and
/// `null` prints nothing.
///
/// # Examples
///
/// ```
/// use colloquy_core::render_value;
/// use serde_json::json;
///
/// assert_eq!(render_value(&json!("Ada")), "Ada");
/// assert_eq!(render_value(&json!(["a", "b"])), "a,b");
/// assert_eq!(render_value(&json!(null)), "");
/// ```
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}
