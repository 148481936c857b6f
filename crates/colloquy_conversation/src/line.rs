//! Script line types.
//!
//! A script line is one of three shapes, validated when it is built:
//! a plain [`Line::Message`], a [`Line::Question`] that captures and branches
//! on the reply, or a [`Line::Action`] that runs a control action after its
//! (optional) message is sent.

use crate::BranchHandler;
use colloquy_core::QuickReply;
use colloquy_error::{BuilderError, ColloquyResult, ScriptError, ScriptErrorKind};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The sendable part of a line. Strings inside are templates.
///
/// # Examples
///
/// ```
/// use colloquy_conversation::MessageBody;
///
/// let body = MessageBody::builder()
///     .text(vec!["Hi!".to_string(), "Hello!".to_string()])
///     .build()
///     .unwrap();
/// assert_eq!(body.text().len(), 2);
/// assert!(body.has_content());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Default,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into), default, build_fn(error = "BuilderError"))]
pub struct MessageBody {
    /// Text variants; one is chosen at random per send
    #[serde(default)]
    text: Vec<String>,
    /// Suggested replies
    #[serde(default)]
    quick_replies: Vec<QuickReply>,
    /// Native attachments
    #[serde(default)]
    attachments: Option<Value>,
    /// Channel-specific payload
    #[serde(default)]
    channel_data: Map<String, Value>,
}

impl MessageBody {
    /// Creates a new message body builder.
    pub fn builder() -> MessageBodyBuilder {
        MessageBodyBuilder::default()
    }

    /// Whether sending this body would produce anything.
    pub fn has_content(&self) -> bool {
        !self.text.is_empty()
            || !self.quick_replies.is_empty()
            || self.attachments.is_some()
            || !self.channel_data.is_empty()
    }
}

impl From<&str> for MessageBody {
    fn from(text: &str) -> Self {
        Self {
            text: vec![text.to_string()],
            ..Default::default()
        }
    }
}

impl From<String> for MessageBody {
    fn from(text: String) -> Self {
        Self {
            text: vec![text],
            ..Default::default()
        }
    }
}

/// A control-action token.
///
/// Tokens that name no built-in action are thread jumps.
///
/// # Examples
///
/// ```
/// use colloquy_conversation::ControlAction;
///
/// let action: ControlAction = "stop".parse().unwrap();
/// assert_eq!(action, ControlAction::Stop);
///
/// let jump: ControlAction = "billing".parse().unwrap();
/// assert_eq!(jump, ControlAction::Goto("billing".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    /// Fall through to the next line
    Next,
    /// End with status `completed`
    Complete,
    /// End with status `canceled`
    Stop,
    /// End with status `timeout`
    Timeout,
    /// Re-run the previous line
    Repeat,
    /// Stay on the current question and wait for another reply
    Wait,
    /// Replace this dialog with another script
    ExecuteScript {
        /// Dialog id of the replacement
        script: String,
        /// Thread the replacement starts in
        #[serde(default)]
        thread: Option<String>,
    },
    /// Jump to the start of a thread
    Goto(String),
}

impl ControlAction {
    /// Shorthand for [`ControlAction::ExecuteScript`].
    pub fn execute_script(script: impl Into<String>, thread: Option<&str>) -> Self {
        Self::ExecuteScript {
            script: script.into(),
            thread: thread.map(str::to_string),
        }
    }
}

impl FromStr for ControlAction {
    type Err = ScriptError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Ok(match token {
            "next" => Self::Next,
            "complete" => Self::Complete,
            "stop" => Self::Stop,
            "timeout" => Self::Timeout,
            "repeat" => Self::Repeat,
            "wait" => Self::Wait,
            "execute_script" => {
                return Err(ScriptError::new(ScriptErrorKind::InvalidAction(
                    "execute_script needs a target script; use ControlAction::execute_script"
                        .to_string(),
                )));
            }
            "" => {
                return Err(ScriptError::new(ScriptErrorKind::InvalidAction(
                    "empty action token".to_string(),
                )));
            }
            thread => Self::Goto(thread.to_string()),
        })
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => write!(f, "next"),
            Self::Complete => write!(f, "complete"),
            Self::Stop => write!(f, "stop"),
            Self::Timeout => write!(f, "timeout"),
            Self::Repeat => write!(f, "repeat"),
            Self::Wait => write!(f, "wait"),
            Self::ExecuteScript { script, .. } => write!(f, "execute_script:{}", script),
            Self::Goto(thread) => write!(f, "{}", thread),
        }
    }
}

/// How an option's pattern is written. Both compile to a case-insensitive regex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Plain string pattern
    #[default]
    String,
    /// Regular expression
    Regex,
}

/// What happens when an option wins.
#[derive(Debug, Clone)]
pub enum BranchOutcome {
    /// Dispatch a control action
    Action(ControlAction),
    /// Run a developer callback instead of an action
    Handler(BranchHandler),
}

/// One branch rule evaluated against a reply.
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct CollectOption {
    /// Pattern flavour
    kind: PatternKind,
    /// Source pattern, absent on default options
    pattern: Option<String>,
    /// Whether this is the fallback option
    default: bool,
    /// What to do when the option wins
    outcome: BranchOutcome,
    #[getter(skip)]
    matcher: Option<Regex>,
}

impl CollectOption {
    /// Option matching a string pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern does not compile.
    pub fn string(pattern: impl Into<String>, action: ControlAction) -> ColloquyResult<Self> {
        Self::matching(PatternKind::String, pattern.into(), BranchOutcome::Action(action))
    }

    /// Option matching a regular expression.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern does not compile.
    pub fn regex(pattern: impl Into<String>, action: ControlAction) -> ColloquyResult<Self> {
        Self::matching(PatternKind::Regex, pattern.into(), BranchOutcome::Action(action))
    }

    /// Option matching a pattern and running `handler` when it wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern does not compile.
    pub fn handled(
        kind: PatternKind,
        pattern: impl Into<String>,
        handler: BranchHandler,
    ) -> ColloquyResult<Self> {
        Self::matching(kind, pattern.into(), BranchOutcome::Handler(handler))
    }

    /// Fallback option taken when no pattern matches.
    pub fn fallback(outcome: BranchOutcome) -> Self {
        Self {
            kind: PatternKind::String,
            pattern: None,
            default: true,
            outcome,
            matcher: None,
        }
    }

    /// Fallback option dispatching `action`.
    pub fn fallback_action(action: ControlAction) -> Self {
        Self::fallback(BranchOutcome::Action(action))
    }

    fn matching(kind: PatternKind, pattern: String, outcome: BranchOutcome) -> ColloquyResult<Self> {
        let matcher = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                ScriptError::new(ScriptErrorKind::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })
            })?;
        Ok(Self {
            kind,
            pattern: Some(pattern),
            default: false,
            outcome,
            matcher: Some(matcher),
        })
    }

    /// Whether this (non-default) option's pattern occurs in `reply`.
    pub fn matches(&self, reply: &str) -> bool {
        self.matcher.as_ref().is_some_and(|m| m.is_match(reply))
    }
}

/// Capture and branching rules attached to a question.
///
/// # Examples
///
/// ```
/// use colloquy_conversation::{CollectOption, CollectSpec, ControlAction};
///
/// let collect = CollectSpec::builder()
///     .key("answer")
///     .options(vec![
///         CollectOption::string("^yes$", ControlAction::Goto("thanks".to_string())).unwrap(),
///         CollectOption::fallback_action(ControlAction::Stop),
///     ])
///     .build()
///     .unwrap();
///
/// let winner = collect.select("YES").unwrap();
/// assert!(!winner.default());
/// assert!(*collect.select("maybe").unwrap().default());
/// ```
#[derive(Debug, Clone, Default, derive_getters::Getters, derive_builder::Builder)]
#[builder(default, build_fn(error = "BuilderError"))]
pub struct CollectSpec {
    /// Variable the reply is captured into; no capture when absent
    #[builder(setter(into, strip_option))]
    key: Option<String>,
    /// Append repeated replies instead of overwriting
    multiple: bool,
    /// Branch rules in declaration order
    options: Vec<CollectOption>,
}

impl CollectSpec {
    /// Creates a new collect spec builder.
    pub fn builder() -> CollectSpecBuilder {
        CollectSpecBuilder::default()
    }

    /// Capture into `key` with no branching.
    pub fn capture(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            multiple: false,
            options: Vec::new(),
        }
    }

    /// Capture into `key` and hand every reply to `handler`.
    pub fn with_handler(key: impl Into<String>, handler: BranchHandler) -> Self {
        Self {
            key: Some(key.into()),
            multiple: false,
            options: vec![CollectOption::fallback(BranchOutcome::Handler(handler))],
        }
    }

    /// Picks the winning option for `reply`.
    ///
    /// The first non-default option whose pattern matches wins; otherwise the
    /// first default option, if any.
    pub fn select(&self, reply: &str) -> Option<&CollectOption> {
        self.options
            .iter()
            .filter(|option| !option.default)
            .find(|option| option.matches(reply))
            .or_else(|| self.options.iter().find(|option| option.default))
    }
}

/// One scripted unit.
#[derive(Debug, Clone)]
pub enum Line {
    /// Send a message and move on
    Message(MessageBody),
    /// Ask and wait for a reply
    Question {
        /// What to ask
        body: MessageBody,
        /// How to capture and branch on the reply
        collect: CollectSpec,
    },
    /// Send an optional message, then run a control action
    Action {
        /// Message sent before the action, may be empty
        body: MessageBody,
        /// Action to run
        action: ControlAction,
    },
}

impl Line {
    /// The line's message body.
    pub fn body(&self) -> &MessageBody {
        match self {
            Self::Message(body) | Self::Question { body, .. } | Self::Action { body, .. } => body,
        }
    }

    /// Collect rules, if this line is a question.
    pub fn collect(&self) -> Option<&CollectSpec> {
        match self {
            Self::Question { collect, .. } => Some(collect),
            _ => None,
        }
    }

    /// Trailing action, if this line has one.
    pub fn action(&self) -> Option<&ControlAction> {
        match self {
            Self::Action { action, .. } => Some(action),
            _ => None,
        }
    }
}
