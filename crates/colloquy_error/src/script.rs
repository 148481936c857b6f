//! Scripting error types.

/// Specific error conditions caused by a mistake in a script or in its use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ScriptErrorKind {
    /// The single-use step continuation was invoked a second time
    #[display(
        "ScriptedStepContext.next(): method already called for dialog and step '{}[{}]' in thread '{}'",
        dialog,
        index,
        thread
    )]
    ContinuationReused {
        /// Dialog identifier
        dialog: String,
        /// Thread the step belongs to
        thread: String,
        /// Step index within the thread
        index: usize,
    },
    /// An action token names no known control action and no thread
    #[display("Action '{}' does not name a control action or an existing thread", _0)]
    UnknownThread(String),
    /// A collect option pattern does not compile
    #[display("Invalid pattern '{}': {}", pattern, message)]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Compiler message
        message: String,
    },
    /// A control action token could not be parsed
    #[display("Invalid action: {}", _0)]
    InvalidAction(String),
}

/// Error type for scripting mistakes.
///
/// # Examples
///
/// ```
/// use colloquy_error::{ScriptError, ScriptErrorKind};
///
/// let err = ScriptError::new(ScriptErrorKind::UnknownThread("billing".to_string()));
/// assert!(format!("{}", err).contains("billing"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Script Error: {} at line {} in {}", kind, line, file)]
pub struct ScriptError {
    /// The specific error condition
    pub kind: ScriptErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ScriptError {
    /// Create a new ScriptError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ScriptErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
