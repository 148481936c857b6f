//! Hook and handler error types.

/// Specific error conditions raised by developer callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum HookErrorKind {
    /// The callback returned an error
    #[display("Hook '{}' failed: {}", hook, message)]
    Failed {
        /// Which hook point failed (e.g. `before:default`, `on_change:name`)
        hook: String,
        /// Error message reported by the callback
        message: String,
    },
}

/// Hook error with location tracking.
///
/// # Examples
///
/// ```
/// use colloquy_error::{HookError, HookErrorKind};
///
/// let err = HookError::new(HookErrorKind::Failed {
///     hook: "after".to_string(),
///     message: "crm unavailable".to_string(),
/// });
/// assert!(format!("{}", err).contains("crm unavailable"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Hook Error: {} at line {} in {}", kind, line, file)]
pub struct HookError {
    kind: HookErrorKind,
    line: u32,
    file: &'static str,
}

impl HookError {
    /// Create a new hook error with caller location tracking.
    #[track_caller]
    pub fn new(kind: HookErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a failed callback at the given hook point.
    #[track_caller]
    pub fn failed(hook: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(HookErrorKind::Failed {
            hook: hook.into(),
            message: message.into(),
        })
    }

    /// Get the error kind.
    pub fn kind(&self) -> &HookErrorKind {
        &self.kind
    }
}
