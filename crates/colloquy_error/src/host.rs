//! Host framework error types.

/// Failures reported by the turn-delivery framework hosting a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum HostErrorKind {
    /// Outgoing message could not be delivered
    #[display("Failed to send message: {}", _0)]
    SendFailed(String),
    /// Prompt could not be started
    #[display("Failed to start prompt '{}': {}", prompt_id, message)]
    PromptFailed {
        /// Prompt identifier
        prompt_id: String,
        /// Failure reason
        message: String,
    },
    /// No prompt registered under the requested id
    #[display("Prompt '{}' is not registered", _0)]
    PromptNotRegistered(String),
    /// Session handle could not be spawned
    #[display("Failed to spawn session: {}", _0)]
    SpawnFailed(String),
    /// A dialog lifecycle call (end/replace) failed
    #[display("Dialog lifecycle call failed: {}", _0)]
    LifecycleFailed(String),
}

/// Host error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Host Error: {} at line {} in {}", kind, line, file)]
pub struct HostError {
    kind: HostErrorKind,
    line: u32,
    file: &'static str,
}

impl HostError {
    /// Create a new host error with caller location tracking.
    #[track_caller]
    pub fn new(kind: HostErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &HostErrorKind {
        &self.kind
    }
}
