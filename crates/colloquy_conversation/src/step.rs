//! Per-invocation step context.

use colloquy_error::{ColloquyResult, ScriptError, ScriptErrorKind};
use colloquy_interface::DialogReason;

/// A position inside a script.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepPosition {
    /// Thread name
    pub thread: String,
    /// Line index within the thread
    pub index: usize,
}

/// Ephemeral view of the step being resolved.
///
/// Owns a single-use continuation: [`StepContext::next`] yields the following
/// position once and fails on every later call.
#[derive(Debug)]
pub struct StepContext {
    dialog_id: String,
    position: StepPosition,
    reason: DialogReason,
    reply: Option<String>,
    next_called: bool,
}

impl StepContext {
    /// Context for `(thread, index)` carrying an optional user reply.
    pub fn new(
        dialog_id: impl Into<String>,
        thread: impl Into<String>,
        index: usize,
        reason: DialogReason,
        reply: Option<String>,
    ) -> Self {
        Self {
            dialog_id: dialog_id.into(),
            position: StepPosition {
                thread: thread.into(),
                index,
            },
            reason,
            reply,
            next_called: false,
        }
    }

    /// Thread being resolved.
    pub fn thread(&self) -> &str {
        &self.position.thread
    }

    /// Index being resolved.
    pub fn index(&self) -> usize {
        self.position.index
    }

    /// Why this step runs.
    pub fn reason(&self) -> DialogReason {
        self.reason
    }

    /// The user's reply, when one arrived with this invocation and is non-empty.
    pub fn reply(&self) -> Option<&str> {
        self.reply.as_deref().filter(|reply| !reply.is_empty())
    }

    /// Consume the continuation, yielding the following position.
    ///
    /// # Errors
    ///
    /// Returns `ContinuationReused` when called more than once.
    pub fn next(&mut self) -> ColloquyResult<StepPosition> {
        if self.next_called {
            return Err(ScriptError::new(ScriptErrorKind::ContinuationReused {
                dialog: self.dialog_id.clone(),
                thread: self.position.thread.clone(),
                index: self.position.index,
            })
            .into());
        }
        self.next_called = true;
        Ok(StepPosition {
            thread: self.position.thread.clone(),
            index: self.position.index + 1,
        })
    }
}
