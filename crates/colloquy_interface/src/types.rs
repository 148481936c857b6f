//! Turn result types exchanged with the host.

use colloquy_core::Values;
use serde::{Deserialize, Serialize};

/// Why a step is being run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum DialogReason {
    /// The dialog was just started
    #[display("begin_called")]
    BeginCalled,
    /// A new user turn arrived
    #[display("continue_called")]
    ContinueCalled,
    /// The engine advanced or redirected within a turn
    #[display("next_called")]
    NextCalled,
    /// The dialog was replaced by another
    #[display("replace_called")]
    ReplaceCalled,
}

/// Outcome of one engine invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogTurnStatus {
    /// Suspended; re-invoke on the next user turn
    Waiting,
    /// The dialog ended
    Complete,
    /// The dialog handed off to another script
    Replaced,
}

/// What the engine reports back after a turn.
///
/// # Examples
///
/// ```
/// use colloquy_interface::{DialogTurnResult, DialogTurnStatus};
///
/// let result = DialogTurnResult::waiting();
/// assert_eq!(result.status, DialogTurnStatus::Waiting);
/// assert!(result.values.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogTurnResult {
    /// Turn status
    pub status: DialogTurnStatus,
    /// Snapshot of the final values when the dialog completed
    pub values: Option<Values>,
}

impl DialogTurnResult {
    /// Suspended awaiting input.
    pub fn waiting() -> Self {
        Self {
            status: DialogTurnStatus::Waiting,
            values: None,
        }
    }

    /// Completed with a final snapshot.
    pub fn complete(values: Values) -> Self {
        Self {
            status: DialogTurnStatus::Complete,
            values: Some(values),
        }
    }

    /// Handed off to another dialog.
    pub fn replaced() -> Self {
        Self {
            status: DialogTurnStatus::Replaced,
            values: None,
        }
    }

    /// Whether the dialog is still running.
    pub fn is_waiting(&self) -> bool {
        self.status == DialogTurnStatus::Waiting
    }
}
