//! Control-action dispatch.

use crate::{BranchHandler, ControlAction, Convo, Script, StepContext, StepPosition};
use colloquy_core::{EndStatus, Values};
use colloquy_error::ColloquyResult;
use colloquy_interface::TurnContext;
use tracing::{debug, warn};

/// A state-machine transition chosen while resolving a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Nothing consumed the step; carry on with normal resolution
    Continue,
    /// Discard the current resolution and resume at a new position
    Restart(StepPosition),
    /// A question was asked; suspend at the current position
    Suspend,
    /// Roll back to the question and wait for another reply
    Wait,
    /// End the dialog with a status tag
    End(EndStatus),
    /// Hand off to another script
    Replace {
        /// Replacement dialog id
        script: String,
        /// Thread it starts in
        thread: Option<String>,
    },
}

/// Resolve an action token against the script.
///
/// Unknown tokens are logged and treated as [`Transition::Continue`].
pub fn dispatch_action(action: &ControlAction, step: &StepContext, script: &Script) -> Transition {
    debug!(action = %action, thread = step.thread(), index = step.index(), "Dispatching action");
    match action {
        ControlAction::Next => Transition::Continue,
        ControlAction::Complete => Transition::End(EndStatus::Completed),
        ControlAction::Stop => Transition::End(EndStatus::Canceled),
        ControlAction::Timeout => Transition::End(EndStatus::Timeout),
        ControlAction::ExecuteScript { script, thread } => Transition::Replace {
            script: script.clone(),
            thread: thread.clone(),
        },
        ControlAction::Repeat => Transition::Restart(StepPosition {
            thread: step.thread().to_string(),
            index: step.index().saturating_sub(1),
        }),
        ControlAction::Wait => Transition::Wait,
        ControlAction::Goto(thread) if script.has_thread(thread) => {
            Transition::Restart(StepPosition {
                thread: thread.clone(),
                index: 0,
            })
        }
        ControlAction::Goto(thread) => {
            warn!(
                action = %thread,
                thread = step.thread(),
                index = step.index(),
                "Action names no control action and no thread; ignoring"
            );
            Transition::Continue
        }
    }
}

/// Run a branch handler in place of an action.
///
/// The handler's variable writes are returned alongside the transition. If it
/// left the position alone the step falls through.
pub async fn dispatch_handler(
    handler: &BranchHandler,
    reply: &str,
    convo: Convo,
    ctx: &dyn TurnContext,
) -> ColloquyResult<(Transition, Values)> {
    let (thread, index) = (convo.thread().to_string(), convo.step_index());
    let bot = ctx.spawn().await?;
    let convo = handler.call(reply.to_string(), convo, bot).await?;
    let moved = convo.moved_from(&thread, index);
    let (thread, index, values) = convo.into_parts();
    let transition = if moved {
        Transition::Restart(StepPosition { thread, index })
    } else {
        Transition::Continue
    };
    Ok((transition, values))
}
