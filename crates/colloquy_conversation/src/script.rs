//! Script store: named threads of lines.

use crate::{BranchOutcome, CollectSpec, ControlAction, Line, MessageBody};
use colloquy_error::{ColloquyResult, ScriptError, ScriptErrorKind};
use std::collections::HashMap;
use tracing::debug;

/// Name of the thread `say`/`ask` append to.
pub const DEFAULT_THREAD: &str = "default";

/// Named threads, each an ordered sequence of lines.
///
/// Built once before execution; the engine only reads it.
///
/// # Example
///
/// ```
/// use colloquy_conversation::{CollectSpec, Script};
///
/// let mut script = Script::new();
/// script.say("Hi");
/// script.ask("Name?", CollectSpec::capture("name"));
/// script.say("Hi {{vars.name}}");
///
/// assert_eq!(script.thread("default").map(|t| t.len()), Some(3));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Script {
    threads: HashMap<String, Vec<Line>>,
}

impl Script {
    /// An empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `line` to `thread`, creating the thread if absent.
    pub fn add_line(&mut self, thread: impl Into<String>, line: Line) {
        let thread = thread.into();
        debug!(thread = %thread, "Adding line");
        self.threads.entry(thread).or_default().push(line);
    }

    /// Append a message line to `thread`.
    pub fn add_message(&mut self, thread: impl Into<String>, body: impl Into<MessageBody>) {
        self.add_line(thread, Line::Message(body.into()));
    }

    /// Append a question line to `thread`.
    pub fn add_question(
        &mut self,
        thread: impl Into<String>,
        body: impl Into<MessageBody>,
        collect: CollectSpec,
    ) {
        self.add_line(
            thread,
            Line::Question {
                body: body.into(),
                collect,
            },
        );
    }

    /// Append a line that sends `body` (may be empty) and then runs `action`.
    pub fn add_action(
        &mut self,
        thread: impl Into<String>,
        body: impl Into<MessageBody>,
        action: ControlAction,
    ) {
        self.add_line(
            thread,
            Line::Action {
                body: body.into(),
                action,
            },
        );
    }

    /// Append a message to the default thread.
    pub fn say(&mut self, body: impl Into<MessageBody>) {
        self.add_message(DEFAULT_THREAD, body);
    }

    /// Append a question to the default thread.
    pub fn ask(&mut self, body: impl Into<MessageBody>, collect: CollectSpec) {
        self.add_question(DEFAULT_THREAD, body, collect);
    }

    /// Lines of `thread`, in execution order.
    pub fn thread(&self, name: &str) -> Option<&[Line]> {
        self.threads.get(name).map(Vec::as_slice)
    }

    /// Whether `name` is a thread of this script.
    pub fn has_thread(&self, name: &str) -> bool {
        self.threads.contains_key(name)
    }

    /// Thread names, sorted.
    pub fn thread_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.threads.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Check every jump target names a thread.
    ///
    /// The engine tolerates dangling jumps at runtime (logged and ignored); this
    /// catches them while authoring.
    ///
    /// # Errors
    ///
    /// Returns `UnknownThread` for the first jump to a missing thread.
    pub fn validate(&self) -> ColloquyResult<()> {
        for name in self.thread_names() {
            let lines = self.threads.get(name).map(Vec::as_slice).unwrap_or_default();
            for line in lines {
                let mut targets: Vec<&ControlAction> = line.action().into_iter().collect();
                if let Some(collect) = line.collect() {
                    targets.extend(collect.options().iter().filter_map(|option| {
                        match option.outcome() {
                            BranchOutcome::Action(action) => Some(action),
                            BranchOutcome::Handler(_) => None,
                        }
                    }));
                }
                for action in targets {
                    if let ControlAction::Goto(target) = action {
                        if !self.has_thread(target) {
                            return Err(ScriptError::new(ScriptErrorKind::UnknownThread(
                                target.clone(),
                            ))
                            .into());
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
