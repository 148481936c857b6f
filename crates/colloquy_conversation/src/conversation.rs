//! Step execution engine.
//!
//! A [`Conversation`] interprets a [`Script`] one user turn at a time. Each
//! invocation reads the host-owned [`DialogState`], emits zero or more
//! messages, and leaves the state at the point the next turn resumes from.
//!
//! A turn is resolved on a working copy of the state. Captured values (and
//! whatever the on-change hooks wrote) are committed as soon as those hooks
//! succeed; the resumption point is committed only when the whole turn
//! resolves. A failing handler therefore keeps the capture but replays the
//! same step on the next turn. A begin that fails leaves the dialog unstarted,
//! and the next turn begins it again.

use crate::dispatch::{Transition, dispatch_action, dispatch_handler};
use crate::{
    BranchOutcome, CollectSpec, ConversationConfig, Convo, HookRegistry, Line, MessageBody,
    Script, StepContext, StepPosition, TemplateRenderer,
};
use colloquy_core::{Activity, DialogState, OutgoingMessage, Values};
use colloquy_error::{ColloquyResult, JsonError, ScriptError, ScriptErrorKind};
use colloquy_interface::{BotSession, DialogReason, DialogTurnResult, TurnContext};
use futures::Future;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Key the terminal status tag is written under.
pub const STATUS_KEY: &str = "_status";

/// A scripted dialog: script, hooks and settings.
///
/// # Example
///
/// ```rust,ignore
/// use colloquy_conversation::{CollectSpec, Conversation, ConversationConfig, Script};
///
/// let mut script = Script::new();
/// script.say("Hi");
/// script.ask("Name?", CollectSpec::capture("name"));
/// script.say("Hi {{vars.name}}");
///
/// let conversation = Conversation::new("onboarding", script, ConversationConfig::default())?;
///
/// // First turn
/// let mut state = DialogState::default();
/// conversation.begin_dialog(&ctx, &mut state, Values::new()).await?;
///
/// // Every later turn
/// conversation.continue_dialog(&ctx, &mut state, &activity).await?;
/// ```
#[derive(Debug)]
pub struct Conversation {
    id: String,
    script: Script,
    hooks: HookRegistry,
    config: ConversationConfig,
    renderer: TemplateRenderer,
    rng: Mutex<StdRng>,
}

impl Conversation {
    /// Create a conversation over a finished script.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(
        id: impl Into<String>,
        script: Script,
        config: ConversationConfig,
    ) -> ColloquyResult<Self> {
        config.validate()?;
        Ok(Self {
            id: id.into(),
            script,
            hooks: HookRegistry::new(),
            config,
            renderer: TemplateRenderer::new()?,
            rng: Mutex::new(StdRng::from_entropy()),
        })
    }

    /// Use a seeded generator for text variant selection.
    pub fn with_rng_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    /// Dialog identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The script being run.
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Active configuration.
    pub fn config(&self) -> &ConversationConfig {
        &self.config
    }

    /// Register a hook run when the dialog enters `thread` from another thread.
    pub fn before<F, Fut>(&mut self, thread: impl Into<String>, hook: F)
    where
        F: Fn(Convo, Arc<dyn BotSession>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ColloquyResult<Convo>> + Send + 'static,
    {
        self.hooks.before(thread, hook);
    }

    /// Register a hook run once when the dialog ends.
    pub fn after<F, Fut>(&mut self, hook: F)
    where
        F: Fn(Values, Arc<dyn BotSession>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ColloquyResult<()>> + Send + 'static,
    {
        self.hooks.after(hook);
    }

    /// Register a hook run right after a reply is captured into `key`.
    pub fn on_change<F, Fut>(&mut self, key: impl Into<String>, hook: F)
    where
        F: Fn(String, Convo, Arc<dyn BotSession>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ColloquyResult<Convo>> + Send + 'static,
    {
        self.hooks.on_change(key, hook);
    }

    /// Start the dialog.
    ///
    /// `values` starts as a copy of `options`. The dialog opens in
    /// `options.thread` when it names a thread, else the configured default.
    ///
    /// # Errors
    ///
    /// Returns an error if the starting thread does not exist, or if a hook or
    /// the host fails.
    #[instrument(skip(self, ctx, state, options), fields(dialog = %self.id))]
    pub async fn begin_dialog(
        &self,
        ctx: &dyn TurnContext,
        state: &mut DialogState,
        options: Values,
    ) -> ColloquyResult<DialogTurnResult> {
        let thread = match options.get("thread") {
            Some(Value::String(thread)) => thread.clone(),
            _ => self.config.default_thread().clone(),
        };
        info!(thread = %thread, "Beginning dialog");

        // No current thread yet, so entering the first one runs its before hooks.
        *state = DialogState::new(String::new(), options);
        self.run_step(
            ctx,
            state,
            StepPosition { thread, index: 0 },
            DialogReason::BeginCalled,
            None,
        )
        .await
    }

    /// Start the dialog with options taken from a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns an error if `options` is not a JSON object, or as
    /// [`Conversation::begin_dialog`].
    pub async fn begin_dialog_json(
        &self,
        ctx: &dyn TurnContext,
        state: &mut DialogState,
        options: &Value,
    ) -> ColloquyResult<DialogTurnResult> {
        let Value::Object(map) = options else {
            return Err(JsonError::new("dialog options must be a JSON object").into());
        };
        let options = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        self.begin_dialog(ctx, state, options).await
    }

    /// Deliver an incoming activity.
    ///
    /// Non-message activities leave the dialog untouched.
    ///
    /// # Errors
    ///
    /// See [`Conversation::resume_dialog`].
    #[instrument(skip(self, ctx, state, activity), fields(dialog = %self.id, kind = %activity.kind))]
    pub async fn continue_dialog(
        &self,
        ctx: &dyn TurnContext,
        state: &mut DialogState,
        activity: &Activity,
    ) -> ColloquyResult<DialogTurnResult> {
        if !activity.is_message() {
            debug!("Ignoring non-message activity");
            return Ok(DialogTurnResult::waiting());
        }
        self.resume_dialog(ctx, state, DialogReason::ContinueCalled, activity.text.clone())
            .await
    }

    /// Resume after the step the state points at, with `result` as the reply.
    ///
    /// A step that waited is run again rather than skipped. A dialog whose
    /// begin failed before entering a thread is begun again with its original
    /// options, and `result` is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the state points at an unknown thread, or if a hook
    /// or the host fails.
    #[instrument(skip(self, ctx, state, result), fields(dialog = %self.id, thread = %state.thread, index = state.step_index))]
    pub async fn resume_dialog(
        &self,
        ctx: &dyn TurnContext,
        state: &mut DialogState,
        reason: DialogReason,
        result: Option<String>,
    ) -> ColloquyResult<DialogTurnResult> {
        if !state.is_started() {
            info!("Dialog never entered a thread, beginning again");
            let options = state.options.clone();
            return self.begin_dialog(ctx, state, options).await;
        }

        let position = StepPosition {
            thread: state.thread.clone(),
            index: state.resume_index(),
        };
        self.run_step(ctx, state, position, reason, result).await
    }

    /// Resolve steps from `position` until the turn suspends or the dialog ends.
    async fn run_step(
        &self,
        ctx: &dyn TurnContext,
        state: &mut DialogState,
        mut position: StepPosition,
        mut reason: DialogReason,
        mut reply: Option<String>,
    ) -> ColloquyResult<DialogTurnResult> {
        let mut working = state.clone();
        let budget = *self.config.max_steps_per_turn();
        let mut steps = 0;

        let outcome = loop {
            let lines = self.script.thread(&position.thread).ok_or_else(|| {
                ScriptError::new(ScriptErrorKind::UnknownThread(position.thread.clone()))
            })?;

            if position.index >= lines.len() {
                debug!(thread = %position.thread, "Reached end of thread");
                break self.end(ctx, &mut working, reply.as_deref()).await?;
            }

            if steps == budget {
                warn!(
                    thread = %position.thread,
                    index = position.index,
                    budget,
                    "Step budget exhausted, suspending turn"
                );
                if position.thread == working.thread {
                    working.step_index = position.index;
                    working.replay = true;
                }
                break DialogTurnResult::waiting();
            }
            steps += 1;

            working.step_index = position.index;
            working.replay = false;
            let previous_thread = std::mem::replace(&mut working.thread, position.thread.clone());
            let mut step = StepContext::new(
                self.id.as_str(),
                position.thread.as_str(),
                position.index,
                reason,
                reply.take(),
            );

            if position.index == 0 && previous_thread != position.thread {
                let convo = self
                    .hooks
                    .run_before(&position.thread, self.convo(&working, &step), ctx)
                    .await?;
                if let Some(redirect) = absorb(&mut working, convo, &step) {
                    debug!(
                        from = %position.thread,
                        to = %redirect.thread,
                        "Before hook redirected"
                    );
                    position = redirect;
                    reason = DialogReason::NextCalled;
                    continue;
                }
            }

            let transition = self.on_step(ctx, state, &mut working, &step, lines).await?;
            debug!(
                thread = step.thread(),
                index = step.index(),
                transition = ?transition,
                "Step resolved"
            );
            match transition {
                Transition::Continue => {
                    position = step.next()?;
                    reason = DialogReason::NextCalled;
                }
                Transition::Restart(target) => {
                    position = target;
                    reason = DialogReason::NextCalled;
                }
                Transition::Suspend => break DialogTurnResult::waiting(),
                Transition::Wait => {
                    working.replay = true;
                    break DialogTurnResult::waiting();
                }
                Transition::End(status) => {
                    working
                        .values
                        .insert(STATUS_KEY.to_string(), Value::String(status.to_string()));
                    break self.end(ctx, &mut working, step.reply()).await?;
                }
                Transition::Replace { script, thread } => {
                    let mut options = Values::new();
                    if let Some(thread) = thread {
                        options.insert("thread".to_string(), Value::String(thread));
                    }
                    options.extend(working.values.clone());
                    info!(script = %script, "Replacing dialog");
                    ctx.replace_dialog(&script, options).await?;
                    break DialogTurnResult::replaced();
                }
            }
        };

        *state = working;
        Ok(outcome)
    }

    /// Interpret one line: capture and branch on the reply to the previous
    /// question, then prompt, send, or act.
    async fn on_step(
        &self,
        ctx: &dyn TurnContext,
        committed: &mut DialogState,
        working: &mut DialogState,
        step: &StepContext,
        lines: &[Line],
    ) -> ColloquyResult<Transition> {
        let previous = collect_before(lines, step.index());
        if let (Some(reply), Some(collect)) = (step.reply(), previous) {
            if let Some(key) = collect.key() {
                self.capture(working, key, reply, *collect.multiple());

                let convo = self
                    .hooks
                    .run_on_change(key, reply, self.convo(working, step), ctx)
                    .await?;
                let redirect = absorb(working, convo, step);
                committed.values = working.values.clone();

                if let Some(redirect) = redirect {
                    debug!(key = %key, to = %redirect.thread, "on_change hook redirected");
                    return Ok(Transition::Restart(redirect));
                }
            }

            if let Some(option) = collect.select(reply) {
                let transition = match option.outcome() {
                    BranchOutcome::Action(action) => dispatch_action(action, step, &self.script),
                    BranchOutcome::Handler(handler) => {
                        let (transition, values) =
                            dispatch_handler(handler, reply, self.convo(working, step), ctx)
                                .await?;
                        working.values = values;
                        transition
                    }
                };
                if transition != Transition::Continue {
                    return Ok(transition);
                }
            }
        }

        let Some(line) = lines.get(step.index()) else {
            return Ok(Transition::Continue);
        };
        match line {
            Line::Question { body, .. } => {
                let outgoing = self.render(body, &working.values);
                match ctx.prompt(self.config.prompt_id(), &outgoing).await {
                    Ok(()) => Ok(Transition::Suspend),
                    Err(e) => {
                        error!(
                            prompt_id = %self.config.prompt_id(),
                            error = %e,
                            "Failed to start prompt"
                        );
                        ctx.send_message(&OutgoingMessage::text(self.config.prompt_failure_text()))
                            .await?;
                        Ok(Transition::Continue)
                    }
                }
            }
            Line::Message(body) => {
                self.send(ctx, body, &working.values).await?;
                Ok(Transition::Continue)
            }
            Line::Action { body, action } => {
                self.send(ctx, body, &working.values).await?;
                Ok(dispatch_action(action, step, &self.script))
            }
        }
    }

    /// Store `reply` under `key`, appending when the question collects multiple replies.
    fn capture(&self, state: &mut DialogState, key: &str, reply: &str, multiple: bool) {
        let value = match state.value_text(key) {
            Some(existing) if multiple && !existing.is_empty() => {
                format!("{}{}{}", existing, self.config.capture_separator(), reply)
            }
            _ => reply.to_string(),
        };
        debug!(key = %key, multiple, "Captured reply");
        state.values.insert(key.to_string(), Value::String(value));
    }

    async fn send(
        &self,
        ctx: &dyn TurnContext,
        body: &MessageBody,
        values: &Values,
    ) -> ColloquyResult<()> {
        if body.has_content() {
            ctx.send_message(&self.render(body, values)).await?;
        }
        Ok(())
    }

    fn render(&self, body: &MessageBody, values: &Values) -> OutgoingMessage {
        let mut rng = self.rng.lock();
        self.renderer.make_outgoing(body, values, &mut *rng)
    }

    fn convo(&self, state: &DialogState, step: &StepContext) -> Convo {
        Convo::new(
            self.id.as_str(),
            step.thread(),
            step.index(),
            state.values.clone(),
        )
    }

    /// Terminal sequence: snapshot values, end on the host, run after hooks.
    async fn end(
        &self,
        ctx: &dyn TurnContext,
        state: &mut DialogState,
        result: Option<&str>,
    ) -> ColloquyResult<DialogTurnResult> {
        let snapshot = state.values.clone();
        info!(status = ?snapshot.get(STATUS_KEY), "Dialog complete");
        ctx.end_dialog(result).await?;
        self.hooks.run_after(&snapshot, ctx).await?;
        Ok(DialogTurnResult::complete(snapshot))
    }
}

/// Collect rules of the question just before `index`, if there is one.
fn collect_before(lines: &[Line], index: usize) -> Option<&CollectSpec> {
    index
        .checked_sub(1)
        .and_then(|i| lines.get(i))
        .and_then(Line::collect)
}

/// Fold a hook's handle back into the working state, returning the new
/// position if the hook moved the conversation.
fn absorb(state: &mut DialogState, convo: Convo, step: &StepContext) -> Option<StepPosition> {
    let moved = convo.moved_from(step.thread(), step.index());
    let (thread, index, values) = convo.into_parts();
    state.values = values;
    moved.then_some(StepPosition { thread, index })
}
