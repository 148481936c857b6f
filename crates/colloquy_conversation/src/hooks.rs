//! Lifecycle hooks and branch handlers.
//!
//! Callbacks never alias engine state. Each one receives a [`Convo`] by value
//! and hands it back; the engine compares the returned position with the one
//! it passed in to detect a redirect.

use colloquy_core::Values;
use colloquy_interface::{BotSession, TurnContext};
use colloquy_error::ColloquyResult;
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Conversation-scoped control handle passed to hooks and handlers.
///
/// # Examples
///
/// ```
/// use colloquy_conversation::Convo;
///
/// let mut convo = Convo::new("onboarding", "default", 2, Default::default());
/// convo.goto_thread("billing");
/// assert_eq!(convo.thread(), "billing");
/// assert_eq!(convo.step_index(), 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Convo {
    dialog_id: String,
    thread: String,
    step_index: usize,
    values: Values,
}

impl Convo {
    /// A handle positioned at `(thread, step_index)`.
    pub fn new(
        dialog_id: impl Into<String>,
        thread: impl Into<String>,
        step_index: usize,
        values: Values,
    ) -> Self {
        Self {
            dialog_id: dialog_id.into(),
            thread: thread.into(),
            step_index,
            values,
        }
    }

    /// Redirect the conversation to the start of `thread`.
    pub fn goto_thread(&mut self, thread: impl Into<String>) {
        self.thread = thread.into();
        self.step_index = 0;
    }

    /// Store a variable; it is written back to the dialog state.
    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Read a variable.
    pub fn var(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// All variables.
    pub fn values(&self) -> &Values {
        &self.values
    }

    /// Dialog this handle belongs to.
    pub fn dialog_id(&self) -> &str {
        &self.dialog_id
    }

    /// Current thread.
    pub fn thread(&self) -> &str {
        &self.thread
    }

    /// Current step index.
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// Whether the handle now points somewhere other than `(thread, index)`.
    pub fn moved_from(&self, thread: &str, index: usize) -> bool {
        self.thread != thread || self.step_index != index
    }

    pub(crate) fn into_parts(self) -> (String, usize, Values) {
        (self.thread, self.step_index, self.values)
    }
}

/// Future returned by hooks that may redirect the conversation.
pub type ConvoFuture = BoxFuture<'static, ColloquyResult<Convo>>;

type BeforeFn = dyn Fn(Convo, Arc<dyn BotSession>) -> ConvoFuture + Send + Sync;
type ChangeFn = dyn Fn(String, Convo, Arc<dyn BotSession>) -> ConvoFuture + Send + Sync;
type AfterFn = dyn Fn(Values, Arc<dyn BotSession>) -> BoxFuture<'static, ColloquyResult<()>> + Send + Sync;

/// Callback run in place of an action when a collect option wins.
///
/// Receives the raw reply, the control handle and a session handle.
#[derive(Clone)]
pub struct BranchHandler(Arc<ChangeFn>);

impl BranchHandler {
    /// Wrap an async callback.
    ///
    /// # Examples
    ///
    /// ```
    /// use colloquy_conversation::BranchHandler;
    ///
    /// let handler = BranchHandler::new(|reply, mut convo, _bot| async move {
    ///     if reply.contains("help") {
    ///         convo.goto_thread("help");
    ///     }
    ///     Ok(convo)
    /// });
    /// # let _ = handler;
    /// ```
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(String, Convo, Arc<dyn BotSession>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ColloquyResult<Convo>> + Send + 'static,
    {
        Self(Arc::new(
            move |reply: String, convo: Convo, bot: Arc<dyn BotSession>| -> ConvoFuture {
                Box::pin(handler(reply, convo, bot))
            },
        ))
    }

    /// Run the handler.
    pub async fn call(
        &self,
        reply: String,
        convo: Convo,
        bot: Arc<dyn BotSession>,
    ) -> ColloquyResult<Convo> {
        (self.0)(reply, convo, bot).await
    }
}

impl fmt::Debug for BranchHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BranchHandler(..)")
    }
}

/// Registry of before, after and on-change hooks.
///
/// Hooks of one kind run sequentially in registration order.
#[derive(Default)]
pub struct HookRegistry {
    before: HashMap<String, Vec<Arc<BeforeFn>>>,
    after: Vec<Arc<AfterFn>>,
    on_change: HashMap<String, Vec<Arc<ChangeFn>>>,
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("before", &self.before.keys().collect::<Vec<_>>())
            .field("after", &self.after.len())
            .field("on_change", &self.on_change.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `hook` whenever the dialog enters `thread` from a different thread.
    pub fn before<F, Fut>(&mut self, thread: impl Into<String>, hook: F)
    where
        F: Fn(Convo, Arc<dyn BotSession>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ColloquyResult<Convo>> + Send + 'static,
    {
        let hook: Arc<BeforeFn> =
            Arc::new(move |convo: Convo, bot: Arc<dyn BotSession>| -> ConvoFuture {
                Box::pin(hook(convo, bot))
            });
        self.before.entry(thread.into()).or_default().push(hook);
    }

    /// Run `hook` once when the dialog ends, with a snapshot of the final values.
    pub fn after<F, Fut>(&mut self, hook: F)
    where
        F: Fn(Values, Arc<dyn BotSession>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ColloquyResult<()>> + Send + 'static,
    {
        let hook: Arc<AfterFn> = Arc::new(
            move |values: Values, bot: Arc<dyn BotSession>| -> BoxFuture<'static, ColloquyResult<()>> {
                Box::pin(hook(values, bot))
            },
        );
        self.after.push(hook);
    }

    /// Run `hook` right after a reply is captured into `key`.
    pub fn on_change<F, Fut>(&mut self, key: impl Into<String>, hook: F)
    where
        F: Fn(String, Convo, Arc<dyn BotSession>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ColloquyResult<Convo>> + Send + 'static,
    {
        let hook: Arc<ChangeFn> = Arc::new(
            move |value: String, convo: Convo, bot: Arc<dyn BotSession>| -> ConvoFuture {
                Box::pin(hook(value, convo, bot))
            },
        );
        self.on_change.entry(key.into()).or_default().push(hook);
    }

    /// Whether any before hook is registered for `thread`.
    pub fn has_before(&self, thread: &str) -> bool {
        self.before.get(thread).is_some_and(|hooks| !hooks.is_empty())
    }

    pub(crate) async fn run_before(
        &self,
        thread: &str,
        mut convo: Convo,
        ctx: &dyn TurnContext,
    ) -> ColloquyResult<Convo> {
        let Some(hooks) = self.before.get(thread).filter(|hooks| !hooks.is_empty()) else {
            return Ok(convo);
        };
        debug!(thread = %thread, count = hooks.len(), "Running before hooks");
        let bot = ctx.spawn().await?;
        for hook in hooks {
            convo = hook(convo, Arc::clone(&bot)).await?;
        }
        Ok(convo)
    }

    pub(crate) async fn run_on_change(
        &self,
        key: &str,
        value: &str,
        mut convo: Convo,
        ctx: &dyn TurnContext,
    ) -> ColloquyResult<Convo> {
        let Some(hooks) = self.on_change.get(key).filter(|hooks| !hooks.is_empty()) else {
            return Ok(convo);
        };
        debug!(key = %key, count = hooks.len(), "Running on_change hooks");
        let bot = ctx.spawn().await?;
        for hook in hooks {
            convo = hook(value.to_string(), convo, Arc::clone(&bot)).await?;
        }
        Ok(convo)
    }

    pub(crate) async fn run_after(&self, values: &Values, ctx: &dyn TurnContext) -> ColloquyResult<()> {
        if self.after.is_empty() {
            return Ok(());
        }
        debug!(count = self.after.len(), "Running after hooks");
        let bot = ctx.spawn().await?;
        for hook in &self.after {
            hook(values.clone(), Arc::clone(&bot)).await?;
        }
        Ok(())
    }
}
