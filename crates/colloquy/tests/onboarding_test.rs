//! End-to-end onboarding flow against a host that stores dialog state as JSON
//! between turns.

use async_trait::async_trait;
use colloquy::{
    Activity, BotSession, CollectOption, CollectSpec, ColloquyResult, ControlAction,
    Conversation, ConversationConfig, DialogState, DialogTurnResult, DialogTurnStatus,
    InMemoryTurnContext, MessageBody, OutgoingMessage, QuickReply, Script, TurnContext, Values,
};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// Host that rehydrates state from serialized JSON on every turn.
struct JsonStoreHost {
    inner: InMemoryTurnContext,
    store: Mutex<HashMap<String, String>>,
}

impl JsonStoreHost {
    fn new() -> Self {
        let inner = InMemoryTurnContext::new("conv-42");
        inner.register_prompt("onboarding_prompt");
        Self {
            inner,
            store: Mutex::new(HashMap::new()),
        }
    }

    fn load(&self) -> DialogState {
        self.store
            .lock()
            .get("conv-42")
            .map(|raw| serde_json::from_str(raw).unwrap())
            .unwrap_or_default()
    }

    fn save(&self, state: &DialogState) {
        let raw = serde_json::to_string(state).unwrap();
        self.store.lock().insert("conv-42".to_string(), raw);
    }

    async fn begin(&self, convo: &Conversation) -> DialogTurnResult {
        let mut state = DialogState::default();
        let result = convo.begin_dialog(self, &mut state, Values::new()).await.unwrap();
        self.save(&state);
        result
    }

    async fn reply(&self, convo: &Conversation, text: &str) -> DialogTurnResult {
        let mut state = self.load();
        let result = convo
            .continue_dialog(self, &mut state, &Activity::message(text))
            .await
            .unwrap();
        self.save(&state);
        result
    }
}

#[async_trait]
impl TurnContext for JsonStoreHost {
    async fn send_message(&self, message: &OutgoingMessage) -> ColloquyResult<()> {
        self.inner.send_message(message).await
    }

    async fn prompt(&self, prompt_id: &str, message: &OutgoingMessage) -> ColloquyResult<()> {
        self.inner.prompt(prompt_id, message).await
    }

    async fn spawn(&self) -> ColloquyResult<Arc<dyn BotSession>> {
        self.inner.spawn().await
    }

    async fn end_dialog(&self, result: Option<&str>) -> ColloquyResult<()> {
        self.inner.end_dialog(result).await
    }

    async fn replace_dialog(&self, dialog_id: &str, options: Values) -> ColloquyResult<()> {
        self.inner.replace_dialog(dialog_id, options).await
    }
}

fn onboarding() -> Conversation {
    let mut script = Script::new();
    script.say("Welcome aboard!");
    script.ask("What should we call you?", CollectSpec::capture("name"));

    let plan = MessageBody::builder()
        .text(vec!["Which plan, {{vars.name}}?".to_string()])
        .quick_replies(vec![
            QuickReply {
                title: "Free".to_string(),
                payload: "free".to_string(),
            },
            QuickReply {
                title: "Team".to_string(),
                payload: "team".to_string(),
            },
        ])
        .build()
        .unwrap();
    let plan_options = CollectSpec::builder()
        .key("plan")
        .options(vec![
            CollectOption::regex(r"^(team|business)$", ControlAction::Goto("team".to_string()))
                .unwrap(),
            CollectOption::string("^free$", ControlAction::Next).unwrap(),
            CollectOption::fallback_action(ControlAction::Repeat),
        ])
        .build()
        .unwrap();
    script.ask(plan, plan_options);
    script.say("Enjoy the free plan, {{vars.name}}.");

    let receipt = MessageBody::builder()
        .text(vec!["Team plan confirmed".to_string()])
        .attachments(Some(json!([{ "title": "Receipt for {{vars.name}}" }])))
        .build()
        .unwrap();
    script.add_message("team", receipt);
    script.validate().unwrap();

    let config = ConversationConfig::with_prompt_id("onboarding_prompt");
    let mut convo = Conversation::new("onboarding", script, config)
        .unwrap()
        .with_rng_seed(42);

    convo.on_change("name", |value: String, mut convo, _bot| async move {
        convo.set_var("display_name", value.trim().to_uppercase());
        Ok(convo)
    });
    convo
}

#[tokio::test]
async fn test_team_plan_flow_survives_rehydration() {
    let host = JsonStoreHost::new();
    let convo = onboarding();

    let result = host.begin(&convo).await;
    assert_eq!(result.status, DialogTurnStatus::Waiting);
    assert_eq!(
        host.inner.take_texts(),
        vec!["Welcome aboard!", "What should we call you?"]
    );

    host.reply(&convo, "Ada").await;
    let prompt = host.inner.deliveries().pop().unwrap();
    assert_eq!(prompt.message().text, "Which plan, Ada?");
    assert_eq!(prompt.message().suggested_actions.len(), 2);
    host.inner.take_texts();

    let result = host.reply(&convo, "Business").await;
    assert_eq!(result.status, DialogTurnStatus::Complete);

    let sent = host.inner.deliveries();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message().text, "Team plan confirmed");
    assert_eq!(
        sent[0].message().attachments,
        Some(json!([{ "title": "Receipt for Ada" }]))
    );

    let values = result.values.unwrap();
    assert_eq!(values.get("plan"), Some(&json!("Business")));
    assert_eq!(values.get("display_name"), Some(&json!("ADA")));
    assert_eq!(host.load().thread, "team");
}

#[tokio::test]
async fn test_unrecognized_plan_asks_again() {
    let host = JsonStoreHost::new();
    let convo = onboarding();
    host.begin(&convo).await;
    host.reply(&convo, "Grace").await;
    host.inner.take_texts();

    let result = host.reply(&convo, "enterprise please").await;
    assert!(result.is_waiting());
    assert_eq!(host.inner.take_texts(), vec!["Which plan, Grace?"]);
    assert_eq!(host.load().step_index, 2);

    let result = host.reply(&convo, "free").await;
    assert_eq!(result.status, DialogTurnStatus::Complete);
    assert_eq!(host.inner.texts(), vec!["Enjoy the free plan, Grace."]);
}
