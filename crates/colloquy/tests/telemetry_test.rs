//! Telemetry installed around a real dialog turn.

use colloquy::{
    Conversation, ConversationConfig, DialogState, DialogTurnStatus, InMemoryTurnContext, Script,
    TelemetryConfig, Values, init_telemetry, shutdown_telemetry,
};
use parking_lot::Mutex;
use std::sync::Arc;

#[tokio::test]
async fn test_dialog_turns_run_inside_exported_spans() {
    let config = TelemetryConfig::new("colloquy-test").with_log_level("debug");
    let provider = init_telemetry(&config).unwrap();

    let mut script = Script::new();
    script.say("Hello");
    let mut convo = Conversation::new("greeting", script, ConversationConfig::default()).unwrap();

    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    convo.before("default", move |convo, _bot| {
        let sink = Arc::clone(&sink);
        async move {
            let current = tracing::Span::current();
            *sink.lock() = current.metadata().map(|m| m.name());
            Ok(convo)
        }
    });

    let ctx = InMemoryTurnContext::new("conv-otel");
    let mut state = DialogState::default();
    let result = convo.begin_dialog(&ctx, &mut state, Values::new()).await.unwrap();

    assert_eq!(result.status, DialogTurnStatus::Complete);
    assert_eq!(*seen.lock(), Some("begin_dialog"));
    assert!(shutdown_telemetry(provider).is_ok());
    assert!(init_telemetry(&config).is_err());
}
