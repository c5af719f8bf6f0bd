//! End-to-end pipeline tests against a mock chat backend.

use async_trait::async_trait;
use interpreter::{Command, CommandError, Pipeline, ReadyState, ScreenBounds};
use llm::{ChatModel, ChatRequest, ChatResponse, LlmError};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock backend with a canned reply.
struct MockChatModel {
    response: String,
    available: bool,
    call_count: AtomicUsize,
}

impl MockChatModel {
    fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            available: true,
            call_count: AtomicUsize::new(0),
        }
    }

    fn unavailable() -> Self {
        Self {
            response: String::new(),
            available: false,
            call_count: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn chat(&self, _request: ChatRequest) -> llm::Result<ChatResponse> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if !self.available {
            return Err(LlmError::ServiceUnavailable("mock backend is down".into()));
        }
        Ok(ChatResponse {
            content: self.response.clone(),
            model: "mock".into(),
        })
    }

    async fn is_available(&self) -> bool {
        self.available
    }
}

fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

async fn ready_pipeline(model: MockChatModel) -> (Pipeline, Arc<MockChatModel>) {
    init_logs();
    let model = Arc::new(model);
    let pipeline = Pipeline::new(model.clone());
    pipeline.probe_backend().await;
    (pipeline, model)
}

#[tokio::test]
async fn screenshot_instruction_produces_bare_screenshot_command() {
    let (pipeline, _) = ready_pipeline(MockChatModel::new(r#"{"action": "screenshot"}"#)).await;

    let command = pipeline.run("take a screenshot").await.unwrap();
    assert_eq!(command, Command::Screenshot);
    assert_eq!(
        serde_json::to_value(&command).unwrap(),
        json!({"action": "screenshot"})
    );
}

#[tokio::test]
async fn unavailable_backend_falls_back_to_generic_tap() {
    let model = Arc::new(MockChatModel::unavailable());
    let pipeline = Pipeline::new(model.clone());
    pipeline.probe_backend().await;
    assert_eq!(pipeline.readiness(), ReadyState::Failed);

    let command = pipeline.run("tap at 2000,3000").await.unwrap();
    assert_eq!(command, Command::Tap { x: 540, y: 960 });
    // The primary stage was skipped entirely, not attempted and failed.
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn unprobed_backend_is_treated_as_unavailable() {
    let model = Arc::new(MockChatModel::new(r#"{"action": "screenshot"}"#));
    let pipeline = Pipeline::new(model.clone());
    assert_eq!(pipeline.readiness(), ReadyState::Unknown);

    let command = pipeline.run("take a screenshot").await.unwrap();
    assert_eq!(command, Command::Screenshot);
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn out_of_range_tap_is_clamped_to_screen() {
    let (pipeline, _) =
        ready_pipeline(MockChatModel::new(r#"{"action": "tap", "x": 2000, "y": 3000}"#)).await;

    let command = pipeline.run("tap at 2000,3000").await.unwrap();
    assert_eq!(command, Command::Tap { x: 1080, y: 1920 });
}

#[tokio::test]
async fn reported_screen_bounds_drive_coordinate_clamping() {
    let model = Arc::new(MockChatModel::new(r#"{"action": "tap", "x": 2000, "y": 3000}"#));
    let pipeline = Pipeline::new(model).with_screen_bounds(ScreenBounds::new(720, 1280));
    pipeline.probe_backend().await;

    let command = pipeline.run("tap the corner").await.unwrap();
    assert_eq!(command, Command::Tap { x: 720, y: 1280 });
}

#[tokio::test]
async fn overdriven_brightness_is_clamped() {
    let (pipeline, _) =
        ready_pipeline(MockChatModel::new(r#"{"action": "brightness", "level": 380}"#)).await;

    let command = pipeline.run("set brightness to 150%").await.unwrap();
    assert_eq!(command, Command::Brightness { level: 255 });
}

#[tokio::test]
async fn invalid_enum_is_rejected_not_coerced() {
    let (pipeline, _) = ready_pipeline(MockChatModel::new(
        r#"{"action": "scroll", "direction": "diagonal"}"#,
    ))
    .await;

    let err = pipeline.run("scroll diagonal").await.unwrap_err();
    match err {
        CommandError::Composite { primary, fallback } => {
            assert!(matches!(*primary, CommandError::InvalidEnumValue { .. }));
            assert!(matches!(*fallback, CommandError::Unparsable));
        }
        other => panic!("expected Composite, got {other:?}"),
    }
}

#[tokio::test]
async fn gibberish_reply_and_no_rule_yields_composite_failure() {
    let (pipeline, model) = ready_pipeline(MockChatModel::new(
        "I am sorry, I do not understand that instruction.",
    ))
    .await;

    let err = pipeline.run("florble the wumpus sideways").await.unwrap_err();
    match err {
        CommandError::Composite { primary, fallback } => {
            assert!(matches!(*primary, CommandError::MalformedResponse(_)));
            assert!(matches!(*fallback, CommandError::Unparsable));
        }
        other => panic!("expected Composite, got {other:?}"),
    }
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn wait_with_non_numeric_suffix_defaults_to_one_second() {
    let model = Arc::new(MockChatModel::unavailable());
    let pipeline = Pipeline::new(model);
    pipeline.probe_backend().await;

    let command = pipeline.run("wait abc").await.unwrap();
    assert_eq!(command, Command::Wait { seconds: 1.0 });
}

#[tokio::test]
async fn prose_wrapped_reply_still_parses() {
    let (pipeline, _) = ready_pipeline(MockChatModel::new(
        "Sure thing! Here is the command:\n```json\n{\"action\": \"wifi\", \"enabled\": true}\n```",
    ))
    .await;

    let command = pipeline.run("turn on wifi please").await.unwrap();
    assert_eq!(command, Command::Wifi { enabled: true });
}

#[tokio::test]
async fn invalid_primary_candidate_falls_back_on_same_text() {
    // Primary proposes an unknown action; the fallback rules still
    // understand the instruction.
    let (pipeline, model) =
        ready_pipeline(MockChatModel::new(r#"{"action": "grab_screen"}"#)).await;

    let command = pipeline.run("take a screenshot").await.unwrap();
    assert_eq!(command, Command::Screenshot);
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn composite_command_failure_names_the_failing_index() {
    let (pipeline, _) = ready_pipeline(MockChatModel::new(
        r#"{"action": "loop", "count": 3, "actions": [
            {"action": "screenshot"},
            {"action": "scroll", "direction": "sideways"}
        ]}"#,
    ))
    .await;

    // The instruction itself matches no fallback rule, so the nested
    // validation failure from the primary stage is what surfaces.
    let err = pipeline.run("repeat that twice").await.unwrap_err();
    let CommandError::Composite { primary, .. } = err else {
        panic!("expected Composite");
    };
    match *primary {
        CommandError::InvalidNested { ref path, .. } => assert_eq!(path, "actions[1]"),
        ref other => panic!("expected InvalidNested, got {other:?}"),
    }
}

#[tokio::test]
async fn nested_composite_command_validates_whole_tree() {
    let (pipeline, _) = ready_pipeline(MockChatModel::new(
        r#"{"action": "conditional",
            "condition": {"method": "text", "value": "Login", "exists": true},
            "then": {"action": "loop", "count": 2, "actions": [{"action": "tap", "x": 9999, "y": 10}]},
            "else": {"action": "key", "keycode": "BACK"}}"#,
    ))
    .await;

    let command = pipeline.run("log in if possible").await.unwrap();
    let Command::Conditional { then, else_branch, .. } = command else {
        panic!("expected conditional");
    };
    // Clamping applied deep inside the nested tree.
    assert_eq!(
        *then,
        Command::Loop {
            count: 2,
            actions: vec![Command::Tap { x: 1080, y: 10 }],
        }
    );
    assert!(else_branch.is_some());
}
