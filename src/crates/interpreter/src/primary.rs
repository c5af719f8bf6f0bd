//! Model-backed primary interpreter.
//!
//! Sends the instruction together with a system prompt enumerating every
//! action schema to the language-model backend, then extracts the first
//! well-formed JSON object from the free-form reply. The model is not
//! trusted to emit only JSON, and nothing here is semantic validation —
//! the candidate goes to the validator untouched.

use crate::command::RawCommand;
use crate::error::{CommandError, Result};
use crate::registry::Registry;
use llm::{ChatMessage, ChatModel, ChatRequest};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Example text → command pairs shown to the model.
static EXAMPLES: &[(&str, &str)] = &[
    ("Take a screenshot", r#"{"action": "screenshot"}"#),
    ("Record screen for 30 seconds", r#"{"action": "screen_record", "duration": 30}"#),
    ("Go back", r#"{"action": "key", "keycode": "BACK"}"#),
    ("Open camera", r#"{"action": "app", "package": "com.android.camera"}"#),
    ("Type hello world", r#"{"action": "type", "text": "hello world"}"#),
    ("Scroll down", r#"{"action": "scroll", "direction": "down"}"#),
    (
        "Long press in the center",
        r#"{"action": "long_press", "x": 540, "y": 960, "duration": 1000}"#,
    ),
    ("Turn on WiFi", r#"{"action": "wifi", "enabled": true}"#),
    ("Set brightness to 50%", r#"{"action": "brightness", "level": 128}"#),
    ("Rotate to landscape", r#"{"action": "rotate", "orientation": "landscape"}"#),
    ("Enable dark mode", r#"{"action": "dark_mode", "enabled": true}"#),
    ("Get device info", r#"{"action": "get_device_info"}"#),
    (
        "Find element with text Login",
        r#"{"action": "find_element", "method": "text", "value": "Login"}"#,
    ),
    (
        "Swipe from left to right",
        r#"{"action": "swipe", "start_x": 100, "start_y": 960, "end_x": 980, "end_y": 960, "duration": 300}"#,
    ),
    ("Pinch to zoom out", r#"{"action": "pinch", "x": 540, "y": 960, "scale": 0.5}"#),
    ("Open notification panel", r#"{"action": "notification_panel", "expand": true}"#),
    ("Turn on flashlight", r#"{"action": "flashlight", "enabled": true}"#),
    ("Reboot device", r#"{"action": "reboot", "mode": "normal"}"#),
    ("Wait 3 seconds", r#"{"action": "wait", "seconds": 3}"#),
];

/// Interprets instructions by asking the language-model backend.
pub struct PrimaryInterpreter {
    model: Arc<dyn ChatModel>,
    system_prompt: String,
}

impl PrimaryInterpreter {
    /// Build an interpreter whose prompt catalog is rendered from the
    /// registry, so prompt and validator describe the same actions.
    pub fn new(model: Arc<dyn ChatModel>, registry: &Registry) -> Self {
        Self {
            model,
            system_prompt: build_system_prompt(registry),
        }
    }

    /// The rendered system prompt (catalog plus examples).
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Ask the backend to translate `text` into a raw command candidate.
    pub async fn interpret(&self, text: &str) -> Result<RawCommand> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(format!("Convert this command: \"{text}\"")),
        ])
        .with_temperature(0.1)
        .with_top_p(0.9)
        .with_num_predict(200);

        let response = self.model.chat(request).await.map_err(CommandError::from)?;
        debug!(model = %response.model, "backend replied");

        let object = extract_object(&response.content).ok_or_else(|| {
            CommandError::MalformedResponse(format!(
                "no JSON object in model reply: {}",
                preview(&response.content)
            ))
        })?;

        Ok(RawCommand::from(object))
    }
}

/// Render the model-facing catalog from the schema registry.
fn build_system_prompt(registry: &Registry) -> String {
    let mut prompt = String::from(
        "You are an Android device controller. Convert natural language commands \
         into structured JSON actions.\n\nAvailable actions:\n",
    );

    for schema in registry.schemas() {
        prompt.push_str("- ");
        prompt.push_str(schema.name);
        prompt.push_str(": {\"action\": \"");
        prompt.push_str(schema.name);
        prompt.push('"');
        for field in &schema.fields {
            prompt.push_str(", \"");
            prompt.push_str(field.name);
            prompt.push_str("\": ");
            prompt.push_str(&field.kind.prompt_hint());
        }
        prompt.push_str("}\n");
    }

    prompt.push_str("\nExamples:\n");
    for (user, reply) in EXAMPLES {
        prompt.push_str("User: \"");
        prompt.push_str(user);
        prompt.push_str("\"\nResponse: ");
        prompt.push_str(reply);
        prompt.push_str("\n\n");
    }

    prompt.push_str("IMPORTANT: Respond ONLY with valid JSON. No explanations or additional text.");
    prompt
}

/// Extract the first parseable JSON object from free-form model output.
///
/// Fenced code blocks are preferred when present; otherwise the text is
/// scanned for a balanced `{...}` span that parses.
pub(crate) fn extract_object(text: &str) -> Option<Map<String, Value>> {
    for fence in ["```json", "```"] {
        if let Some(start) = text.find(fence) {
            let body = &text[start + fence.len()..];
            let inner = match body.find("```") {
                Some(end) => &body[..end],
                None => body,
            };
            if let Some(obj) = first_balanced_object(inner) {
                return Some(obj);
            }
        }
    }

    first_balanced_object(text)
}

/// Scan for the first balanced brace span that parses as a JSON object.
/// Candidates that fail to parse are skipped by restarting one byte past
/// their opening brace, so objects nested in broken surroundings are
/// still found.
fn first_balanced_object(text: &str) -> Option<Map<String, Value>> {
    let bytes = text.as_bytes();
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        let mut end = None;

        for (i, &b) in bytes.iter().enumerate().skip(start) {
            if in_string {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_string = false;
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }

        match end {
            Some(end) => {
                if let Ok(Value::Object(map)) = serde_json::from_str(&text[start..=end]) {
                    return Some(map);
                }
                search_from = start + 1;
            }
            // Unbalanced tail; a later opening brace cannot close either.
            None => return None,
        }
    }

    None
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(80) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_bare_object() {
        let obj = extract_object(r#"{"action": "screenshot"}"#).unwrap();
        assert_eq!(Value::Object(obj), json!({"action": "screenshot"}));
    }

    #[test]
    fn test_extract_object_surrounded_by_prose() {
        let text = r#"Sure! The command you want is {"action": "tap", "x": 10, "y": 20} — done."#;
        let obj = extract_object(text).unwrap();
        assert_eq!(Value::Object(obj), json!({"action": "tap", "x": 10, "y": 20}));
    }

    #[test]
    fn test_extract_from_json_fence() {
        let text = "Here you go:\n```json\n{\"action\": \"wifi\", \"enabled\": true}\n```\nAnything else?";
        let obj = extract_object(text).unwrap();
        assert_eq!(Value::Object(obj), json!({"action": "wifi", "enabled": true}));
    }

    #[test]
    fn test_extract_nested_object() {
        let text = r#"{"action": "loop", "count": 2, "actions": [{"action": "tap", "x": 1, "y": 2}]}"#;
        let obj = extract_object(text).unwrap();
        assert_eq!(obj.get("count"), Some(&json!(2)));
        assert!(obj.get("actions").unwrap().is_array());
    }

    #[test]
    fn test_extract_skips_broken_candidate() {
        let text = r#"{oops not json} but then {"action": "paste"}"#;
        let obj = extract_object(text).unwrap();
        assert_eq!(Value::Object(obj), json!({"action": "paste"}));
    }

    #[test]
    fn test_extract_handles_braces_inside_strings() {
        let text = r#"{"action": "type", "text": "smile :-} ok"}"#;
        let obj = extract_object(text).unwrap();
        assert_eq!(obj.get("text"), Some(&json!("smile :-} ok")));
    }

    #[test]
    fn test_extract_rejects_non_objects() {
        assert!(extract_object("no json here at all").is_none());
        assert!(extract_object("[1, 2, 3]").is_none());
        assert!(extract_object("tap the screen please").is_none());
    }

    #[test]
    fn test_system_prompt_covers_catalog() {
        let registry = Registry::new();
        let prompt = build_system_prompt(&registry);

        for schema in registry.schemas() {
            assert!(
                prompt.contains(&format!("- {}: ", schema.name)),
                "prompt is missing action {}",
                schema.name
            );
        }
        assert!(prompt.contains("Respond ONLY with valid JSON"));
        assert!(prompt.contains(r#"{"action": "screenshot"}"#));
    }
}
