//! Shared types for the provider clients.
//!
//! `ChatMessage`, `ProjectSettings` and `FunctionSpec` are the internal
//! representation every provider translates from. The wire types mirror the
//! chat-completions request/response shape both upstream providers speak.

use serde::{Deserialize, Serialize};

use super::providers::ProviderKind;

// ─── Conversation ────────────────────────────────────────────────────────────

/// Message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    /// Result of a function the model asked us to call.
    Function,
}

/// A single message in the conversation, oldest first.
///
/// `name` is required when `role` is [`Role::Function`] and carries the
/// called function's name; it is omitted from the wire otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            name: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            name: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            name: None,
        }
    }

    /// A `function`-role message reporting the result of `name`.
    pub fn function(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Function,
            content: content.into(),
            name: Some(name.into()),
        }
    }
}

// ─── Project settings ────────────────────────────────────────────────────────

/// Declares a capability the model may invoke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    /// JSON-schema-like parameter description.
    pub parameters: serde_json::Value,
}

/// Per-project model configuration, treated as immutable for one call.
///
/// `temperature` and `max_tokens` use `0` to mean "unset"; providers apply
/// their own defaults in that case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<FunctionSpec>>,
    /// Explicit provider tag. When set it wins over the model-id heuristic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
}

impl ProjectSettings {
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }
}

// ─── Request ─────────────────────────────────────────────────────────────────

/// Request body for `POST .../chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<FunctionSpec>>,
}

// ─── Response ────────────────────────────────────────────────────────────────

/// A function-call directive: the model wants `name` run with `arguments`.
///
/// `arguments` is JSON-encoded text, exactly as the provider sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

/// What a provider produced: a final answer or a function-call directive,
/// never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Text(String),
    FunctionCall(FunctionCall),
}

/// Response body from `POST .../chat/completions`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub error: Option<ProviderErrorPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    #[serde(default)]
    #[allow(dead_code)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    #[allow(dead_code)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub function_call: Option<FunctionCall>,
    /// Newer providers report calls here instead of `function_call`.
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallPayload>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallPayload {
    pub function: FunctionCall,
}

/// Error object some providers embed in an otherwise successful body.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderErrorPayload {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    #[allow(dead_code)]
    pub kind: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    pub code: Option<serde_json::Value>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_message_carries_name() {
        let msg = ChatMessage::function("fetchOrderInfo", "null");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "function");
        assert_eq!(json["name"], "fetchOrderInfo");
        assert_eq!(json["content"], "null");
    }

    #[test]
    fn test_name_omitted_for_plain_messages() {
        let json = serde_json::to_string(&ChatMessage::user("hello")).unwrap();
        assert!(!json.contains("name"), "name should be omitted when None");
    }

    #[test]
    fn test_request_omits_unset_optionals() {
        let req = ChatCompletionRequest {
            model: "gpt-4o".to_string(),
            messages: vec![],
            temperature: 0.7,
            max_tokens: 1000,
            stream: false,
            stop: None,
            functions: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("stop"));
        assert!(!json.contains("functions"));
        assert!(json.contains("\"stream\":false"));
    }

    #[test]
    fn test_settings_deserialize_with_missing_fields() {
        let settings: ProjectSettings = serde_json::from_str(r#"{"model":"chatgpt"}"#).unwrap();
        assert_eq!(settings.model, "chatgpt");
        assert_eq!(settings.max_tokens, 0);
        assert!(settings.functions.is_none());
        assert!(settings.provider.is_none());
    }

    #[test]
    fn test_response_with_tool_calls_deserializes() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null,
            "tool_calls":[{"id":"call_1","type":"function",
            "function":{"name":"fetchProductInfo","arguments":"{\"productId\":\"p1\"}"}}]}}]}"#;
        let resp: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        let calls = resp.choices[0].message.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.name, "fetchProductInfo");
    }
}
