//! General-purpose provider client (OpenAI chat completions).

use std::time::Duration;

use async_trait::async_trait;

use super::client::{effective_max_tokens, effective_temperature, HttpTransport, ProviderClient};
use super::errors::ProviderError;
use super::providers::ProviderKind;
use super::types::{ChatCompletionRequest, ChatMessage, Completion, ProjectSettings};
use crate::config::ProviderConfig;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";

pub struct ChatGptClient {
    transport: HttpTransport,
    model: String,
}

impl ChatGptClient {
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self, ProviderError> {
        let endpoint = config.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        Ok(Self {
            transport: HttpTransport::new(endpoint, &config.api_key, timeout)?,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    /// The exact body [`complete`](ProviderClient::complete) would send.
    pub fn build_request(
        &self,
        messages: &[ChatMessage],
        settings: &ProjectSettings,
    ) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            temperature: effective_temperature(settings),
            max_tokens: effective_max_tokens(settings),
            stream: false,
            stop: None,
            functions: settings.functions.clone(),
        }
    }
}

#[async_trait]
impl ProviderClient for ChatGptClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::ChatGpt
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        settings: &ProjectSettings,
    ) -> Result<Completion, ProviderError> {
        let body = self.build_request(messages, settings);
        self.transport.send(self.kind(), &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::types::FunctionSpec;

    fn client() -> ChatGptClient {
        ChatGptClient::new(
            &ProviderConfig {
                api_key: "sk-test".into(),
                endpoint: None,
                model: None,
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_request_uses_fixed_model_and_defaults() {
        let req = client().build_request(
            &[ChatMessage::user("hello")],
            &ProjectSettings::for_model("chatgpt"),
        );
        assert_eq!(req.model, "gpt-4o");
        assert_eq!(req.temperature, 0.7);
        assert_eq!(req.max_tokens, 1000);
        assert!(!req.stream);
        assert!(req.stop.is_none());
    }

    #[test]
    fn test_request_forwards_functions() {
        let settings = ProjectSettings {
            functions: Some(vec![FunctionSpec {
                name: "fetchOrderInfo".into(),
                description: "Look up an order".into(),
                parameters: serde_json::json!({"type": "object"}),
            }]),
            ..ProjectSettings::for_model("gpt-4o")
        };
        let req = client().build_request(&[], &settings);
        assert_eq!(req.functions.unwrap()[0].name, "fetchOrderInfo");
    }

    #[test]
    fn test_endpoint_defaults_to_openai() {
        assert_eq!(client().transport.endpoint(), DEFAULT_ENDPOINT);
    }
}
