//! Code-specialized provider client (DeepSeek chat completions).
//!
//! Same wire shape as the general-purpose provider, plus a fixed stop
//! sequence.

use std::time::Duration;

use async_trait::async_trait;

use super::client::{effective_max_tokens, effective_temperature, HttpTransport, ProviderClient};
use super::errors::ProviderError;
use super::providers::ProviderKind;
use super::types::{ChatCompletionRequest, ChatMessage, Completion, ProjectSettings};
use crate::config::ProviderConfig;

pub const DEFAULT_ENDPOINT: &str = "https://api.deepseek.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Sent with every request.
pub const STOP_SEQUENCE: &str = "<|endoftext|>";

pub struct DeepSeekClient {
    transport: HttpTransport,
    model: String,
}

impl DeepSeekClient {
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
            stop: Some(vec![STOP_SEQUENCE.to_string()]),
            functions: settings.functions.clone(),
        }
    }
}

#[async_trait]
impl ProviderClient for DeepSeekClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::DeepSeek
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

    #[test]
    fn test_request_sets_stop_and_model() {
        let client = DeepSeekClient::new(
            &ProviderConfig {
                api_key: "ds-test".into(),
                endpoint: Some("http://localhost:1/v1/chat/completions".into()),
                model: None,
            },
            Duration::from_secs(5),
        )
        .unwrap();

        let settings = ProjectSettings {
            temperature: 0.3,
            max_tokens: 500,
            ..ProjectSettings::for_model("deepseek-coder")
        };
        let req = client.build_request(&[ChatMessage::user("hi")], &settings);

        assert_eq!(req.model, "deepseek-chat");
        assert_eq!(req.stop, Some(vec!["<|endoftext|>".to_string()]));
        assert_eq!(req.temperature, 0.3);
        assert_eq!(req.max_tokens, 500);

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["stop"][0], "<|endoftext|>");
        assert_eq!(json["stream"], false);
    }
}
