//! Provider client contract and the shared HTTP transport.
//!
//! Every upstream provider implements [`ProviderClient`]. Each call performs
//! exactly one HTTP request; retry and fallback policy belong to the
//! orchestrator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;

use super::errors::ProviderError;
use super::providers::ProviderKind;
use super::response::parse_completion_response;
use super::types::{ChatCompletionRequest, ChatMessage, Completion, ProjectSettings};

// ─── Constants ───────────────────────────────────────────────────────────────

/// TCP connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Temperature sent when the project leaves it unset.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// `max_tokens` sent when the project leaves it unset.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

// ─── ProviderClient ──────────────────────────────────────────────────────────

/// One upstream chat-completion provider.
///
/// Implementations translate the internal message/settings representation
/// into their wire format and back. The credential is bound at construction.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Which provider this client talks to.
    fn kind(&self) -> ProviderKind;

    /// Run one chat completion.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        settings: &ProjectSettings,
    ) -> Result<Completion, ProviderError>;
}

/// Temperature to send, applying the provider default for "unset".
pub fn effective_temperature(settings: &ProjectSettings) -> f32 {
    if settings.temperature > 0.0 {
        settings.temperature
    } else {
        DEFAULT_TEMPERATURE
    }
}

/// `max_tokens` to send, applying the provider default for "unset".
pub fn effective_max_tokens(settings: &ProjectSettings) -> u32 {
    if settings.max_tokens > 0 {
        settings.max_tokens
    } else {
        DEFAULT_MAX_TOKENS
    }
}

// ─── HttpTransport ───────────────────────────────────────────────────────────

/// Bearer-authenticated JSON POST to a chat-completions endpoint.
///
/// Shared by the concrete provider clients; holds no per-call state.
pub struct HttpTransport {
    http: HttpClient,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::ConnectionFailed {
                endpoint: endpoint.to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send `body` and parse the reply as a completion.
    pub async fn send(
        &self,
        provider: ProviderKind,
        body: &ChatCompletionRequest,
    ) -> Result<Completion, ProviderError> {
        // Request metadata only; the body and credential stay out of the log.
        tracing::info!(
            provider = %provider,
            url = %self.endpoint,
            model = %body.model,
            message_count = body.messages.len(),
            function_count = body.functions.as_ref().map(|f| f.len()).unwrap_or(0),
            max_tokens = body.max_tokens,
            "=== PROVIDER REQUEST ==="
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout {
                        duration_secs: self.timeout.as_secs(),
                    }
                } else {
                    ProviderError::ConnectionFailed {
                        endpoint: self.endpoint.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let body_text = response.text().await.map_err(|e| ProviderError::MalformedResponse {
            reason: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            tracing::warn!(
                provider = %provider,
                status = status.as_u16(),
                "provider returned non-success status"
            );
            return Err(ProviderError::from_http_body(status.as_u16(), &body_text));
        }

        parse_completion_response(&provider.to_string(), &body_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_when_unset() {
        let settings = ProjectSettings::for_model("chatgpt");
        assert_eq!(effective_temperature(&settings), DEFAULT_TEMPERATURE);
        assert_eq!(effective_max_tokens(&settings), DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_explicit_values_kept() {
        let settings = ProjectSettings {
            temperature: 0.2,
            max_tokens: 256,
            ..ProjectSettings::for_model("chatgpt")
        };
        assert_eq!(effective_temperature(&settings), 0.2);
        assert_eq!(effective_max_tokens(&settings), 256);
    }

    #[test]
    fn test_transport_keeps_endpoint() {
        let t = HttpTransport::new(
            "http://127.0.0.1:9/v1/chat/completions",
            "sk-test",
            Duration::from_secs(3),
        )
        .unwrap();
        assert_eq!(t.endpoint(), "http://127.0.0.1:9/v1/chat/completions");
    }
}
