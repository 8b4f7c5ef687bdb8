//! Chat-completion response parsing.
//!
//! Turns a raw response body into a [`Completion`]: non-empty `content`
//! wins, then `function_call`, then the first entry of `tool_calls`.
//! A body with none of those is an error, never an empty answer.

use super::errors::ProviderError;
use super::types::{ChatCompletionResponse, Completion};

/// Parse a 2xx response body from `provider`.
pub fn parse_completion_response(provider: &str, body: &str) -> Result<Completion, ProviderError> {
    let resp: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::MalformedResponse {
            reason: format!("failed to parse {provider} response: {e}"),
        })?;

    if let Some(err) = resp.error {
        return Err(ProviderError::ProviderReported {
            message: if err.message.is_empty() {
                "Unknown error".to_string()
            } else {
                err.message
            },
        });
    }

    let Some(choice) = resp.choices.into_iter().next() else {
        return Err(ProviderError::EmptyResponse {
            provider: provider.to_string(),
        });
    };

    let message = choice.message;

    if let Some(content) = message.content.filter(|c| !c.is_empty()) {
        return Ok(Completion::Text(content));
    }

    if let Some(call) = message.function_call {
        return Ok(Completion::FunctionCall(call));
    }

    if let Some(call) = message
        .tool_calls
        .and_then(|calls| calls.into_iter().next())
        .map(|tc| tc.function)
    {
        return Ok(Completion::FunctionCall(call));
    }

    Err(ProviderError::EmptyResponse {
        provider: provider.to_string(),
    })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
