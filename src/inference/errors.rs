//! Provider error types.
//!
//! All errors implement `std::error::Error` via `thiserror`. Structured logging
//! is the caller's responsibility; these types carry the context needed to
//! build meaningful log entries.

use thiserror::Error;

/// Errors a single provider call can end in.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// TCP/HTTP connection to the provider endpoint failed.
    #[error("connection failed to {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    /// The provider did not respond within the request timeout.
    #[error("provider timeout after {duration_secs}s")]
    Timeout { duration_secs: u64 },

    /// Non-2xx HTTP response.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// A 2xx body that carried an `error` object.
    #[error("provider reported error: {message}")]
    ProviderReported { message: String },

    /// The response had neither text content nor a function call.
    #[error("{provider} returned neither content nor a function call")]
    EmptyResponse { provider: String },

    /// The body could not be decoded as a completion response.
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },
}

impl ProviderError {
    /// HTTP status associated with this error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build an `HttpError`, preferring the provider's own error message
    /// (`error.message` or `message`) over the raw body.
    pub fn from_http_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .or_else(|| v.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    "Unknown error".to_string()
                } else {
                    body.trim().to_string()
                }
            });

        ProviderError::HttpError { status, message }
    }
}
