//! Voice synthesis error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("connection failed to {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    #[error("text-to-speech HTTP {status}")]
    HttpError { status: u16 },

    #[error("nothing to synthesize")]
    EmptyText,

    #[error("failed to store audio at {path}: {reason}")]
    Storage { path: String, reason: String },
}
