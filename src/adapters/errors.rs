//! Data adapter error types.
//!
//! A missing record is not an error: lookups return `Ok(None)`. These
//! variants are for a backend that could not be asked at all.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    /// Store or service unreachable.
    #[error("connection failed to {target}: {reason}")]
    ConnectionFailed { target: String, reason: String },

    /// Credential rejected.
    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    /// Non-2xx, non-404 response from a REST backend.
    #[error("HTTP {status} from {endpoint}")]
    HttpError { status: u16, endpoint: String },

    /// Query failed inside the managed store.
    #[error("database error: {reason}")]
    DatabaseError { reason: String },

    /// Payload did not match the record shape.
    #[error("decode error: {reason}")]
    DecodeError { reason: String },
}

impl From<rusqlite::Error> for AdapterError {
    fn from(e: rusqlite::Error) -> Self {
        AdapterError::DatabaseError {
            reason: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(e: serde_json::Error) -> Self {
        AdapterError::DecodeError {
            reason: e.to_string(),
        }
    }
}
