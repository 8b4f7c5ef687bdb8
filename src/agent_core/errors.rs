//! Agent Core error types.
//!
//! Apart from the setup variants returned by `Orchestrator::from_config`,
//! none of these reach the caller of `get_ai_response`. They explain why a
//! call degraded to the simulated responder and are logged as such.

use thiserror::Error;

use crate::adapters::AdapterError;
use crate::inference::{ProviderError, ProviderKind};
use crate::voice::VoiceError;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The selected provider has no credential configured.
    #[error("no credential configured for provider '{provider}'")]
    MissingCredential { provider: ProviderKind },

    /// The model id matches no known provider, or more than one.
    #[error("model '{model}' does not resolve to a single known provider")]
    UnknownModel { model: String },

    /// Every provider attempt failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The model kept asking for functions past the round limit.
    #[error("function-call round limit of {rounds} exceeded")]
    RoundLimitExceeded { rounds: u32 },

    /// The whole call ran past its deadline.
    #[error("deadline of {secs}s exceeded")]
    DeadlineExceeded { secs: u64 },

    /// The configured data adapter could not be built.
    #[error("data adapter setup failed: {0}")]
    Adapter(#[from] AdapterError),

    /// The configured voice synthesizer could not be built.
    #[error("voice setup failed: {0}")]
    Voice(#[from] VoiceError),
}
