//! Voice synthesis: the text-to-speech collaborator the model may call as
//! `generateVoiceResponse`.
//!
//! The orchestrator depends only on [`VoiceSynthesizer`]; [`ElevenLabsClient`]
//! is the HTTP implementation.

pub mod elevenlabs;
pub mod errors;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use elevenlabs::ElevenLabsClient;
pub use errors::VoiceError;

/// What to synthesize. Optional tuning falls back to provider defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceRequest {
    pub text: String,
    pub voice_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_boost: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability: Option<f32>,
}

/// A playable result: where the audio landed and how big it is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioReference {
    pub audio_path: PathBuf,
    pub voice_id: String,
    pub bytes: usize,
}

#[async_trait]
pub trait VoiceSynthesizer: Send + Sync {
    /// Voice used when the caller names none.
    fn default_voice_id(&self) -> &str;

    async fn synthesize(&self, request: &VoiceRequest) -> Result<AudioReference, VoiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_camel_case() {
        let req: VoiceRequest = serde_json::from_str(
            r#"{"text":"Your refund is approved","voiceId":"v1","similarityBoost":0.5}"#,
        )
        .unwrap();
        assert_eq!(req.voice_id, "v1");
        assert_eq!(req.similarity_boost, Some(0.5));
        assert!(req.stability.is_none());
    }
}
