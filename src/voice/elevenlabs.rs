//! ElevenLabs text-to-speech client.
//!
//! `POST {endpoint}/text-to-speech/{voice_id}` with the `xi-api-key` header.
//! The audio bytes are written to `output_dir/<uuid>.mp3`; the file path is
//! the playable reference handed back to the model.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use uuid::Uuid;

use super::errors::VoiceError;
use super::{AudioReference, VoiceRequest, VoiceSynthesizer};
use crate::config::VoiceConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_SIMILARITY_BOOST: f32 = 0.75;
const DEFAULT_STABILITY: f32 = 0.75;

pub struct ElevenLabsClient {
    http: HttpClient,
    endpoint: String,
    api_key: String,
    default_voice_id: String,
    model_id: String,
    output_dir: PathBuf,
}

impl ElevenLabsClient {
    pub fn new(config: &VoiceConfig) -> Result<Self, VoiceError> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| VoiceError::ConnectionFailed {
                endpoint: config.endpoint.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            default_voice_id: config.default_voice_id.clone(),
            model_id: config.model_id.clone(),
            output_dir: config
                .output_dir
                .clone()
                .unwrap_or_else(|| crate::data_dir().join("audio")),
        })
    }

    fn url_for(&self, voice_id: &str) -> String {
        format!("{}/text-to-speech/{voice_id}", self.endpoint)
    }

    fn build_body(&self, request: &VoiceRequest) -> serde_json::Value {
        serde_json::json!({
            "text": request.text,
            "model_id": request.model_id.as_deref().unwrap_or(&self.model_id),
            "voice_settings": {
                "similarity_boost": request.similarity_boost.unwrap_or(DEFAULT_SIMILARITY_BOOST),
                "stability": request.stability.unwrap_or(DEFAULT_STABILITY),
            }
        })
    }

    async fn store(&self, audio: &[u8]) -> Result<PathBuf, VoiceError> {
        let path = self.output_dir.join(format!("{}.mp3", Uuid::new_v4()));
        let storage_err = |e: std::io::Error| VoiceError::Storage {
            path: path.display().to_string(),
            reason: e.to_string(),
        };
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(storage_err)?;
        tokio::fs::write(&path, audio).await.map_err(storage_err)?;
        Ok(path)
    }
}

#[async_trait]
impl VoiceSynthesizer for ElevenLabsClient {
    fn default_voice_id(&self) -> &str {
        &self.default_voice_id
    }

    async fn synthesize(&self, request: &VoiceRequest) -> Result<AudioReference, VoiceError> {
        if request.text.trim().is_empty() {
            return Err(VoiceError::EmptyText);
        }

        let url = self.url_for(&request.voice_id);
        tracing::info!(
            voice_id = %request.voice_id,
            text_len = request.text.len(),
            "synthesizing voice response"
        );

        let response = self
            .http
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| VoiceError::ConnectionFailed {
                endpoint: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(VoiceError::HttpError {
                status: status.as_u16(),
            });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| VoiceError::ConnectionFailed {
                endpoint: url.clone(),
                reason: format!("failed to read audio: {e}"),
            })?;

        let audio_path = self.store(&audio).await?;

        Ok(AudioReference {
            audio_path,
            voice_id: request.voice_id.clone(),
            bytes: audio.len(),
        })
    }
}
