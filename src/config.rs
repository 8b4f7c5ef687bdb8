//! Deployment configuration loading and validation.
//!
//! Reads `shopdesk.yaml` and resolves environment variables, so credentials
//! can stay out of the file (`api_key: ${OPENAI_API_KEY:-}`). The resulting
//! [`AssistantConfig`] is injected into the orchestrator at construction;
//! nothing here is process-global.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::inference::ProviderKind;

/// Config file name searched for when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "shopdesk.yaml";

/// Env var that may point at the config file.
pub const CONFIG_ENV_VAR: &str = "SHOPDESK_CONFIG";

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not find {CONFIG_FILE_NAME}")]
    NotFound,

    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse config: {reason}")]
    Parse { reason: String },

    #[error("invalid config: {reason}")]
    Invalid { reason: String },
}

// ─── Public Types ────────────────────────────────────────────────────────────

/// Credential and endpoint for one upstream provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfig {
    /// Empty means "not configured"; the provider is then never called.
    #[serde(default)]
    pub api_key: String,
    /// Full chat-completions URL. Provider default when absent.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Wire model identifier. Provider default when absent.
    #[serde(default)]
    pub model: Option<String>,
}

impl ProviderConfig {
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub chatgpt: ProviderConfig,
    #[serde(default)]
    pub deepseek: ProviderConfig,
}

impl ProvidersConfig {
    pub fn get(&self, kind: ProviderKind) -> &ProviderConfig {
        match kind {
            ProviderKind::ChatGpt => &self.chatgpt,
            ProviderKind::DeepSeek => &self.deepseek,
        }
    }
}

/// Which data backend answers order/product/refund lookups.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum AdapterConfig {
    /// Managed SQLite store. `":memory:"` gives an empty in-memory store.
    Sqlite { path: String },
    /// Any service implementing the `/api/...` REST contract.
    Rest {
        base_url: String,
        #[serde(default)]
        api_key: String,
        /// Surface transport/auth failures as "not found" (the observed
        /// behaviour) instead of as adapter errors.
        #[serde(default = "default_true")]
        fail_soft: bool,
    },
}

impl Default for AdapterConfig {
    fn default() -> Self {
        AdapterConfig::Sqlite {
            path: ":memory:".to_string(),
        }
    }
}

/// Text-to-speech collaborator settings.
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    pub api_key: String,
    #[serde(default = "default_voice_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_voice_id")]
    pub default_voice_id: String,
    #[serde(default = "default_voice_model")]
    pub model_id: String,
    /// Directory synthesized audio is written to. Data dir when absent.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

/// Bounds on one orchestrator call.
#[derive(Debug, Clone, Deserialize)]
pub struct LoopLimits {
    #[serde(default = "default_max_function_rounds")]
    pub max_function_rounds: u32,
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_simulated_latency_ms")]
    pub simulated_latency_ms: u64,
    #[serde(default = "default_max_function_result_chars")]
    pub max_function_result_chars: usize,
}

impl LoopLimits {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

impl Default for LoopLimits {
    fn default() -> Self {
        Self {
            max_function_rounds: default_max_function_rounds(),
            deadline_secs: default_deadline_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            simulated_latency_ms: default_simulated_latency_ms(),
            max_function_result_chars: default_max_function_result_chars(),
        }
    }
}

/// Top-level deployment configuration (mirrors `shopdesk.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    /// Model used when project settings name none.
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Alternate providers tried, once each, after the primary fails.
    #[serde(default)]
    pub fallback_chain: Vec<ProviderKind>,
    #[serde(default)]
    pub adapter: AdapterConfig,
    #[serde(default)]
    pub voice: Option<VoiceConfig>,
    #[serde(default)]
    pub limits: LoopLimits,
    /// Offer the built-in lookup functions when a project declares none.
    #[serde(default = "default_true")]
    pub advertise_builtin_functions: bool,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            providers: ProvidersConfig::default(),
            fallback_chain: Vec::new(),
            adapter: AdapterConfig::default(),
            voice: None,
            limits: LoopLimits::default(),
            advertise_builtin_functions: true,
        }
    }
}

impl AssistantConfig {
    /// Reject configurations the orchestrator cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_function_rounds == 0 {
            return Err(ConfigError::Invalid {
                reason: "limits.max_function_rounds must be at least 1".into(),
            });
        }
        if self.limits.deadline_secs == 0 {
            return Err(ConfigError::Invalid {
                reason: "limits.deadline_secs must be at least 1".into(),
            });
        }
        if let AdapterConfig::Rest { base_url, .. } = &self.adapter {
            if base_url.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    reason: "adapter.base_url must not be empty".into(),
                });
            }
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}
fn default_model() -> String {
    "deepseek-coder".to_string()
}
fn default_voice_endpoint() -> String {
    "https://api.elevenlabs.io/v1".to_string()
}
fn default_voice_id() -> String {
    "pNInz6obpgDQGcFmaJgB".to_string()
}
fn default_voice_model() -> String {
    "eleven_multilingual_v2".to_string()
}
fn default_max_function_rounds() -> u32 {
    5
}
fn default_deadline_secs() -> u64 {
    60
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_simulated_latency_ms() -> u64 {
    1000
}
fn default_max_function_result_chars() -> usize {
    6_000
}

// ─── Loading ─────────────────────────────────────────────────────────────────

/// Locate the config file.
///
/// Order: `SHOPDESK_CONFIG`, then `shopdesk.yaml` in `start` or any parent.
pub fn find_config_path(start: &Path) -> Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(path);
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.exists())
        .ok_or(ConfigError::NotFound)
}

/// Load, interpolate, parse and validate a config file.
pub fn load_config(path: &Path) -> Result<AssistantConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_config(&raw)
}

/// Parse config text (after `${VAR}` interpolation) and validate it.
pub fn parse_config(raw: &str) -> Result<AssistantConfig, ConfigError> {
    let interpolated = interpolate_env_vars(raw);

    let config: AssistantConfig =
        serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;

    config.validate()?;
    Ok(config)
}

// ─── Env-var interpolation ───────────────────────────────────────────────────

/// Replace `${VAR}` and `${VAR:-default}` in a string.
fn interpolate_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                result.push_str(&resolve_var_expr(&after[..end]));
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated: keep the text as written.
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    result.push_str(rest);
    result
}

/// Resolve `VAR` or `VAR:-default`.
fn resolve_var_expr(expr: &str) -> String {
    match expr.split_once(":-") {
        Some((name, default)) => std::env::var(name)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string()),
        None => std::env::var(expr).unwrap_or_default(),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
