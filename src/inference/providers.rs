//! Provider tags and model-id resolution.
//!
//! Project settings name a model loosely ("chatgpt", "gpt-4o",
//! "deepseek-coder"). This module turns that into exactly one
//! [`ProviderKind`], or none when the name is unknown or ambiguous.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Upstream chat-completion providers this crate can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// General-purpose provider (OpenAI chat completions).
    ChatGpt,
    /// Code-specialized provider (DeepSeek chat completions).
    DeepSeek,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::ChatGpt, ProviderKind::DeepSeek];

    /// Resolve a model identifier case-insensitively.
    ///
    /// Returns `None` for identifiers matching neither family, and for
    /// identifiers matching both (e.g. `"gpt-deepseek-merge"`).
    pub fn from_model_id(model: &str) -> Option<Self> {
        let normalized = model.trim().to_lowercase();
        let is_chatgpt = normalized.contains("chatgpt") || normalized.contains("gpt");
        let is_deepseek = normalized.contains("deepseek");

        match (is_chatgpt, is_deepseek) {
            (true, false) => Some(ProviderKind::ChatGpt),
            (false, true) => Some(ProviderKind::DeepSeek),
            _ => None,
        }
    }

    /// Human-readable name used in logs and simulated replies.
    pub fn display_name(self) -> &'static str {
        match self {
            ProviderKind::ChatGpt => "ChatGPT (GPT-4o)",
            ProviderKind::DeepSeek => "DeepSeek Coder",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::ChatGpt => f.write_str("chatgpt"),
            ProviderKind::DeepSeek => f.write_str("deepseek"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_chatgpt_aliases() {
        assert_eq!(ProviderKind::from_model_id("chatgpt"), Some(ProviderKind::ChatGpt));
        assert_eq!(ProviderKind::from_model_id("GPT-4o"), Some(ProviderKind::ChatGpt));
    }

    #[test]
    fn test_resolves_deepseek_case_insensitively() {
        assert_eq!(
            ProviderKind::from_model_id("DeepSeek-Coder"),
            Some(ProviderKind::DeepSeek)
        );
    }

    #[test]
    fn test_unknown_model_resolves_to_none() {
        assert_eq!(ProviderKind::from_model_id("llama-3"), None);
        assert_eq!(ProviderKind::from_model_id(""), None);
    }

    #[test]
    fn test_ambiguous_model_resolves_to_none() {
        assert_eq!(ProviderKind::from_model_id("deepseek-gpt-distill"), None);
    }

    #[test]
    fn test_serde_tag_is_lowercase() {
        let json = serde_json::to_string(&ProviderKind::DeepSeek).unwrap();
        assert_eq!(json, "\"deepseek\"");
        let kind: ProviderKind = serde_json::from_str("\"chatgpt\"").unwrap();
        assert_eq!(kind, ProviderKind::ChatGpt);
    }
}
