//! Provider clients: one per upstream chat-completion service.
//!
//! This module handles all communication with the model providers:
//! - Translating `ChatMessage` history and `ProjectSettings` into each
//!   provider's request body (defaults, stop sequences, fixed model ids)
//! - Exactly one HTTP call per completion, no internal retry
//! - Parsing replies into a [`Completion`]: final text or a function call
//! - Model-id → [`ProviderKind`] resolution
//!
//! Both providers speak the chat-completions wire format, so swapping the
//! endpoint or model is a config change, not a code change.

pub mod chatgpt;
pub mod client;
pub mod deepseek;
pub mod errors;
pub mod function_call;
pub mod providers;
pub mod response;
pub mod types;

// Re-exports for convenience
pub use chatgpt::ChatGptClient;
pub use client::ProviderClient;
pub use deepseek::DeepSeekClient;
pub use errors::ProviderError;
pub use providers::ProviderKind;
pub use types::{ChatMessage, Completion, FunctionCall, FunctionSpec, ProjectSettings, Role};
