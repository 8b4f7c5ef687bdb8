//! Agent Core: orchestration layer for the support assistant.
//!
//! Submodules:
//! - `orchestrator`: provider selection, the bounded function-call loop and
//!   every fallback path
//! - `dispatch`: runs model-issued function calls against the data adapter
//!   or the voice synthesizer
//! - `prompt`: default system prompt and system-message normalization
//! - `simulated`: keyword-based offline responder
//! - `errors`: why a call degraded

pub mod dispatch;
pub mod errors;
pub mod orchestrator;
pub mod prompt;
pub mod simulated;

// Re-exports for convenience
pub use dispatch::{builtin_function_specs, DispatchOutcome, FunctionDispatcher};
pub use errors::OrchestratorError;
pub use orchestrator::Orchestrator;
pub use prompt::{is_unnamed_function_message, with_single_system_message, DEFAULT_SYSTEM_PROMPT};
pub use simulated::SimulatedResponder;
