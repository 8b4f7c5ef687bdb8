//! Orchestrator: the control loop behind `get_ai_response`.
//!
//! ```text
//! SELECT_PROVIDER → CALL_PROVIDER → RETURN_TEXT
//!                        ↓   ↑
//!                  RESOLVE_FUNCTION
//! ```
//!
//! Provider selection, system-prompt injection, the bounded function-call
//! loop and every fallback live here. The caller always gets text back:
//! whatever goes wrong ends in the simulated responder.
//!
//! The orchestrator holds no per-call mutable state, so one instance can
//! serve concurrent calls.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use super::dispatch::{builtin_function_specs, FunctionDispatcher};
use super::errors::OrchestratorError;
use super::prompt::with_single_system_message;
use super::simulated::SimulatedResponder;
use crate::adapters::{build_adapter, DataAdapter};
use crate::config::{AssistantConfig, LoopLimits};
use crate::inference::{
    ChatGptClient, ChatMessage, Completion, DeepSeekClient, ProjectSettings, ProviderClient,
    ProviderKind,
};
use crate::voice::{ElevenLabsClient, VoiceSynthesizer};

pub struct Orchestrator {
    default_model: String,
    limits: LoopLimits,
    fallback_chain: Vec<ProviderKind>,
    advertise_builtin_functions: bool,
    providers: HashMap<ProviderKind, Arc<dyn ProviderClient>>,
    adapter: Arc<dyn DataAdapter>,
    dispatcher: FunctionDispatcher,
    simulated: SimulatedResponder,
}

impl Orchestrator {
    /// An orchestrator with no providers registered. Until one is added
    /// with [`with_provider`](Self::with_provider), every call is answered
    /// by the simulated responder.
    pub fn new(config: &AssistantConfig, adapter: Arc<dyn DataAdapter>) -> Self {
        let limits = config.limits.clone();
        Self {
            default_model: config.default_model.clone(),
            fallback_chain: config.fallback_chain.clone(),
            advertise_builtin_functions: config.advertise_builtin_functions,
            providers: HashMap::new(),
            dispatcher: FunctionDispatcher::new(
                adapter.clone(),
                None,
                limits.max_function_result_chars,
            ),
            adapter,
            simulated: SimulatedResponder::new(
                limits.simulated_latency(),
                config.default_model.clone(),
            ),
            limits,
        }
    }

    /// Register (or replace) the client for its provider kind.
    pub fn with_provider(mut self, client: Arc<dyn ProviderClient>) -> Self {
        self.providers.insert(client.kind(), client);
        self
    }

    /// Enable `generateVoiceResponse`.
    pub fn with_voice(mut self, voice: Arc<dyn VoiceSynthesizer>) -> Self {
        self.dispatcher = FunctionDispatcher::new(
            self.adapter.clone(),
            Some(voice),
            self.limits.max_function_result_chars,
        );
        self
    }

    /// Wire everything the deployment config describes.
    ///
    /// Providers without a credential are not registered, so models that
    /// resolve to them go straight to the simulated responder.
    pub fn from_config(config: &AssistantConfig) -> Result<Self, OrchestratorError> {
        let adapter = build_adapter(&config.adapter)?;
        let mut orchestrator = Self::new(config, adapter);
        let timeout = config.limits.request_timeout();

        for kind in ProviderKind::ALL {
            let provider_config = config.providers.get(kind);
            if !provider_config.has_credential() {
                tracing::info!(provider = %kind, "no credential configured, provider disabled");
                continue;
            }
            let client: Arc<dyn ProviderClient> = match kind {
                ProviderKind::ChatGpt => Arc::new(ChatGptClient::new(provider_config, timeout)?),
                ProviderKind::DeepSeek => {
                    Arc::new(DeepSeekClient::new(provider_config, timeout)?)
                }
            };
            orchestrator = orchestrator.with_provider(client);
        }

        if let Some(voice) = &config.voice {
            orchestrator = orchestrator.with_voice(Arc::new(ElevenLabsClient::new(voice)?));
        }

        tracing::info!(
            providers = ?orchestrator.configured_providers(),
            fallback_chain = ?orchestrator.fallback_chain,
            voice = orchestrator.dispatcher.has_voice(),
            "orchestrator ready"
        );

        Ok(orchestrator)
    }

    /// Provider kinds with a registered client, in declaration order.
    pub fn configured_providers(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|k| self.providers.contains_key(k))
            .collect()
    }

    /// Answer a conversation. Never fails: every error path ends in the
    /// simulated responder.
    ///
    /// `messages` is not modified; system-prompt injection and function
    /// results go into a working copy.
    pub async fn get_ai_response(
        &self,
        messages: &[ChatMessage],
        settings: &ProjectSettings,
    ) -> String {
        let span = tracing::info_span!("ai_response", request_id = %Uuid::new_v4());

        async {
            match self.try_respond(messages, settings).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(reason = %e, "falling back to simulated responder");
                    self.simulated.respond(messages, settings).await
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn try_respond(
        &self,
        messages: &[ChatMessage],
        settings: &ProjectSettings,
    ) -> Result<String, OrchestratorError> {
        let primary = self.select_provider(settings)?;
        let call_settings = self.settings_for_call(settings);
        let mut working = with_single_system_message(messages);

        let deadline = self.limits.deadline();
        match tokio::time::timeout(
            deadline,
            self.resolve_loop(primary, &mut working, &call_settings),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(OrchestratorError::DeadlineExceeded {
                secs: deadline.as_secs(),
            }),
        }
    }

    /// Pick the primary provider for this call.
    ///
    /// An explicit `settings.provider` wins; otherwise the model id (or the
    /// deployment default when empty) is matched against provider names.
    fn select_provider(
        &self,
        settings: &ProjectSettings,
    ) -> Result<Arc<dyn ProviderClient>, OrchestratorError> {
        let model = if settings.model.trim().is_empty() {
            self.default_model.as_str()
        } else {
            settings.model.as_str()
        };

        let kind = settings
            .provider
            .or_else(|| ProviderKind::from_model_id(model))
            .ok_or_else(|| OrchestratorError::UnknownModel {
                model: model.to_string(),
            })?;

        let client = self
            .providers
            .get(&kind)
            .cloned()
            .ok_or(OrchestratorError::MissingCredential { provider: kind })?;

        tracing::info!(provider = %kind, model = %model, "provider selected");
        Ok(client)
    }

    /// Settings as sent upstream: the built-in catalog is attached when the
    /// project declares no functions of its own.
    fn settings_for_call(&self, settings: &ProjectSettings) -> ProjectSettings {
        let mut call_settings = settings.clone();
        if call_settings.functions.is_none() && self.advertise_builtin_functions {
            call_settings.functions = Some(builtin_function_specs(self.dispatcher.has_voice()));
        }
        call_settings
    }

    /// Call the provider until it answers with text, dispatching each
    /// function call it makes in between.
    ///
    /// A failed provider is never retried. The next untried entry of the
    /// fallback chain takes over for the rest of the loop.
    async fn resolve_loop(
        &self,
        primary: Arc<dyn ProviderClient>,
        working: &mut Vec<ChatMessage>,
        settings: &ProjectSettings,
    ) -> Result<String, OrchestratorError> {
        let mut active = primary;
        let mut tried = vec![active.kind()];
        let max_rounds = self.limits.max_function_rounds;
        let mut round: u32 = 0;

        loop {
            let completion = match active.complete(working, settings).await {
                Ok(c) => c,
                Err(e) => {
                    let Some(next) = self.next_fallback(&tried) else {
                        return Err(e.into());
                    };
                    tracing::warn!(
                        failed = %active.kind(),
                        next = %next.kind(),
                        error = %e,
                        "provider failed, trying fallback provider"
                    );
                    tried.push(next.kind());
                    active = next;
                    continue;
                }
            };

            let call = match completion {
                Completion::Text(text) => {
                    tracing::info!(
                        provider = %active.kind(),
                        round,
                        text_len = text.len(),
                        "provider returned final answer"
                    );
                    return Ok(text);
                }
                Completion::FunctionCall(call) => call,
            };

            if round >= max_rounds {
                return Err(OrchestratorError::RoundLimitExceeded { rounds: max_rounds });
            }
            round += 1;

            tracing::info!(
                provider = %active.kind(),
                round,
                function = %call.name,
                "resolving function call"
            );
            let content = self.dispatcher.dispatch(&call).await;
            working.push(ChatMessage::function(call.name, content));
        }
    }

    fn next_fallback(&self, tried: &[ProviderKind]) -> Option<Arc<dyn ProviderClient>> {
        self.fallback_chain
            .iter()
            .filter(|k| !tried.contains(*k))
            .find_map(|k| self.providers.get(k).cloned())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
