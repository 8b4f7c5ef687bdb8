//! Function dispatch: runs a model-issued function call against the data
//! adapter or the voice synthesizer and renders the result as the content
//! of a `function`-role message.
//!
//! Outcomes, as the model sees them:
//! - record found → the record as JSON
//! - record not found, or unknown function → `null`
//! - bad arguments, adapter or voice failure → `{"error": "..."}`
//!
//! Dispatch itself never fails; every fault becomes model-visible content so
//! the next round can explain it to the user.

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use serde_json::Value;

use crate::adapters::DataAdapter;
use crate::inference::function_call::decode_arguments;
use crate::inference::{FunctionCall, FunctionSpec};
use crate::voice::{VoiceRequest, VoiceSynthesizer};

// ─── Function names ─────────────────────────────────────────────────────────

pub const FETCH_ORDER_INFO: &str = "fetchOrderInfo";
pub const FETCH_PRODUCT_INFO: &str = "fetchProductInfo";
pub const FETCH_REFUND_INFO: &str = "fetchRefundInfo";
pub const GENERATE_VOICE_RESPONSE: &str = "generateVoiceResponse";

/// Function specs advertised when a project declares none.
///
/// `generateVoiceResponse` is only offered when a synthesizer is wired in.
pub fn builtin_function_specs(include_voice: bool) -> Vec<FunctionSpec> {
    let id_param = |name: &str, description: &str| {
        serde_json::json!({
            "type": "object",
            "properties": { name: { "type": "string", "description": description } },
            "required": [name]
        })
    };

    let mut specs = vec![
        FunctionSpec {
            name: FETCH_ORDER_INFO.to_string(),
            description: "Look up an order's status, items and total by order ID.".to_string(),
            parameters: id_param("orderId", "The order ID the customer gave"),
        },
        FunctionSpec {
            name: FETCH_PRODUCT_INFO.to_string(),
            description: "Look up a product's description, price and stock level.".to_string(),
            parameters: id_param("productId", "The product ID"),
        },
        FunctionSpec {
            name: FETCH_REFUND_INFO.to_string(),
            description: "Look up the refund status for an order.".to_string(),
            parameters: id_param("orderId", "The order ID the refund belongs to"),
        },
    ];

    if include_voice {
        specs.push(FunctionSpec {
            name: GENERATE_VOICE_RESPONSE.to_string(),
            description: "Turn a short reply into spoken audio for the customer.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string", "description": "What to say" },
                    "voiceId": { "type": "string", "description": "Voice to use (optional)" }
                },
                "required": ["text"]
            }),
        });
    }

    specs
}

// ─── Outcome ────────────────────────────────────────────────────────────────

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Found(Value),
    NotFound,
    UnknownFunction,
    Failed(String),
}

impl DispatchOutcome {
    /// Content for the `function`-role message.
    pub fn to_message_content(&self) -> String {
        match self {
            DispatchOutcome::Found(value) => value.to_string(),
            DispatchOutcome::NotFound | DispatchOutcome::UnknownFunction => "null".to_string(),
            DispatchOutcome::Failed(reason) => serde_json::json!({ "error": reason }).to_string(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            DispatchOutcome::Found(_) => "found",
            DispatchOutcome::NotFound => "not_found",
            DispatchOutcome::UnknownFunction => "unknown_function",
            DispatchOutcome::Failed(_) => "error",
        }
    }
}

// ─── Dispatcher ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoiceArgs {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    script: Option<String>,
    #[serde(default, alias = "voice_id")]
    voice_id: Option<String>,
    #[serde(default, alias = "model_id")]
    model_id: Option<String>,
    #[serde(default, alias = "similarity_boost")]
    similarity_boost: Option<f32>,
    #[serde(default)]
    stability: Option<f32>,
}

pub struct FunctionDispatcher {
    adapter: Arc<dyn DataAdapter>,
    voice: Option<Arc<dyn VoiceSynthesizer>>,
    max_result_chars: usize,
}

impl FunctionDispatcher {
    pub fn new(
        adapter: Arc<dyn DataAdapter>,
        voice: Option<Arc<dyn VoiceSynthesizer>>,
        max_result_chars: usize,
    ) -> Self {
        Self {
            adapter,
            voice,
            max_result_chars,
        }
    }

    pub fn has_voice(&self) -> bool {
        self.voice.is_some()
    }

    /// Run `call` and return the `function`-message content.
    pub async fn dispatch(&self, call: &FunctionCall) -> String {
        let start = Instant::now();
        let outcome = self.run(call).await;

        tracing::info!(
            function = %call.name,
            outcome = outcome.label(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "function dispatched"
        );

        truncate_result(outcome.to_message_content(), self.max_result_chars, &call.name)
    }

    async fn run(&self, call: &FunctionCall) -> DispatchOutcome {
        let Some(args) = decode_arguments(&call.arguments) else {
            return DispatchOutcome::Failed(format!(
                "could not decode arguments for {}",
                call.name
            ));
        };

        match call.name.as_str() {
            FETCH_ORDER_INFO => {
                let Some(order_id) = id_arg(&args, &["orderId", "order_id"]) else {
                    return missing_arg("orderId");
                };
                found_or_absent(self.adapter.fetch_order_info(&order_id).await)
            }
            FETCH_PRODUCT_INFO => {
                let Some(product_id) = id_arg(&args, &["productId", "product_id"]) else {
                    return missing_arg("productId");
                };
                found_or_absent(self.adapter.fetch_product_info(&product_id).await)
            }
            FETCH_REFUND_INFO => {
                let Some(order_id) = id_arg(&args, &["orderId", "order_id"]) else {
                    return missing_arg("orderId");
                };
                found_or_absent(self.adapter.fetch_refund_info(&order_id).await)
            }
            GENERATE_VOICE_RESPONSE => self.synthesize(args).await,
            other => {
                tracing::warn!(function = %other, "model called an unknown function");
                DispatchOutcome::UnknownFunction
            }
        }
    }

    async fn synthesize(&self, args: Value) -> DispatchOutcome {
        let Some(voice) = &self.voice else {
            return DispatchOutcome::Failed("voice synthesis is not configured".to_string());
        };

        let args: VoiceArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return DispatchOutcome::Failed(format!("invalid voice arguments: {e}")),
        };

        let Some(text) = args.text.or(args.script).filter(|t| !t.trim().is_empty()) else {
            return missing_arg("text");
        };

        let request = VoiceRequest {
            text,
            voice_id: args
                .voice_id
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| voice.default_voice_id().to_string()),
            model_id: args.model_id,
            similarity_boost: args.similarity_boost,
            stability: args.stability,
        };

        match voice.synthesize(&request).await {
            Ok(audio) => match serde_json::to_value(&audio) {
                Ok(v) => DispatchOutcome::Found(v),
                Err(e) => DispatchOutcome::Failed(e.to_string()),
            },
            Err(e) => DispatchOutcome::Failed(e.to_string()),
        }
    }
}

/// First of `keys` present in `args`, as a string. Numeric ids are accepted.
fn id_arg(args: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| args.get(*k))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

fn missing_arg(name: &str) -> DispatchOutcome {
    DispatchOutcome::Failed(format!("missing required argument '{name}'"))
}

fn found_or_absent<T: serde::Serialize, E: std::fmt::Display>(
    result: Result<Option<T>, E>,
) -> DispatchOutcome {
    match result {
        Ok(Some(record)) => match serde_json::to_value(record) {
            Ok(v) => DispatchOutcome::Found(v),
            Err(e) => DispatchOutcome::Failed(e.to_string()),
        },
        Ok(None) => DispatchOutcome::NotFound,
        Err(e) => {
            tracing::warn!(error = %e, "data adapter lookup failed");
            DispatchOutcome::Failed(format!("data lookup failed: {e}"))
        }
    }
}

/// Cap a function result at `max_chars` characters so one record cannot
/// flood the context window. The cut prefix is wrapped so the content the
/// model sees is still valid JSON.
fn truncate_result(content: String, max_chars: usize, function: &str) -> String {
    let total_chars = content.chars().count();
    if total_chars <= max_chars {
        return content;
    }
    let partial: String = content.chars().take(max_chars).collect();
    tracing::warn!(
        function = %function,
        original_chars = total_chars,
        truncated_to = max_chars,
        "function result truncated"
    );
    serde_json::json!({
        "truncated": true,
        "total_chars": total_chars,
        "partial": partial,
    })
    .to_string()
}

// ─── Tests ──────────────────────────────────────────────────────────────────
