use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use shopdesk::adapters::build_adapter;
use shopdesk::agent_core::is_unnamed_function_message;
use shopdesk::config::{find_config_path, load_config, AdapterConfig, AssistantConfig};
use shopdesk::{ChatMessage, Orchestrator, ProjectSettings, ProviderKind};

#[derive(Parser)]
#[command(name = "shopdesk", version, about = "Storefront support assistant")]
struct Cli {
    /// Path to shopdesk.yaml (default: $SHOPDESK_CONFIG, then upward search)
    #[arg(long, global = true, env = "SHOPDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Log to stderr instead of the rotating log file
    #[arg(long, global = true)]
    log_stderr: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask the assistant a question and print the answer
    Ask {
        /// Model identifier (e.g. chatgpt, gpt-4o, deepseek-coder)
        #[arg(long)]
        model: Option<String>,

        #[arg(long)]
        temperature: Option<f32>,

        #[arg(long)]
        max_tokens: Option<u32>,

        /// JSON file holding a prior conversation (array of messages)
        #[arg(long)]
        messages: Option<PathBuf>,

        /// The question, appended as the last user message
        prompt: Vec<String>,
    },

    /// Look up a record through the configured data adapter
    Lookup {
        #[arg(value_enum)]
        kind: LookupKind,
        id: String,
    },

    /// Show the resolved configuration with credentials redacted
    CheckConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum LookupKind {
    Order,
    Product,
    Refund,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    shopdesk::init_tracing(cli.log_stderr).context("failed to initialize logging")?;

    let config = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Command::Ask {
            model,
            temperature,
            max_tokens,
            messages,
            prompt,
        } => {
            let mut history = match messages {
                Some(path) => read_messages(&path)?,
                None => Vec::new(),
            };
            let question = prompt.join(" ");
            if !question.trim().is_empty() {
                history.push(ChatMessage::user(question));
            }
            anyhow::ensure!(!history.is_empty(), "nothing to ask: give a prompt or --messages");

            let settings = ProjectSettings {
                model: model.unwrap_or_default(),
                temperature: temperature.unwrap_or_default(),
                max_tokens: max_tokens.unwrap_or_default(),
                ..ProjectSettings::default()
            };

            let orchestrator = Orchestrator::from_config(&config)?;
            println!("{}", orchestrator.get_ai_response(&history, &settings).await);
        }
        Command::Lookup { kind, id } => {
            let adapter = build_adapter(&config.adapter)?;
            let record = match kind {
                LookupKind::Order => adapter
                    .fetch_order_info(&id)
                    .await?
                    .map(serde_json::to_value)
                    .transpose()?,
                LookupKind::Product => adapter
                    .fetch_product_info(&id)
                    .await?
                    .map(serde_json::to_value)
                    .transpose()?,
                LookupKind::Refund => adapter
                    .fetch_refund_info(&id)
                    .await?
                    .map(serde_json::to_value)
                    .transpose()?,
            };
            match record {
                Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                None => println!("not found"),
            }
        }
        Command::CheckConfig => print_config(&config),
    }

    Ok(())
}

/// Explicit path, then `SHOPDESK_CONFIG`/upward search, then built-in defaults.
fn resolve_config(explicit: Option<&Path>) -> Result<AssistantConfig> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => {
            let cwd = std::env::current_dir().context("cannot read current directory")?;
            find_config_path(&cwd).ok()
        }
    };

    match path {
        Some(p) => {
            tracing::info!(path = %p.display(), "loading config");
            load_config(&p).with_context(|| format!("loading {}", p.display()))
        }
        None => {
            tracing::warn!("no shopdesk.yaml found, using defaults");
            Ok(AssistantConfig::default())
        }
    }
}

fn read_messages(path: &Path) -> Result<Vec<ChatMessage>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let messages: Vec<ChatMessage> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    if let Some(index) = messages.iter().position(is_unnamed_function_message) {
        bail!(
            "{}: message {index} has role \"function\" but no name",
            path.display()
        );
    }
    Ok(messages)
}

fn print_config(config: &AssistantConfig) {
    println!("default_model: {}", config.default_model);
    for kind in ProviderKind::ALL {
        let provider = config.providers.get(kind);
        println!(
            "provider {kind}: credential={} endpoint={} model={}",
            redact(&provider.api_key),
            provider.endpoint.as_deref().unwrap_or("(default)"),
            provider.model.as_deref().unwrap_or("(default)"),
        );
    }
    println!("fallback_chain: {:?}", config.fallback_chain);
    match &config.adapter {
        AdapterConfig::Sqlite { path } => println!("adapter: sqlite path={path}"),
        AdapterConfig::Rest {
            base_url,
            api_key,
            fail_soft,
        } => println!(
            "adapter: rest base_url={base_url} credential={} fail_soft={fail_soft}",
            redact(api_key)
        ),
    }
    match &config.voice {
        Some(voice) => println!(
            "voice: endpoint={} credential={} default_voice_id={}",
            voice.endpoint,
            redact(&voice.api_key),
            voice.default_voice_id
        ),
        None => println!("voice: disabled"),
    }
    println!(
        "limits: max_function_rounds={} deadline_secs={} request_timeout_secs={}",
        config.limits.max_function_rounds,
        config.limits.deadline_secs,
        config.limits.request_timeout_secs
    );
}

fn redact(secret: &str) -> String {
    let secret = secret.trim();
    if secret.is_empty() {
        return "(none)".to_string();
    }
    let count = secret.chars().count();
    if count <= 8 {
        "****".to_string()
    } else {
        let tail: String = secret.chars().skip(count - 4).collect();
        format!("****{tail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_messages_rejects_unnamed_function_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.json");
        std::fs::write(
            &path,
            r#"[{"role":"user","content":"A-1?"},{"role":"function","content":"{}"}]"#,
        )
        .unwrap();

        let err = read_messages(&path).unwrap_err();
        assert!(err.to_string().contains("message 1"), "got: {err}");
    }

    #[test]
    fn test_read_messages_accepts_named_function_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.json");
        std::fs::write(
            &path,
            r#"[{"role":"function","name":"fetchOrderInfo","content":"null"}]"#,
        )
        .unwrap();

        let messages = read_messages(&path).unwrap();
        assert_eq!(messages[0].name.as_deref(), Some("fetchOrderInfo"));
    }
}
