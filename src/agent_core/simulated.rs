//! Simulated responder: offline stand-in used when no provider is usable.
//!
//! Replies are canned and keyed on simple keyword matches against the latest
//! user message. The only guarantee is a non-empty answer. An artificial
//! delay keeps caller-side timing close to a real provider round trip.

use std::time::Duration;

use crate::inference::client::effective_temperature;
use crate::inference::{ChatMessage, ProjectSettings, ProviderKind, Role};

pub struct SimulatedResponder {
    latency: Duration,
    default_model: String,
}

impl SimulatedResponder {
    pub fn new(latency: Duration, default_model: impl Into<String>) -> Self {
        Self {
            latency,
            default_model: default_model.into(),
        }
    }

    /// Produce a reply after the configured delay. Never fails.
    pub async fn respond(&self, messages: &[ChatMessage], settings: &ProjectSettings) -> String {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.compose(messages, settings)
    }

    /// The reply without the delay.
    pub fn compose(&self, messages: &[ChatMessage], settings: &ProjectSettings) -> String {
        let Some(last_user) = messages.iter().rev().find(|m| m.role == Role::User) else {
            return "I don't see a question yet. How can I help you today?".to_string();
        };

        let model = if settings.model.trim().is_empty() {
            self.default_model.as_str()
        } else {
            settings.model.as_str()
        };
        let assistant_name = settings
            .provider
            .or_else(|| ProviderKind::from_model_id(model))
            .map(ProviderKind::display_name)
            .unwrap_or("the configured model");

        let question = Question::new(&last_user.content);

        if question.has_any_word(&["hello", "hi", "hey", "greetings"])
            || question.has_phrase("good morning")
            || question.has_phrase("good afternoon")
        {
            return format!(
                "Hello! I'm the store's support assistant, powered by {assistant_name}. \
                 I can help with orders, refunds and product questions. What can I do for you today?"
            );
        }

        if question.has_any_word(&["help", "capabilities", "features"])
            || question.has_phrase("what can you do")
        {
            return "I can check the status of an order, look up a product's price and stock, \
                    and tell you where a refund stands. Share an order ID or product ID and \
                    I'll take it from there."
                .to_string();
        }

        if question.has_word("model") || question.has_phrase("which ai") {
            return format!(
                "I'm currently set up to use {assistant_name} with a temperature of {:.1}.",
                effective_temperature(settings)
            );
        }

        if question.has_any_word(&[
            "order", "orders", "refund", "refunds", "product", "products", "stock", "price",
            "shipping", "delivery",
        ]) {
            return "I can't reach the live store data right now, so I can't look that up yet. \
                    Please keep your order or product ID handy and try again in a few minutes."
                .to_string();
        }

        if question.has_phrase("when was")
            || question.has_any_word(&["history", "formed", "founded"])
        {
            return format!(
                "I'd normally draw on my knowledge base to answer \"{}\" accurately, \
                 but it's unavailable at the moment. Please try again shortly.",
                last_user.content.trim()
            );
        }

        format!(
            "Thanks for your question: \"{}\". I'm running in a limited offline mode right now, \
             so I can't give a full answer. Please try again in a few minutes.",
            last_user.content.trim()
        )
    }
}

/// Lower-cased question text with word-level lookups.
struct Question {
    text: String,
    words: Vec<String>,
}

impl Question {
    fn new(raw: &str) -> Self {
        let text = raw.to_lowercase();
        let words = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        Self { text, words }
    }

    fn has_word(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    fn has_any_word(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.has_word(w))
    }

    fn has_phrase(&self, phrase: &str) -> bool {
        self.text.contains(phrase)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn responder() -> SimulatedResponder {
        SimulatedResponder::new(Duration::ZERO, "deepseek-coder")
    }

    fn ask(text: &str, settings: &ProjectSettings) -> String {
        responder().compose(&[ChatMessage::user(text)], settings)
    }

    #[test]
    fn test_greeting() {
        let reply = ask("hello", &ProjectSettings::for_model("deepseek-coder"));
        assert!(reply.starts_with("Hello!"));
        assert!(reply.contains("DeepSeek Coder"));
    }

    #[test]
    fn test_hi_inside_other_words_is_not_a_greeting() {
        let reply = ask("is this thing on", &ProjectSettings::default());
        assert!(!reply.starts_with("Hello!"), "got: {reply}");
    }

    #[test]
    fn test_model_question_names_provider_and_temperature() {
        let settings = ProjectSettings {
            temperature: 0.3,
            ..ProjectSettings::for_model("chatgpt")
        };
        let reply = ask("Which model are you?", &settings);
        assert!(reply.contains("ChatGPT (GPT-4o)"));
        assert!(reply.contains("0.3"));
    }

    #[test]
    fn test_empty_model_uses_default() {
        let reply = ask("hi", &ProjectSettings::default());
        assert!(reply.contains("DeepSeek Coder"));
    }

    #[test]
    fn test_order_question_explains_offline_lookup() {
        let reply = ask("Where is order A-1001?", &ProjectSettings::default());
        assert!(reply.contains("can't reach the live store data"));
    }

    #[test]
    fn test_default_quotes_question() {
        let reply = ask("Tell me a joke", &ProjectSettings::default());
        assert!(reply.contains("\"Tell me a joke\""));
    }

    #[test]
    fn test_no_user_message() {
        let reply = responder().compose(
            &[ChatMessage::system("be nice")],
            &ProjectSettings::default(),
        );
        assert!(!reply.is_empty());
        assert!(reply.contains("don't see a question"));
    }

    #[test]
    fn test_latest_user_message_wins() {
        let messages = vec![
            ChatMessage::user("hello"),
            ChatMessage::assistant("Hi!"),
            ChatMessage::user("what can you do?"),
        ];
        let reply = responder().compose(&messages, &ProjectSettings::default());
        assert!(reply.starts_with("I can check the status"));
    }

    #[tokio::test]
    async fn test_respond_waits_for_latency() {
        let responder = SimulatedResponder::new(Duration::from_millis(20), "chatgpt");
        let start = std::time::Instant::now();
        let reply = responder
            .respond(&[ChatMessage::user("hi")], &ProjectSettings::default())
            .await;
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert!(!reply.is_empty());
    }
}
