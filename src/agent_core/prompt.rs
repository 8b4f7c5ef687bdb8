//! Default system prompt and system-message normalization.

use crate::inference::{ChatMessage, Role};

/// Domain prompt injected when the caller supplied no system message.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a customer support assistant for an online store. You can look up live store data:

1. Order status and details by order ID (fetchOrderInfo)
2. Product information, price and stock level by product ID (fetchProductInfo)
3. Refund status for an order (fetchRefundInfo)

Orders:
- Confirm the order exists with fetchOrderInfo before describing it
- Give the status, the items purchased and the total
- If the order is not found, ask the customer to double-check the order ID

Refunds:
- Check the current refund status with fetchRefundInfo
- Explain what happens next for that status, with the amount and reason when known

Products:
- Look up current data with fetchProductInfo
- Give the price, stock availability and description
- If it is out of stock, say so plainly

Always:
- Only state facts the lookups returned
- Keep a professional, helpful tone
- Ask for clarification when a request is ambiguous
- Never reveal sensitive customer details
- Format currency values properly
- If a lookup fails, explain that clearly instead of guessing";

/// Return a working copy of `messages` with exactly one system message.
///
/// - None present: [`DEFAULT_SYSTEM_PROMPT`] is prepended.
/// - One present: the sequence is returned unchanged.
/// - Several present: their contents are merged, in order, into the first
///   one's position and the rest are dropped.
///
/// Function-role messages without a name are dropped first; providers
/// reject them. Non-system messages keep their relative order. The caller's
/// slice is never modified.
pub fn with_single_system_message(messages: &[ChatMessage]) -> Vec<ChatMessage> {
    let named = without_unnamed_function_messages(messages);
    let messages = named.as_slice();
    let system_count = messages.iter().filter(|m| m.role == Role::System).count();

    match system_count {
        0 => {
            let mut out = Vec::with_capacity(messages.len() + 1);
            out.push(ChatMessage::system(DEFAULT_SYSTEM_PROMPT));
            out.extend_from_slice(messages);
            out
        }
        1 => messages.to_vec(),
        _ => {
            let merged = messages
                .iter()
                .filter(|m| m.role == Role::System)
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");

            let mut out = Vec::with_capacity(messages.len() - system_count + 1);
            let mut placed = false;
            for msg in messages {
                if msg.role != Role::System {
                    out.push(msg.clone());
                } else if !placed {
                    out.push(ChatMessage::system(merged.clone()));
                    placed = true;
                }
            }
            out
        }
    }
}

/// True for a function-role message that does not say which function
/// produced it.
pub fn is_unnamed_function_message(message: &ChatMessage) -> bool {
    message.role == Role::Function
        && message.name.as_deref().map_or(true, |n| n.trim().is_empty())
}

fn without_unnamed_function_messages(messages: &[ChatMessage]) -> Vec<ChatMessage> {
    messages
        .iter()
        .enumerate()
        .filter(|(index, m)| {
            let unnamed = is_unnamed_function_message(m);
            if unnamed {
                tracing::warn!(index, "dropping function message without a name");
            }
            !unnamed
        })
        .map(|(_, m)| m.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system_count(messages: &[ChatMessage]) -> usize {
        messages.iter().filter(|m| m.role == Role::System).count()
    }

    #[test]
    fn test_default_prompt_prepended() {
        let input = vec![ChatMessage::user("where is my order?")];
        let out = with_single_system_message(&input);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].role, Role::System);
        assert_eq!(out[0].content, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(out[1], input[0]);
        assert_eq!(input.len(), 1, "caller's messages must not change");
    }

    #[test]
    fn test_existing_system_message_kept() {
        let input = vec![
            ChatMessage::system("You are Shoply's helper."),
            ChatMessage::user("hi"),
        ];
        assert_eq!(with_single_system_message(&input), input);
    }

    #[test]
    fn test_multiple_system_messages_merged_in_place() {
        let input = vec![
            ChatMessage::user("first"),
            ChatMessage::system("Rule A"),
            ChatMessage::assistant("ok"),
            ChatMessage::system("Rule B"),
            ChatMessage::user("second"),
        ];
        let out = with_single_system_message(&input);
        assert_eq!(system_count(&out), 1);
        assert_eq!(out[1].content, "Rule A\n\nRule B");
        let roles: Vec<Role> = out.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::System, Role::Assistant, Role::User]
        );
    }

    #[test]
    fn test_empty_history_gets_prompt_only() {
        let out = with_single_system_message(&[]);
        assert_eq!(out.len(), 1);
        assert_eq!(system_count(&out), 1);
    }

    #[test]
    fn test_unnamed_function_message_dropped() {
        let nameless = ChatMessage {
            role: Role::Function,
            content: r#"{"status":"shipped"}"#.into(),
            name: None,
        };
        let blank = ChatMessage {
            name: Some("  ".into()),
            ..nameless.clone()
        };
        let input = vec![
            ChatMessage::user("where is A-1?"),
            nameless,
            blank,
            ChatMessage::function("fetchOrderInfo", r#"{"status":"shipped"}"#),
        ];

        let out = with_single_system_message(&input);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].role, Role::System);
        assert_eq!(out[1].role, Role::User);
        assert_eq!(out[2].name.as_deref(), Some("fetchOrderInfo"));
        assert_eq!(input.len(), 4);
    }
}
