//! Token-budget pruning for `getConversationContext`: fixed 70/30 split
//! between messages and files, newest-first admission, stop on first
//! miss (never skip forward).

use super::tokenizer::count_tokens;
use super::types::{ConversationFile, ConversationMessage};

pub const MESSAGE_TOKEN_RATIO: f64 = 0.7;
pub const FILE_TOKEN_RATIO: f64 = 0.3;

/// Returns the admitted messages (in chronological order) and their
/// total token cost, stopping at the first message (walking from
/// newest) that would not fit in `budget`.
pub fn prune_messages(
    model: &str,
    messages: &[ConversationMessage],
    budget: u64,
) -> (Vec<ConversationMessage>, u64) {
    let mut admitted = Vec::new();
    let mut used = 0u64;

    for message in messages.iter().rev() {
        let cost = count_tokens(model, &message.content)
            + message
                .tool_name
                .as_deref()
                .map(|n| count_tokens(model, n))
                .unwrap_or(0)
            + 3;
        if used + cost > budget {
            break;
        }
        used += cost;
        admitted.push(message.clone());
    }

    admitted.reverse();
    (admitted, used)
}

/// Returns the admitted files (in `lastAccessedAt DESC` order) and
/// their total token cost, stopping at the first file that would not
/// fit in `budget`.
pub fn prune_files(
    model: &str,
    files: &[ConversationFile],
    budget: u64,
) -> (Vec<ConversationFile>, u64) {
    let mut ordered = files.to_vec();
    ordered.sort_by(|a, b| b.last_accessed_at.cmp(&a.last_accessed_at));

    let mut admitted = Vec::new();
    let mut used = 0u64;

    for file in ordered {
        let cost = count_tokens(model, &file.file_content);
        if used + cost > budget {
            break;
        }
        used += cost;
        admitted.push(file);
    }

    (admitted, used)
}

pub fn split_budget(max_tokens: u64) -> (u64, u64) {
    let message_budget = (max_tokens as f64 * MESSAGE_TOKEN_RATIO).floor() as u64;
    let file_budget = (max_tokens as f64 * FILE_TOKEN_RATIO).floor() as u64;
    (message_budget, file_budget)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::types::MessageRole;
    use chrono::Utc;
    use uuid::Uuid;

    fn msg(content: &str, index: i64) -> ConversationMessage {
        ConversationMessage {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            message_index: index,
            role: MessageRole::User,
            content: content.to_string(),
            tool_name: None,
            parent_message_id: None,
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    #[test]
    fn empty_budget_admits_nothing() {
        let messages = vec![msg("hello", 0), msg("world", 1)];
        let (admitted, used) = prune_messages("gpt-4o", &messages, 0);
        assert!(admitted.is_empty());
        assert_eq!(used, 0);
    }

    #[test]
    fn stops_at_first_miss_from_newest() {
        let messages: Vec<ConversationMessage> = (0..20)
            .map(|i| msg(&"word ".repeat(20), i))
            .collect();
        let (admitted, used) = prune_messages("gpt-4o", &messages, 50);
        assert!(admitted.len() < messages.len());
        assert!(used <= 50);
        // Admitted messages remain in chronological order.
        for pair in admitted.windows(2) {
            assert!(pair[0].message_index < pair[1].message_index);
        }
    }

    #[test]
    fn split_budget_is_70_30() {
        let (messages, files) = split_budget(1000);
        assert_eq!(messages, 700);
        assert_eq!(files, 300);
    }
}
