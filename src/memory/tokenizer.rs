//! BPE token counting via `tiktoken-rs`, with encoders cached per encoding
//! kind for the process lifetime and a char/4 fallback if construction
//! ever fails.

use std::sync::OnceLock;

use tiktoken_rs::CoreBPE;

use super::types::ConversationMessage;

const PER_MESSAGE_OVERHEAD: u64 = 3;
const ASSISTANT_PRIMING: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EncodingKind {
    Cl100kBase,
    P50kBase,
}

fn encoding_for_model(model: &str) -> EncodingKind {
    if model.starts_with("text-davinci") || model.starts_with("text-curie") {
        EncodingKind::P50kBase
    } else {
        EncodingKind::Cl100kBase
    }
}

static CL100K: OnceLock<Option<CoreBPE>> = OnceLock::new();
static P50K: OnceLock<Option<CoreBPE>> = OnceLock::new();

fn encoder_for(kind: EncodingKind) -> Option<&'static CoreBPE> {
    let cell = match kind {
        EncodingKind::Cl100kBase => &CL100K,
        EncodingKind::P50kBase => &P50K,
    };
    cell.get_or_init(|| match kind {
        EncodingKind::Cl100kBase => tiktoken_rs::cl100k_base().ok(),
        EncodingKind::P50kBase => tiktoken_rs::p50k_base().ok(),
    })
    .as_ref()
}

/// Token count for one string on the tokenizer selected for `model`.
/// Falls back to `ceil(chars/4)` if the encoder failed to initialize.
pub fn count_tokens(model: &str, text: &str) -> u64 {
    let kind = encoding_for_model(model);
    match encoder_for(kind) {
        Some(bpe) => bpe.encode_with_special_tokens(text).len() as u64,
        None => char_fallback(text),
    }
}

fn char_fallback(text: &str) -> u64 {
    ((text.chars().count() as u64) + 3) / 4
}

/// Token count for a full message sequence, including per-message and
/// assistant-priming overhead per the chat-completion token accounting
/// convention.
pub fn count_message_tokens(model: &str, messages: &[&ConversationMessage]) -> u64 {
    let mut total = ASSISTANT_PRIMING;
    for message in messages {
        total += PER_MESSAGE_OVERHEAD;
        total += count_tokens(model, &message.content);
        if let Some(tool_name) = &message.tool_name {
            total += count_tokens(model, tool_name);
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpt4_selects_cl100k() {
        assert_eq!(encoding_for_model("gpt-4o"), EncodingKind::Cl100kBase);
    }

    #[test]
    fn davinci_selects_p50k() {
        assert_eq!(encoding_for_model("text-davinci-003"), EncodingKind::P50kBase);
    }

    #[test]
    fn unknown_model_falls_back_to_cl100k() {
        assert_eq!(encoding_for_model("gemini-1.5-pro"), EncodingKind::Cl100kBase);
    }

    #[test]
    fn count_tokens_is_nonzero_for_nonempty_text() {
        assert!(count_tokens("gpt-4o", "hello world") > 0);
    }

    #[test]
    fn char_fallback_rounds_up() {
        assert_eq!(char_fallback("abcde"), 2);
        assert_eq!(char_fallback(""), 0);
    }
}
