//! Bounded conversation context: ordered history, token-budgeted windows,
//! and LLM-backed history compression.

mod compression;
mod session;
mod store;

pub use compression::{COMPRESSION_SLACK, CompressionStrategy, HistoryCompressor};
pub use session::ChatSession;
pub use store::{ContextConfig, ContextStore};

use crate::llm::Message;

/// Approximate characters per token used by all budget estimates
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimate the token cost of a text
pub fn estimate_tokens(text: &str) -> usize {
    text.len() / CHARS_PER_TOKEN
}

/// Estimate the total token cost of a message list
pub fn estimate_total_tokens(messages: &[Message]) -> usize {
    messages
        .iter()
        .map(|message| estimate_tokens(&message.content))
        .sum()
}
