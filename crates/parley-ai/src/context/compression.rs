//! LLM-backed history compression.
//!
//! Collapses an old span of conversation messages into one synthetic summary
//! message. Generation failures never propagate: each strategy falls back to
//! a fixed truncation of the prefix instead.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::context::estimate_total_tokens;
use crate::llm::{LlmClient, Message};

const SUMMARY_PROMPT: &str = include_str!("templates/summary_prompt.md");
const KEY_INFO_PROMPT: &str = include_str!("templates/key_info_prompt.md");
const HYBRID_PROMPT: &str = include_str!("templates/hybrid_prompt.md");

/// Histories at most this much longer than `keep_last_n` are not worth
/// compressing; `compress` returns them unchanged.
pub const COMPRESSION_SLACK: usize = 2;

/// Recent messages kept verbatim by `incremental_compress`
const INCREMENTAL_KEEP_RECENT: usize = 3;

/// Chunks of at most this many messages are kept verbatim rather than
/// compressed by `incremental_compress`.
const MIN_CHUNK_TO_COMPRESS: usize = 3;

/// Compression strategy for collapsing old conversation history
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompressionStrategy {
    /// Free-form recap of the old conversation
    #[default]
    Summary,
    /// Only facts, decisions, preferences, and action items
    ExtractKeyInfo,
    /// Both a summary and key facts
    Hybrid,
}

impl CompressionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::ExtractKeyInfo => "extract_key_info",
            Self::Hybrid => "hybrid",
        }
    }

    fn prompt(&self) -> &'static str {
        match self {
            Self::Summary => SUMMARY_PROMPT,
            Self::ExtractKeyInfo => KEY_INFO_PROMPT,
            Self::Hybrid => HYBRID_PROMPT,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Summary => "[History Summary]",
            Self::ExtractKeyInfo => "[Key Information]",
            Self::Hybrid => "[Conversation Analysis]",
        }
    }

    /// Number of prefix messages kept verbatim when generation fails.
    /// Hybrid shares Summary's fallback.
    fn fallback_len(&self) -> usize {
        match self {
            Self::Summary | Self::Hybrid => 3,
            Self::ExtractKeyInfo => 2,
        }
    }
}

impl fmt::Display for CompressionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compresses conversation history via LLM summarization
pub struct HistoryCompressor {
    llm: Arc<dyn LlmClient>,
}

impl HistoryCompressor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Whether the history is large enough to warrant compression.
    ///
    /// True when the message count reaches `threshold_messages`, or when a
    /// token threshold is given and the estimated total exceeds it.
    pub fn should_compress(
        &self,
        history: &[Message],
        threshold_messages: usize,
        threshold_tokens: Option<usize>,
    ) -> bool {
        history.len() >= threshold_messages
            || threshold_tokens.is_some_and(|limit| estimate_total_tokens(history) > limit)
    }

    /// Compress all but the last `keep_last_n` messages into exactly one
    /// synthetic message via the given strategy.
    pub async fn compress(
        &self,
        history: &[Message],
        strategy: CompressionStrategy,
        keep_last_n: usize,
    ) -> Vec<Message> {
        if history.len() <= keep_last_n + COMPRESSION_SLACK {
            debug!(len = history.len(), "history too short for compression, skipping");
            return history.to_vec();
        }

        let split = history.len() - keep_last_n;
        let (old, recent) = history.split_at(split);

        let mut result = self.collapse(old, strategy).await;
        result.extend_from_slice(recent);

        info!(
            from = history.len(),
            to = result.len(),
            strategy = %strategy,
            "history compressed"
        );
        result
    }

    /// Compress the old-message prefix chunk by chunk, keeping the last
    /// three messages verbatim. More generation calls, finer granularity;
    /// chunks of two or fewer messages are kept as-is.
    pub async fn incremental_compress(
        &self,
        history: &[Message],
        chunk_size: usize,
        strategy: CompressionStrategy,
    ) -> Vec<Message> {
        let chunk_size = chunk_size.max(1);
        if history.len() <= chunk_size + INCREMENTAL_KEEP_RECENT {
            return history.to_vec();
        }

        let split = history.len() - INCREMENTAL_KEEP_RECENT;
        let (old, recent) = history.split_at(split);

        let mut result = Vec::new();
        for chunk in old.chunks(chunk_size) {
            if chunk.len() >= MIN_CHUNK_TO_COMPRESS {
                result.extend(self.collapse(chunk, strategy).await);
            } else {
                result.extend_from_slice(chunk);
            }
        }
        result.extend_from_slice(recent);
        result
    }

    /// Collapse a message span into one synthetic message, falling back to
    /// a fixed truncation of the span when generation fails.
    async fn collapse(&self, old: &[Message], strategy: CompressionStrategy) -> Vec<Message> {
        let conversation = format_conversation(old);
        let prompt = strategy.prompt().replace("{conversation}", &conversation);

        match self.llm.generate(vec![Message::user(prompt)]).await {
            Ok(text) => vec![Message::compressed(
                format!("{} {}", strategy.label(), text),
                old.len(),
                strategy,
            )],
            Err(err) => {
                warn!(%err, strategy = %strategy, "compression generation failed, truncating instead");
                let keep = strategy.fallback_len().min(old.len());
                old[..keep].to_vec()
            }
        }
    }
}

/// Format a message span as `role: content` lines for summarization
fn format_conversation(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|message| format!("{}: {}", message.role.as_str(), message.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MockLlmClient, Role};

    fn history_of(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(format!("user message {i}"))
                } else {
                    Message::assistant(format!("assistant reply {i}"))
                }
            })
            .collect()
    }

    #[test]
    fn should_compress_at_message_threshold() {
        let compressor = HistoryCompressor::new(Arc::new(MockLlmClient::new(["x"])));
        assert!(!compressor.should_compress(&history_of(14), 15, None));
        assert!(compressor.should_compress(&history_of(15), 15, None));
    }

    #[test]
    fn should_compress_at_token_threshold() {
        let compressor = HistoryCompressor::new(Arc::new(MockLlmClient::new(["x"])));
        let history = vec![Message::user("a".repeat(400))];
        // 100 estimated tokens: over a 50-token limit, under the message count.
        assert!(compressor.should_compress(&history, 15, Some(50)));
        assert!(!compressor.should_compress(&history, 15, Some(200)));
    }

    #[tokio::test]
    async fn summary_collapses_prefix_into_one_message() {
        let mock = Arc::new(MockLlmClient::new(["a recap of the conversation"]));
        let compressor = HistoryCompressor::new(mock.clone());
        let history = history_of(10);

        let compressed = compressor
            .compress(&history, CompressionStrategy::Summary, 3)
            .await;

        assert_eq!(compressed.len(), 4);
        assert_eq!(mock.call_count(), 1);

        let head = &compressed[0];
        assert!(head.compressed);
        assert_eq!(head.role, Role::System);
        assert_eq!(head.original_count, Some(7));
        assert_eq!(head.strategy, Some(CompressionStrategy::Summary));
        assert_eq!(head.content, "[History Summary] a recap of the conversation");
        assert_eq!(compressed[1..], history[7..]);
    }

    #[tokio::test]
    async fn strategies_use_their_own_labels() {
        let compressor = HistoryCompressor::new(Arc::new(MockLlmClient::new(["facts", "both"])));
        let history = history_of(10);

        let extracted = compressor
            .compress(&history, CompressionStrategy::ExtractKeyInfo, 3)
            .await;
        assert!(extracted[0].content.starts_with("[Key Information]"));
        assert_eq!(extracted[0].strategy, Some(CompressionStrategy::ExtractKeyInfo));

        let hybrid = compressor
            .compress(&history, CompressionStrategy::Hybrid, 3)
            .await;
        assert!(hybrid[0].content.starts_with("[Conversation Analysis]"));
    }

    #[tokio::test]
    async fn short_history_is_returned_unchanged() {
        let mock = Arc::new(MockLlmClient::new(["unused"]));
        let compressor = HistoryCompressor::new(mock.clone());
        let history = history_of(5);

        let result = compressor
            .compress(&history, CompressionStrategy::Summary, 3)
            .await;

        assert_eq!(result, history);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn generation_failure_falls_back_to_truncation() {
        let history = history_of(10);

        let compressor = HistoryCompressor::new(Arc::new(MockLlmClient::failing("down")));
        let summary = compressor
            .compress(&history, CompressionStrategy::Summary, 3)
            .await;
        // First 3 of the 7-message prefix plus the 3 recent messages.
        assert_eq!(summary.len(), 6);
        assert_eq!(summary[..3], history[..3]);
        assert_eq!(summary[3..], history[7..]);
        assert!(summary.iter().all(|m| !m.compressed));

        let extract = compressor
            .compress(&history, CompressionStrategy::ExtractKeyInfo, 3)
            .await;
        assert_eq!(extract.len(), 5);
        assert_eq!(extract[..2], history[..2]);

        let hybrid = compressor
            .compress(&history, CompressionStrategy::Hybrid, 3)
            .await;
        assert_eq!(hybrid.len(), 6);
        assert_eq!(hybrid[..3], history[..3]);
    }

    #[tokio::test]
    async fn incremental_compress_summarizes_per_chunk() {
        let mock = Arc::new(MockLlmClient::new(["s1", "s2", "s3"]));
        let compressor = HistoryCompressor::new(mock.clone());
        let history = history_of(20);

        let result = compressor
            .incremental_compress(&history, 5, CompressionStrategy::Summary)
            .await;

        // 17 old messages -> chunks of 5, 5, 5, 2: three summaries plus the
        // two-message tail kept verbatim, then the three recent messages.
        assert_eq!(mock.call_count(), 3);
        assert_eq!(result.len(), 3 + 2 + 3);
        assert!(result[0].compressed);
        assert_eq!(result[0].original_count, Some(5));
        assert!(!result[3].compressed);
        assert_eq!(result[3..5], history[15..17]);
        assert_eq!(result[5..], history[17..]);
    }

    #[tokio::test]
    async fn incremental_compress_skips_short_histories() {
        let mock = Arc::new(MockLlmClient::new(["unused"]));
        let compressor = HistoryCompressor::new(mock.clone());
        let history = history_of(8);

        let result = compressor
            .incremental_compress(&history, 5, CompressionStrategy::Summary)
            .await;

        assert_eq!(result, history);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn compression_prompt_carries_the_conversation() {
        let mock = Arc::new(MockLlmClient::new(["recap"]));
        let compressor = HistoryCompressor::new(mock.clone());
        let history = history_of(10);

        compressor
            .compress(&history, CompressionStrategy::Summary, 3)
            .await;

        let requests = mock.captured_requests();
        assert_eq!(requests.len(), 1);
        let prompt = &requests[0][0].content;
        assert!(prompt.contains("user: user message 0"));
        assert!(prompt.contains("assistant: assistant reply 5"));
        assert!(!prompt.contains("user message 7"), "recent messages stay out of the prompt");
    }
}
