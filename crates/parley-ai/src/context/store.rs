//! Ordered conversation log with message-count and token-budget limits.
//!
//! The store owns one conversation session's history. Appends transparently
//! trigger compression once the configured threshold is crossed; otherwise
//! the history is hard-truncated to the newest `history_limit` messages.

use tracing::{debug, info};

use crate::context::compression::{CompressionStrategy, HistoryCompressor};
use crate::context::estimate_tokens;
use crate::llm::{Message, Role};

/// Context store configuration
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Hard cap on stored messages when compression does not run
    pub history_limit: usize,
    /// Default token budget for `context_window`
    pub max_context_tokens: usize,
    pub compression_enabled: bool,
    /// Compress once the history reaches this many messages
    pub compression_threshold: usize,
    /// Optional token-count trigger in addition to the message count
    pub compression_token_threshold: Option<usize>,
    pub compression_strategy: CompressionStrategy,
    /// Messages kept verbatim at the end of a compressed history
    pub keep_last_n: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            history_limit: 10,
            max_context_tokens: 4096,
            compression_enabled: true,
            compression_threshold: 15,
            compression_token_threshold: None,
            compression_strategy: CompressionStrategy::Summary,
            keep_last_n: 3,
        }
    }
}

/// Ordered conversation log for a single session
pub struct ContextStore {
    history: Vec<Message>,
    config: ContextConfig,
    compressor: Option<HistoryCompressor>,
}

impl ContextStore {
    /// Create a store without a compressor; overflow is handled by
    /// truncation only.
    pub fn new(config: ContextConfig) -> Self {
        Self {
            history: Vec::new(),
            config,
            compressor: None,
        }
    }

    /// Attach a history compressor
    pub fn with_compressor(mut self, compressor: HistoryCompressor) -> Self {
        self.compressor = Some(compressor);
        self
    }

    /// Append a message built from role and content
    pub async fn add_message(&mut self, role: Role, content: impl Into<String>) {
        self.add(Message::new(role, content)).await;
    }

    /// Append a message, then compress or truncate as needed
    pub async fn add(&mut self, message: Message) {
        self.history.push(message);

        if self.should_compress() {
            // Checked by should_compress.
            let Some(compressor) = &self.compressor else {
                return;
            };
            let original_count = self.history.len();
            let compressed = compressor
                .compress(
                    &self.history,
                    self.config.compression_strategy,
                    self.config.keep_last_n,
                )
                .await;
            info!(
                from = original_count,
                to = compressed.len(),
                "context history compressed"
            );
            self.history = compressed;
        } else if self.history.len() > self.config.history_limit {
            let excess = self.history.len() - self.config.history_limit;
            self.history.drain(..excess);
            debug!(limit = self.config.history_limit, "context history truncated");
        }
    }

    /// Build a context window within the given token budget.
    ///
    /// Scans newest to oldest, costing each message at `len / 4` tokens,
    /// and stops at the first candidate that would exceed the budget (an
    /// older message is never included past a skipped one). The returned
    /// slice is in chronological order.
    pub fn get_context(&self, max_tokens: usize) -> Vec<Message> {
        let mut selected = Vec::new();
        let mut total = 0;

        for message in self.history.iter().rev() {
            let cost = estimate_tokens(&message.content);
            if total + cost > max_tokens {
                break;
            }
            selected.push(message.clone());
            total += cost;
        }

        selected.reverse();
        selected
    }

    /// Context window at the configured default budget
    pub fn context_window(&self) -> Vec<Message> {
        self.get_context(self.config.max_context_tokens)
    }

    /// Full stored history, oldest first
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Empty the history
    pub fn clear(&mut self) {
        self.history.clear();
    }

    fn should_compress(&self) -> bool {
        self.config.compression_enabled
            && self.compressor.as_ref().is_some_and(|compressor| {
                compressor.should_compress(
                    &self.history,
                    self.config.compression_threshold,
                    self.config.compression_token_threshold,
                )
            })
    }
}
