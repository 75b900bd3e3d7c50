//! LLM client trait and message types

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::context::CompressionStrategy;
use crate::error::Result;

/// Chat message role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Chat message
///
/// A message tagged `compressed` is a synthetic summary that replaced a
/// contiguous prefix of older messages; it is never re-expanded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub compressed: bool,
    /// Number of original messages a compressed message replaced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_count: Option<usize>,
    /// Strategy that produced a compressed message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<CompressionStrategy>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Message {
    /// Create a message with the given role
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            compressed: false,
            original_count: None,
            strategy: None,
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a synthetic system message standing in for `original_count`
    /// older messages collapsed by `strategy`.
    pub fn compressed(
        content: impl Into<String>,
        original_count: usize,
        strategy: CompressionStrategy,
    ) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            compressed: true,
            original_count: Some(original_count),
            strategy: Some(strategy),
        }
    }
}

/// Text-generation client trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Get provider name
    fn provider(&self) -> &str;

    /// Get model name
    fn model(&self) -> &str;

    /// Generate a completion for the ordered message list
    async fn generate(&self, messages: Vec<Message>) -> Result<String>;

    /// Stream a completion as text chunks.
    ///
    /// The default implementation yields the full `generate` result as a
    /// single chunk; clients with native streaming support override this.
    fn generate_stream(&self, messages: Vec<Message>) -> BoxStream<'_, Result<String>> {
        Box::pin(futures::stream::once(self.generate(messages)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_message_serializes_without_compression_fields() {
        let json = serde_json::to_value(Message::user("hello")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hello"}));
    }

    #[test]
    fn compressed_message_serializes_with_tags() {
        let msg = Message::compressed("[History Summary] recap", 7, CompressionStrategy::Summary);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["compressed"], true);
        assert_eq!(json["original_count"], 7);
        assert_eq!(json["strategy"], "summary");
    }

    #[test]
    fn message_roundtrips_through_json() {
        let msg = Message::compressed("recap", 4, CompressionStrategy::ExtractKeyInfo);
        let back: Message = serde_json::from_str(&serde_json::to_string(&msg).unwrap()).unwrap();
        assert_eq!(back, msg);
    }
}
