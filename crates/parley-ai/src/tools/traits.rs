//! Tool trait for agent capabilities

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Core trait for agent tools.
///
/// A tool takes a free-text argument and returns either plain text
/// (`Value::String`) or a structured mapping. Implementations are not
/// trusted to fail cleanly; the agent loop catches errors and converts
/// them into observation text.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name (used in action syntax)
    fn name(&self) -> &str;

    /// Human-readable description for generation prompts
    fn description(&self) -> &str;

    /// Execute the tool with the given argument
    async fn run(&self, argument: &str) -> Result<Value>;
}
