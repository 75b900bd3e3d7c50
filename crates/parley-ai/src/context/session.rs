//! Context-aware chat session.
//!
//! Ties the context store and the generation backend together: each turn
//! appends the user message, prompts the LLM with the current context
//! window, and records the reply.

use std::sync::Arc;

use tracing::debug;

use crate::context::compression::HistoryCompressor;
use crate::context::store::{ContextConfig, ContextStore};
use crate::error::Result;
use crate::llm::{LlmClient, Message, Role};

/// A single conversation session over a bounded context store
pub struct ChatSession {
    llm: Arc<dyn LlmClient>,
    store: ContextStore,
}

impl ChatSession {
    /// Create a session with the default store configuration and an
    /// LLM-backed compressor.
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        let store = ContextStore::new(ContextConfig::default())
            .with_compressor(HistoryCompressor::new(llm.clone()));
        Self { llm, store }
    }

    /// Create a session over a preconfigured store
    pub fn with_store(llm: Arc<dyn LlmClient>, store: ContextStore) -> Self {
        Self { llm, store }
    }

    /// Process one user turn and return the assistant reply.
    ///
    /// The optional system prompt is prepended to the context window for
    /// this call only; it is not stored in the history.
    pub async fn interact(
        &mut self,
        user_input: &str,
        system_prompt: Option<&str>,
    ) -> Result<String> {
        self.store.add_message(Role::User, user_input).await;

        let mut messages = Vec::new();
        if let Some(prompt) = system_prompt {
            messages.push(Message::system(prompt));
        }
        messages.extend(self.store.context_window());
        debug!(messages = messages.len(), "sending context window");

        let response = self.llm.generate(messages).await?;
        self.store
            .add_message(Role::Assistant, response.clone())
            .await;
        Ok(response)
    }

    /// Current context window
    pub fn context(&self) -> Vec<Message> {
        self.store.context_window()
    }

    /// Clear the session history
    pub fn clear_context(&mut self) {
        self.store.clear();
    }
}
