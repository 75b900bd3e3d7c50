//! LLM client abstraction

mod client;
mod mock;

pub use client::{LlmClient, Message, Role};
pub use mock::MockLlmClient;
