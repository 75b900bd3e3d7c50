//! Parley AI - conversational ReAct agent with bounded context
//!
//! This crate provides:
//! - ReAct (Reasoning + Acting) loop with batch and streaming delivery
//! - Tool registry and a uniform tool invocation contract
//! - Citation extraction and deduplication from tool observations
//! - Bounded conversation context with token-budgeted windows
//! - LLM-backed history compression with deterministic fallbacks

pub mod agent;
pub mod context;
pub mod error;
pub mod llm;
pub mod tools;

// Re-export commonly used types
pub use agent::{
    AgentResult, Citation, ReActAgent, ReActConfig, StepKind, ThinkingStep, extract_citations,
    parse_action, render_citations,
};
pub use context::{
    ChatSession, CompressionStrategy, ContextConfig, ContextStore, HistoryCompressor,
};
pub use error::{AgentError, Result};
pub use llm::{LlmClient, Message, MockLlmClient, Role};
pub use tools::{Tool, ToolRegistry};
