//! ReAct reasoning loop: Thought -> Action -> Observation until a final
//! answer is produced.
//!
//! The loop is a single lazy step sequence. Batch delivery (`run`) and
//! incremental delivery (`run_stream`) are driven by the same state machine,
//! so both produce identical steps for the same inputs and a deterministic
//! generation backend.

use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::agent::citations::{Citation, extract_citations, render_citations};
use crate::agent::parser::{parse_action, strip_final_answer};
use crate::agent::step::ThinkingStep;
use crate::llm::{LlmClient, Message};
use crate::tools::ToolRegistry;

/// Terminal message when the step budget runs out
pub const MAX_STEPS_MESSAGE: &str = "Sorry, I couldn't find an answer after several steps.";

/// Terminal message when the generation backend fails mid-run
pub const GENERATION_FAILED_MESSAGE: &str =
    "Sorry, I couldn't generate a response. Please try again.";

/// Terminal message when the run is cancelled from outside
pub const CANCELLED_MESSAGE: &str = "The request was cancelled.";

/// ReAct loop configuration
#[derive(Debug, Clone)]
pub struct ReActConfig {
    /// Maximum iterations before forcing termination
    pub max_steps: usize,
}

impl Default for ReActConfig {
    fn default() -> Self {
        Self { max_steps: 100 }
    }
}

/// Result of a completed reasoning run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentResult {
    pub final_answer: String,
    pub steps: Vec<ThinkingStep>,
}

/// Agent controller implementing the ReAct loop
pub struct ReActAgent {
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
    config: ReActConfig,
    cancel: CancellationToken,
}

impl ReActAgent {
    /// Create a new agent over an LLM client and a tool registry
    pub fn new(llm: Arc<dyn LlmClient>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            llm,
            tools,
            config: ReActConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Override the loop configuration
    pub fn with_config(mut self, config: ReActConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a cancellation token, checked at the top of each iteration
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run the loop to completion and return the final answer with the
    /// full ordered trace.
    pub async fn run(&self, user_input: &str) -> AgentResult {
        let mut stream = self.run_stream(user_input);
        let mut steps = Vec::new();
        while let Some(step) = stream.next().await {
            steps.push(step);
        }
        // The stream always ends with a terminal step carrying content.
        let final_answer = steps
            .last()
            .and_then(|step| step.content.clone())
            .unwrap_or_default();
        AgentResult {
            final_answer,
            steps,
        }
    }

    /// Run the loop as a stream of steps, suitable for progressive display
    pub fn run_stream<'a>(
        &'a self,
        user_input: &str,
    ) -> Pin<Box<dyn Stream<Item = ThinkingStep> + Send + 'a>> {
        let user_input = user_input.to_string();
        Box::pin(async_stream::stream! {
            let mut thought = seed_thought(&user_input, &self.tools.tool_list());
            let mut history: Vec<String> = Vec::new();
            let mut citations: Vec<Citation> = Vec::new();
            let mut emitted = 0usize;
            info!(input = %user_input, "starting reasoning loop");

            for iteration in 0..self.config.max_steps {
                if self.cancel.is_cancelled() {
                    warn!("reasoning loop cancelled");
                    emitted += 1;
                    yield ThinkingStep::error(emitted, CANCELLED_MESSAGE, "Cancelled");
                    return;
                }

                debug!(iteration = iteration + 1, "iteration start");
                emitted += 1;
                yield ThinkingStep::thought(emitted, thought.clone());

                let prompt = build_action_prompt(&thought);
                let action = match self.llm.generate(vec![Message::user(prompt)]).await {
                    Ok(action) => action,
                    Err(err) => {
                        warn!(%err, "action generation failed");
                        emitted += 1;
                        yield ThinkingStep::error(emitted, GENERATION_FAILED_MESSAGE, "Generation failed");
                        return;
                    }
                };
                debug!(action = %action, "action generated");

                let Some((tool_name, argument)) = parse_action(&action) else {
                    let mut final_answer = strip_final_answer(&action).to_string();
                    if !citations.is_empty() {
                        final_answer.push_str("\n\n");
                        final_answer.push_str(&render_citations(&citations));
                    }
                    info!("final answer reached");
                    emitted += 1;
                    yield ThinkingStep::final_answer(emitted, final_answer);
                    return;
                };

                let observation = self.execute_action(&tool_name, &argument).await;
                debug!(tool = %tool_name, observation = %observation, "observation received");
                citations.extend(extract_citations(&observation));

                emitted += 1;
                yield ThinkingStep::action(emitted, thought.clone(), action.clone(), observation.clone());

                history.push(format!("Thought: {thought}"));
                history.push(format!("Action: {action}"));
                history.push(format!("Observation: {observation}"));
                thought = next_thought(&history);
            }

            warn!(max_steps = self.config.max_steps, "step budget exhausted");
            emitted += 1;
            yield ThinkingStep::error(emitted, MAX_STEPS_MESSAGE, "Max steps reached");
        })
    }

    /// Execute a parsed tool call; failures become observation text,
    /// never errors.
    async fn execute_action(&self, tool_name: &str, argument: &str) -> String {
        let Some(tool) = self.tools.get(tool_name) else {
            warn!(tool = %tool_name, "tool not found");
            return format!("Tool '{tool_name}' not found.");
        };

        match tool.run(argument).await {
            Ok(Value::String(text)) => text,
            Ok(value) => value.to_string(),
            Err(err) => {
                warn!(tool = %tool_name, %err, "tool execution failed");
                format!("Error executing tool: {err}")
            }
        }
    }
}

fn seed_thought(user_input: &str, tool_list: &str) -> String {
    format!(
        "I need to answer the following question: {user_input}. \
         I should use the tools available to find the answer. \
         The available tools are: {tool_list}. \
         I will start by thinking about which tool to use."
    )
}

fn build_action_prompt(thought: &str) -> String {
    format!(
        "Thought: {thought}\n\n\
         Follow these rules:\n\
         1. Prefer the available tools to gather the information you need.\n\
         2. Invoke a tool as name[argument], for example search[Berlin weather].\n\
         3. When you have the answer, reply with 'Final Answer:' followed by the core answer only.\n\n\
         Action: "
    )
}

fn next_thought(history: &[String]) -> String {
    format!(
        "Based on the history, I need to decide the next step.\n\
         If I have the answer, I will output 'Final Answer:'.\n\
         Otherwise, I will choose another action.\n\n\
         History:\n{}",
        history.join("\n")
    )
}
