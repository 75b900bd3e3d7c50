//! Scripted LLM client for tests and offline runs

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{AgentError, Result};
use crate::llm::{LlmClient, Message};

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Failure(String),
}

/// Mock LLM client that replays a scripted sequence of responses.
///
/// Each `generate` call pops the next scripted entry; once the script is
/// exhausted every further call returns `"Done"`. Requests are captured for
/// later inspection.
pub struct MockLlmClient {
    script: Mutex<VecDeque<Scripted>>,
    call_count: AtomicUsize,
    captured_requests: Mutex<Vec<Vec<Message>>>,
}

impl MockLlmClient {
    /// Create a client that replies with the given texts in order
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| Scripted::Reply(r.into()))
                    .collect(),
            ),
            call_count: AtomicUsize::new(0),
            captured_requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a client whose every call fails with the given message
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        let client = Self::new(Vec::<String>::new());
        // An empty script plus a queued failure keeps erroring forever
        // because the failure entry is re-queued on each call.
        client
            .script
            .lock()
            .unwrap()
            .push_back(Scripted::Failure(message));
        client
    }

    /// Queue a generation failure after the scripted replies
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Failure(message.into()));
        self
    }

    /// Number of `generate` calls made so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Message lists passed to `generate`, in call order
    pub fn captured_requests(&self) -> Vec<Vec<Message>> {
        self.captured_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn generate(&self, messages: Vec<Message>) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.captured_requests.lock().unwrap().push(messages);

        let mut script = self.script.lock().unwrap();
        match script.pop_front() {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Failure(message)) => {
                // Persistent failure mode: keep the entry so repeated calls
                // keep failing rather than falling through to "Done".
                script.push_front(Scripted::Failure(message.clone()));
                Err(AgentError::Llm(message))
            }
            None => Ok("Done".to_string()),
        }
    }
}
