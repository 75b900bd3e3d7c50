//! Reasoning trace steps

use serde::{Deserialize, Serialize};

/// Kind of a single trace step
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Thought,
    Action,
    FinalAnswer,
    Error,
}

/// One entry of the reasoning loop's append-only trace.
///
/// Steps are immutable once emitted and used for introspection only; the
/// loop never reads them back for control flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThinkingStep {
    pub step: usize,
    #[serde(rename = "type")]
    pub kind: StepKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ThinkingStep {
    pub fn thought(step: usize, content: impl Into<String>) -> Self {
        Self {
            step,
            kind: StepKind::Thought,
            thought: None,
            action: None,
            observation: None,
            content: Some(content.into()),
        }
    }

    pub fn action(
        step: usize,
        thought: impl Into<String>,
        action: impl Into<String>,
        observation: impl Into<String>,
    ) -> Self {
        Self {
            step,
            kind: StepKind::Action,
            thought: Some(thought.into()),
            action: Some(action.into()),
            observation: Some(observation.into()),
            content: None,
        }
    }

    pub fn final_answer(step: usize, content: impl Into<String>) -> Self {
        Self {
            step,
            kind: StepKind::FinalAnswer,
            thought: Some("Final answer reached".to_string()),
            action: None,
            observation: None,
            content: Some(content.into()),
        }
    }

    pub fn error(step: usize, content: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            step,
            kind: StepKind::Error,
            thought: Some(reason.into()),
            action: None,
            observation: None,
            content: Some(content.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_kind_as_type_tag() {
        let step = ThinkingStep::final_answer(3, "42");
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["type"], "final_answer");
        assert_eq!(json["step"], 3);
        assert_eq!(json["content"], "42");
        assert!(json.get("action").is_none());
    }
}
