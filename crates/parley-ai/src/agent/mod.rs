//! ReAct agent: action grammar, citation handling, and the reasoning loop

mod citations;
mod parser;
mod react;
mod step;


pub use citations::{Citation, dedup_citations, extract_citations, render_citations};
pub use parser::{ACTION_MARKER, FINAL_ANSWER_MARKER, parse_action, strip_final_answer};
pub use react::{
    AgentResult, CANCELLED_MESSAGE, GENERATION_FAILED_MESSAGE, MAX_STEPS_MESSAGE, ReActAgent,
    ReActConfig,
};
pub use step::{StepKind, ThinkingStep};
