//! Action grammar for free-text model output.
//!
//! The tool-call grammar is a hard contract, not a best-effort regex:
//! `Identifier '[' Body ']'` where `Identifier` is `\w+` and `Body` may not
//! contain an unescaped `]`. The first match wins. The line scanned first is
//! the *last* line containing the literal `Action:` marker; if there is no
//! marker line, or the pattern does not match it, the entire text is scanned
//! and the body may span multiple lines.

use once_cell::sync::Lazy;
use regex::Regex;

/// Literal marker identifying the action line in model output
pub const ACTION_MARKER: &str = "Action:";

/// Terminal marker stripped from final answer text.
///
/// Its presence is never a termination signal on its own; the loop ends
/// when no tool call can be parsed.
pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";

static TOOL_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)\[((?:\\.|[^\]\\])*)\]").expect("tool call pattern is valid"));

/// Extract a `(tool, argument)` pair from action text.
///
/// Returns `None` when no tool call is present, which the agent loop treats
/// as the termination signal.
pub fn parse_action(text: &str) -> Option<(String, String)> {
    if let Some(line) = text.lines().rev().find(|line| line.contains(ACTION_MARKER))
        && let Some(call) = match_tool_call(line)
    {
        return Some(call);
    }
    match_tool_call(text)
}

fn match_tool_call(text: &str) -> Option<(String, String)> {
    TOOL_CALL
        .captures(text)
        .map(|caps| (caps[1].trim().to_string(), caps[2].trim().to_string()))
}

/// Strip the terminal marker from final answer text.
///
/// Everything up to and including the last `Final Answer:` occurrence is
/// removed; without the marker the text is returned trimmed.
pub fn strip_final_answer(text: &str) -> &str {
    match text.rfind(FINAL_ANSWER_MARKER) {
        Some(idx) => text[idx + FINAL_ANSWER_MARKER.len()..].trim(),
        None => text.trim(),
    }
}
