//! Citation extraction and rendering for tool observations.
//!
//! An observation that decodes as a JSON object with a `citations` array of
//! `{title, href, source?}` entries is recognized; any other shape is
//! treated as plain text. Decode failures are silent, never errors.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Structured source reference surfaced inside a tool observation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Citation {
    #[serde(default)]
    pub title: String,
    /// Dedup key; first occurrence wins.
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Extract citations from observation text.
///
/// A structured decode is attempted only when the text looks like a JSON
/// object or array. Entries that fail to decode individually are skipped.
pub fn extract_citations(observation: &str) -> Vec<Citation> {
    let trimmed = observation.trim_start();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return Vec::new();
    }

    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return Vec::new();
    };

    // Only a top-level object carries a `citations` key.
    let citations = value
        .get("citations")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect::<Vec<Citation>>()
        })
        .unwrap_or_default();

    if !citations.is_empty() {
        debug!(count = citations.len(), "extracted citations from observation");
    }
    citations
}

/// Dedupe citations by `href`, preserving first-seen order
pub fn dedup_citations(citations: &[Citation]) -> Vec<Citation> {
    let mut seen = HashSet::new();
    citations
        .iter()
        .filter(|citation| seen.insert(citation.href.clone()))
        .cloned()
        .collect()
}

/// Render citations as a numbered Markdown source list
pub fn render_citations(citations: &[Citation]) -> String {
    let mut out = String::from("### Sources\n");
    for (index, citation) in dedup_citations(citations).iter().enumerate() {
        out.push_str(&format!(
            "{}. [{}]({})",
            index + 1,
            citation.title,
            citation.href
        ));
        if let Some(source) = &citation.source {
            out.push_str(&format!(" - {source}"));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(href: &str) -> Citation {
        Citation {
            title: String::new(),
            href: href.to_string(),
            source: None,
        }
    }

    #[test]
    fn dedupes_by_href_in_first_seen_order() {
        let citations = vec![citation("a"), citation("a"), citation("b")];
        let unique = dedup_citations(&citations);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].href, "a");
        assert_eq!(unique[1].href, "b");
    }

    #[test]
    fn extracts_from_json_object() {
        let observation = r#"{"result": "...", "citations": [
            {"title": "Doc", "href": "https://example.com/doc", "source": "Search"},
            {"title": "Other", "href": "https://example.com/other"}
        ]}"#;
        let citations = extract_citations(observation);
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].title, "Doc");
        assert_eq!(citations[0].source.as_deref(), Some("Search"));
        assert_eq!(citations[1].source, None);
    }

    #[test]
    fn plain_text_yields_nothing() {
        assert!(extract_citations("The weather is sunny.").is_empty());
    }

    #[test]
    fn object_without_citations_key_yields_nothing() {
        assert!(extract_citations(r#"{"result": 42}"#).is_empty());
    }

    #[test]
    fn top_level_array_yields_nothing() {
        assert!(extract_citations(r#"[{"href": "a"}]"#).is_empty());
    }

    #[test]
    fn malformed_json_is_silent() {
        assert!(extract_citations("{not json").is_empty());
    }

    #[test]
    fn entries_missing_href_are_skipped() {
        let observation = r#"{"citations": [{"title": "no link"}, {"href": "b"}]}"#;
        let citations = extract_citations(observation);
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].href, "b");
    }

    #[test]
    fn renders_numbered_markdown_list() {
        let citations = vec![
            Citation {
                title: "Doc".to_string(),
                href: "https://example.com/doc".to_string(),
                source: Some("Search".to_string()),
            },
            citation("https://example.com/other"),
        ];
        let rendered = render_citations(&citations);
        assert_eq!(
            rendered,
            "### Sources\n1. [Doc](https://example.com/doc) - Search\n2. [](https://example.com/other)\n"
        );
    }
}
