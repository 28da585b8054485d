// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

fn code_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```[a-zA-Z]*\n(.*?)```").expect("code fence regex"))
}

fn diagram_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(flowchart|graph|sequenceDiagram|stateDiagram|stateDiagram-v2|classDiagram|erDiagram|journey|gantt|mindmap)",
        )
        .expect("diagram header regex")
    })
}

fn json_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)```json\s*(.*?)```").expect("json fence regex"))
}

fn any_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(.*?)```").expect("any fence regex"))
}

/// Pull diagram source out of a free-form model response.
///
/// A fenced code block wins; otherwise everything from the first recognizable
/// diagram-header keyword onward; otherwise the whole trimmed response.
pub fn extract_mermaid(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    if let Some(captures) = code_fence().captures(text) {
        return captures[1].trim().to_owned();
    }
    if let Some(found) = diagram_header().find(text) {
        return text[found.start()..].trim().to_owned();
    }
    text.trim().to_owned()
}

/// Pull a JSON object out of a free-form model response.
///
/// Prefers a ```json fence, then any fence, then the raw text; within the
/// candidate, the slice from the first `{` to the last `}` is parsed. Returns
/// `None` when nothing parseable is found.
pub fn extract_json(text: &str) -> Option<Value> {
    if text.is_empty() {
        return None;
    }
    let candidate = json_fence()
        .captures(text)
        .or_else(|| any_fence().captures(text))
        .map(|captures| captures.get(1).map(|group| group.as_str()).unwrap_or(""))
        .unwrap_or(text);
    let start = candidate.find('{')?;
    let end = candidate.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&candidate[start..=end]).ok()
}
