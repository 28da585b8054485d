// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

use serde_json::Value;

use crate::model::RecognitionSession;
use crate::query::{infer_adjacency, AdjacencyOptions};

const MAX_CONTEXT_BLOCKS: usize = 120;
const MAX_CONTEXT_LINES: usize = 80;

/// What kind of diagram the user says the sketch is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DiagramHint {
    #[default]
    Auto,
    Swimlane,
    Named(String),
}

impl DiagramHint {
    /// The prompt line for this hint, if any.
    pub fn note(&self) -> Option<String> {
        match self {
            DiagramHint::Auto => None,
            DiagramHint::Swimlane => {
                Some("User hint: swimlane diagram. Use subgraph lanes with labels.".to_owned())
            }
            DiagramHint::Named(name) => Some(format!("User hint: diagram_type={name}.")),
        }
    }
}

/// Textual context describing the recognized sketch content, for inclusion
/// in a generation prompt. Blocks and lines are capped so a noisy sketch
/// cannot blow up the prompt. `None` when no active blocks exist.
pub fn recognition_context(
    session: &RecognitionSession,
    options: AdjacencyOptions,
) -> Option<String> {
    let blocks: Vec<_> = session.active_blocks().take(MAX_CONTEXT_BLOCKS).collect();
    if blocks.is_empty() {
        return None;
    }
    let mut content: Vec<String> = Vec::new();
    content.push("OCR blocks (text @ x,y,w,h):".to_owned());
    for (index, block) in blocks.iter().enumerate() {
        let position = match block.bounds() {
            Some(b) => format!("{},{},{},{}", b.x, b.y, b.w, b.h),
            None => "n/a".to_owned(),
        };
        content.push(format!("{}. \"{}\" @ {}", index + 1, block.text(), position));
    }

    let lines: Vec<_> = session.active_lines().take(MAX_CONTEXT_LINES).collect();
    if !lines.is_empty() {
        content.push(String::new());
        content.push("Detected line segments (x1,y1 -> x2,y2):".to_owned());
        for (index, line) in lines.iter().enumerate() {
            content.push(format!(
                "L{}: {},{} -> {},{}",
                index + 1,
                line.x1,
                line.y1,
                line.x2,
                line.y2
            ));
        }
        let hints = infer_adjacency(session, options);
        if !hints.is_empty() {
            content.push(String::new());
            content.push("Line adjacency hints (block ids):".to_owned());
            for hint in hints {
                content.push(format!("- {}<->{}", hint.a(), hint.b()));
            }
        }
    }
    Some(content.join("\n"))
}

fn push_if(lines: &mut Vec<String>, text: impl Into<String>) {
    let text = text.into();
    if !text.is_empty() {
        lines.push(text);
    }
}

/// Stage-one prompt: analyze the sketch and answer with a JSON structure.
pub fn structure_prompt(
    user_prompt: &str,
    context: Option<&str>,
    hint: &DiagramHint,
) -> String {
    let hint_note = hint.note();
    let mut lines: Vec<String> = vec![
        "You are a flowchart analyst.".into(),
        "Read the image and return JSON only.".into(),
        "Schema:".into(),
        "{".into(),
        "  \"diagram_type\": \"flowchart|tree|swimlane|sequence|state|unknown\",".into(),
        "  \"direction\": \"TD|LR|TB|RL\",".into(),
        "  \"nodes\": [{\"id\":\"A\",\"label\":\"Start\",\"shape\":\"round\"}],".into(),
        "  \"edges\": [{\"from\":\"A\",\"to\":\"B\",\"label\":\"Yes\"}],".into(),
        "  \"lanes\": [{\"id\":\"L1\",\"label\":\"User\",\"nodes\":[\"A\",\"B\"]}]".into(),
        "}".into(),
        "Rules:".into(),
        "- Output JSON only, no markdown fences.".into(),
        "- Use short ASCII ids (A, B, C...).".into(),
        "- Keep labels short and readable.".into(),
        "- Every edge must reference existing node ids.".into(),
        "- Do not invent edges based on label meaning; only use visible connections.".into(),
        "- If a connection is unclear, omit it instead of guessing.".into(),
        "- Make sure node ids are unique and referenced consistently in edges.".into(),
        "- If lanes are not present, return an empty array for lanes.".into(),
    ];
    if hint_note.is_some() {
        lines.push(
            "- If the user hint specifies a diagram type, set diagram_type to that value.".into(),
        );
    }
    lines.push("- If line segments are provided, use them to infer node connections.".into());
    lines.push(
        "- If arrowheads are unclear, infer direction using layout (top-to-bottom, left-to-right)."
            .into(),
    );
    lines.push("- If still unclear, omit the edge.".into());
    if let Some(context) = context {
        lines.push("Use OCR blocks to recover small text labels.".into());
        lines.push(context.to_owned());
    }
    if let Some(note) = hint_note {
        lines.push(note);
    }
    if !user_prompt.is_empty() {
        lines.push(format!("User constraints:\n{user_prompt}"));
    }
    lines.join("\n")
}

/// One-step prompt: analyze the sketch and answer with Mermaid directly.
pub fn single_shot_prompt(
    user_prompt: &str,
    context: Option<&str>,
    hint: &DiagramHint,
) -> String {
    let hint_note = hint.note();
    let mut lines: Vec<String> = vec![
        "You are a flowchart analyst.".into(),
        "Read the image and output Mermaid code only.".into(),
        "Rules:".into(),
        "- Prefer flowchart TD unless the diagram is clearly sequence or state.".into(),
        "- If the diagram is sequence, use sequenceDiagram.".into(),
        "- If the diagram is state-based, use stateDiagram-v2.".into(),
        "- For swimlanes, use subgraph blocks.".into(),
    ];
    if hint_note.is_some() {
        lines.push("- Follow the user hint for diagram type.".into());
    }
    lines.push("- Use line segments to infer connections between nodes.".into());
    lines.push("- If arrowheads are unclear, infer direction from layout.".into());
    lines.push("- Keep labels short and readable.".into());
    lines.push(
        "- Put exactly one statement per line; never place two node definitions on one line."
            .into(),
    );
    lines.push("- If a label needs multiple lines, use <br/> inside the label.".into());
    lines.push("- Do not invent edges that are not visible in the image.".into());
    lines.push("- No markdown fences or extra commentary.".into());
    if let Some(context) = context {
        lines.push("Use OCR blocks to recover small text labels.".into());
        lines.push(context.to_owned());
    }
    if let Some(note) = hint_note {
        lines.push(note);
    }
    if !user_prompt.is_empty() {
        lines.push(format!("User constraints:\n{user_prompt}"));
    }
    lines.join("\n")
}

/// Stage-two prompt: turn the stage-one JSON structure into Mermaid.
pub fn draft_prompt(structure: &Value, user_prompt: &str, hint: &DiagramHint) -> String {
    let json_block = serde_json::to_string_pretty(structure).unwrap_or_default();
    let hint_note = hint.note();
    let mut lines: Vec<String> = vec![
        "You are a Mermaid author.".into(),
        "Using the JSON structure below, output Mermaid code only.".into(),
        "Rules:".into(),
        "- If diagram_type is sequence, use sequenceDiagram.".into(),
        "- If diagram_type is state, use stateDiagram-v2.".into(),
        "- Otherwise use flowchart with direction from JSON.".into(),
        "- If direction is missing, default to TD.".into(),
        "- Map shapes: round -> ( ), square -> [ ], diamond -> { }.".into(),
        "- If lanes are provided, use subgraph blocks per lane.".into(),
    ];
    if hint_note.is_some() {
        lines.push("- Follow the user hint for diagram type.".into());
    }
    if *hint == DiagramHint::Swimlane {
        lines.push(
            "- If diagram_type is swimlane and lanes are empty, infer lanes or create generic lanes."
                .into(),
        );
    }
    lines.push("- No markdown fences or extra commentary.".into());
    lines.push("- Output exactly the nodes and edges from JSON; do not add or drop any.".into());
    lines.push(
        "- Put exactly one statement per line; never place two node definitions on one line."
            .into(),
    );
    lines.push("- If a label needs multiple lines, use <br/> inside the label.".into());
    lines.push(
        "- Do not invent edges or reorder relationships; keep the JSON graph structure.".into(),
    );
    if !user_prompt.is_empty() {
        lines.push(format!("User constraints:\n{user_prompt}"));
    }
    if let Some(note) = hint_note {
        lines.push(note);
    }
    lines.push("JSON:".into());
    push_if(&mut lines, json_block);
    lines.join("\n")
}

/// Prompt asking the model to double-check Mermaid syntax before display.
pub fn final_check_prompt(mermaid: &str) -> String {
    [
        "You are a Mermaid syntax checker.",
        "Fix any Mermaid syntax errors and return Mermaid code only.",
        "If the code is already valid, return it unchanged.",
        "Ensure the first line is just the diagram header (e.g. flowchart TD).",
        "Remove stray '>' after edge labels (use: A -->|label| B).",
        "Do not include graph/flowchart directives on lines after the header.",
        "Ensure exactly one statement per line; split adjacent node definitions onto separate lines.",
        "If a label needs multiple lines, use <br/> inside the label.",
        "Do not change the graph structure (nodes/edges); only fix syntax.",
        "No markdown fences or extra commentary.",
        "Mermaid:",
        mermaid,
    ]
    .join("\n")
}

/// Prompt asking the model to fix Mermaid that the renderer rejected.
pub fn repair_prompt(mermaid: &str, error_message: &str, original: Option<&str>) -> String {
    let mut lines: Vec<String> = vec![
        "You fix Mermaid syntax errors.".into(),
        "Given the Mermaid code and parser error, return corrected Mermaid only.".into(),
        "Do not add explanations or markdown fences.".into(),
        "Ensure the first line is a proper header (e.g. flowchart TD).".into(),
        "Use correct edge label syntax: A -->|label| B (no extra '>').".into(),
        "Preserve every node label and relationship; do not drop any text.".into(),
        "If a node label needs multiple lines, keep it in one node using <br/>.".into(),
        "Ensure exactly one statement per line; split adjacent node definitions onto separate lines."
            .into(),
        "Do not invent or remove edges; keep the same structure.".into(),
    ];
    if let Some(original) = original.filter(|o| *o != mermaid) {
        lines.push(format!(
            "Original Mermaid (do not drop any labels or relationships):\n{original}"
        ));
    }
    lines.push("Error:".into());
    lines.push(error_message.to_owned());
    lines.push("Mermaid:".into());
    lines.push(mermaid.to_owned());
    lines.join("\n")
}
