// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use smol_str::SmolStr;

use crate::model::{BoundingBox, RecognitionBlock, RecognitionLine, RecognitionSession};

use super::{ImagePayload, RemoteError};

/// Tuning knobs for the Hough line detector, clamped to the ranges the
/// detection service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionParams {
    pub canny_low: u32,
    pub canny_high: u32,
    pub threshold: u32,
    pub min_line_length: u32,
    pub max_line_gap: u32,
    pub max_lines: u32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            canny_low: 50,
            canny_high: 150,
            threshold: 60,
            min_line_length: 30,
            max_line_gap: 8,
            max_lines: 80,
        }
    }
}

impl DetectionParams {
    /// Clamp every knob into its accepted range. The upper Canny threshold is
    /// additionally raised to at least the lower one.
    pub fn clamped(self) -> Self {
        let canny_low = self.canny_low.min(500);
        Self {
            canny_low,
            canny_high: self.canny_high.min(500).max(canny_low),
            threshold: self.threshold.clamp(1, 500),
            min_line_length: self.min_line_length.min(2000),
            max_line_gap: self.max_line_gap.min(500),
            max_lines: self.max_lines.clamp(1, 400),
        }
    }
}

/// One recognition call: the sketch image plus detector tuning.
#[derive(Debug, Clone, Serialize)]
pub struct RecognitionRequest {
    pub image: ImagePayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(flatten)]
    pub line_params: DetectionParams,
}

/// Text-and-line recognition over a sketch image.
#[allow(async_fn_in_trait)]
pub trait LineRecognizer {
    async fn recognize(&self, request: RecognitionRequest) -> Result<RawRecognitionResponse, RemoteError>;
}

/// The recognizer's response before any shape checking. Field names vary
/// across backends, so elements stay as raw JSON until adapted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecognitionResponse {
    #[serde(default, alias = "textBlocks", alias = "words")]
    pub blocks: Vec<Value>,
    #[serde(default)]
    pub lines: Vec<Value>,
    #[serde(default)]
    pub text: Option<String>,
}

fn num(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn box_from_value(value: &Value) -> Option<BoundingBox> {
    if let Some(items) = value.as_array() {
        if items.len() >= 4 {
            return Some(BoundingBox {
                x: num(&items[0])?,
                y: num(&items[1])?,
                w: num(&items[2])?,
                h: num(&items[3])?,
            });
        }
        return None;
    }
    let object = value.as_object()?;
    if !object.contains_key("x") && !object.contains_key("y") {
        return None;
    }
    let field = |a: &str, b: &str| {
        object
            .get(a)
            .or_else(|| object.get(b))
            .and_then(num)
            .unwrap_or(0.0)
    };
    Some(BoundingBox {
        x: field("x", "left"),
        y: field("y", "top"),
        w: field("w", "width"),
        h: field("h", "height"),
    })
}

fn block_from_value(value: &Value, index: usize) -> Option<RecognitionBlock> {
    let object = value.as_object()?;
    let text = object
        .get("text")
        .or_else(|| object.get("value"))
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("");
    if text.is_empty() {
        return None;
    }
    let bounds = ["box", "bbox", "boundingBox", "rect"]
        .iter()
        .filter_map(|key| object.get(*key))
        .find_map(box_from_value);
    Some(RecognitionBlock::new(
        SmolStr::new(format!("B{}", index + 1)),
        text.to_owned(),
        bounds,
    ))
}

fn line_from_value(value: &Value, index: usize) -> Option<RecognitionLine> {
    let coord = |key: &str, position: usize| {
        value
            .get(key)
            .or_else(|| value.get(position))
            .and_then(num)
    };
    Some(RecognitionLine::detected(
        SmolStr::new(format!("L{}", index + 1)),
        coord("x1", 0)?,
        coord("y1", 1)?,
        coord("x2", 2)?,
        coord("y2", 3)?,
    ))
}

/// Adapt a raw recognizer response into a session.
///
/// Malformed elements are dropped one by one instead of failing the whole
/// payload. When no structured blocks survive but the response carries a
/// plain `text` field, that text becomes a single unpositioned block.
/// Returns `None` when nothing usable remains.
pub fn session_from_raw(raw: &RawRecognitionResponse) -> Option<RecognitionSession> {
    let mut blocks: Vec<RecognitionBlock> = Vec::new();
    let mut next = 0usize;
    for value in &raw.blocks {
        if let Some(block) = block_from_value(value, next) {
            blocks.push(block);
            next += 1;
        }
    }
    let mut lines: Vec<RecognitionLine> = Vec::new();
    for value in &raw.lines {
        if let Some(line) = line_from_value(value, lines.len()) {
            lines.push(line);
        }
    }
    if blocks.is_empty() {
        if let Some(text) = raw.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            blocks.push(RecognitionBlock::new(SmolStr::new("B1"), text.to_owned(), None));
        }
    }
    if blocks.is_empty() && lines.is_empty() {
        return None;
    }
    Some(RecognitionSession::new(blocks, lines))
}

/// Serialize the active parts of a session for inclusion in a prompt:
/// block text with coordinates, and line endpoints. `None` when nothing
/// is active.
pub fn payload_from_session(session: &RecognitionSession) -> Option<Value> {
    let blocks: Vec<Value> = session
        .active_blocks()
        .map(|block| {
            json!({
                "text": block.text(),
                "box": block.bounds(),
            })
        })
        .collect();
    let lines: Vec<Value> = session
        .active_lines()
        .map(|line| {
            json!({
                "x1": line.x1,
                "y1": line.y1,
                "x2": line.x2,
                "y2": line.y2,
            })
        })
        .collect();
    if blocks.is_empty() && lines.is_empty() {
        return None;
    }
    Some(json!({ "blocks": blocks, "lines": lines }))
}
