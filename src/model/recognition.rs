// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Axis-aligned box in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BoundingBox {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// A piece of recognized text with its location, when the recognizer
/// reported one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionBlock {
    id: SmolStr,
    text: String,
    #[serde(rename = "box")]
    bounds: Option<BoundingBox>,
    active: bool,
}

impl RecognitionBlock {
    pub fn new(id: SmolStr, text: String, bounds: Option<BoundingBox>) -> Self {
        Self {
            id,
            text,
            bounds,
            active: true,
        }
    }

    pub fn id(&self) -> &SmolStr {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: String) {
        self.text = text;
    }

    pub fn bounds(&self) -> Option<&BoundingBox> {
        self.bounds.as_ref()
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

/// Where a connector line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineSource {
    Hough,
    Manual,
}

/// A detected or user-drawn connector segment between two image points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionLine {
    id: SmolStr,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    source: LineSource,
    active: bool,
    #[serde(default)]
    from_id: Option<SmolStr>,
    #[serde(default)]
    to_id: Option<SmolStr>,
}

impl RecognitionLine {
    pub fn detected(id: SmolStr, x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            id,
            x1,
            y1,
            x2,
            y2,
            source: LineSource::Hough,
            active: true,
            from_id: None,
            to_id: None,
        }
    }

    pub fn manual(id: SmolStr, from_id: SmolStr, to_id: SmolStr, x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            id,
            x1,
            y1,
            x2,
            y2,
            source: LineSource::Manual,
            active: true,
            from_id: Some(from_id),
            to_id: Some(to_id),
        }
    }

    pub fn id(&self) -> &SmolStr {
        &self.id
    }

    pub fn source(&self) -> LineSource {
        self.source
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn from_id(&self) -> Option<&SmolStr> {
        self.from_id.as_ref()
    }

    pub fn to_id(&self) -> Option<&SmolStr> {
        self.to_id.as_ref()
    }

    /// Endpoint pair with a canonical ordering, for duplicate checks.
    pub fn endpoint_pair(&self) -> Option<(&SmolStr, &SmolStr)> {
        let from = self.from_id.as_ref()?;
        let to = self.to_id.as_ref()?;
        if from <= to {
            Some((from, to))
        } else {
            Some((to, from))
        }
    }
}

/// A staged, not-yet-applied edit for one block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Controls what survives a recognition refresh.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshOptions {
    /// Keep the existing text blocks instead of replacing them.
    pub preserve_blocks: bool,
    /// Carry user-drawn connector lines over to the refreshed result.
    pub keep_manual: bool,
}

/// Everything recognized from one sketch image, plus edit state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognitionSession {
    blocks: Vec<RecognitionBlock>,
    lines: Vec<RecognitionLine>,
    #[serde(default)]
    selected_block_id: Option<SmolStr>,
    #[serde(default)]
    selected_line_id: Option<SmolStr>,
    #[serde(default)]
    pending_edits: BTreeMap<SmolStr, BlockPatch>,
    #[serde(default)]
    manual_line_counter: u64,
}

impl RecognitionSession {
    pub fn new(blocks: Vec<RecognitionBlock>, lines: Vec<RecognitionLine>) -> Self {
        let mut session = Self {
            blocks,
            lines,
            ..Self::default()
        };
        session.sync_manual_counter();
        session
    }

    pub fn blocks(&self) -> &[RecognitionBlock] {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut Vec<RecognitionBlock> {
        &mut self.blocks
    }

    pub fn lines(&self) -> &[RecognitionLine] {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut Vec<RecognitionLine> {
        &mut self.lines
    }

    pub fn active_blocks(&self) -> impl Iterator<Item = &RecognitionBlock> {
        self.blocks.iter().filter(|block| block.active())
    }

    pub fn active_lines(&self) -> impl Iterator<Item = &RecognitionLine> {
        self.lines.iter().filter(|line| line.active())
    }

    pub fn find_block(&self, id: &str) -> Option<&RecognitionBlock> {
        self.blocks.iter().find(|block| block.id() == id)
    }

    pub fn find_block_mut(&mut self, id: &str) -> Option<&mut RecognitionBlock> {
        self.blocks.iter_mut().find(|block| block.id() == id)
    }

    pub fn find_line(&self, id: &str) -> Option<&RecognitionLine> {
        self.lines.iter().find(|line| line.id() == id)
    }

    pub fn find_line_mut(&mut self, id: &str) -> Option<&mut RecognitionLine> {
        self.lines.iter_mut().find(|line| line.id() == id)
    }

    pub fn selected_block_id(&self) -> Option<&SmolStr> {
        self.selected_block_id.as_ref()
    }

    pub fn set_selected_block_id(&mut self, id: Option<SmolStr>) {
        self.selected_block_id = id;
    }

    pub fn selected_line_id(&self) -> Option<&SmolStr> {
        self.selected_line_id.as_ref()
    }

    pub fn set_selected_line_id(&mut self, id: Option<SmolStr>) {
        self.selected_line_id = id;
    }

    pub fn pending_edits(&self) -> &BTreeMap<SmolStr, BlockPatch> {
        &self.pending_edits
    }

    pub fn pending_edits_mut(&mut self) -> &mut BTreeMap<SmolStr, BlockPatch> {
        &mut self.pending_edits
    }

    /// Drop selections that no longer point at an existing element.
    pub fn clear_stale_selections(&mut self) {
        if let Some(id) = self.selected_block_id.clone() {
            if self.find_block(&id).is_none() {
                self.selected_block_id = None;
            }
        }
        if let Some(id) = self.selected_line_id.clone() {
            if self.find_line(&id).is_none() {
                self.selected_line_id = None;
            }
        }
    }

    /// Advance the manual-line counter past every `M<n>` id already present,
    /// so ids stay unique after deserializing or merging sessions.
    pub fn sync_manual_counter(&mut self) {
        let max_seen = self
            .lines
            .iter()
            .filter_map(|line| line.id().strip_prefix('M'))
            .filter_map(|digits| digits.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        if self.manual_line_counter <= max_seen {
            self.manual_line_counter = max_seen + 1;
        }
        if self.manual_line_counter == 0 {
            self.manual_line_counter = 1;
        }
    }

    pub fn next_manual_line_id(&mut self) -> SmolStr {
        self.sync_manual_counter();
        let id = SmolStr::new(format!("M{}", self.manual_line_counter));
        self.manual_line_counter += 1;
        id
    }

    /// Merge a freshly recognized session into this one.
    ///
    /// Detected lines always come from the refresh. Blocks are replaced
    /// unless `preserve_blocks` keeps the current set (including staged
    /// edits and selections). Manual lines survive when `keep_manual` is
    /// set, appended after the refreshed detected lines.
    pub fn apply_refresh(&mut self, refreshed: RecognitionSession, options: RefreshOptions) {
        let mut lines = refreshed.lines;
        if options.keep_manual {
            lines.extend(
                self.lines
                    .iter()
                    .filter(|line| line.source() == LineSource::Manual)
                    .cloned(),
            );
        }
        self.lines = lines;
        if !options.preserve_blocks {
            self.blocks = refreshed.blocks;
            self.pending_edits.clear();
            self.selected_block_id = None;
        }
        self.clear_stale_selections();
        self.sync_manual_counter();
    }
}

#[cfg(test)]
mod tests {
    use smol_str::SmolStr;

    use super::{
        BoundingBox, RecognitionBlock, RecognitionLine, RecognitionSession, RefreshOptions,
    };

    fn block(id: &str, text: &str) -> RecognitionBlock {
        RecognitionBlock::new(
            SmolStr::new(id),
            text.to_owned(),
            Some(BoundingBox {
                x: 0.0,
                y: 0.0,
                w: 10.0,
                h: 10.0,
            }),
        )
    }

    #[test]
    fn bounding_box_center() {
        let bounds = BoundingBox {
            x: 10.0,
            y: 20.0,
            w: 4.0,
            h: 6.0,
        };
        assert_eq!(bounds.center(), (12.0, 23.0));
    }

    #[test]
    fn manual_counter_skips_past_existing_ids() {
        let lines = vec![
            RecognitionLine::detected(SmolStr::new("L1"), 0.0, 0.0, 1.0, 1.0),
            RecognitionLine::manual(
                SmolStr::new("M7"),
                SmolStr::new("B1"),
                SmolStr::new("B2"),
                0.0,
                0.0,
                1.0,
                1.0,
            ),
        ];
        let mut session = RecognitionSession::new(vec![], lines);
        assert_eq!(session.next_manual_line_id(), "M8");
        assert_eq!(session.next_manual_line_id(), "M9");
    }

    #[test]
    fn manual_counter_starts_at_one() {
        let mut session = RecognitionSession::default();
        assert_eq!(session.next_manual_line_id(), "M1");
    }

    #[test]
    fn endpoint_pair_is_order_insensitive() {
        let forward = RecognitionLine::manual(
            SmolStr::new("M1"),
            SmolStr::new("B2"),
            SmolStr::new("B1"),
            0.0,
            0.0,
            1.0,
            1.0,
        );
        assert_eq!(
            forward.endpoint_pair(),
            Some((&SmolStr::new("B1"), &SmolStr::new("B2")))
        );
    }

    #[test]
    fn refresh_replaces_blocks_and_resets_edit_state() {
        let mut session = RecognitionSession::new(vec![block("B1", "old")], vec![]);
        session.set_selected_block_id(Some(SmolStr::new("B1")));
        session
            .pending_edits_mut()
            .insert(SmolStr::new("B1"), Default::default());

        let refreshed = RecognitionSession::new(vec![block("B1", "new")], vec![]);
        session.apply_refresh(refreshed, RefreshOptions::default());

        assert_eq!(session.blocks()[0].text(), "new");
        assert!(session.pending_edits().is_empty());
        assert_eq!(session.selected_block_id(), None);
    }

    #[test]
    fn refresh_preserves_blocks_when_asked() {
        let mut session = RecognitionSession::new(vec![block("B1", "kept")], vec![]);
        session
            .pending_edits_mut()
            .insert(SmolStr::new("B1"), Default::default());

        let refreshed = RecognitionSession::new(
            vec![block("B9", "discarded")],
            vec![RecognitionLine::detected(
                SmolStr::new("L1"),
                0.0,
                0.0,
                5.0,
                5.0,
            )],
        );
        session.apply_refresh(
            refreshed,
            RefreshOptions {
                preserve_blocks: true,
                keep_manual: false,
            },
        );

        assert_eq!(session.blocks()[0].text(), "kept");
        assert_eq!(session.pending_edits().len(), 1);
        assert_eq!(session.lines().len(), 1);
    }

    #[test]
    fn refresh_keeps_manual_lines_when_asked() {
        let manual = RecognitionLine::manual(
            SmolStr::new("M1"),
            SmolStr::new("B1"),
            SmolStr::new("B2"),
            0.0,
            0.0,
            1.0,
            1.0,
        );
        let detected = RecognitionLine::detected(SmolStr::new("L1"), 0.0, 0.0, 1.0, 1.0);
        let mut session = RecognitionSession::new(vec![], vec![manual, detected]);

        let refreshed = RecognitionSession::new(
            vec![],
            vec![RecognitionLine::detected(
                SmolStr::new("L1"),
                2.0,
                2.0,
                3.0,
                3.0,
            )],
        );
        session.apply_refresh(
            refreshed,
            RefreshOptions {
                preserve_blocks: false,
                keep_manual: true,
            },
        );

        let ids: Vec<&str> = session.lines().iter().map(|l| l.id().as_str()).collect();
        assert_eq!(ids, vec!["L1", "M1"]);
        // A later manual line must not collide with the carried-over M1.
        assert_eq!(session.next_manual_line_id(), "M2");
    }

    #[test]
    fn stale_selections_are_cleared() {
        let mut session = RecognitionSession::new(vec![block("B1", "x")], vec![]);
        session.set_selected_block_id(Some(SmolStr::new("B9")));
        session.set_selected_line_id(Some(SmolStr::new("L9")));
        session.clear_stale_selections();
        assert_eq!(session.selected_block_id(), None);
        assert_eq!(session.selected_line_id(), None);
    }
}
