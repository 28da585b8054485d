// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

use std::collections::BTreeSet;

use smol_str::SmolStr;

use crate::model::{RecognitionLine, RecognitionSession};

/// Controls how aggressively line endpoints snap to block centers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjacencyOptions {
    /// Snap distance floor in pixels, effective on small images.
    pub min_threshold: f64,
    /// Fraction of the larger image dimension used as the snap distance.
    pub scale: f64,
}

impl Default for AdjacencyOptions {
    fn default() -> Self {
        Self {
            min_threshold: 40.0,
            scale: 0.08,
        }
    }
}

/// An unordered pair of block ids a connector line appears to join.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct HintEdge {
    a: SmolStr,
    b: SmolStr,
}

impl HintEdge {
    /// Canonical form: the lexically smaller id first.
    pub fn new(first: SmolStr, second: SmolStr) -> Self {
        if first <= second {
            Self { a: first, b: second }
        } else {
            Self { a: second, b: first }
        }
    }

    pub fn a(&self) -> &SmolStr {
        &self.a
    }

    pub fn b(&self) -> &SmolStr {
        &self.b
    }
}

fn snap_threshold(session: &RecognitionSession, options: AdjacencyOptions) -> f64 {
    let mut max_x: f64 = 0.0;
    let mut max_y: f64 = 0.0;
    for block in session.active_blocks() {
        if let Some(bounds) = block.bounds() {
            max_x = max_x.max(bounds.x + bounds.w);
            max_y = max_y.max(bounds.y + bounds.h);
        }
    }
    for line in session.active_lines() {
        max_x = max_x.max(line.x1).max(line.x2);
        max_y = max_y.max(line.y1).max(line.y2);
    }
    let mut max_dim = max_x.max(max_y);
    if max_dim <= 0.0 {
        max_dim = 1.0;
    }
    options.min_threshold.max((max_dim * options.scale).round())
}

fn nearest_block(
    session: &RecognitionSession,
    x: f64,
    y: f64,
    threshold: f64,
) -> Option<SmolStr> {
    let mut best: Option<(f64, &SmolStr)> = None;
    for block in session.active_blocks() {
        let Some(bounds) = block.bounds() else {
            continue;
        };
        let (cx, cy) = bounds.center();
        let dist = (x - cx).hypot(y - cy);
        if best.map(|(d, _)| dist < d).unwrap_or(true) {
            best = Some((dist, block.id()));
        }
    }
    let (dist, id) = best?;
    if dist > threshold {
        return None;
    }
    Some(id.clone())
}

/// Infer which block pairs the detected lines connect.
///
/// Each active line's endpoints snap to the nearest active block center
/// within the threshold; a line whose endpoints land on two different
/// blocks contributes one edge. Self-loops and unmatched endpoints are
/// skipped and duplicates collapse.
pub fn infer_adjacency(session: &RecognitionSession, options: AdjacencyOptions) -> Vec<HintEdge> {
    let has_blocks = session.active_blocks().next().is_some();
    let has_lines = session.active_lines().next().is_some();
    if !has_blocks || !has_lines {
        return Vec::new();
    }
    let threshold = snap_threshold(session, options);
    let mut edges: BTreeSet<HintEdge> = BTreeSet::new();
    for line in session.active_lines() {
        let Some(start) = nearest_block(session, line.x1, line.y1, threshold) else {
            continue;
        };
        let Some(end) = nearest_block(session, line.x2, line.y2, threshold) else {
            continue;
        };
        if start == end {
            continue;
        }
        edges.insert(HintEdge::new(start, end));
    }
    edges.into_iter().collect()
}

/// Resolve the blocks a single line joins, for display. Explicit endpoint
/// ids on a manual line win; otherwise the endpoints snap like
/// [`infer_adjacency`] does.
pub fn line_endpoints(
    session: &RecognitionSession,
    line: &RecognitionLine,
    options: AdjacencyOptions,
) -> Option<(SmolStr, SmolStr)> {
    if let (Some(from), Some(to)) = (line.from_id(), line.to_id()) {
        return Some((from.clone(), to.clone()));
    }
    let threshold = snap_threshold(session, options);
    let start = nearest_block(session, line.x1, line.y1, threshold)?;
    let end = nearest_block(session, line.x2, line.y2, threshold)?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use smol_str::SmolStr;

    use crate::model::{BoundingBox, RecognitionBlock, RecognitionLine, RecognitionSession};

    use super::{infer_adjacency, line_endpoints, AdjacencyOptions, HintEdge};

    fn block(id: &str, x: f64, y: f64) -> RecognitionBlock {
        RecognitionBlock::new(
            SmolStr::new(id),
            id.to_owned(),
            Some(BoundingBox { x, y, w: 20.0, h: 10.0 }),
        )
    }

    fn line(id: &str, x1: f64, y1: f64, x2: f64, y2: f64) -> RecognitionLine {
        RecognitionLine::detected(SmolStr::new(id), x1, y1, x2, y2)
    }

    fn edge(a: &str, b: &str) -> HintEdge {
        HintEdge::new(SmolStr::new(a), SmolStr::new(b))
    }

    #[test]
    fn line_between_two_centers_yields_one_edge() {
        // Centers at (10, 5) and (110, 5); small image so the 40px floor applies.
        let session = RecognitionSession::new(
            vec![block("B1", 0.0, 0.0), block("B2", 100.0, 0.0)],
            vec![line("L1", 12.0, 6.0, 108.0, 4.0)],
        );
        assert_eq!(
            infer_adjacency(&session, AdjacencyOptions::default()),
            vec![edge("B1", "B2")]
        );
    }

    #[test]
    fn duplicate_and_reversed_lines_collapse() {
        let session = RecognitionSession::new(
            vec![block("B1", 0.0, 0.0), block("B2", 100.0, 0.0)],
            vec![
                line("L1", 10.0, 5.0, 110.0, 5.0),
                line("L2", 110.0, 5.0, 10.0, 5.0),
            ],
        );
        assert_eq!(infer_adjacency(&session, AdjacencyOptions::default()).len(), 1);
    }

    #[test]
    fn endpoint_past_the_threshold_is_dropped() {
        // Max dimension ~2000 makes the threshold 160; 200px away misses.
        let session = RecognitionSession::new(
            vec![block("B1", 0.0, 0.0), block("B2", 1980.0, 1990.0)],
            vec![line("L1", 10.0, 5.0, 1790.0, 1995.0)],
        );
        assert!(infer_adjacency(&session, AdjacencyOptions::default()).is_empty());
    }

    #[test]
    fn self_loops_are_skipped() {
        let session = RecognitionSession::new(
            vec![block("B1", 0.0, 0.0)],
            vec![line("L1", 8.0, 4.0, 12.0, 6.0)],
        );
        assert!(infer_adjacency(&session, AdjacencyOptions::default()).is_empty());
    }

    #[test]
    fn inactive_elements_do_not_contribute() {
        let mut session = RecognitionSession::new(
            vec![block("B1", 0.0, 0.0), block("B2", 100.0, 0.0)],
            vec![line("L1", 10.0, 5.0, 110.0, 5.0)],
        );
        session.find_line_mut("L1").unwrap().set_active(false);
        assert!(infer_adjacency(&session, AdjacencyOptions::default()).is_empty());
    }

    #[test]
    fn unpositioned_blocks_are_ignored_for_snapping() {
        let mut session = RecognitionSession::new(
            vec![block("B1", 0.0, 0.0), block("B2", 100.0, 0.0)],
            vec![line("L1", 10.0, 5.0, 110.0, 5.0)],
        );
        session
            .blocks_mut()
            .push(RecognitionBlock::new(SmolStr::new("B3"), "loose".into(), None));
        assert_eq!(
            infer_adjacency(&session, AdjacencyOptions::default()),
            vec![edge("B1", "B2")]
        );
    }

    #[test]
    fn explicit_endpoints_win_over_snapping() {
        let manual = RecognitionLine::manual(
            SmolStr::new("M1"),
            SmolStr::new("B2"),
            SmolStr::new("B1"),
            0.0,
            0.0,
            0.0,
            0.0,
        );
        let session = RecognitionSession::new(
            vec![block("B1", 0.0, 0.0), block("B2", 100.0, 0.0)],
            vec![manual.clone()],
        );
        assert_eq!(
            line_endpoints(&session, &manual, AdjacencyOptions::default()),
            Some((SmolStr::new("B2"), SmolStr::new("B1")))
        );
    }

    #[test]
    fn hint_edges_are_canonically_ordered() {
        assert_eq!(edge("B2", "B1"), edge("B1", "B2"));
        assert_eq!(edge("B2", "B1").a(), "B1");
    }
}
