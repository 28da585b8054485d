// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

//! Edit operations over a recognition session: staging and applying block
//! edits, toggling and removing connector lines, and drawing manual edges.

use std::fmt;

use smol_str::SmolStr;

use crate::model::{BlockPatch, LineSource, RecognitionLine, RecognitionSession};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    UnknownBlock { id: SmolStr },
    UnknownLine { id: SmolStr },
    SameEndpoints,
    MissingBox { id: SmolStr },
    DuplicateManualEdge { from: SmolStr, to: SmolStr },
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::UnknownBlock { id } => write!(f, "no block with id {id}"),
            EditError::UnknownLine { id } => write!(f, "no line with id {id}"),
            EditError::SameEndpoints => write!(f, "an edge needs two distinct blocks"),
            EditError::MissingBox { id } => {
                write!(f, "block {id} has no bounding box to anchor an edge")
            }
            EditError::DuplicateManualEdge { from, to } => {
                write!(f, "a manual edge between {from} and {to} already exists")
            }
        }
    }
}

impl std::error::Error for EditError {}

/// Stage an edit for a block without touching the block yet. A second stage
/// for the same block merges field-wise, the newer value winning.
pub fn stage_block_edit(
    session: &mut RecognitionSession,
    id: &str,
    patch: BlockPatch,
) -> Result<(), EditError> {
    if session.find_block(id).is_none() {
        return Err(EditError::UnknownBlock { id: SmolStr::new(id) });
    }
    let staged = session.pending_edits_mut().entry(SmolStr::new(id)).or_default();
    if patch.text.is_some() {
        staged.text = patch.text;
    }
    if patch.active.is_some() {
        staged.active = patch.active;
    }
    Ok(())
}

/// Apply every staged edit and clear the staging area.
///
/// Text edits only land when the trimmed value is non-empty; blanking a block
/// is done by deactivating it, not by erasing its text. Returns the number of
/// blocks that changed.
pub fn apply_block_edits(session: &mut RecognitionSession) -> usize {
    let edits = std::mem::take(session.pending_edits_mut());
    let mut applied = 0;
    for (id, patch) in edits {
        let Some(block) = session.find_block_mut(&id) else {
            continue;
        };
        let mut changed = false;
        if let Some(text) = patch.text {
            let trimmed = text.trim();
            if !trimmed.is_empty() && trimmed != block.text() {
                block.set_text(trimmed.to_owned());
                changed = true;
            }
        }
        if let Some(active) = patch.active {
            if active != block.active() {
                block.set_active(active);
                changed = true;
            }
        }
        if changed {
            applied += 1;
        }
    }
    applied
}

/// Flip a line's active flag and select it. Returns the new state.
pub fn toggle_line(session: &mut RecognitionSession, id: &str) -> Result<bool, EditError> {
    let Some(line) = session.find_line_mut(id) else {
        return Err(EditError::UnknownLine { id: SmolStr::new(id) });
    };
    let next = !line.active();
    line.set_active(next);
    session.set_selected_line_id(Some(SmolStr::new(id)));
    Ok(next)
}

/// Delete a line outright. A selection pointing at it is cleared.
pub fn remove_line(session: &mut RecognitionSession, id: &str) -> Result<(), EditError> {
    let before = session.lines().len();
    session.lines_mut().retain(|line| line.id() != id);
    if session.lines().len() == before {
        return Err(EditError::UnknownLine { id: SmolStr::new(id) });
    }
    if session.selected_line_id().map(SmolStr::as_str) == Some(id) {
        session.set_selected_line_id(None);
    }
    Ok(())
}

/// Draw a manual edge between two recognized blocks, anchored at their box
/// centers. Rejects self-loops, endpoint blocks without a box, and a second
/// active manual edge over the same (unordered) block pair.
pub fn add_manual_edge(
    session: &mut RecognitionSession,
    from: &str,
    to: &str,
) -> Result<SmolStr, EditError> {
    if from == to {
        return Err(EditError::SameEndpoints);
    }
    let from_center = {
        let block = session
            .find_block(from)
            .ok_or_else(|| EditError::UnknownBlock { id: SmolStr::new(from) })?;
        block
            .bounds()
            .ok_or_else(|| EditError::MissingBox { id: SmolStr::new(from) })?
            .center()
    };
    let to_center = {
        let block = session
            .find_block(to)
            .ok_or_else(|| EditError::UnknownBlock { id: SmolStr::new(to) })?;
        block
            .bounds()
            .ok_or_else(|| EditError::MissingBox { id: SmolStr::new(to) })?
            .center()
    };

    let pair = if from <= to { (from, to) } else { (to, from) };
    let duplicate = session.active_lines().any(|line| {
        line.source() == LineSource::Manual
            && line
                .endpoint_pair()
                .map(|(a, b)| (a.as_str(), b.as_str()) == pair)
                .unwrap_or(false)
    });
    if duplicate {
        return Err(EditError::DuplicateManualEdge {
            from: SmolStr::new(from),
            to: SmolStr::new(to),
        });
    }

    let id = session.next_manual_line_id();
    let line = RecognitionLine::manual(
        id.clone(),
        SmolStr::new(from),
        SmolStr::new(to),
        from_center.0,
        from_center.1,
        to_center.0,
        to_center.1,
    );
    session.lines_mut().push(line);
    session.set_selected_line_id(Some(id.clone()));
    Ok(id)
}
