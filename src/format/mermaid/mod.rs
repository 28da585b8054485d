// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

//! Tolerant structural repair for generated Mermaid text.
//!
//! Vision models reliably produce Mermaid with a handful of recurring defects:
//! labels broken across physical lines, two node definitions glued onto one
//! line, a direction code fused to the header keyword, stray `>` after edge
//! labels. This module repairs those defects with bracket-depth-aware scans
//! and targeted regexes. It is deliberately *not* a Mermaid parser; anything
//! it does not recognize passes through unchanged, and the composed
//! [`normalize_mermaid`] is idempotent.

mod extract;
mod flatten;
mod labels;
mod normalize;
mod scanner;

pub use extract::{extract_json, extract_mermaid};
pub use flatten::{flatten_label_newlines, split_adjacent_statements};
pub use labels::fix_label_boundaries;
pub use normalize::{local_repair, normalize_mermaid};
pub use scanner::BracketScanner;
