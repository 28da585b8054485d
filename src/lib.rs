// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

//! Sketchmaid turns hand-drawn sketches into rendered Mermaid diagrams.
//!
//! The crate is organized around a conversion pipeline:
//!
//! - [`format::mermaid`] repairs and normalizes generated Mermaid text.
//! - [`model`] holds recognized sketch content and generation bookkeeping.
//! - [`remote`] defines the seams to generation, rendering, recognition,
//!   and log backends.
//! - [`ops`] edits a recognition session (blocks, lines, manual edges).
//! - [`query`] derives adjacency hints from detected line segments.
//! - [`convert`] drives generation and the bounded self-healing loop.

pub mod convert;
pub mod format;
pub mod model;
pub mod ops;
pub mod query;
pub mod remote;
