// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

//! Data model for recognized sketch content and generation bookkeeping.

mod memory;
mod recognition;

pub use memory::{GenerationMemory, Provider};
pub use recognition::{
    BlockPatch, BoundingBox, LineSource, RecognitionBlock, RecognitionLine, RecognitionSession,
    RefreshOptions,
};
