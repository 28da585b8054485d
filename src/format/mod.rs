// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

//! Text-format concerns: Mermaid normalization, repair, and response extraction.

pub mod mermaid;
