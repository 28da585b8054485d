// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

//! Read-only queries over a recognition session.

mod adjacency;

pub use adjacency::{infer_adjacency, line_endpoints, AdjacencyOptions, HintEdge};
