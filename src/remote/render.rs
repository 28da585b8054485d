// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

use std::fmt;

/// Diagram text that the renderer refused, with its parser message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderError {
    pub message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "render failed: {}", self.message)
    }
}

impl std::error::Error for RenderError {}

/// Validates diagram text by attempting to render it.
#[allow(async_fn_in_trait)]
pub trait Renderer {
    /// `Ok(())` when the text renders, `Err` with the renderer's message
    /// when it does not.
    async fn validate(&self, mermaid: &str) -> Result<(), RenderError>;
}
