// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

use super::RemoteError;

/// An image attached to a generation request, already base64-encoded the way
/// the backends expect inline data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImagePayload {
    pub mime_type: String,
    pub base64: String,
}

impl ImagePayload {
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            base64: STANDARD.encode(bytes),
        }
    }
}

/// A prompt (optionally with the sketch image) sent to a generation backend.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImagePayload>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// A follow-up turn asking the backend to fix diagram text that failed to
/// render.
#[derive(Debug, Clone, Serialize)]
pub struct RepairRequest {
    /// The broken diagram text as it currently stands.
    pub mermaid: String,
    /// The renderer's error message, verbatim.
    pub error_message: String,
    /// The text the backend originally produced, when it differs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// A diagram-text generation backend.
#[allow(async_fn_in_trait)]
pub trait Generator {
    /// Produce diagram text for a prompt. Returns the raw model response;
    /// callers extract the fenced diagram from it.
    async fn generate(&self, request: GenerateRequest) -> Result<String, RemoteError>;

    /// Ask for a corrected version of diagram text that failed validation.
    async fn repair(&self, request: RepairRequest) -> Result<String, RemoteError>;
}
