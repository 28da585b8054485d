// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

//! Interfaces to the remote services the converter talks to: diagram
//! generation backends, the render validator, the line recognizer, and
//! container log tailing. Each seam is a trait so the pipeline can run
//! against fakes in tests.

mod generate;
mod logs;
mod recognition;
mod render;

use std::fmt;

pub use generate::{GenerateRequest, Generator, ImagePayload, RepairRequest};
pub use logs::{LogBuffer, LogChunk, LogCursor, LogSource};
pub use recognition::{
    payload_from_session, session_from_raw, DetectionParams, LineRecognizer, RawRecognitionResponse,
    RecognitionRequest,
};
pub use render::{RenderError, Renderer};

/// Failure talking to a remote backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The service answered with a non-success status.
    Service { status: u16, detail: String },
    /// The request never completed.
    Transport { detail: String },
    /// The service answered, but the body was not usable.
    InvalidPayload { detail: String },
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Service { status, detail } => {
                write!(f, "service error (status {status}): {detail}")
            }
            RemoteError::Transport { detail } => write!(f, "transport error: {detail}"),
            RemoteError::InvalidPayload { detail } => write!(f, "invalid payload: {detail}"),
        }
    }
}

impl std::error::Error for RemoteError {}
