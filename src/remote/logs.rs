// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use super::RemoteError;

/// How many log lines the buffer keeps before dropping from the front.
pub const LOG_LINE_CAP: usize = 400;

/// Where to resume reading a service's log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCursor {
    /// Continue from an absolute line offset returned by a previous chunk.
    Offset(u64),
    /// Start over with only the last `n` lines.
    Tail(u32),
}

impl LogCursor {
    /// Query-string form understood by the log endpoint.
    pub fn query(&self) -> String {
        match self {
            LogCursor::Offset(offset) => format!("offset={offset}"),
            LogCursor::Tail(count) => format!("tail={count}"),
        }
    }
}

/// One batch of log lines plus the offset to resume from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LogChunk {
    #[serde(default)]
    pub lines: Vec<String>,
    #[serde(default)]
    pub offset: u64,
}

/// A tail-able log stream, typically a sidecar container.
#[allow(async_fn_in_trait)]
pub trait LogSource {
    async fn fetch(&self, cursor: LogCursor) -> Result<LogChunk, RemoteError>;
}

/// Rolling view over fetched log lines, capped at [`LOG_LINE_CAP`].
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    lines: Vec<String>,
    offset: u64,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Cursor for the next fetch: resume from the recorded offset, or tail
    /// a fresh window when nothing has been read yet.
    pub fn cursor(&self) -> LogCursor {
        if self.offset == 0 && self.lines.is_empty() {
            LogCursor::Tail(LOG_LINE_CAP as u32)
        } else {
            LogCursor::Offset(self.offset)
        }
    }

    pub fn append(&mut self, chunk: LogChunk) {
        self.lines.extend(chunk.lines);
        if self.lines.len() > LOG_LINE_CAP {
            let excess = self.lines.len() - LOG_LINE_CAP;
            self.lines.drain(..excess);
        }
        self.offset = chunk.offset;
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.offset = 0;
    }
}
