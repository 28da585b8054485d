// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

/// Depth-tracking bracket scanner over `[`, `(` and `{`.
///
/// The scanner keeps a stack of expected closing delimiters. A closer that
/// matches the top of the stack pops it; a mismatched closer passes through
/// without popping, so malformed nesting never aborts a repair pass.
#[derive(Debug, Clone, Default)]
pub struct BracketScanner {
    stack: Vec<char>,
}

impl BracketScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expected closing delimiter for an opener, if `ch` is one.
    pub fn closer_for(ch: char) -> Option<char> {
        match ch {
            '[' => Some(']'),
            '(' => Some(')'),
            '{' => Some('}'),
            _ => None,
        }
    }

    /// Observe one character and update bracket depth.
    pub fn step(&mut self, ch: char) {
        if let Some(closer) = Self::closer_for(ch) {
            self.stack.push(closer);
            return;
        }
        if matches!(ch, ']' | ')' | '}') && self.stack.last() == Some(&ch) {
            self.stack.pop();
        }
    }

    /// True while at least one bracket is open.
    pub fn in_bracket(&self) -> bool {
        !self.stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
