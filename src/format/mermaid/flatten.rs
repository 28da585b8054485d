// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

use super::scanner::BracketScanner;

/// Replace literal line breaks inside bracketed labels with `<br/>`.
///
/// Line breaks at bracket depth zero are statement separators and stay as-is.
/// Carriage returns are dropped everywhere. Must run before any line-oriented
/// fix so that a label spanning several physical lines fuses onto one logical
/// line first.
pub fn flatten_label_newlines(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut scanner = BracketScanner::new();
    for ch in input.chars() {
        if ch == '\r' {
            continue;
        }
        if ch == '\n' && scanner.in_bracket() {
            output.push_str("<br/>");
            continue;
        }
        scanner.step(ch);
        output.push(ch);
    }
    output
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

// Space, tab, CR, NBSP, zero-width space/joiners, BOM.
fn is_skippable(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '\t' | '\r' | '\u{00A0}' | '\u{200B}'..='\u{200D}' | '\u{FEFF}'
    )
}

/// Insert a line break between two shape definitions glued onto one line.
///
/// Detects a closing delimiter followed (after skippable characters) by an
/// identifier run that itself precedes an opening delimiter, e.g. `A[X]B[Y]`,
/// and splits it into `A[X]\nB[Y]`. Already-separated statements are left
/// alone, which keeps the pass idempotent.
pub fn split_adjacent_statements(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut output = String::with_capacity(input.len());
    for (i, &ch) in chars.iter().enumerate() {
        output.push(ch);
        if !matches!(ch, ']' | ')' | '}') {
            continue;
        }
        let mut j = i + 1;
        while j < chars.len() && is_skippable(chars[j]) {
            j += 1;
        }
        if j >= chars.len() || chars[j] == '\n' || !is_ident_char(chars[j]) {
            continue;
        }
        let mut k = j;
        while k < chars.len() && is_ident_char(chars[k]) {
            k += 1;
        }
        while k < chars.len() && is_skippable(chars[k]) {
            k += 1;
        }
        if k < chars.len() && matches!(chars[k], '[' | '(' | '{') {
            output.push('\n');
        }
    }
    output
}
