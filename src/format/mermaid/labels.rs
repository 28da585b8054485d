// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

use std::sync::OnceLock;

use regex::Regex;

fn br_tag() -> &'static Regex {
    static BR_TAG: OnceLock<Regex> = OnceLock::new();
    BR_TAG.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("br tag regex"))
}

fn trim_break_escapes(mut text: &str) -> &str {
    while let Some(rest) = text.strip_prefix("\\n") {
        text = rest;
    }
    while let Some(rest) = text.strip_suffix("\\n") {
        text = rest;
    }
    text
}

/// Canonicalize break markers inside top-level `[...]` labels.
///
/// Within each label: carriage returns are stripped, literal line breaks and
/// `<br/>` tags become the `\n` escape, and a label that needed any break fix
/// is trimmed of leading/trailing escapes and quoted (with embedded quotes
/// escaped) unless it already is. Labels without a break requirement pass
/// through byte-identical, so well-formed labels are never re-quoted.
pub fn fix_label_boundaries(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut buffer = String::new();
    let mut in_label = false;
    for ch in input.chars() {
        if !in_label {
            output.push(ch);
            if ch == '[' {
                in_label = true;
                buffer.clear();
            }
            continue;
        }
        if ch != ']' {
            buffer.push(ch);
            continue;
        }
        output.push_str(&fixed_label(&buffer));
        output.push(']');
        in_label = false;
        buffer.clear();
    }
    // Unterminated label: flush unchanged rather than guessing a closer.
    if in_label {
        output.push_str(&buffer);
    }
    output
}

fn fixed_label(raw: &str) -> String {
    let mut adjusted = raw.replace('\r', "");
    let mut had_break = false;
    if adjusted.contains('\n') {
        adjusted = adjusted.replace('\n', "\\n");
        had_break = true;
    }
    let replaced = br_tag().replace_all(&adjusted, "\\n");
    if replaced != adjusted {
        had_break = true;
    }
    let adjusted = replaced.into_owned();
    if adjusted.contains("\\n") {
        had_break = true;
    }
    if !had_break {
        return adjusted;
    }

    let stripped = trim_break_escapes(&adjusted);
    let trimmed = stripped.trim();
    let already_quoted = trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"');
    if already_quoted {
        return stripped.to_owned();
    }
    let escaped = trimmed.replace('"', "\\\"");
    format!("\"{escaped}\"")
}
