// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

use std::sync::OnceLock;

use regex::Regex;

use super::flatten::{flatten_label_newlines, split_adjacent_statements};
use super::labels::fix_label_boundaries;

// `flowchartTD` -> `flowchart TD`.
fn header_glue() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^([ \t]*)(flowchart|graph)([A-Za-z]{2})").expect("header glue regex")
    })
}

// `A --> B subgraph lane` -> subgraph on its own line.
fn subgraph_inline() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\S)\s+(subgraph\b)").expect("subgraph inline regex"))
}

fn end_inline() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\S)\s+(end\b)").expect("end inline regex"))
}

// `-->|label|>` -> `-->|label| `.
fn stray_edge_gt() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(-->|==>|-\.->|--->|===>)\|([^|]+)\|\s*>").expect("stray edge gt regex")
    })
}

// Closer followed by a short identifier that opens another shape.
fn closer_then_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([\]\)\}])\s*([A-Za-z0-9_]{1,30})(\s*[\[\(\{])").expect("closer shape regex")
    })
}

// Closer glued to an identifier that heads an arrow statement.
fn closer_then_arrow() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([\]\)\}])([A-Za-z0-9_][A-Za-z0-9_]*\s*-->)").expect("closer arrow regex")
    })
}

fn header_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^([ \t]*)(flowchart|graph)\s*([A-Za-z]{2})\s*(.*)$")
            .expect("header line regex")
    })
}

fn end_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^([ \t]*)end\b(.*)$").expect("end line regex"))
}

fn subgraph_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^([ \t]*)subgraph\s+(.+)$").expect("subgraph line regex"))
}

fn quoted_title(rest: &str) -> bool {
    let first = rest.chars().next();
    let last = rest.chars().next_back();
    matches!(first, Some('"' | '\'' | '`')) && matches!(last, Some('"' | '\'' | '`'))
}

/// Full structural normalization for generated Mermaid text.
///
/// Steps run in a fixed order: unicode/line-ending cleanup, label flattening,
/// adjacent-statement splitting, header/directive restructuring, stray-token
/// removal, subgraph title quoting, and finally label boundary fixing. The
/// composition is idempotent and never drops label text, only re-encodes
/// delimiters and whitespace.
pub fn normalize_mermaid(code: &str) -> String {
    if code.is_empty() {
        return String::new();
    }
    let mut text = code.trim().replace("\r\n", "\n");
    text.retain(|ch| !matches!(ch, '\u{200B}'..='\u{200D}' | '\u{FEFF}'));
    let text = text.replace('\u{00A0}', " ");

    let text = flatten_label_newlines(&text);
    let text = split_adjacent_statements(&text);

    let text = header_glue().replace_all(&text, "${1}${2} ${3}");
    let text = subgraph_inline().replace_all(&text, "${1}\n${2}");
    let text = end_inline().replace_all(&text, "${1}\n${2}");
    let text = stray_edge_gt().replace_all(&text, "${1}|${2}| ");
    let text = closer_then_shape().replace_all(&text, "${1}\n${2}${3}");
    let text = closer_then_arrow().replace_all(&text, "${1}\n${2}");

    let mut fixed: Vec<String> = Vec::new();
    for line in text.lines() {
        if let Some(captures) = header_line().captures(line) {
            let indent = &captures[1];
            let keyword = &captures[2];
            let direction = &captures[3];
            let rest = captures[4].trim();
            fixed.push(format!("{indent}{keyword} {direction}"));
            if !rest.is_empty() {
                fixed.push(format!("{indent}{rest}"));
            }
            continue;
        }
        if let Some(captures) = end_line().captures(line) {
            let indent = &captures[1];
            let rest = captures[2].trim();
            fixed.push(format!("{indent}end"));
            if !rest.is_empty() {
                fixed.push(format!("{indent}{rest}"));
            }
            continue;
        }
        fixed.push(line.to_owned());
    }

    let mut quoted: Vec<String> = Vec::new();
    for line in &fixed {
        let Some(captures) = subgraph_line().captures(line) else {
            quoted.push(line.clone());
            continue;
        };
        let indent = &captures[1];
        let rest = captures[2].trim();
        let bracketed = rest.starts_with('[') && rest.ends_with(']');
        if rest.is_empty() || quoted_title(rest) || bracketed {
            quoted.push(line.clone());
            continue;
        }
        if rest.chars().any(char::is_whitespace) {
            quoted.push(format!("{indent}subgraph \"{rest}\""));
        } else {
            quoted.push(line.clone());
        }
    }

    fix_label_boundaries(&quoted.join("\n"))
}

/// Local heuristic repair: the normalization-only fix applied when rendering
/// fails, before any remote escalation. Re-runs the bracket-aware passes on
/// top of a full normalization so defects introduced by a generator's partial
/// fix are also caught.
pub fn local_repair(code: &str) -> String {
    let flattened = flatten_label_newlines(code);
    let split = split_adjacent_statements(&flattened);
    normalize_mermaid(&split)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{local_repair, normalize_mermaid};

    #[test]
    fn glued_header_is_split_from_statement() {
        let normalized = normalize_mermaid("flowchartTD A-->B");
        let lines: Vec<&str> = normalized.lines().collect();
        assert_eq!(lines[0], "flowchart TD");
        assert!(lines.contains(&"A-->B"), "statement line missing: {normalized}");
    }

    #[test]
    fn adjacent_shapes_become_separate_statements() {
        let normalized = normalize_mermaid("flowchart TD\nA[Start]B[End]");
        assert_eq!(normalized, "flowchart TD\nA[Start]\nB[End]");
    }

    #[test]
    fn stray_gt_after_edge_label_is_removed() {
        let normalized = normalize_mermaid("flowchart TD\nA -->|yes|> B");
        assert_eq!(normalized, "flowchart TD\nA -->|yes|  B");
        assert!(!normalized.contains("|>"));
    }

    #[test]
    fn subgraph_and_end_move_to_their_own_lines() {
        let normalized = normalize_mermaid("flowchart TD\nA --> B subgraph Lane\nC --> D end");
        let lines: Vec<&str> = normalized.lines().collect();
        assert!(lines.contains(&"subgraph Lane"), "got: {normalized}");
        assert!(lines.contains(&"end"), "got: {normalized}");
    }

    #[test]
    fn end_with_trailing_content_is_resplit() {
        let normalized = normalize_mermaid("flowchart TD\nsubgraph Lane\nA --> B\nend C --> D");
        let lines: Vec<&str> = normalized.lines().collect();
        assert!(lines.contains(&"end"));
        assert!(lines.contains(&"C --> D"));
    }

    #[test]
    fn subgraph_title_with_spaces_is_quoted() {
        let normalized = normalize_mermaid("flowchart TD\nsubgraph User Lane\nA\nend");
        assert!(
            normalized.contains("subgraph \"User Lane\""),
            "got: {normalized}"
        );
    }

    #[test]
    fn quoted_or_bracketed_subgraph_titles_are_left_alone() {
        let normalized = normalize_mermaid("flowchart TD\nsubgraph \"User Lane\"\nA\nend");
        assert!(normalized.contains("subgraph \"User Lane\""));
        let normalized = normalize_mermaid("flowchart TD\nsubgraph [User Lane]\nA\nend");
        assert!(normalized.contains("subgraph [User Lane]"));
    }

    #[test]
    fn multiline_label_is_fused_and_quoted() {
        let normalized = normalize_mermaid("flowchart TD\nA[first\nsecond] --> B");
        assert!(
            normalized.contains("A[\"first\\nsecond\"]"),
            "got: {normalized}"
        );
    }

    #[test]
    fn label_text_is_preserved_through_normalization() {
        let normalized = normalize_mermaid("flowchart TD\nA[Collect user\ninput data] --> B[Done]");
        assert!(normalized.contains("Collect user"));
        assert!(normalized.contains("input data"));
        assert!(normalized.contains("Done"));
    }

    #[test]
    fn closer_glued_to_arrow_statement_is_split() {
        let normalized = normalize_mermaid("flowchart TD\nA[Start]B --> C");
        let lines: Vec<&str> = normalized.lines().collect();
        assert!(lines.contains(&"A[Start]"), "got: {normalized}");
        assert!(lines.contains(&"B --> C"), "got: {normalized}");
    }

    #[rstest]
    #[case("flowchartTD A-->B")]
    #[case("flowchart TD\nA[Start]B[End]")]
    #[case("flowchart TD\nA -->|yes|> B")]
    #[case("flowchart TD\nA[first\nsecond] --> B")]
    #[case("flowchart TD\nsubgraph User Lane\nA --> B\nend trailing")]
    #[case("graphLR start[Go]stop[Halt]")]
    #[case("\u{FEFF}flowchart TD\u{00A0}\nA --> B")]
    fn normalize_is_idempotent(#[case] input: &str) {
        let once = normalize_mermaid(input);
        assert_eq!(normalize_mermaid(&once), once, "input: {input:?}");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize_mermaid(""), "");
        assert_eq!(normalize_mermaid("   \n  "), "");
    }

    #[test]
    fn zero_width_and_nbsp_characters_are_scrubbed() {
        let normalized = normalize_mermaid("flowchart\u{200B} TD\nA\u{00A0}--> B");
        assert_eq!(normalized, "flowchart TD\nA --> B");
    }

    #[test]
    fn local_repair_matches_normalize_for_already_flat_input() {
        let input = "flowchart TD\nA[Start]B[End]";
        assert_eq!(local_repair(input), normalize_mermaid(input));
    }
}
