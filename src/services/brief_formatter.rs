//! Compact brief formatter (C13): a lossy, character-bounded summary of the
//! knowledge store used to prime a prompt, grouped by finding kind.
//!
//! Grounded in the same character-budget truncation idiom as
//! `context_truncation`: a conservative estimator, not a tokenizer, and a
//! hard ceiling rather than a target to fill exactly.

use crate::domain::models::{FindingKind, Node};

/// Default character budget for a formatted brief.
pub const DEFAULT_CHAR_BUDGET: usize = 4000;

/// Kind display order: stable and independent of storage/iteration order so
/// the same node set always formats identically.
const KIND_ORDER: &[FindingKind] = &[
    FindingKind::Decision,
    FindingKind::Constraint,
    FindingKind::Pattern,
    FindingKind::Feature,
    FindingKind::Plan,
    FindingKind::Documentation,
    FindingKind::Note,
    FindingKind::Metadata,
];

const DESCRIPTION_PREFIX_CHARS: usize = 80;

/// Split `s` at the `max_chars`-th character boundary, returning the prefix
/// and the count of characters dropped after it. The prefix never exceeds
/// `max_chars` characters and `prefix_chars + dropped == s.chars().count()`.
pub fn split_at_char_budget(s: &str, max_chars: usize) -> (String, usize) {
    let total = s.chars().count();
    if total <= max_chars {
        return (s.to_string(), 0);
    }
    let prefix: String = s.chars().take(max_chars).collect();
    (prefix, total - max_chars)
}

fn entry_line(node: &Node) -> String {
    let description = &node.finding.description;
    let (prefix, dropped) = split_at_char_budget(description, DESCRIPTION_PREFIX_CHARS);
    let prefix: String = if dropped > 0 {
        format!("{prefix}…")
    } else {
        prefix
    };
    format!("- {} — {}", node.finding.title, prefix)
}

/// Render `nodes` as a compact, kind-grouped brief, never exceeding
/// `budget_chars`. Entries are added in kind order, then by a node's
/// position in its group; once an entry would overflow the budget the
/// remainder is dropped and a one-line summary of how much was omitted is
/// appended (still within budget).
pub fn format_brief(nodes: &[Node], budget_chars: usize) -> String {
    let mut out = String::new();
    let mut omitted = 0usize;
    let mut total_entries = 0usize;

    for kind in KIND_ORDER {
        let group: Vec<&Node> = nodes.iter().filter(|n| n.finding.kind == *kind).collect();
        if group.is_empty() {
            continue;
        }
        let header = format!("## {}\n", kind.as_str());
        if out.len() + header.len() > budget_chars {
            omitted += group.len();
            continue;
        }

        let mut header_written = false;
        for node in group {
            total_entries += 1;
            let line = entry_line(node);
            let projected = out.len() + if header_written { 0 } else { header.len() } + line.len() + 1;
            if projected > budget_chars {
                omitted += 1;
                continue;
            }
            if !header_written {
                out.push_str(&header);
                header_written = true;
            }
            out.push_str(&line);
            out.push('\n');
        }
    }

    if omitted > 0 {
        let footer = format!("…{omitted} of {total_entries} findings omitted for space\n");
        if out.len() + footer.len() <= budget_chars {
            out.push_str(&footer);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Confidence, Finding};

    fn node(kind: FindingKind, title: &str, description: &str) -> Node {
        Node::new(Finding::new(kind, title, description, Confidence::Medium))
    }

    #[test]
    fn split_at_char_budget_preserves_total_char_count() {
        let s = "hello world";
        let (prefix, dropped) = split_at_char_budget(s, 5);
        assert_eq!(prefix, "hello");
        assert_eq!(prefix.chars().count() + dropped, s.chars().count());
    }

    #[test]
    fn split_at_char_budget_is_a_no_op_under_budget() {
        let (prefix, dropped) = split_at_char_budget("short", 80);
        assert_eq!(prefix, "short");
        assert_eq!(dropped, 0);
    }

    #[test]
    fn groups_entries_by_kind_in_stable_order() {
        let nodes = vec![
            node(FindingKind::Note, "N1", "a note about something"),
            node(FindingKind::Decision, "D1", "a decision about something"),
        ];
        let brief = format_brief(&nodes, DEFAULT_CHAR_BUDGET);
        let decision_pos = brief.find("## decision").unwrap();
        let note_pos = brief.find("## note").unwrap();
        assert!(decision_pos < note_pos);
    }

    #[test]
    fn truncates_long_descriptions_with_ellipsis() {
        let long_description = "x".repeat(200);
        let nodes = vec![node(FindingKind::Note, "N1", &long_description)];
        let brief = format_brief(&nodes, DEFAULT_CHAR_BUDGET);
        assert!(brief.contains('…'));
        assert!(brief.len() < long_description.len());
    }

    #[test]
    fn never_exceeds_the_requested_budget() {
        let nodes: Vec<Node> = (0..200)
            .map(|i| node(FindingKind::Feature, &format!("F{i}"), "a reasonably long description of a feature"))
            .collect();
        let brief = format_brief(&nodes, 500);
        assert!(brief.len() <= 500);
    }

    #[test]
    fn omission_footer_names_the_dropped_count() {
        let nodes: Vec<Node> = (0..200)
            .map(|i| node(FindingKind::Feature, &format!("F{i}"), "a reasonably long description of a feature"))
            .collect();
        let brief = format_brief(&nodes, 500);
        assert!(brief.contains("omitted for space"));
    }

    #[test]
    fn empty_input_produces_empty_brief() {
        assert_eq!(format_brief(&[], DEFAULT_CHAR_BUDGET), "");
    }
}
