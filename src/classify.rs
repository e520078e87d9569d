use std::sync::LazyLock;

use regex::Regex;

use crate::block::Block;

/// One or more blank lines. Lines holding only spaces or tabs count as blank.
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n(?:[ \t]*\r?\n)+").expect("invalid blank line regex"));

/// Classify a prose segment into blocks, one per blank-line separated group.
///
/// Only the first line of a group decides its kind. List groups keep the lines that
/// carry the list marker, headings keep their first line, paragraphs keep everything.
pub fn classify(prose: &str) -> Vec<Block<'_>> {
    BLANK_LINES
        .split(prose)
        .map(|group| group.trim_matches(|c| c == '\n' || c == '\r'))
        .filter_map(classify_group)
        .collect()
}

fn classify_group(group: &str) -> Option<Block<'_>> {
    let first_line = group.lines().next().unwrap_or_default();

    if let Some(text) = first_line.strip_prefix("## ") {
        return Some(Block::Heading { level: 2, text });
    }
    if let Some(text) = first_line.strip_prefix("### ") {
        return Some(Block::Heading { level: 3, text });
    }
    if group.starts_with("- ") {
        let items = group
            .lines()
            .filter_map(|line| line.strip_prefix("- "))
            .collect();
        return Some(Block::List {
            ordered: false,
            items,
        });
    }
    if group.trim().is_empty() {
        return None;
    }
    if strip_ordered_marker(group).is_none() {
        return Some(Block::Paragraph(group));
    }

    let items = group.lines().filter_map(strip_ordered_marker).collect();
    Some(Block::List {
        ordered: true,
        items,
    })
}

/// Strip a leading `\d+\.` marker and the whitespace after it.
fn strip_ordered_marker(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == line.len() {
        return None;
    }
    rest.strip_prefix('.').map(str::trim_start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("## Title", BlockKind::Heading2)]
    #[case("### Title", BlockKind::Heading3)]
    #[case("- item", BlockKind::UnorderedList)]
    #[case("1. item", BlockKind::OrderedList)]
    #[case("12.item", BlockKind::OrderedList)]
    #[case("plain text", BlockKind::Paragraph)]
    #[case("#### deeper", BlockKind::Paragraph)]
    #[case("##no space", BlockKind::Paragraph)]
    #[case("-not a list", BlockKind::Paragraph)]
    #[case("1 not ordered", BlockKind::Paragraph)]
    fn kind_from_first_line(#[case] group: &str, #[case] kind: BlockKind) {
        let blocks = classify(group);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind(), kind);
    }

    #[test]
    fn groups_split_on_blank_lines() {
        assert_eq!(
            classify("one\n\ntwo\n\n\n\nthree"),
            vec![
                Block::Paragraph("one"),
                Block::Paragraph("two"),
                Block::Paragraph("three"),
            ]
        );
    }

    #[test]
    fn whitespace_only_lines_separate_groups() {
        assert_eq!(
            classify("one\n  \t\ntwo"),
            vec![Block::Paragraph("one"), Block::Paragraph("two")]
        );
    }

    #[test]
    fn blank_groups_are_dropped() {
        assert!(classify("").is_empty());
        assert!(classify("\n").is_empty());
        assert!(classify("   ").is_empty());
    }

    #[test]
    fn paragraph_keeps_internal_newlines() {
        assert_eq!(
            classify("\nfirst line\nsecond line\n"),
            vec![Block::Paragraph("first line\nsecond line")]
        );
    }

    #[test]
    fn heading_keeps_only_first_line() {
        assert_eq!(
            classify("### Switches\nThe heart of any keyboard.\n- not an item"),
            vec![Block::Heading {
                level: 3,
                text: "Switches",
            }]
        );
    }

    #[test]
    fn unordered_list_drops_unmarked_lines() {
        assert_eq!(
            classify("- one\nnot a list item\n- two"),
            vec![Block::List {
                ordered: false,
                items: vec!["one", "two"],
            }]
        );
    }

    #[test]
    fn ordered_list_strips_markers() {
        assert_eq!(
            classify("1. Each value has an owner\n2.  One owner at a time\nnote\n10.Dropped"),
            vec![Block::List {
                ordered: true,
                items: vec!["Each value has an owner", "One owner at a time", "Dropped"],
            }]
        );
    }

    #[test]
    fn mixed_groups_in_order() {
        let prose = "Intro.\n\n## Modern Mitigations\n\n- **Canaries**\n- ASLR\n\nOutro.";
        assert_eq!(
            classify(prose),
            vec![
                Block::Paragraph("Intro."),
                Block::Heading {
                    level: 2,
                    text: "Modern Mitigations",
                },
                Block::List {
                    ordered: false,
                    items: vec!["**Canaries**", "ASLR"],
                },
                Block::Paragraph("Outro."),
            ]
        );
    }
}
