use crate::block::{Block, Node, Segment};
use crate::classify::classify;
use crate::inline::tokenize;
use crate::segment::split_segments;

/// Language reported for fenced code without an info word.
pub const DEFAULT_LANGUAGE: &str = "text";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub default_language: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            default_language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Render a document into presentation nodes with default options.
pub fn render(document: &str) -> Vec<Node> {
    render_with(document, &RenderOptions::default())
}

/// Render a document into presentation nodes.
///
/// Never fails: unmatched fences and empty input degrade to whatever can be
/// rendered unambiguously.
pub fn render_with(document: &str, options: &RenderOptions) -> Vec<Node> {
    let segments = split_segments(document);
    let mut nodes = Vec::new();

    for segment in &segments {
        match *segment {
            Segment::Code { language, body } => nodes.push(Node::CodeBlock {
                language: language
                    .unwrap_or(options.default_language.as_str())
                    .to_string(),
                body: body.to_string(),
            }),
            Segment::Prose(prose) => {
                nodes.extend(classify(prose).into_iter().map(block_to_node));
            }
        }
    }

    log::trace!(
        "rendered {} nodes from {} segments ({} bytes)",
        nodes.len(),
        segments.len(),
        document.len()
    );
    nodes
}

fn block_to_node(block: Block<'_>) -> Node {
    match block {
        Block::Heading { level, text } => Node::Heading {
            level,
            text: tokenize(text),
        },
        Block::Paragraph(text) => Node::Paragraph {
            text: tokenize(text),
        },
        Block::List { ordered, items } => {
            let items = items.into_iter().map(tokenize).collect();
            if ordered {
                Node::OrderedList { items }
            } else {
                Node::UnorderedList { items }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Span;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Vec<Span> {
        vec![Span::Text(s.to_string())]
    }

    #[test]
    fn empty_document() {
        assert!(render("").is_empty());
        assert!(render("\n\n\n").is_empty());
    }

    #[test]
    fn heading_then_paragraph() {
        assert_eq!(
            render("## What is a Buffer Overflow?\n\nA buffer overflow occurs."),
            vec![
                Node::Heading {
                    level: 2,
                    text: text("What is a Buffer Overflow?"),
                },
                Node::Paragraph {
                    text: text("A buffer overflow occurs."),
                },
            ]
        );
    }

    #[test]
    fn headings_are_tokenized() {
        assert_eq!(
            render("### The `printk` call"),
            vec![Node::Heading {
                level: 3,
                text: vec![
                    Span::Text("The ".to_string()),
                    Span::Code("printk".to_string()),
                    Span::Text(" call".to_string()),
                ],
            }]
        );
    }

    #[test]
    fn code_block_uses_default_language() {
        assert_eq!(
            render("```\nmake\n```"),
            vec![Node::CodeBlock {
                language: "text".to_string(),
                body: "make".to_string(),
            }]
        );
    }

    #[test]
    fn configured_default_language() {
        let options = RenderOptions {
            default_language: "plaintext".to_string(),
        };
        assert_eq!(
            render_with("```\nmake\n```", &options),
            vec![Node::CodeBlock {
                language: "plaintext".to_string(),
                body: "make".to_string(),
            }]
        );
    }

    #[test]
    fn code_body_is_not_tokenized() {
        assert_eq!(
            render("```c\nchar *p = *q;\n```"),
            vec![Node::CodeBlock {
                language: "c".to_string(),
                body: "char *p = *q;".to_string(),
            }]
        );
    }

    #[test]
    fn lists_render_items() {
        assert_eq!(
            render("- **Cherry MX Blue**: Tactile\n- Gateron\n\n1. one\n2. two"),
            vec![
                Node::UnorderedList {
                    items: vec![
                        vec![
                            Span::Bold("Cherry MX Blue".to_string()),
                            Span::Text(": Tactile".to_string()),
                        ],
                        text("Gateron"),
                    ],
                },
                Node::OrderedList {
                    items: vec![text("one"), text("two")],
                },
            ]
        );
    }

    #[test]
    fn unterminated_fence_renders_rest_as_code() {
        assert_eq!(
            render("Intro\n\n```bash\necho hi\n\n## not a heading"),
            vec![
                Node::Paragraph {
                    text: text("Intro"),
                },
                Node::CodeBlock {
                    language: "bash".to_string(),
                    body: "echo hi\n\n## not a heading".to_string(),
                },
            ]
        );
    }

    #[test]
    fn nodes_serialize_with_type_tags() {
        let json = serde_json::to_value(render("**hi**")).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "type": "paragraph", "text": [{ "kind": "bold", "text": "hi" }] }
            ])
        );
    }
}
