use serde::Serialize;

/// Inline text spans with formatting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Span {
    Text(String),
    Bold(String),
    Italic(String),
    Code(String),
}

impl Span {
    /// The visible text of the span, markers stripped.
    pub fn text(&self) -> &str {
        match self {
            Span::Text(text) | Span::Bold(text) | Span::Italic(text) | Span::Code(text) => text,
        }
    }
}

/// Concatenate the visible text of a run of spans.
pub fn spans_text(spans: &[Span]) -> String {
    spans.iter().map(Span::text).collect()
}

/// Presentation nodes produced by the renderer, in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    CodeBlock {
        language: String,
        body: String,
    },
    Heading {
        level: u8,
        text: Vec<Span>,
    },
    Paragraph {
        text: Vec<Span>,
    },
    UnorderedList {
        items: Vec<Vec<Span>>,
    },
    OrderedList {
        items: Vec<Vec<Span>>,
    },
}

/// A maximal run of a document: fenced code or everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Prose(&'a str),
    Code {
        language: Option<&'a str>,
        body: &'a str,
    },
}

/// Kind of a prose block, decided by the prefix of its first line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading2,
    Heading3,
    UnorderedList,
    OrderedList,
    Paragraph,
}

/// A classified group of lines within a prose segment.
///
/// Text is borrowed from the document with markers already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block<'a> {
    Heading { level: u8, text: &'a str },
    Paragraph(&'a str),
    List { ordered: bool, items: Vec<&'a str> },
}

impl Block<'_> {
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Heading { level: 2, .. } => BlockKind::Heading2,
            Block::Heading { .. } => BlockKind::Heading3,
            Block::Paragraph(_) => BlockKind::Paragraph,
            Block::List { ordered: false, .. } => BlockKind::UnorderedList,
            Block::List { ordered: true, .. } => BlockKind::OrderedList,
        }
    }
}
