use std::sync::LazyLock;

use regex::Regex;

use crate::block::Span;

/// `**bold**`, `*italic*` or `` `code` ``, tried in that order at each position.
static INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*(.+?)\*\*|\*(.+?)\*|`([^`]+)`").expect("invalid inline span regex")
});

/// Tokenize a run of text into plain and formatted spans.
///
/// Matching is a single left-to-right scan: the first marker found wins and its
/// content is taken non-greedily. Text without markers yields one `Text` span.
pub fn tokenize(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in INLINE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            spans.push(Span::Text(text[last..whole.start()].to_string()));
        }

        let span = if let Some(bold) = caps.get(1) {
            Span::Bold(bold.as_str().to_string())
        } else if let Some(italic) = caps.get(2) {
            Span::Italic(italic.as_str().to_string())
        } else if let Some(code) = caps.get(3) {
            Span::Code(code.as_str().to_string())
        } else {
            continue;
        };
        spans.push(span);
        last = whole.end();
    }

    if last < text.len() {
        spans.push(Span::Text(text[last..].to_string()));
    }
    if spans.is_empty() {
        spans.push(Span::Text(text.to_string()));
    }
    spans
}
