use crate::block::Segment;

const FENCE: &str = "```";

/// Split a document into fenced code and prose segments, in document order.
///
/// A fence pair only forms a code segment when the opening fence is followed by an
/// optional language word and a newline. Other pairs stay in the prose as literal
/// text. An unterminated fence turns the rest of the document into code.
pub fn split_segments(document: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    // Start of the prose run not yet emitted
    let mut prose_start = 0;
    let mut cursor = 0;

    while let Some(offset) = document[cursor..].find(FENCE) {
        let open = cursor + offset;
        let inner_start = open + FENCE.len();

        let Some(close_offset) = document[inner_start..].find(FENCE) else {
            push_prose(&mut segments, &document[prose_start..open]);
            let (language, body) = split_info_line(&document[inner_start..])
                .unwrap_or((None, &document[inner_start..]));
            segments.push(Segment::Code {
                language,
                body: body.trim(),
            });
            return segments;
        };

        let inner_end = inner_start + close_offset;
        let after = inner_end + FENCE.len();

        if let Some((language, body)) = split_info_line(&document[inner_start..inner_end]) {
            push_prose(&mut segments, &document[prose_start..open]);
            segments.push(Segment::Code {
                language,
                body: body.trim(),
            });
            prose_start = after;
        }
        cursor = after;
    }

    push_prose(&mut segments, &document[prose_start..]);
    segments
}

fn push_prose<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str) {
    if !text.is_empty() {
        segments.push(Segment::Prose(text));
    }
}

/// Split fenced content into its language word and body.
///
/// Returns `None` when the opening line holds anything but an optional
/// `[A-Za-z0-9_]+` word.
fn split_info_line(inner: &str) -> Option<(Option<&str>, &str)> {
    let newline = inner.find('\n')?;
    let info = inner[..newline].strip_suffix('\r').unwrap_or(&inner[..newline]);
    if !info.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return None;
    }
    let language = if info.is_empty() { None } else { Some(info) };
    Some((language, &inner[newline + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn prose_only() {
        assert_eq!(split_segments("hello"), vec![Segment::Prose("hello")]);
    }

    #[test]
    fn empty_document() {
        assert!(split_segments("").is_empty());
    }

    #[test]
    fn fence_between_prose() {
        assert_eq!(
            split_segments("a\n```js\nconsole.log(1)\n```\nb"),
            vec![
                Segment::Prose("a\n"),
                Segment::Code {
                    language: Some("js"),
                    body: "console.log(1)",
                },
                Segment::Prose("\nb"),
            ]
        );
    }

    #[test]
    fn fence_without_language() {
        assert_eq!(
            split_segments("```\nplain\n```"),
            vec![Segment::Code {
                language: None,
                body: "plain",
            }]
        );
    }

    #[test]
    fn adjacent_fences_emit_no_empty_prose() {
        assert_eq!(
            split_segments("```a\n1\n``````b\n2\n```"),
            vec![
                Segment::Code {
                    language: Some("a"),
                    body: "1",
                },
                Segment::Code {
                    language: Some("b"),
                    body: "2",
                },
            ]
        );
    }

    #[test]
    fn body_is_trimmed() {
        assert_eq!(
            split_segments("```rust\n\n  let x = 1;\n\n```"),
            vec![Segment::Code {
                language: Some("rust"),
                body: "let x = 1;",
            }]
        );
    }

    #[test]
    fn crlf_info_line() {
        assert_eq!(
            split_segments("```sh\r\nls\r\n```"),
            vec![Segment::Code {
                language: Some("sh"),
                body: "ls",
            }]
        );
    }

    #[test]
    fn first_closing_fence_wins() {
        assert_eq!(
            split_segments("```md\na ```b``` c\n```"),
            vec![
                Segment::Code {
                    language: Some("md"),
                    body: "a",
                },
                Segment::Prose("b``` c\n```"),
            ]
        );
    }

    #[test]
    fn unterminated_fence_takes_the_rest() {
        assert_eq!(
            split_segments("intro\n```python\nprint(1)\n\nmore"),
            vec![
                Segment::Prose("intro\n"),
                Segment::Code {
                    language: Some("python"),
                    body: "print(1)\n\nmore",
                },
            ]
        );
    }

    #[test]
    fn unterminated_fence_without_newline() {
        assert_eq!(
            split_segments("text ```"),
            vec![
                Segment::Prose("text "),
                Segment::Code {
                    language: None,
                    body: "",
                },
            ]
        );
    }

    #[test]
    fn inline_fence_pair_stays_prose() {
        assert_eq!(
            split_segments("use ```x``` here"),
            vec![Segment::Prose("use ```x``` here")]
        );
    }

    #[test]
    fn unusual_info_string_stays_prose() {
        assert_eq!(
            split_segments("```c++\nint x;\n```\nafter"),
            vec![Segment::Prose("```c++\nint x;\n```\nafter")]
        );
    }
}
