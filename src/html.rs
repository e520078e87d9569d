use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::article::ArticleView;
use crate::block::{Node, Span};
use crate::render::{RenderOptions, render_with};

/// Convert presentation nodes to HTML markup
pub fn nodes_to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        emit_node(node, &mut out);
    }
    out
}

/// Render an article page: header, rendered body and tag list.
pub fn article_to_html(article: &ArticleView, options: &RenderOptions) -> String {
    let mut out = String::new();

    out.push_str("<article>\n<header>\n<p class=\"article-section\">");
    out.push_str(&format!(
        "<a href=\"{}\">{}</a>",
        encode_double_quoted_attribute(&article.section_path()),
        encode_text(&article.section)
    ));
    if let Some(subsection) = &article.subsection {
        out.push_str(" · ");
        out.push_str(&encode_text(subsection));
    }
    out.push_str("</p>\n<h1>");
    out.push_str(&encode_text(&article.title));
    out.push_str("</h1>\n<p class=\"article-meta\">");
    out.push_str(&encode_text(&article.author));
    out.push_str(" · ");
    out.push_str(&encode_text(&article.date));
    out.push_str(" · ");
    out.push_str(&encode_text(&article.read_time));
    out.push_str("</p>\n");
    if let Some(image_url) = &article.image_url {
        out.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\">\n",
            encode_double_quoted_attribute(image_url),
            encode_double_quoted_attribute(&article.title)
        ));
    }
    out.push_str("</header>\n");

    out.push_str(&nodes_to_html(&render_with(&article.content, options)));

    if !article.tags.is_empty() {
        out.push_str("<ul class=\"tags\">\n");
        for tag in &article.tags {
            out.push_str("<li>");
            out.push_str(&encode_text(tag));
            out.push_str("</li>\n");
        }
        out.push_str("</ul>\n");
    }
    if !article.author_bio.is_empty() {
        out.push_str("<aside class=\"author-bio\">");
        out.push_str(&encode_text(&article.author_bio));
        out.push_str("</aside>\n");
    }
    out.push_str("</article>\n");
    out
}

/// Fallback page for an article that could not be fetched.
pub fn not_found_html() -> String {
    "<main>\n<h1>Article Not Found</h1>\n<p>The article you're looking for doesn't exist.</p>\n<a href=\"/\">Back to Home</a>\n</main>\n".to_string()
}

fn emit_node(node: &Node, out: &mut String) {
    match node {
        Node::Heading { level, text } => {
            out.push_str(&format!("<h{level}>"));
            spans_to_html(text, out);
            out.push_str(&format!("</h{level}>\n"));
        }
        Node::Paragraph { text } => {
            out.push_str("<p>");
            spans_to_html(text, out);
            out.push_str("</p>\n");
        }
        Node::CodeBlock { language, body } => {
            out.push_str("<div class=\"code-block\">\n<div class=\"code-block-header\">");
            out.push_str(&encode_text(language));
            out.push_str("</div>\n<pre><code class=\"language-");
            out.push_str(&encode_double_quoted_attribute(language));
            out.push_str("\">");
            out.push_str(&encode_text(body));
            out.push_str("</code></pre>\n</div>\n");
        }
        Node::UnorderedList { items } => list_to_html("ul", items, out),
        Node::OrderedList { items } => list_to_html("ol", items, out),
    }
}

fn list_to_html(tag: &str, items: &[Vec<Span>], out: &mut String) {
    out.push_str(&format!("<{tag}>\n"));
    for item in items {
        out.push_str("<li>");
        spans_to_html(item, out);
        out.push_str("</li>\n");
    }
    out.push_str(&format!("</{tag}>\n"));
}

fn spans_to_html(spans: &[Span], out: &mut String) {
    for span in spans {
        span_to_html(span, out);
    }
}

fn span_to_html(span: &Span, out: &mut String) {
    let (open, close) = match span {
        Span::Text(text) => {
            out.push_str(&encode_text(text));
            return;
        }
        Span::Bold(_) => ("<strong>", "</strong>"),
        Span::Italic(_) => ("<em>", "</em>"),
        Span::Code(_) => ("<code>", "</code>"),
    };
    out.push_str(open);
    out.push_str(&encode_text(span.text()));
    out.push_str(close);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render;

    fn to_html(document: &str) -> String {
        nodes_to_html(&render(document))
    }

    #[test]
    fn heading() {
        assert_eq!(to_html("## Hello"), "<h2>Hello</h2>\n");
        assert_eq!(to_html("### Hello"), "<h3>Hello</h3>\n");
    }

    #[test]
    fn paragraph() {
        assert_eq!(to_html("Hello world"), "<p>Hello world</p>\n");
    }

    #[test]
    fn inline_formatting() {
        assert_eq!(
            to_html("**bold** *italic* `code`"),
            "<p><strong>bold</strong> <em>italic</em> <code>code</code></p>\n"
        );
    }

    #[test]
    fn code_block() {
        assert_eq!(
            to_html("```rust\nlet x = 1;\n```"),
            "<div class=\"code-block\">\n<div class=\"code-block-header\">rust</div>\n<pre><code class=\"language-rust\">let x = 1;</code></pre>\n</div>\n"
        );
    }

    #[test]
    fn lists() {
        assert_eq!(
            to_html("- one\n- two"),
            "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n"
        );
        assert_eq!(
            to_html("1. one\n2. two"),
            "<ol>\n<li>one</li>\n<li>two</li>\n</ol>\n"
        );
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            to_html("a <b> & `<c>`"),
            "<p>a &lt;b&gt; &amp; <code>&lt;c&gt;</code></p>\n"
        );
        assert_eq!(
            to_html("```html\n<div>\n```"),
            "<div class=\"code-block\">\n<div class=\"code-block-header\">html</div>\n<pre><code class=\"language-html\">&lt;div&gt;</code></pre>\n</div>\n"
        );
    }

    #[test]
    fn article_page() {
        let article = ArticleView {
            id: "rust-ownership".to_string(),
            title: "Rust Ownership".to_string(),
            excerpt: String::new(),
            content: "## Rules\n\n1. One owner".to_string(),
            author: "Sam Wilson".to_string(),
            author_bio: String::new(),
            date: "Jan 5, 2024".to_string(),
            read_time: "10 min read".to_string(),
            section: "Programming".to_string(),
            subsection: Some("Languages".to_string()),
            image_url: None,
            tags: vec!["rust".to_string()],
        };
        let html = article_to_html(&article, &RenderOptions::default());
        assert!(html.contains("<a href=\"/section/programming\">Programming</a> · Languages"));
        assert!(html.contains("<h1>Rust Ownership</h1>"));
        assert!(html.contains("Sam Wilson · Jan 5, 2024 · 10 min read"));
        assert!(html.contains("<h2>Rules</h2>\n<ol>\n<li>One owner</li>\n</ol>\n"));
        assert!(html.contains("<ul class=\"tags\">\n<li>rust</li>\n</ul>"));
        assert!(!html.contains("author-bio"));
    }

    #[test]
    fn not_found_page() {
        assert!(not_found_html().contains("Article Not Found"));
    }
}
