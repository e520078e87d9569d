mod block;
mod classify;
mod html;
mod inline;
mod render;
mod segment;

pub mod api;
pub mod article;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod guard;

pub use block::{Block, BlockKind, Node, Segment, Span, spans_text};
pub use classify::classify;
pub use html::{article_to_html, nodes_to_html, not_found_html};
pub use inline::tokenize;
pub use render::{DEFAULT_LANGUAGE, RenderOptions, render, render_with};
pub use segment::split_segments;

pub use config::Config;
