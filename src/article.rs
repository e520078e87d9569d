use chrono::DateTime;
use serde::Deserialize;

use crate::api::Article;

/// An article as the blog presents it, with display defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArticleView {
    /// Route id: the slug, or the document id for articles without one.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub author_bio: String,
    pub date: String,
    pub read_time: String,
    pub section: String,
    #[serde(default)]
    pub subsection: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ArticleView {
    /// Link to the article's section listing.
    pub fn section_path(&self) -> String {
        format!("/section/{}", self.section.to_lowercase())
    }
}

impl From<&Article> for ArticleView {
    fn from(article: &Article) -> Self {
        let id = non_empty(&article.slug).unwrap_or(&article.document_id);
        let timestamp = non_empty(&article.published_at).or(non_empty(&article.created_at));

        Self {
            id: id.to_string(),
            title: article.title.clone(),
            excerpt: article.excerpt.clone().unwrap_or_default(),
            content: article.content.clone().unwrap_or_default(),
            author: non_empty(&article.author).unwrap_or("Anonymous").to_string(),
            author_bio: article.author_bio.clone().unwrap_or_default(),
            date: timestamp.map(format_date).unwrap_or_default(),
            read_time: non_empty(&article.read_time)
                .unwrap_or("5 min read")
                .to_string(),
            section: article
                .section
                .as_ref()
                .map(|section| section.name.as_str())
                .filter(|name| !name.is_empty())
                .unwrap_or("General")
                .to_string(),
            subsection: non_empty(&article.subsection).map(str::to_string),
            image_url: non_empty(&article.image_url).map(str::to_string),
            tags: article.tags.clone().unwrap_or_default(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Format an RFC 3339 timestamp as `Jan 5, 2024`. Unparseable input is kept as is.
pub fn format_date(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(date) => date.format("%b %-d, %Y").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// Derive a URL slug from a title.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}
