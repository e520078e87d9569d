//! Content types exchanged with the CMS REST API.

use serde::{Deserialize, Serialize};

/// Collection response: `{ "data": [...], "meta": { "pagination": ... } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Collection<T> {
    pub data: Option<Vec<T>>,
    pub meta: Option<Meta>,
}

impl<T> Collection<T> {
    /// Entries of the collection; a `null` payload is empty.
    pub fn into_vec(self) -> Vec<T> {
        self.data.unwrap_or_default()
    }
}

/// Single-entry response: `{ "data": {...} }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Single<T> {
    pub data: T,
}

/// Write bodies are wrapped the same way.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: u64,
    pub document_id: String,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub author_bio: Option<String>,
    #[serde(default)]
    pub read_time: Option<String>,
    #[serde(default)]
    pub subsection: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub section: Option<Section>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: u64,
    pub document_id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdeaStatus {
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl IdeaStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            IdeaStatus::Pending => "pending",
            IdeaStatus::Approved => "approved",
            IdeaStatus::Rejected => "rejected",
            IdeaStatus::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for IdeaStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(IdeaStatus::Pending),
            "approved" => Ok(IdeaStatus::Approved),
            "rejected" => Ok(IdeaStatus::Rejected),
            other => Err(format!("unknown idea status `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: u64,
    pub document_id: String,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    pub status: IdeaStatus,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub votes: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user: Option<UserRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRef {
    pub id: u64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: u64,
    pub document_id: String,
    #[serde(default)]
    pub article: Option<Article>,
}

/// Role record as the users-permissions plugin reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub jwt: String,
    pub user: User,
}

/// Fields written when creating or updating an article.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleInput {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    pub author_bio: String,
    pub read_time: String,
    /// Document id of the section, `null` when unassigned.
    pub section: Option<String>,
    pub subsection: String,
    pub image_url: String,
    pub tags: Vec<String>,
    pub featured: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectionInput {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub order: i64,
}

/// A user-submitted idea before it reaches the CMS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdea {
    pub title: String,
    pub content: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct IdeaInput<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub category: &'a str,
    pub status: IdeaStatus,
    pub user: u64,
    pub votes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct VotesInput {
    pub votes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StatusInput {
    pub status: IdeaStatus,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct BookmarkInput {
    pub user: u64,
    pub article: u64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginInput<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RegisterInput<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Split comma-separated tag input, dropping empty entries.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
