//! Blocking client for the CMS REST API.
//!
//! Reads mirror the queries the blog front end issues (filters, population and
//! sorting are passed as query pairs); writes wrap their body in `{"data": ...}`.
//! Anonymous reads are cached for the configured freshness window.

mod cache;
pub mod model;

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use cache::QueryCache;
pub use model::{
    Article, ArticleInput, AuthResponse, Bookmark, Collection, Idea, IdeaStatus, NewIdea,
    Pagination, RoleRecord, Section, SectionInput, User, UserRef, parse_tags,
};

use crate::config::Config;
use crate::error::ApiError;
use model::{
    BookmarkInput, Envelope, IdeaInput, LoginInput, RegisterInput, Single, StatusInput,
    VotesInput,
};

/// Number of articles `latest_articles` is usually asked for.
pub const DEFAULT_LATEST_COUNT: usize = 5;

pub struct ContentClient {
    base_url: Url,
    http: Client,
    token: Option<String>,
    cache: QueryCache,
}

impl ContentClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(&config.api.base_url).map_err(|err| ApiError::InvalidUrl {
                url: config.api.base_url.clone(),
                reason: err.to_string(),
            })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl {
                url: config.api.base_url.clone(),
                reason: "not a base URL".to_string(),
            });
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .user_agent(concat!("canvas/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url,
            http,
            token: None,
            cache: QueryCache::new(Duration::from_secs(config.cache.stale_secs)),
        })
    }

    /// Authenticate subsequent requests with a bearer token, or stop doing so.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    // Articles

    pub fn articles(&self) -> Result<Vec<Article>, ApiError> {
        let url = self.endpoint(
            &["api", "articles"],
            &[("populate", "section"), ("sort", "createdAt:desc")],
        )?;
        Ok(self.get::<Collection<Article>>(url)?.into_vec())
    }

    pub fn article_by_slug(&self, slug: &str) -> Result<Option<Article>, ApiError> {
        let url = self.endpoint(
            &["api", "articles"],
            &[("filters[slug][$eq]", slug), ("populate", "section")],
        )?;
        Ok(self.get::<Collection<Article>>(url)?.into_vec().into_iter().next())
    }

    pub fn articles_by_section(&self, section_slug: &str) -> Result<Vec<Article>, ApiError> {
        let url = self.endpoint(
            &["api", "articles"],
            &[
                ("filters[section][slug][$eq]", section_slug),
                ("populate", "section"),
                ("sort", "createdAt:desc"),
            ],
        )?;
        Ok(self.get::<Collection<Article>>(url)?.into_vec())
    }

    pub fn featured_article(&self) -> Result<Option<Article>, ApiError> {
        let url = self.endpoint(
            &["api", "articles"],
            &[
                ("filters[featured][$eq]", "true"),
                ("populate", "section"),
                ("pagination[limit]", "1"),
            ],
        )?;
        Ok(self.get::<Collection<Article>>(url)?.into_vec().into_iter().next())
    }

    pub fn latest_articles(&self, count: usize) -> Result<Vec<Article>, ApiError> {
        let limit = count.to_string();
        let url = self.endpoint(
            &["api", "articles"],
            &[
                ("populate", "section"),
                ("sort", "createdAt:desc"),
                ("pagination[limit]", limit.as_str()),
            ],
        )?;
        Ok(self.get::<Collection<Article>>(url)?.into_vec())
    }

    pub fn article(&self, document_id: &str) -> Result<Article, ApiError> {
        let url = self.endpoint(&["api", "articles", document_id], &[("populate", "section")])?;
        Ok(self.get::<Single<Article>>(url)?.data)
    }

    pub fn create_article(&self, input: &ArticleInput) -> Result<Article, ApiError> {
        let url = self.endpoint(&["api", "articles"], &[])?;
        Ok(self.write::<_, Single<Article>>(Method::POST, url, input)?.data)
    }

    pub fn update_article(
        &self,
        document_id: &str,
        input: &ArticleInput,
    ) -> Result<Article, ApiError> {
        let url = self.endpoint(&["api", "articles", document_id], &[])?;
        Ok(self.write::<_, Single<Article>>(Method::PUT, url, input)?.data)
    }

    pub fn delete_article(&self, document_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "articles", document_id], &[])?;
        self.delete(url)
    }

    // Sections

    pub fn sections(&self) -> Result<Vec<Section>, ApiError> {
        let url = self.endpoint(&["api", "sections"], &[("sort", "order:asc")])?;
        Ok(self.get::<Collection<Section>>(url)?.into_vec())
    }

    pub fn create_section(&self, input: &SectionInput) -> Result<Section, ApiError> {
        let url = self.endpoint(&["api", "sections"], &[])?;
        Ok(self.write::<_, Single<Section>>(Method::POST, url, input)?.data)
    }

    pub fn update_section(
        &self,
        document_id: &str,
        input: &SectionInput,
    ) -> Result<Section, ApiError> {
        let url = self.endpoint(&["api", "sections", document_id], &[])?;
        Ok(self.write::<_, Single<Section>>(Method::PUT, url, input)?.data)
    }

    pub fn delete_section(&self, document_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "sections", document_id], &[])?;
        self.delete(url)
    }

    // Ideas

    /// Approved ideas, most voted first.
    pub fn approved_ideas(&self) -> Result<Vec<Idea>, ApiError> {
        let url = self.endpoint(
            &["api", "ideas"],
            &[
                ("filters[status][$eq]", IdeaStatus::Approved.as_str()),
                ("populate", "user"),
                ("sort", "votes:desc"),
            ],
        )?;
        Ok(self.get::<Collection<Idea>>(url)?.into_vec())
    }

    pub fn ideas_by_user(&self, user_id: u64) -> Result<Vec<Idea>, ApiError> {
        let user_id = user_id.to_string();
        let url = self.endpoint(
            &["api", "ideas"],
            &[
                ("filters[user][id][$eq]", user_id.as_str()),
                ("populate", "user"),
                ("sort", "createdAt:desc"),
            ],
        )?;
        Ok(self.get::<Collection<Idea>>(url)?.into_vec())
    }

    /// Every idea regardless of status, newest first.
    pub fn all_ideas(&self) -> Result<Vec<Idea>, ApiError> {
        let url = self.endpoint(
            &["api", "ideas"],
            &[("populate", "user"), ("sort", "createdAt:desc")],
        )?;
        Ok(self.get::<Collection<Idea>>(url)?.into_vec())
    }

    /// Submit an idea for review. It starts out pending with no votes.
    pub fn submit_idea(&self, user_id: u64, idea: &NewIdea) -> Result<Idea, ApiError> {
        let url = self.endpoint(&["api", "ideas"], &[])?;
        let input = IdeaInput {
            title: &idea.title,
            content: &idea.content,
            category: &idea.category,
            status: IdeaStatus::Pending,
            user: user_id,
            votes: 0,
        };
        Ok(self.write::<_, Single<Idea>>(Method::POST, url, &input)?.data)
    }

    pub fn vote_idea(&self, idea: &Idea) -> Result<Idea, ApiError> {
        let url = self.endpoint(&["api", "ideas", idea.document_id.as_str()], &[])?;
        let input = VotesInput {
            votes: idea.votes + 1,
        };
        Ok(self.write::<_, Single<Idea>>(Method::PUT, url, &input)?.data)
    }

    pub fn set_idea_status(&self, document_id: &str, status: IdeaStatus) -> Result<Idea, ApiError> {
        let url = self.endpoint(&["api", "ideas", document_id], &[])?;
        Ok(self
            .write::<_, Single<Idea>>(Method::PUT, url, &StatusInput { status })?
            .data)
    }

    // Bookmarks

    pub fn bookmarks_for_user(&self, user_id: u64) -> Result<Vec<Bookmark>, ApiError> {
        let user_id = user_id.to_string();
        let url = self.endpoint(
            &["api", "bookmarks"],
            &[
                ("filters[user][id][$eq]", user_id.as_str()),
                ("populate", "article"),
            ],
        )?;
        Ok(self.get::<Collection<Bookmark>>(url)?.into_vec())
    }

    pub fn bookmark_for_article(
        &self,
        user_id: u64,
        article_id: u64,
    ) -> Result<Option<Bookmark>, ApiError> {
        let user_id = user_id.to_string();
        let article_id = article_id.to_string();
        let url = self.endpoint(
            &["api", "bookmarks"],
            &[
                ("filters[user][id][$eq]", user_id.as_str()),
                ("filters[article][id][$eq]", article_id.as_str()),
            ],
        )?;
        Ok(self.get::<Collection<Bookmark>>(url)?.into_vec().into_iter().next())
    }

    pub fn add_bookmark(&self, user_id: u64, article_id: u64) -> Result<Bookmark, ApiError> {
        let url = self.endpoint(&["api", "bookmarks"], &[])?;
        let input = BookmarkInput {
            user: user_id,
            article: article_id,
        };
        Ok(self.write::<_, Single<Bookmark>>(Method::POST, url, &input)?.data)
    }

    pub fn remove_bookmark(&self, document_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "bookmarks", document_id], &[])?;
        self.delete(url)
    }

    // Authentication

    pub fn login(&self, identifier: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let url = self.endpoint(&["api", "auth", "local"], &[])?;
        log::debug!("POST {url}");
        let request = self.http.post(url.clone()).json(&LoginInput {
            identifier,
            password,
        });
        let body = self.send(request, None)?;
        decode(&url, &body)
    }

    pub fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let url = self.endpoint(&["api", "auth", "local", "register"], &[])?;
        log::debug!("POST {url}");
        let request = self.http.post(url.clone()).json(&RegisterInput {
            username,
            email,
            password,
        });
        let body = self.send(request, None)?;
        decode(&url, &body)
    }

    /// The user owning `token`, with its role populated.
    pub fn current_user(&self, token: &str) -> Result<User, ApiError> {
        let url = self.endpoint(&["api", "users", "me"], &[("populate", "role")])?;
        log::debug!("GET {url}");
        let body = self.send(self.http.get(url.clone()), Some(token))?;
        decode(&url, &body)
    }

    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "not a base URL".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        // Only anonymous reads are shared between callers.
        let cacheable = self.token.is_none();
        if cacheable {
            if let Some(body) = self.cache.get(url.as_str()) {
                log::debug!("cache hit for {url}");
                return decode(&url, &body);
            }
        }

        log::debug!("GET {url}");
        let body = self.send(self.http.get(url.clone()), self.token.as_deref())?;
        if cacheable {
            self.cache.insert(url.as_str(), body.clone());
        }
        decode(&url, &body)
    }

    fn write<B, T>(&self, method: Method, url: Url, data: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        log::debug!("{method} {url}");
        let request = self
            .http
            .request(method, url.clone())
            .json(&Envelope { data });
        let body = self.send(request, self.token.as_deref())?;
        self.cache.clear();
        decode(&url, &body)
    }

    fn delete(&self, url: Url) -> Result<(), ApiError> {
        log::debug!("DELETE {url}");
        self.send(self.http.delete(url), self.token.as_deref())?;
        self.cache.clear();
        Ok(())
    }

    fn send(&self, request: RequestBuilder, token: Option<&str>) -> Result<String, ApiError> {
        let request = match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            log::debug!("request failed with {status}");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(body)
    }
}

fn decode<T: DeserializeOwned>(url: &Url, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Extract `error.message` from a CMS error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
