//! Articles bundled with the binary.
//!
//! The blog stays readable without the CMS: whenever a read fails or comes back
//! empty, the matching entries of this catalog are shown instead.

use serde::Deserialize;

use crate::api::Article;
use crate::article::ArticleView;
use crate::error::ApiError;

/// Seed articles compiled into the binary, validated by `build.rs`.
const BUNDLED: &str = include_str!("catalog.toml");

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    articles: Vec<ArticleView>,
}

impl Catalog {
    /// The bundled seed articles.
    pub fn bundled() -> Self {
        toml::from_str(BUNDLED).unwrap_or_default()
    }

    fn get(&self, id: &str) -> Option<&ArticleView> {
        self.articles.iter().find(|article| article.id == id)
    }

    /// The first entry is the featured one.
    fn featured(&self) -> Option<&ArticleView> {
        self.articles.first()
    }

    /// Articles whose section name matches `section`, ignoring case.
    fn by_section(&self, section: &str) -> Vec<&ArticleView> {
        let section = section.to_lowercase();
        self.articles
            .iter()
            .filter(|article| article.section.to_lowercase() == section)
            .collect()
    }

    pub fn article_or_bundled(
        &self,
        slug: &str,
        fetched: Result<Option<Article>, ApiError>,
    ) -> Option<ArticleView> {
        match fetched {
            Ok(Some(article)) => return Some(ArticleView::from(&article)),
            Ok(None) => log::info!("no CMS article `{slug}`, using bundled catalog"),
            Err(e) => log::warn!("failed to fetch article `{slug}`: {e}"),
        }
        self.get(slug).cloned()
    }

    pub fn featured_or_bundled(
        &self,
        fetched: Result<Option<Article>, ApiError>,
    ) -> Option<ArticleView> {
        match fetched {
            Ok(Some(article)) => return Some(ArticleView::from(&article)),
            Ok(None) => log::info!("no featured CMS article, using bundled catalog"),
            Err(e) => log::warn!("failed to fetch featured article: {e}"),
        }
        self.featured().cloned()
    }

    pub fn section_or_bundled(
        &self,
        section: &str,
        fetched: Result<Vec<Article>, ApiError>,
    ) -> Vec<ArticleView> {
        fetched_views(fetched, "section articles").unwrap_or_else(|| {
            self.by_section(section).into_iter().cloned().collect()
        })
    }

    /// The newest `count` articles other than `featured`.
    pub fn latest_or_bundled(
        &self,
        count: usize,
        featured: Option<&ArticleView>,
        fetched: Result<Vec<Article>, ApiError>,
    ) -> Vec<ArticleView> {
        let articles =
            fetched_views(fetched, "latest articles").unwrap_or_else(|| self.articles.clone());
        articles
            .into_iter()
            .filter(|article| featured.is_none_or(|featured| featured.id != article.id))
            .take(count)
            .collect()
    }

    pub fn all_or_bundled(&self, fetched: Result<Vec<Article>, ApiError>) -> Vec<ArticleView> {
        fetched_views(fetched, "articles").unwrap_or_else(|| self.articles.clone())
    }
}

/// Views of a non-empty CMS result; `None` when the catalog should stand in.
fn fetched_views(fetched: Result<Vec<Article>, ApiError>, what: &str) -> Option<Vec<ArticleView>> {
    match fetched {
        Ok(articles) if !articles.is_empty() => {
            Some(articles.iter().map(ArticleView::from).collect())
        }
        Ok(_) => {
            log::info!("no {what} in the CMS, using bundled catalog");
            None
        }
        Err(e) => {
            log::warn!("failed to fetch {what}: {e}");
            None
        }
    }
}
