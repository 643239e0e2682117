use std::collections::HashMap;

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};

pub const NO_EXCERPT: &str = "No excerpt available";

/// One encyclopedia article, normalized for feed consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub id: u64,
    pub title: String,
    pub excerpt: String,
    pub thumbnail_url: Option<String>,
    pub full_image_url: Option<String>,
    pub url: String,
    pub fetched_at: DateTime<Utc>,
}

impl ArticleRecord {
    /// Builds a record from an upstream page. Pages the upstream reports
    /// without a page id (missing or deleted titles) yield `None`.
    pub fn from_page(
        page: &WikipediaPage,
        wiki_url: &Url,
        fetched_at: DateTime<Utc>,
    ) -> Option<Self> {
        let id = page.pageid?;

        let url = match &page.canonicalurl {
            Some(url) => url.clone(),
            None => article_url(wiki_url, &page.title),
        };

        Some(Self {
            id,
            title: page.title.clone(),
            excerpt: page
                .extract
                .clone()
                .unwrap_or_else(|| NO_EXCERPT.to_string()),
            thumbnail_url: page.thumbnail.as_ref().map(|image| image.source.clone()),
            full_image_url: page.originalimage.as_ref().map(|image| image.source.clone()),
            url,
            fetched_at,
        })
    }
}

/// `{wiki_url}{title}` with the title percent-encoded as a single path segment.
pub fn article_url(wiki_url: &Url, title: &str) -> String {
    let mut url = wiki_url.clone();
    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments.pop_if_empty().push(title);
        }
        Err(()) => return format!("{wiki_url}{title}"),
    }
    url.to_string()
}

// Upstream (MediaWiki action API) payloads

#[derive(Debug, Clone, Deserialize)]
pub struct RandomResponse {
    pub query: RandomQuery,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RandomQuery {
    pub random: Vec<RandomEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RandomEntry {
    pub id: u64,
    pub title: String,
    pub ns: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetailResponse {
    pub query: Option<DetailQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetailQuery {
    #[serde(default)]
    pub pages: HashMap<String, WikipediaPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WikipediaPage {
    pub pageid: Option<u64>,
    #[serde(default)]
    pub ns: i64,
    pub title: String,
    pub extract: Option<String>,
    pub thumbnail: Option<PageImage>,
    pub originalimage: Option<PageImage>,
    pub canonicalurl: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageImage {
    pub source: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl DetailResponse {
    /// Flattens the page map into records, ordered by page id. The upstream
    /// keys pages by id, so ids are unique within the result.
    pub fn into_records(self, wiki_url: &Url, fetched_at: DateTime<Utc>) -> Vec<ArticleRecord> {
        let Some(query) = self.query else {
            return Vec::new();
        };

        let mut records: Vec<ArticleRecord> = query
            .pages
            .values()
            .filter_map(|page| ArticleRecord::from_page(page, wiki_url, fetched_at))
            .collect();
        records.sort_by_key(|record| record.id);
        records
    }
}
