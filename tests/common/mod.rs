#![allow(dead_code)]

use chrono::{Duration, Utc};
use reqwest::Url;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

use wiktok::article::ArticleRecord;
use wiktok::gateway::WikipediaGateway;
use wiktok::wikipedia::{UpstreamConfig, WikipediaClient};

pub const API_PATH: &str = "/w/api.php";

pub fn api_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), API_PATH)
}

pub fn gateway(server: &MockServer, cache_lifetime: Duration) -> WikipediaGateway {
    let config = UpstreamConfig {
        api_url: Url::parse(&api_url(server)).unwrap(),
        ..UpstreamConfig::default()
    };
    WikipediaGateway::new(WikipediaClient::new(config).unwrap(), cache_lifetime)
}

pub fn random_body(pages: &[(u64, &str)]) -> Value {
    let random: Vec<Value> = pages
        .iter()
        .map(|(id, title)| json!({ "id": id, "ns": 0, "title": title }))
        .collect();
    json!({ "batchcomplete": "", "query": { "random": random } })
}

pub fn details_body(pages: &[(u64, &str)]) -> Value {
    let mut map = serde_json::Map::new();
    for (id, title) in pages {
        let slug = title.replace(' ', "_");
        map.insert(
            id.to_string(),
            json!({
                "pageid": id,
                "ns": 0,
                "title": title,
                "extract": format!("This is {title}"),
                "canonicalurl": format!("https://en.wikipedia.org/wiki/{slug}"),
            }),
        );
    }
    json!({ "batchcomplete": "", "query": { "pages": map } })
}

/// Matches the random-title step; add matchers before responding.
pub fn titles_request() -> MockBuilder {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("list", "random"))
}

/// Matches the batched detail step.
pub fn details_request() -> MockBuilder {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("prop", "extracts|pageimages|info"))
}

pub fn titles_mock(pages: &[(u64, &str)]) -> Mock {
    titles_request().respond_with(ResponseTemplate::new(200).set_body_json(random_body(pages)))
}

pub fn details_mock(pages: &[(u64, &str)]) -> Mock {
    details_request().respond_with(ResponseTemplate::new(200).set_body_json(details_body(pages)))
}

pub fn failing_upstream() -> Mock {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service error"))
}

pub fn record(id: u64) -> ArticleRecord {
    ArticleRecord {
        id,
        title: format!("Article {id}"),
        excerpt: format!("Excerpt {id}"),
        thumbnail_url: None,
        full_image_url: None,
        url: format!("https://en.wikipedia.org/wiki/Article_{id}"),
        fetched_at: Utc::now(),
    }
}

pub fn records(ids: impl IntoIterator<Item = u64>) -> Vec<ArticleRecord> {
    ids.into_iter().map(record).collect()
}
