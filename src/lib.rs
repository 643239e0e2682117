use actix_web::{
    get,
    http::{header, Method},
    post, route, web, HttpRequest, HttpResponse, Responder,
};
use chrono::{DateTime, Utc};
use clap::Parser;
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use std::time::SystemTime;
use tracing::error;

pub mod article;
pub mod cache;
pub mod error;
pub mod feed;
pub mod gateway;
pub mod wikipedia;

use article::ArticleRecord;
use error::{ApiError, GatewayError};
use gateway::WikipediaGateway;
use wikipedia::{UpstreamConfig, WikipediaClient};

pub const MIN_BATCH: usize = 1;
pub const MAX_BATCH: usize = 20;
pub const DEFAULT_BATCH: usize = 5;

#[derive(Parser, Debug, Clone)]
#[clap(about, version, author)]
pub struct Args {
    #[clap(short, long, default_value = "127.0.0.1")]
    pub ip: String,

    #[clap(short, long, default_value = "5000")]
    pub port: u16,

    /// Seconds a fetched batch is served before the upstream is asked again
    #[clap(short, long, default_value = "1800")]
    pub cache_lifetime: u32,

    #[clap(short, long, default_value = wikipedia::DEFAULT_API_URL)]
    pub api_url: Url,

    /// Base for article links when the upstream omits a canonical URL
    #[clap(short, long, default_value = wikipedia::DEFAULT_WIKI_URL)]
    pub wiki_url: Url,

    #[clap(short, long, default_value = "300")]
    pub extract_chars: u32,

    #[clap(short, long, default_value = "500")]
    pub thumb_size: u32,

    /// Upstream request timeout in seconds
    #[clap(short, long, default_value = "10")]
    pub request_timeout: u64,
}

impl Args {
    pub fn upstream_config(&self) -> UpstreamConfig {
        UpstreamConfig {
            api_url: self.api_url.clone(),
            wiki_url: self.wiki_url.clone(),
            extract_chars: self.extract_chars,
            thumb_size: self.thumb_size,
            request_timeout: std::time::Duration::from_secs(self.request_timeout),
        }
    }

    pub fn build_gateway(&self) -> Result<WikipediaGateway, GatewayError> {
        let client = WikipediaClient::new(self.upstream_config())?;
        Ok(WikipediaGateway::new(
            client,
            chrono::Duration::seconds(self.cache_lifetime.into()),
        ))
    }
}

pub struct AppState {
    pub config: Args,
    pub gateway: WikipediaGateway,
}

#[derive(Debug, Deserialize)]
pub struct BatchQuery {
    count: Option<String>,
}

/// Parses `count`, defaulting when absent. Anything other than a plain
/// integer in `MIN_BATCH..=MAX_BATCH` is rejected.
pub fn parse_count(raw: Option<&str>) -> Result<usize, ApiError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_BATCH);
    };

    match raw.trim().parse::<usize>() {
        Ok(count) if (MIN_BATCH..=MAX_BATCH).contains(&count) => Ok(count),
        _ => Err(ApiError::InvalidCount),
    }
}

#[get("/random")]
async fn random(app_data: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let article = app_data.gateway.get_random_article().await.map_err(|e| {
        error!(error = %e, "GET /random failed");
        ApiError::fetch("Failed to fetch random Wikipedia article", e)
    })?;

    let body = serde_json::to_string(&article)?;
    Ok(create_response(&req, &body, article.fetched_at))
}

#[route("/random-batch", method = "GET", method = "HEAD")]
async fn random_batch(
    query: web::Query<BatchQuery>,
    app_data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let count = parse_count(query.count.as_deref())?;

    let articles = app_data.gateway.get_random_articles(count).await.map_err(|e| {
        error!(error = %e, count, "GET /random-batch failed");
        ApiError::fetch("Failed to fetch random Wikipedia articles", e)
    })?;

    let body = serde_json::to_string(&articles)?;
    Ok(create_response(&req, &body, newest(&articles)))
}

#[post("/clear-cache")]
async fn clear_cache(app_data: web::Data<AppState>) -> impl Responder {
    app_data.gateway.clear_cache().await;
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Cache cleared successfully",
    }))
}

#[get("/health")]
async fn health(app_data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "upstream": app_data.config.api_url.as_str(),
        "cacheLifetime": app_data.gateway.cache_lifetime().num_seconds(),
    }))
}

/// Registers the gateway's routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(
        web::scope("/api/wikipedia")
            .service(random)
            .service(random_batch)
            .service(clear_cache),
    );
}

fn newest(articles: &[ArticleRecord]) -> DateTime<Utc> {
    articles
        .iter()
        .map(|article| article.fetched_at)
        .max()
        .unwrap_or_else(Utc::now)
}

fn create_response(req: &HttpRequest, body: &str, fetched_at: DateTime<Utc>) -> HttpResponse {
    let last_modified = header::HttpDate::from(SystemTime::from(fetched_at));

    let mut response = HttpResponse::Ok();
    response.insert_header((header::CONTENT_TYPE, "application/json"));
    response.insert_header((header::LAST_MODIFIED, last_modified.to_string()));

    if req.method() == Method::HEAD {
        response
            .insert_header((header::CONTENT_LENGTH, body.len()))
            .finish()
    } else {
        response.body(body.to_string())
    }
}
