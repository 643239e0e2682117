mod common;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;
use wiktok::error::FeedError;
use wiktok::feed::{ArticleSource, GatewayClient};

fn client(server: &MockServer) -> GatewayClient {
    GatewayClient::new(format!("{}/api/wikipedia/", server.uri()), None).unwrap()
}

#[tokio::test]
async fn batch_count_is_clamped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/wikipedia/random-batch"))
        .and(query_param("count", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records(1..=3)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/wikipedia/random-batch"))
        .and(query_param("count", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records([9])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    assert_eq!(client.fetch_random_articles(50).await.unwrap().len(), 3);
    assert_eq!(client.fetch_random_articles(0).await.unwrap()[0].id, 9);
}

#[tokio::test]
async fn error_body_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/wikipedia/random-batch"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Failed to fetch random Wikipedia articles",
            "message": "upstream returned 503 Service Unavailable",
        })))
        .mount(&server)
        .await;

    let err = client(&server).fetch_batch(5).await.unwrap_err();
    match err {
        FeedError::Service { status, message } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(message, "upstream returned 503 Service Unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unreadable_error_body_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/wikipedia/random"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad gateway"))
        .mount(&server)
        .await;

    let err = client(&server).fetch_random_article().await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch random article");
}

#[tokio::test]
async fn single_article_and_clear_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/wikipedia/random"))
        .respond_with(ResponseTemplate::new(200).set_body_json(record(42)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/wikipedia/clear-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Cache cleared successfully",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let article = client.fetch_random_article().await.unwrap();
    assert_eq!(article.id, 42);
    assert_eq!(article.title, "Article 42");

    let cleared = client.clear_cache().await.unwrap();
    assert!(cleared.success);
    assert_eq!(cleared.message, "Cache cleared successfully");
}
