mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use clippy_reader::AppError;
use clippy_reader::face::build_router;
use clippy_reader::feed::{FeedService, FeedSource, article_id};
use clippy_reader::services::ArticleService;
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{FakeBackend, app_state, rss};

async fn mount_feed(server: &MockServer, route: &str, body: String, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/rss+xml"))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn feed_service(sources: Vec<FeedSource>, ttl: Duration, backend: Arc<FakeBackend>) -> FeedService {
    let analyzer = Arc::new(ArticleService::new(backend, reqwest::Client::new()));
    FeedService::new(reqwest::Client::new(), sources, ttl, analyzer)
}

fn sources(server: &MockServer) -> Vec<FeedSource> {
    vec![
        FeedSource::new("Tech Daily", format!("{}/tech.xml", server.uri()), "Technology"),
        FeedSource::new("Broken", format!("{}/broken.xml", server.uri()), "General News"),
        FeedSource::new("Science Weekly", format!("{}/science.xml", server.uri()), "Science & Tech"),
    ]
}

async fn standard_feeds(server: &MockServer, expected_calls: u64) {
    mount_feed(
        server,
        "/tech.xml",
        rss(&[
            ("Faster chips", "https://tech.example/chips", Some("Mon, 09 Jun 2025 10:00:00 GMT")),
            ("Undated gadget", "https://tech.example/gadget", None),
        ]),
        expected_calls,
    )
    .await;
    mount_feed(
        server,
        "/science.xml",
        rss(&[("Bees and crops", "https://science.example/bees", Some("Tue, 10 Jun 2025 08:00:00 GMT"))]),
        expected_calls,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;
}

#[tokio::test]
async fn merges_sources_newest_first_and_tolerates_failures() {
    let server = MockServer::start().await;
    standard_feeds(&server, 1).await;
    let feed = feed_service(sources(&server), Duration::from_secs(900), FakeBackend::replying("unused"));

    let articles = feed.fetch_all().await;

    let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Bees and crops", "Faster chips", "Undated gadget"]);
    assert_eq!(articles[0].source, "Science Weekly");
    assert_eq!(articles[0].category, "Science & Tech");
    assert_eq!(articles[0].id, article_id("https://science.example/bees"));
}

#[tokio::test]
async fn second_call_is_served_from_cache() {
    let server = MockServer::start().await;
    standard_feeds(&server, 1).await;
    let feed = feed_service(sources(&server), Duration::from_secs(900), FakeBackend::replying("unused"));

    let first = feed.fetch_all().await;
    let second = feed.fetch_all().await;
    let technology = feed.by_category("Technology").await;

    assert_eq!(first.len(), second.len());
    assert_eq!(technology.len(), 2);
}

#[tokio::test]
async fn expired_cache_refetches() {
    let server = MockServer::start().await;
    standard_feeds(&server, 2).await;
    let feed = feed_service(sources(&server), Duration::ZERO, FakeBackend::replying("unused"));

    feed.fetch_all().await;
    feed.fetch_all().await;
}

#[tokio::test]
async fn concurrent_callers_share_one_refresh() {
    let server = MockServer::start().await;
    standard_feeds(&server, 1).await;
    let feed = feed_service(sources(&server), Duration::from_secs(900), FakeBackend::replying("unused"));

    let (a, b) = tokio::join!(feed.fetch_all(), feed.search("chips"));

    assert_eq!(a.len(), 3);
    assert_eq!(b.len(), 1);
}

#[tokio::test]
async fn search_matches_title_and_description_case_insensitively() {
    let server = MockServer::start().await;
    standard_feeds(&server, 1).await;
    let feed = feed_service(sources(&server), Duration::from_secs(900), FakeBackend::replying("unused"));

    assert_eq!(feed.search("BEES").await.len(), 1);
    // Descriptions read "About <title>".
    assert_eq!(feed.search("about").await.len(), 3);
    assert!(feed.search("volcano").await.is_empty());
}

#[tokio::test]
async fn article_by_id_attaches_analysis() {
    let server = MockServer::start().await;
    standard_feeds(&server, 1).await;
    let backend = FakeBackend::replying("TL;DR: Bees help.\nTopics: biology\nImportance: 64");
    let feed = feed_service(sources(&server), Duration::from_secs(900), backend.clone());

    let article = feed
        .article_with_analysis(&article_id("https://science.example/bees"))
        .await
        .unwrap();

    assert_eq!(article.article.title, "Bees and crops");
    let analysis = article.analysis.unwrap();
    assert_eq!(analysis.tldr, "Bees help.");
    assert_eq!(analysis.importance, 64);
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn failed_analysis_still_returns_article() {
    let server = MockServer::start().await;
    standard_feeds(&server, 1).await;
    let feed = feed_service(
        sources(&server),
        Duration::from_secs(900),
        FakeBackend::failing(|| AppError::Timeout),
    );

    let article = feed
        .article_with_analysis(&article_id("https://tech.example/chips"))
        .await
        .unwrap();

    assert_eq!(article.article.title, "Faster chips");
    assert!(article.analysis.is_none());
}

#[tokio::test]
async fn unknown_article_is_not_found() {
    let server = MockServer::start().await;
    standard_feeds(&server, 1).await;
    let feed = feed_service(sources(&server), Duration::from_secs(900), FakeBackend::replying("unused"));

    let err = feed.article_with_analysis("missing").await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(ref m) if m == "Article not found"), "{err:?}");
}

#[tokio::test]
async fn feed_routes_wrap_results() {
    let server = MockServer::start().await;
    standard_feeds(&server, 1).await;
    let app = build_router(app_state(FakeBackend::replying("TL;DR: x"), sources(&server), false));
    let api = TestServer::new(app).unwrap();

    let all = api.get("/api/feed").await.json::<Value>();
    assert_eq!(all["data"]["count"], 3);
    assert!(all["data"]["articles"][0]["pubDate"].is_string());

    let category = api.get("/api/feed/category/Technology").await.json::<Value>();
    assert_eq!(category["data"]["category"], "Technology");
    assert_eq!(category["data"]["count"], 2);

    let search = api.get("/api/feed/search?q=chips").await.json::<Value>();
    assert_eq!(search["data"]["query"], "chips");
    assert_eq!(search["data"]["count"], 1);

    let missing = api.get("/api/feed/article/nope").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(missing.json::<Value>()["error"]["message"], "Article not found");
}
