mod common;

use axum::http::{StatusCode, header};
use axum_test::TestServer;
use clippy_reader::AppError;
use clippy_reader::face::build_router;
use clippy_reader::feed::default_sources;
use clippy_reader::tips::TIPS;
use serde_json::{Value, json};

use common::{FakeBackend, app_state};

fn server(backend: std::sync::Arc<FakeBackend>) -> TestServer {
    TestServer::new(build_router(app_state(backend, default_sources(), false))).unwrap()
}

fn dev_server(backend: std::sync::Arc<FakeBackend>) -> TestServer {
    TestServer::new(build_router(app_state(backend, default_sources(), true))).unwrap()
}

async fn post(server: &TestServer, path: &str, body: Value) -> (StatusCode, Value) {
    let response = server.post(path).json(&body).await;
    (response.status_code(), response.json::<Value>())
}

#[tokio::test]
async fn eli5_returns_content_and_metadata() {
    let backend = FakeBackend::replying("Plants eat sunlight.");
    let server = server(backend.clone());

    let (status, body) = post(&server, "/api/eli5", json!({"text": "Photosynthesis converts light"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["content"], "Plants eat sunlight.");
    assert_eq!(body["data"]["metadata"]["model"], "fake-model");
    assert_eq!(body["data"]["metadata"]["tokensUsed"], 42);
    assert!(body.get("error").is_none());
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn validation_messages_are_checked_in_order() {
    let backend = FakeBackend::replying("unused");
    let server = server(backend.clone());

    let cases = [
        (json!({}), "Text input is required"),
        (json!({"text": ""}), "Text input is required"),
        (json!({"text": 0}), "Text input is required"),
        (json!({"text": 42}), "Text input must be a string"),
        (json!({"text": "   "}), "Text input cannot be empty or only whitespace"),
        (json!({"text": " ab "}), "Text input must be at least 3 characters long"),
        (json!({"text": "a".repeat(5001)}), "Text input must be less than 5000 characters"),
    ];

    for (payload, message) in cases {
        let (status, body) = post(&server, "/api/summarize", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{message}");
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], message);
    }
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn exactly_5000_chars_is_accepted() {
    let server = server(FakeBackend::replying("ok"));
    let (status, _) = post(&server, "/api/explain", json!({"text": "a".repeat(5000)})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let server = server(FakeBackend::replying("unused"));

    let response = server
        .post("/api/eli5")
        .content_type("application/json")
        .text("{not json")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn wrongly_typed_option_is_a_validation_error() {
    let server = server(FakeBackend::replying("unused"));
    let (status, body) = post(&server, "/api/define", json!({"text": "Osmosis", "terms": "Osmosis"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let server = server(FakeBackend::replying("unused"));

    let response = server.get("/api/nope").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body = response.json::<Value>();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Endpoint not found");
}

#[tokio::test]
async fn wrong_method_on_known_route_is_404() {
    let server = server(FakeBackend::replying("unused"));

    for response in [server.get("/api/eli5").await, server.post("/api/feed").await] {
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        let body = response.json::<Value>();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Endpoint not found");
    }
}

#[tokio::test]
async fn summarize_define_example_shapes() {
    let server = server(FakeBackend::replying("1. Osmosis: water moves\n2. Diffusion: particles spread"));

    let (_, summary) = post(&server, "/api/summarize", json!({"text": "Cells move water", "format": "bullets"})).await;
    assert_eq!(
        summary["data"]["keyPoints"],
        json!(["Osmosis: water moves", "Diffusion: particles spread"])
    );

    let (_, examples) = post(&server, "/api/example", json!({"text": "Cells", "exampleType": "analogy"})).await;
    assert_eq!(examples["data"]["examples"].as_array().unwrap().len(), 2);

    let (status, defs) = post(&server, "/api/define", json!({"text": "Cells", "terms": ["Osmosis"]})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(defs["data"]["definitions"].is_array());
}

#[tokio::test]
async fn article_analysis_is_flat() {
    let server = server(FakeBackend::replying("TL;DR: Chips got faster.\nTopics: hardware, ai\nImportance: 81"));

    let (status, body) = post(&server, "/api/article/analyze", json!({"content": "Long article body"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tldr"], "Chips got faster.");
    assert_eq!(body["data"]["topics"], json!(["hardware", "ai"]));
    assert_eq!(body["data"]["importance"], 81);
    assert_eq!(body["data"]["metadata"]["model"], "fake-model");
}

#[tokio::test]
async fn article_requires_url_or_content() {
    let server = server(FakeBackend::replying("unused"));

    let (status, body) = post(&server, "/api/article/analyze", json!({"url": "", "content": null})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Either URL or content is required");

    let (status, body) = post(&server, "/api/article/analyze", json!({"content": 5})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Content must be a string");
}

#[tokio::test]
async fn upstream_failures_map_to_statuses() {
    let cases: [(fn() -> AppError, StatusCode, &str, &str); 4] = [
        (
            || AppError::RateLimited,
            StatusCode::TOO_MANY_REQUESTS,
            "RATE_LIMIT_ERROR",
            "You've used Clippy a lot! Please wait a moment before trying again.",
        ),
        (
            || AppError::EngineUnavailable("connection refused".into()),
            StatusCode::SERVICE_UNAVAILABLE,
            "AI_ENGINE_ERROR",
            "AI service is temporarily unavailable. Please try again in a moment.",
        ),
        (
            || AppError::Timeout,
            StatusCode::GATEWAY_TIMEOUT,
            "TIMEOUT_ERROR",
            "Request took too long to process. Please try with shorter text.",
        ),
        (
            || AppError::Provider {
                status: 401,
                message: "Incorrect API key".into(),
            },
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An unexpected error occurred. Please try again later.",
        ),
    ];

    for (make, status, code, message) in cases {
        let server = server(FakeBackend::failing(make));
        let (actual, body) = post(&server, "/api/eli5", json!({"text": "Some text"})).await;
        assert_eq!(actual, status);
        assert_eq!(body["error"]["code"], code);
        assert_eq!(body["error"]["message"], message);
        assert!(body["error"].get("details").is_none());
    }
}

#[tokio::test]
async fn development_mode_exposes_details() {
    let server = dev_server(FakeBackend::failing(|| AppError::Provider {
        status: 401,
        message: "Incorrect API key".into(),
    }));

    let (status, body) = post(&server, "/api/eli5", json!({"text": "Some text"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], "An unexpected error occurred. Please try again later.");
    assert!(body["error"]["details"].as_str().unwrap().contains("Incorrect API key"));
}

#[tokio::test]
async fn search_requires_a_query() {
    let server = server(FakeBackend::replying("unused"));

    let response = server.get("/api/feed/search").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["message"], "Search query is required");

    let response = server.get("/api/feed/search?q=").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn categories_and_sources_need_no_fetch() {
    let server = server(FakeBackend::replying("unused"));

    let categories = server.get("/api/feed/categories").await.json::<Value>();
    assert_eq!(
        categories["data"]["categories"],
        json!(["Technology", "General News", "Science & Tech"])
    );

    let sources = server.get("/api/feed/sources").await.json::<Value>();
    assert_eq!(sources["data"]["sources"].as_array().unwrap().len(), 6);
    assert_eq!(sources["data"]["sources"][0], json!({"name": "TechCrunch", "category": "Technology"}));
}

#[tokio::test]
async fn health_page_and_script() {
    let server = server(FakeBackend::replying("unused"));

    let health = server.get("/health").await;
    assert_eq!(health.json::<Value>(), json!({"status": "ok"}));

    let page = server.get("/").await;
    assert_eq!(page.status_code(), StatusCode::OK);
    assert!(page.text().contains("<script src=\"/clippy.js\"></script>"));

    let script = server.get("/clippy.js").await;
    let content_type = script.header(header::CONTENT_TYPE);
    assert!(content_type.to_str().unwrap().starts_with("application/javascript"));
    assert!(script.text().contains("window.clippyApp"));
}

#[tokio::test]
async fn script_carries_tips_and_timings() {
    let server = server(FakeBackend::replying("unused"));

    let script = server.get("/clippy.js").await.text();

    assert!(script.contains(TIPS[0]));
    assert!(script.contains(TIPS[39]));
    assert!(script.contains("var FIRST_TIP_MS = 10000;"));
    assert!(script.contains("var MIN_INTERVAL_MS = 30000;"));
    assert!(script.contains("var MAX_INTERVAL_MS = 90000;"));
    assert!(script.contains("var TIP_DURATION_MS = 15000;"));
    assert!(!script.contains("__CLIPPY_TIPS__"));
}
