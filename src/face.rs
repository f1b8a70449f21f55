//! HTTP surface: the `/api` routes, health check, the embedded demo page and
//! the injectable browser script.

use std::sync::{Arc, LazyLock};

use axum::body::{Body, to_bytes};
use axum::extract::{Path, Query, Request, State};
use axum::http::header;
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{AppError, ErrorDetails};
use crate::feed::{Article, ArticleWithAnalysis, FeedService, SourceInfo};
use crate::services::Services;
use crate::tips::{FIRST_TIP_DELAY, MAX_INTERVAL, MIN_INTERVAL, TIP_DURATION, TIPS};
use crate::types::{
    AnalysisData, ApiResponse, ArticleRequest, ContentData, DefineRequest, DefinitionsData, Eli5Request,
    ExampleRequest, ExamplesData, ExplainRequest, SummarizeRequest, SummaryData,
};
use crate::validation::{ValidatedArticle, ValidatedText};

/// Injectable browser adapter template; see [`clippy_script`].
pub const CLIPPY_JS: &str = include_str!("../assets/clippy.js");

static CLIPPY_SCRIPT: LazyLock<String> = LazyLock::new(|| {
    let tips = serde_json::to_string(TIPS.as_slice()).unwrap_or_else(|_| "[]".into());
    CLIPPY_JS
        .replace("/*__CLIPPY_TIPS__*/[]", &tips)
        .replace("/*__FIRST_TIP_MS__*/10000", &FIRST_TIP_DELAY.as_millis().to_string())
        .replace("/*__MIN_INTERVAL_MS__*/30000", &MIN_INTERVAL.as_millis().to_string())
        .replace("/*__MAX_INTERVAL_MS__*/90000", &MAX_INTERVAL.as_millis().to_string())
        .replace("/*__TIP_DURATION_MS__*/15000", &TIP_DURATION.as_millis().to_string())
});

/// The script served at `/clippy.js`, with the tip list and timings filled in.
pub fn clippy_script() -> &'static str {
    &CLIPPY_SCRIPT
}

#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Services>,
    pub feed: Arc<FeedService>,
    /// Development mode: copy the full error chain into `error.details`.
    pub expose_error_details: bool,
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/eli5", post(eli5_handler))
        .route("/summarize", post(summarize_handler))
        .route("/define", post(define_handler))
        .route("/explain", post(explain_handler))
        .route("/example", post(example_handler))
        .route("/article/analyze", post(analyze_handler))
        .route("/feed", get(feed_handler))
        .route("/feed/categories", get(categories_handler))
        .route("/feed/sources", get(sources_handler))
        .route("/feed/category/{category}", get(category_handler))
        .route("/feed/search", get(search_handler))
        .route("/feed/article/{id}", get(article_handler))
        .method_not_allowed_fallback(not_found_handler);

    let expose_error_details = state.expose_error_details;
    let mut app = Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/clippy.js", get(script_handler))
        .nest("/api", api)
        .method_not_allowed_fallback(not_found_handler)
        .fallback(not_found_handler)
        .with_state(state);

    if expose_error_details {
        app = app.layer(middleware::from_fn(attach_error_details));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
}

async fn eli5_handler(
    State(state): State<AppState>,
    ValidatedText(req): ValidatedText<Eli5Request>,
) -> ApiResult<ContentData> {
    let data = state.services.eli5.simplify(&req.text, req.context.as_deref()).await?;
    Ok(Json(ApiResponse::ok(data)))
}

async fn summarize_handler(
    State(state): State<AppState>,
    ValidatedText(req): ValidatedText<SummarizeRequest>,
) -> ApiResult<SummaryData> {
    let data = state.services.summary.summarize(&req.text, req.format.as_deref()).await?;
    Ok(Json(ApiResponse::ok(data)))
}

async fn define_handler(
    State(state): State<AppState>,
    ValidatedText(req): ValidatedText<DefineRequest>,
) -> ApiResult<DefinitionsData> {
    let terms = req.terms.unwrap_or_default();
    let data = state.services.definition.define(&req.text, &terms).await?;
    Ok(Json(ApiResponse::ok(data)))
}

async fn explain_handler(
    State(state): State<AppState>,
    ValidatedText(req): ValidatedText<ExplainRequest>,
) -> ApiResult<ContentData> {
    let data = state.services.definition.explain(&req.text, req.level.as_deref()).await?;
    Ok(Json(ApiResponse::ok(data)))
}

async fn example_handler(
    State(state): State<AppState>,
    ValidatedText(req): ValidatedText<ExampleRequest>,
) -> ApiResult<ExamplesData> {
    let data = state
        .services
        .example
        .generate_examples(&req.text, req.example_type.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(data)))
}

async fn analyze_handler(
    State(state): State<AppState>,
    ValidatedArticle(req): ValidatedArticle<ArticleRequest>,
) -> ApiResult<AnalysisData> {
    let data = state
        .services
        .article
        .analyze(req.url.as_deref(), req.content.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(data)))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedData {
    pub articles: Vec<Article>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesData {
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SourcesData {
    pub sources: Vec<SourceInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryData {
    pub articles: Vec<Article>,
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchData {
    pub articles: Vec<Article>,
    pub query: String,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

async fn feed_handler(State(state): State<AppState>) -> ApiResult<FeedData> {
    let articles = state.feed.fetch_all().await.to_vec();
    Ok(Json(ApiResponse::ok(FeedData {
        count: articles.len(),
        articles,
    })))
}

async fn categories_handler(State(state): State<AppState>) -> ApiResult<CategoriesData> {
    Ok(Json(ApiResponse::ok(CategoriesData {
        categories: state.feed.categories(),
    })))
}

async fn sources_handler(State(state): State<AppState>) -> ApiResult<SourcesData> {
    Ok(Json(ApiResponse::ok(SourcesData {
        sources: state.feed.sources(),
    })))
}

async fn category_handler(State(state): State<AppState>, Path(category): Path<String>) -> ApiResult<CategoryData> {
    let articles = state.feed.by_category(&category).await;
    Ok(Json(ApiResponse::ok(CategoryData {
        count: articles.len(),
        articles,
        category,
    })))
}

async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> ApiResult<SearchData> {
    let query = params
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Search query is required".into()))?;

    let articles = state.feed.search(&query).await;
    Ok(Json(ApiResponse::ok(SearchData {
        count: articles.len(),
        articles,
        query,
    })))
}

async fn article_handler(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ArticleWithAnalysis> {
    let article = state.feed.article_with_analysis(&id).await?;
    Ok(Json(ApiResponse::ok(article)))
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn script_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript; charset=utf-8")], clippy_script())
}

async fn not_found_handler() -> AppError {
    AppError::NotFound("Endpoint not found".into())
}

/// Copies the [`ErrorDetails`] extension into the envelope's `error.details`.
async fn attach_error_details(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    let Some(ErrorDetails(details)) = response.extensions().get::<ErrorDetails>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "could not buffer error body");
            return Response::from_parts(parts, Body::empty());
        }
    };

    let body = match serde_json::from_slice::<Value>(&bytes) {
        Ok(mut envelope) => {
            envelope["error"]["details"] = Value::String(details);
            serde_json::to_vec(&envelope).unwrap_or_else(|_| bytes.to_vec())
        }
        Err(_) => bytes.to_vec(),
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(body))
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Clippy Reader</title>
<style>
  * { margin: 0; padding: 0; box-sizing: border-box; }
  body {
    background: #0a0a0f;
    color: #e0e0e0;
    font-family: 'Segoe UI', system-ui, -apple-system, sans-serif;
    line-height: 1.7;
  }
  header {
    padding: 24px 32px;
    border-bottom: 1px solid #1a1a2e;
    display: flex;
    align-items: center;
    gap: 12px;
  }
  header h1 { font-size: 20px; font-weight: 600; color: #fff; }
  header .dot {
    width: 8px; height: 8px;
    border-radius: 50%;
    background: #22c55e;
  }
  main {
    max-width: 760px;
    margin: 0 auto;
    padding: 32px;
  }
  .hint {
    background: #1a1a2e;
    border-left: 3px solid #6366f1;
    padding: 10px 14px;
    border-radius: 8px;
    font-size: 14px;
    margin-bottom: 24px;
  }
  article h2 { color: #fff; margin-bottom: 12px; }
  article p { margin-bottom: 16px; }
</style>
</head>
<body>
  <header>
    <div class="dot"></div>
    <h1>Clippy Reader</h1>
  </header>
  <main>
    <div class="hint">Select any passage below (at least 3 characters) and pick an action from the menu.</div>
    <article>
      <h2>How quantum computers differ</h2>
      <p>Classical computers store information in bits that are either 0 or 1. Quantum computers use qubits,
      which can exist in a superposition of both states at once. When qubits become entangled, the state of
      one is correlated with the state of another no matter how far apart they are.</p>
      <p>Algorithms such as Shor's factoring algorithm exploit interference between these superposed states to
      solve certain problems dramatically faster than any known classical method. Decoherence, the loss of
      quantum behavior through interaction with the environment, remains the main engineering obstacle.</p>
    </article>
  </main>
  <script src="/clippy.js"></script>
</body>
</html>
"##;
