//! Request validation, run as axum extractors so a rejected body never
//! reaches a handler.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;

pub const MIN_TEXT_CHARS: usize = 3;
pub const MAX_TEXT_CHARS: usize = 5000;

/// Body with a `text` field that passed [`validate_text_input`].
#[derive(Debug, Clone)]
pub struct ValidatedText<T>(pub T);

/// Body with `url` and/or `content` that passed [`validate_article_input`].
#[derive(Debug, Clone)]
pub struct ValidatedArticle<T>(pub T);

pub fn validate_text_input(body: &Value) -> Result<(), AppError> {
    let text = match body.get("text").filter(|v| is_present(v)) {
        None => return Err(invalid("Text input is required")),
        Some(Value::String(text)) => text,
        Some(_) => return Err(invalid("Text input must be a string")),
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(invalid("Text input cannot be empty or only whitespace"));
    }
    if trimmed.chars().count() < MIN_TEXT_CHARS {
        return Err(invalid("Text input must be at least 3 characters long"));
    }
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(invalid("Text input must be less than 5000 characters"));
    }
    Ok(())
}

pub fn validate_article_input(body: &Value) -> Result<(), AppError> {
    let url = body.get("url").filter(|v| is_present(v));
    let content = body.get("content").filter(|v| is_present(v));

    if url.is_none() && content.is_none() {
        return Err(invalid("Either URL or content is required"));
    }
    if content.is_some_and(|c| !c.is_string()) {
        return Err(invalid("Content must be a string"));
    }
    Ok(())
}

/// False for the values a JSON client treats as falsy: null, `false`, `0`
/// and the empty string.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn invalid(message: &str) -> AppError {
    AppError::Validation(message.to_string())
}

async fn json_body<S>(req: Request, state: &S) -> Result<Value, AppError>
where
    S: Send + Sync,
{
    let Json(body) = Json::<Value>::from_request(req, state)
        .await
        .map_err(|rejection| AppError::Validation(format!("Invalid JSON body: {}", rejection.body_text())))?;
    Ok(body)
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, AppError> {
    serde_json::from_value(body).map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))
}

impl<S, T> FromRequest<S> for ValidatedText<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = json_body(req, state).await?;
        validate_text_input(&body)?;
        decode(body).map(Self)
    }
}

impl<S, T> FromRequest<S> for ValidatedArticle<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = json_body(req, state).await?;
        validate_article_input(&body)?;
        decode(body).map(Self)
    }
}
