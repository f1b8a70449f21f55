use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, warn};

use crate::completion::CompletionBackend;
use crate::error::AppError;
use crate::html;
use crate::prompts;
use crate::types::{Analysis, AnalysisData, Operation};

static FIRST_INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid integer regex"));

const DEFAULT_IMPORTANCE: u8 = 50;
const FALLBACK_TLDR_CHARS: usize = 200;
const FALLBACK_TOPIC: &str = "General";

/// Feed intelligence: TL;DR, topics, and an importance score.
pub struct ArticleService {
    backend: Arc<dyn CompletionBackend>,
    http: reqwest::Client,
}

impl ArticleService {
    pub fn new(backend: Arc<dyn CompletionBackend>, http: reqwest::Client) -> Self {
        Self { backend, http }
    }

    /// Analyzes `content`, or the text of the page at `url` when no content
    /// was supplied.
    pub async fn analyze(&self, url: Option<&str>, content: Option<&str>) -> Result<AnalysisData, AppError> {
        let content = match (content.filter(|c| !c.is_empty()), url) {
            (Some(content), _) => content.to_string(),
            (None, Some(url)) => self.fetch_page_text(url).await?,
            (None, None) => return Err(AppError::Validation("Either URL or content is required".into())),
        };

        let prompt = prompts::article_analysis_prompt(&content);
        let completion = self
            .backend
            .complete(&prompt, &super::options(Operation::Summarize, 0.3, 300))
            .await?;

        Ok(AnalysisData {
            analysis: parse_analysis(&completion.content),
            metadata: completion.metadata,
        })
    }

    async fn fetch_page_text(&self, url: &str) -> Result<String, AppError> {
        debug!(url, "fetching article for analysis");
        let unreachable = |err: reqwest::Error| {
            warn!(url, error = %err, "article fetch failed");
            AppError::Validation("Unable to retrieve article content from URL".into())
        };

        let body = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(unreachable)?
            .text()
            .await
            .map_err(unreachable)?;

        let text = html::page_text(&body);
        if text.is_empty() {
            return Err(AppError::Validation("Article at URL has no readable content".into()));
        }
        Ok(text)
    }
}

/// Reads `TL;DR:`, `Topics:` and `Importance:` lines (any case). Missing
/// fields fall back to a truncated TL;DR, `["General"]` and 50.
pub fn parse_analysis(text: &str) -> Analysis {
    let mut tldr = String::new();
    let mut topics = Vec::new();
    let mut importance = DEFAULT_IMPORTANCE;

    for line in text.lines().map(str::trim) {
        if let Some(rest) = strip_prefix_ignore_case(line, "tl;dr:") {
            tldr = rest.trim().to_string();
        } else if let Some(rest) = strip_prefix_ignore_case(line, "topics:") {
            topics = rest
                .trim()
                .split(',')
                .map(|t| t.trim().replace(['[', ']'], ""))
                .filter(|t| !t.is_empty())
                .collect();
        } else if let Some(rest) = strip_prefix_ignore_case(line, "importance:") {
            if let Some(found) = FIRST_INTEGER.find(rest) {
                // Only overflow can fail here; anything that large clamps to 100.
                let value = found.as_str().parse::<u64>().unwrap_or(u64::MAX);
                importance = value.min(100) as u8;
            }
        }
    }

    if tldr.is_empty() {
        let head: String = text.chars().take(FALLBACK_TLDR_CHARS).collect();
        tldr = format!("{}...", head.trim());
    }
    if topics.is_empty() {
        topics.push(FALLBACK_TOPIC.to_string());
    }

    Analysis {
        tldr,
        topics,
        importance,
    }
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &line[prefix.len()..])
}
