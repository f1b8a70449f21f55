use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::completion::CompletionBackend;
use crate::error::AppError;
use crate::prompts::{self, SummaryFormat};
use crate::types::{Operation, SummaryData};

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[•\-\*\d]+[\.\)]\s*(.+)$").expect("valid bullet regex"));

const MAX_UNMARKED_POINTS: usize = 5;
const MIN_UNMARKED_CHARS: usize = 10;

pub struct SummaryService {
    backend: Arc<dyn CompletionBackend>,
}

impl SummaryService {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    pub async fn summarize(&self, text: &str, format: Option<&str>) -> Result<SummaryData, AppError> {
        let prompt = prompts::summary_prompt(text, SummaryFormat::parse(format));
        let completion = self
            .backend
            .complete(&prompt, &super::options(Operation::Summarize, 0.5, 400))
            .await?;

        let summary = completion.content.trim().to_string();
        let key_points = extract_key_points(&summary);

        Ok(SummaryData {
            content: summary,
            key_points,
            metadata: completion.metadata,
        })
    }
}

/// Marked lines (`1.`, `2)`, `*.`) yield their text; unmarked lines longer
/// than 10 chars count while fewer than 5 points exist. Falls back to the
/// whole summary as a single point.
pub fn extract_key_points(text: &str) -> Vec<String> {
    let mut points = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(caps) = BULLET.captures(line) {
            points.push(caps[1].trim().to_string());
        } else if line.chars().count() > MIN_UNMARKED_CHARS && points.len() < MAX_UNMARKED_POINTS {
            points.push(line.to_string());
        }
    }

    if points.is_empty() {
        points.push(text.to_string());
    }
    points
}
