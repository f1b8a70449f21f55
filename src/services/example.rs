use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::completion::CompletionBackend;
use crate::error::AppError;
use crate::prompts::{self, ExampleKind};
use crate::types::{ExamplesData, Operation};

static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\*\-•]+[\.\)]\s*").expect("valid marker regex"));
static MARKED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\*\-•]+[\.\)]\s").expect("valid marked line regex"));

pub struct ExampleService {
    backend: Arc<dyn CompletionBackend>,
}

impl ExampleService {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    pub async fn generate_examples(&self, text: &str, example_type: Option<&str>) -> Result<ExamplesData, AppError> {
        let prompt = prompts::example_prompt(text, ExampleKind::parse(example_type));
        let completion = self
            .backend
            .complete(&prompt, &super::options(Operation::Example, 0.8, 400))
            .await?;

        Ok(ExamplesData {
            examples: parse_examples(&completion.content),
            metadata: completion.metadata,
        })
    }
}

/// Splits on numbered or bulleted line starts; unmarked lines continue the
/// current example. Falls back to the whole trimmed text.
pub fn parse_examples(text: &str) -> Vec<String> {
    let mut examples = Vec::new();
    let mut current = String::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if MARKED_LINE.is_match(line) {
            if !current.is_empty() {
                examples.push(current.trim().to_string());
            }
            current = MARKER.replace(line, "").into_owned();
        } else if !current.is_empty() {
            current.push(' ');
            current.push_str(line);
        } else {
            current = line.to_string();
        }
    }

    if !current.is_empty() {
        examples.push(current.trim().to_string());
    }

    if examples.is_empty() {
        examples.push(text.trim().to_string());
    }
    examples
}
