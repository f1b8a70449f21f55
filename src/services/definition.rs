use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::completion::CompletionBackend;
use crate::error::AppError;
use crate::prompts::{self, ExplanationLevel};
use crate::types::{ContentData, Definition, DefinitionsData, Operation};

// "Term: definition", tolerating list markers and **bold** terms.
static COLON_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\*\-\d]*\s*\*?\*?([^:*]+)\*?\*?\s*:\s*(.+)$").expect("valid colon regex")
});
// "Term - definition".
static DASH_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\*\-\d]*\s*\*?\*?([^-*]+)\*?\*?\s*-\s*(.+)$").expect("valid dash regex")
});

const FALLBACK_TERM: &str = "Explanation";

/// Serves both `/define` and `/explain`.
pub struct DefinitionService {
    backend: Arc<dyn CompletionBackend>,
}

impl DefinitionService {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    pub async fn define(&self, text: &str, terms: &[String]) -> Result<DefinitionsData, AppError> {
        let prompt = prompts::definition_prompt(text, terms);
        let completion = self
            .backend
            .complete(&prompt, &super::options(Operation::Define, 0.3, 400))
            .await?;

        Ok(DefinitionsData {
            definitions: parse_definitions(&completion.content),
            metadata: completion.metadata,
        })
    }

    pub async fn explain(&self, text: &str, level: Option<&str>) -> Result<ContentData, AppError> {
        let prompt = prompts::explanation_prompt(text, ExplanationLevel::parse(level));
        let completion = self
            .backend
            .complete(&prompt, &super::options(Operation::Explain, 0.5, 400))
            .await?;

        Ok(ContentData {
            content: completion.content.trim().to_string(),
            metadata: completion.metadata,
        })
    }
}

/// One definition per `Term: definition` or `Term - definition` line. When
/// no line matches, the whole text becomes a single "Explanation" entry.
pub fn parse_definitions(text: &str) -> Vec<Definition> {
    let mut definitions: Vec<Definition> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| COLON_PAIR.captures(line).or_else(|| DASH_PAIR.captures(line)))
        .map(|caps| Definition {
            term: caps[1].trim().to_string(),
            definition: caps[2].trim().to_string(),
        })
        .collect();

    if definitions.is_empty() {
        definitions.push(Definition {
            term: FALLBACK_TERM.to_string(),
            definition: text.trim().to_string(),
        });
    }
    definitions
}
