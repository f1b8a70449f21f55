use std::sync::Arc;

use crate::completion::CompletionBackend;
use crate::error::AppError;
use crate::prompts;
use crate::types::{ContentData, Operation};

pub struct Eli5Service {
    backend: Arc<dyn CompletionBackend>,
}

impl Eli5Service {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Child-friendly rewrite of `text`, optionally grounded in article context.
    pub async fn simplify(&self, text: &str, context: Option<&str>) -> Result<ContentData, AppError> {
        let prompt = prompts::eli5_prompt(text, context);
        let completion = self
            .backend
            .complete(&prompt, &super::options(Operation::Eli5, 0.7, 300))
            .await?;

        Ok(ContentData {
            content: completion.content.trim().to_string(),
            metadata: completion.metadata,
        })
    }
}
