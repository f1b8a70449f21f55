//! Content services. Each one builds its prompt, calls the completion
//! backend with task-tuned settings, and parses the raw text into a typed shape.

mod article;
mod definition;
mod eli5;
mod example;
mod summary;

use std::sync::Arc;

pub use article::{ArticleService, parse_analysis};
pub use definition::{DefinitionService, parse_definitions};
pub use eli5::Eli5Service;
pub use example::{ExampleService, parse_examples};
pub use summary::{SummaryService, extract_key_points};

use crate::completion::{CompletionBackend, CompletionOptions};
use crate::prompts;
use crate::types::Operation;

/// Every content service, built once at startup and shared by the routes.
pub struct Services {
    pub eli5: Eli5Service,
    pub summary: SummaryService,
    pub definition: DefinitionService,
    pub example: ExampleService,
    pub article: Arc<ArticleService>,
}

impl Services {
    /// `http` is used by the article service to fetch pages submitted by URL only.
    pub fn new(backend: Arc<dyn CompletionBackend>, http: reqwest::Client) -> Self {
        Self {
            eli5: Eli5Service::new(backend.clone()),
            summary: SummaryService::new(backend.clone()),
            definition: DefinitionService::new(backend.clone()),
            example: ExampleService::new(backend.clone()),
            article: Arc::new(ArticleService::new(backend, http)),
        }
    }
}

fn options(operation: Operation, temperature: f32, max_tokens: u32) -> CompletionOptions {
    CompletionOptions {
        system_prompt: prompts::system_prompt(operation),
        model: None,
        temperature,
        max_tokens,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::completion::{Completion, CompletionBackend, CompletionOptions};
    use crate::error::AppError;
    use crate::types::CompletionMetadata;

    /// Replies with a fixed text and records every prompt it receives.
    pub struct ScriptedBackend {
        reply: Option<String>,
        pub calls: Mutex<Vec<(String, CompletionOptions)>>,
    }

    impl ScriptedBackend {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn last_call(&self) -> (String, CompletionOptions) {
            self.calls.lock().unwrap().last().cloned().expect("backend was called")
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<Completion, AppError> {
            self.calls.lock().unwrap().push((prompt.to_string(), options.clone()));
            match &self.reply {
                Some(reply) => Ok(Completion {
                    content: reply.trim().to_string(),
                    metadata: CompletionMetadata {
                        processing_time: 5,
                        tokens_used: 42,
                        model: "test-model".into(),
                    },
                }),
                None => Err(AppError::EngineUnavailable("scripted failure".into())),
            }
        }
    }
}
