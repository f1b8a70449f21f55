#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clippy_reader::completion::{Completion, CompletionBackend, CompletionOptions};
use clippy_reader::face::AppState;
use clippy_reader::feed::{FeedSource, FeedService};
use clippy_reader::services::Services;
use clippy_reader::{AppError, CompletionMetadata};

type Reply = Box<dyn Fn() -> Result<String, AppError> + Send + Sync>;

/// Completion backend that answers every prompt the same way.
pub struct FakeBackend {
    reply: Reply,
    calls: AtomicUsize,
}

impl FakeBackend {
    pub fn replying(text: &'static str) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(move || Ok(text.to_string())),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(make: fn() -> AppError) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(move || Err(make())),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionBackend for FakeBackend {
    async fn complete(&self, _prompt: &str, _options: &CompletionOptions) -> Result<Completion, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let content = (self.reply)()?;
        Ok(Completion {
            content,
            metadata: CompletionMetadata {
                processing_time: 7,
                tokens_used: 42,
                model: "fake-model".into(),
            },
        })
    }
}

pub fn app_state(backend: Arc<FakeBackend>, sources: Vec<FeedSource>, development: bool) -> AppState {
    let http = reqwest::Client::new();
    let services = Arc::new(Services::new(backend, http.clone()));
    let feed = Arc::new(FeedService::new(
        http,
        sources,
        Duration::from_secs(900),
        services.article.clone(),
    ));
    AppState {
        services,
        feed,
        expose_error_details: development,
    }
}

pub fn rss(items: &[(&str, &str, Option<&str>)]) -> String {
    let items: String = items
        .iter()
        .map(|(title, link, date)| {
            let date = date.map(|d| format!("<pubDate>{d}</pubDate>")).unwrap_or_default();
            format!(
                "<item><title>{title}</title><link>{link}</link>\
                 <description>About {title}</description>{date}</item>"
            )
        })
        .collect();
    format!("<?xml version=\"1.0\"?><rss version=\"2.0\"><channel><title>t</title>{items}</channel></rss>")
}
