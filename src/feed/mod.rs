//! News feed aggregation: concurrent fetch of every source, normalization,
//! a time-bounded cache, and the queries the feed routes expose.

mod parse;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

pub use parse::{DESCRIPTION_CHARS, ITEMS_PER_FEED, article_id, parse_feed};

use crate::error::AppError;
use crate::services::ArticleService;
use crate::types::Analysis;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
    pub category: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            category: category.into(),
        }
    }
}

pub fn default_sources() -> Vec<FeedSource> {
    vec![
        FeedSource::new("TechCrunch", "https://techcrunch.com/feed/", "Technology"),
        FeedSource::new("BBC News", "http://feeds.bbci.co.uk/news/rss.xml", "General News"),
        FeedSource::new("The Verge", "https://www.theverge.com/rss/index.xml", "Technology"),
        FeedSource::new("Hacker News", "https://hnrss.org/frontpage", "Technology"),
        FeedSource::new("MIT Technology Review", "https://www.technologyreview.com/feed/", "Science & Tech"),
        FeedSource::new("Ars Technica", "https://feeds.arstechnica.com/arstechnica/index", "Technology"),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub link: String,
    pub description: String,
    pub content: String,
    pub pub_date: Option<DateTime<Utc>>,
    pub author: String,
    pub source: String,
    pub category: String,
    pub image: Option<String>,
    pub guid: String,
}

impl Article {
    fn matches(&self, lowered_query: &str) -> bool {
        self.title.to_lowercase().contains(lowered_query) || self.description.to_lowercase().contains(lowered_query)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleWithAnalysis {
    #[serde(flatten)]
    pub article: Article,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
}

/// `{name, category}` as listed by `/api/feed/sources`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub name: String,
    pub category: String,
}

struct Snapshot {
    articles: Arc<Vec<Article>>,
    fetched_at: Instant,
}

pub struct FeedService {
    http: reqwest::Client,
    sources: Vec<FeedSource>,
    ttl: Duration,
    analyzer: Arc<ArticleService>,
    // Held across a refresh so concurrent callers wait for the same fetch.
    cache: Mutex<Option<Snapshot>>,
}

impl FeedService {
    pub fn new(http: reqwest::Client, sources: Vec<FeedSource>, ttl: Duration, analyzer: Arc<ArticleService>) -> Self {
        Self {
            http,
            sources,
            ttl,
            analyzer,
            cache: Mutex::new(None),
        }
    }

    /// Every article from every source, newest first, served from cache
    /// while it is fresh.
    pub async fn fetch_all(&self) -> Arc<Vec<Article>> {
        let mut cache = self.cache.lock().await;
        if let Some(snapshot) = cache.as_ref() {
            if snapshot.fetched_at.elapsed() < self.ttl {
                debug!(count = snapshot.articles.len(), "feed cache hit");
                return snapshot.articles.clone();
            }
        }

        info!(sources = self.sources.len(), "fetching articles from all feeds");
        let articles = Arc::new(self.fetch_sources().await);
        info!(count = articles.len(), sources = self.sources.len(), "feeds refreshed");

        *cache = Some(Snapshot {
            articles: articles.clone(),
            fetched_at: Instant::now(),
        });
        articles
    }

    async fn fetch_sources(&self) -> Vec<Article> {
        let mut tasks = JoinSet::new();
        for (index, source) in self.sources.iter().cloned().enumerate() {
            let http = self.http.clone();
            tasks.spawn(async move {
                let articles = match fetch_feed(&http, &source).await {
                    Ok(articles) => articles,
                    Err(err) => {
                        warn!(source = %source.name, error = %format!("{err:#}"), "feed fetch failed");
                        Vec::new()
                    }
                };
                (index, articles)
            });
        }

        let mut per_source = vec![Vec::new(); self.sources.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, articles)) => per_source[index] = articles,
                Err(err) => warn!(error = %err, "feed task aborted"),
            }
        }

        let mut articles: Vec<Article> = per_source.into_iter().flatten().collect();
        sort_newest_first(&mut articles);
        articles
    }

    /// Unique categories in source order.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for source in &self.sources {
            if !categories.contains(&source.category) {
                categories.push(source.category.clone());
            }
        }
        categories
    }

    pub fn sources(&self) -> Vec<SourceInfo> {
        self.sources
            .iter()
            .map(|s| SourceInfo {
                name: s.name.clone(),
                category: s.category.clone(),
            })
            .collect()
    }

    pub async fn by_category(&self, category: &str) -> Vec<Article> {
        self.fetch_all()
            .await
            .iter()
            .filter(|a| a.category == category)
            .cloned()
            .collect()
    }

    /// Case-insensitive substring match over title and description.
    pub async fn search(&self, query: &str) -> Vec<Article> {
        let lowered = query.to_lowercase();
        self.fetch_all()
            .await
            .iter()
            .filter(|a| a.matches(&lowered))
            .cloned()
            .collect()
    }

    /// The cached article with an AI analysis attached. A failed analysis
    /// still returns the article.
    pub async fn article_with_analysis(&self, id: &str) -> Result<ArticleWithAnalysis, AppError> {
        let article = self
            .fetch_all()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Article not found".into()))?;

        let analysis = match self
            .analyzer
            .analyze(Some(&article.link), Some(&article.content))
            .await
        {
            Ok(data) => Some(data.analysis),
            Err(err) => {
                warn!(id, error = %err, "article analysis failed");
                None
            }
        };

        Ok(ArticleWithAnalysis { article, analysis })
    }
}

async fn fetch_feed(http: &reqwest::Client, source: &FeedSource) -> anyhow::Result<Vec<Article>> {
    let body = http.get(&source.url).send().await?.error_for_status()?.text().await?;
    parse_feed(&body, source)
}

/// Newest first; undated articles keep their relative order at the end.
fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| match (a.pub_date, b.pub_date) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}
