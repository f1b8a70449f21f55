//! HTTP client for the `/api` endpoints, shared by the front-end adapters.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::types::{
    AnalysisData, ApiResponse, ArticleRequest, ContentData, DefineRequest, DefinitionsData, Eli5Request,
    ExampleRequest, ExamplesData, ExplainRequest, Operation, SummarizeRequest, SummaryData,
};

pub const DEFAULT_API_BASE: &str = "http://localhost:3000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

pub type LoadingCallback = Arc<dyn Fn(bool) + Send + Sync>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request timed out. Please try again.")]
    TimedOut,

    /// Non-2xx answer; `message` is the server's `error.message`.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Response contained no data")]
    MissingData,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    on_loading: Option<LoadingCallback>,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

/// Reports `false` when dropped, so every exit path of a request ends loading.
struct LoadingGuard<'a>(Option<&'a LoadingCallback>);

impl<'a> LoadingGuard<'a> {
    fn start(callback: Option<&'a LoadingCallback>) -> Self {
        if let Some(cb) = callback {
            cb(true);
        }
        Self(callback)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if let Some(cb) = self.0 {
            cb(false);
        }
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            on_loading: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn on_loading(mut self, callback: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.on_loading = Some(Arc::new(callback));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POSTs `payload` as JSON to `base_url + endpoint`. The whole exchange
    /// is abandoned once the timeout elapses.
    pub async fn request<T, P>(&self, endpoint: &str, payload: &P) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let _loading = LoadingGuard::start(self.on_loading.as_ref());
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "api request");

        tokio::time::timeout(self.timeout, self.exchange(&url, payload))
            .await
            .map_err(|_| ClientError::TimedOut)?
    }

    async fn exchange<T, P>(&self, url: &str, payload: &P) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let response = self.http.post(url).json(payload).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            let message = body["error"]["message"].as_str().unwrap_or("Request failed").to_string();
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn data<T, P>(&self, endpoint: &str, payload: &P) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        self.request::<T, P>(endpoint, payload)
            .await?
            .data
            .ok_or(ClientError::MissingData)
    }

    pub async fn eli5(&self, text: &str, context: Option<&str>) -> Result<ContentData, ClientError> {
        let payload = Eli5Request {
            text: text.to_string(),
            context: context.map(str::to_owned),
        };
        self.data(Operation::Eli5.endpoint(), &payload).await
    }

    pub async fn summarize(&self, text: &str, format: Option<&str>) -> Result<SummaryData, ClientError> {
        let payload = SummarizeRequest {
            text: text.to_string(),
            format: format.map(str::to_owned),
        };
        self.data(Operation::Summarize.endpoint(), &payload).await
    }

    pub async fn define(&self, text: &str, terms: &[String]) -> Result<DefinitionsData, ClientError> {
        let payload = DefineRequest {
            text: text.to_string(),
            terms: (!terms.is_empty()).then(|| terms.to_vec()),
        };
        self.data(Operation::Define.endpoint(), &payload).await
    }

    pub async fn explain(&self, text: &str, level: Option<&str>) -> Result<ContentData, ClientError> {
        let payload = ExplainRequest {
            text: text.to_string(),
            level: level.map(str::to_owned),
        };
        self.data(Operation::Explain.endpoint(), &payload).await
    }

    pub async fn give_example(&self, text: &str, example_type: Option<&str>) -> Result<ExamplesData, ClientError> {
        let payload = ExampleRequest {
            text: text.to_string(),
            example_type: example_type.map(str::to_owned),
        };
        self.data(Operation::Example.endpoint(), &payload).await
    }

    pub async fn analyze_article(&self, url: Option<&str>, content: Option<&str>) -> Result<AnalysisData, ClientError> {
        let payload = ArticleRequest {
            url: url.map(str::to_owned),
            content: content.map(str::to_owned),
        };
        self.data("/article/analyze", &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slash() {
        assert_eq!(ApiClient::new("http://localhost:3000/api/").base_url(), "http://localhost:3000/api");
        assert_eq!(ApiClient::default().base_url(), DEFAULT_API_BASE);
    }

    #[test]
    fn timeout_message_is_user_facing() {
        assert_eq!(ClientError::TimedOut.to_string(), "Request timed out. Please try again.");
        let server = ClientError::Server {
            status: 400,
            message: "Text input is required".into(),
        };
        assert_eq!(server.to_string(), "Text input is required");
    }

    #[test]
    fn loading_guard_reports_both_edges() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: LoadingCallback = Arc::new(move |loading| sink.lock().unwrap().push(loading));
        {
            let _guard = LoadingGuard::start(Some(&callback));
        }
        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }
}
