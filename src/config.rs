use std::time::Duration;

use clap::Parser;

use crate::completion::{DEFAULT_BASE_URL, DEFAULT_MODEL};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "clippy-reader",
    about = "Clippy Reader - reading assistant backend",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct ServerConfig {
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub openai_base_url: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub openai_model: String,

    /// Per-request completion timeout in milliseconds.
    #[arg(long = "api-timeout", env = "API_TIMEOUT", default_value_t = 10_000)]
    pub api_timeout_ms: u64,

    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// `development` exposes error chains in responses.
    #[arg(long = "env", env = "APP_ENV", default_value = "production")]
    pub app_env: String,

    #[arg(long = "feed-cache-ttl", env = "FEED_CACHE_TTL_SECS", default_value_t = 900)]
    pub feed_cache_ttl_secs: u64,
}

impl ServerConfig {
    pub fn api_timeout(&self) -> Duration {
        Duration::from_millis(self.api_timeout_ms)
    }

    pub fn feed_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.feed_cache_ttl_secs)
    }

    pub fn is_development(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("development")
    }

    /// `host:port`; the host may be a name such as `localhost`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
