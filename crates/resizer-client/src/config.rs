use resizer_core::constants::MAX_DIMENSION;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:4000";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub http_timeout: Duration,
    pub max_dimension: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            max_dimension: MAX_DIMENSION,
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Default::default()
        }
    }

    /// RESIZER_API_URL, RESIZER_HTTP_TIMEOUT_SECS, MAX_DIMENSION
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_url =
            std::env::var("RESIZER_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let http_timeout = std::env::var("RESIZER_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));
        let max_dimension = std::env::var("MAX_DIMENSION")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&d: &u32| d > 0)
            .unwrap_or(MAX_DIMENSION);

        Self {
            api_url,
            http_timeout,
            max_dimension,
        }
    }
}
