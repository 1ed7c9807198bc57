use crate::engine::alignment::DEFAULT_TOLERANCE_MS;
use crate::errors::{PriceHubError, Result};
use secrecy::SecretString;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://20.244.56.144/evaluation-service";

pub const ENV_BASE_URL: &str = "PRICE_HUB_BASE_URL";
pub const ENV_TOKEN: &str = "PRICE_HUB_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "PRICE_HUB_TIMEOUT_SECS";

#[derive(Debug)]
pub struct Config {
    pub base_url: String,
    pub bearer_token: Option<SecretString>,
    pub request_timeout: Duration,
    pub tolerance_ms: i64,
    pub collapse_overlap_errors: bool,
    pub matrix_concurrency: usize,
}

impl Config {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            bearer_token: None,
            request_timeout: Duration::from_secs(30),
            tolerance_ms: DEFAULT_TOLERANCE_MS,
            collapse_overlap_errors: false,
            matrix_concurrency: 8,
        }
    }

    /// 从环境变量读取配置，未设置的项保持默认值
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new();

        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            config = config.with_base_url(&url);
        }
        if let Ok(token) = std::env::var(ENV_TOKEN) {
            config = config.with_bearer_token(&token);
        }
        if let Ok(secs) = std::env::var(ENV_TIMEOUT_SECS) {
            let secs = secs.trim().parse::<u64>().map_err(|e| {
                PriceHubError::Config(format!("{} must be a whole number of seconds: {}", ENV_TIMEOUT_SECS, e))
            })?;
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_bearer_token(mut self, token: &str) -> Self {
        self.bearer_token = Some(SecretString::new(token.into()));
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_tolerance_ms(mut self, tolerance_ms: i64) -> Self {
        self.tolerance_ms = tolerance_ms;
        self
    }

    /// 旧调用方只区分 400/500，开启后重叠不足按 400 返回
    pub fn with_collapse_overlap_errors(mut self, collapse: bool) -> Self {
        self.collapse_overlap_errors = collapse;
        self
    }

    pub fn with_matrix_concurrency(mut self, concurrency: usize) -> Self {
        self.matrix_concurrency = concurrency.max(1);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
