use serde::Serialize;
use thiserror::Error;

/// 上游数据源失败的具体原因
#[derive(Error, Debug)]
pub enum UpstreamCause {
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed price history: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum PriceHubError {
    #[error("Failed to fetch price history for {ticker}: {cause}")]
    Upstream {
        ticker: String,
        #[source]
        cause: UpstreamCause,
    },

    #[error("{}", overlap_message(.matched))]
    InsufficientOverlap { matched: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn overlap_message(matched: &usize) -> String {
    if *matched == 0 {
        "No overlapping price data found for the given time interval".to_string()
    } else {
        format!(
            "Only {} overlapping price sample(s) found, at least 2 are required",
            matched
        )
    }
}

pub type Result<T> = std::result::Result<T, PriceHubError>;

impl PriceHubError {
    pub fn upstream(ticker: &str, cause: impl Into<UpstreamCause>) -> Self {
        PriceHubError::Upstream {
            ticker: ticker.to_string(),
            cause: cause.into(),
        }
    }

    /// HTTP风格的状态码。`collapse_overlap` 为 true 时，重叠不足折叠为 400，兼容旧调用方
    pub fn status_code(&self, collapse_overlap: bool) -> u16 {
        match self {
            PriceHubError::InvalidParameter(_) => 400,
            PriceHubError::InsufficientOverlap { .. } if collapse_overlap => 400,
            PriceHubError::InsufficientOverlap { .. } => 422,
            PriceHubError::Upstream { .. } => 502,
            PriceHubError::Config(_) | PriceHubError::Serialization(_) => 500,
        }
    }

    /// 对齐结果完全为空（而非配对数不足）时返回 true
    pub fn is_no_overlap(&self) -> bool {
        matches!(self, PriceHubError::InsufficientOverlap { matched: 0 })
    }
}

/// 返回给调用方的错误消息体
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&PriceHubError> for ErrorBody {
    fn from(err: &PriceHubError) -> Self {
        ErrorBody {
            error: err.to_string(),
        }
    }
}
