use crate::config::Config;
use crate::errors::{PriceHubError, Result, UpstreamCause};
use crate::fetchers::base::SampleFetcher;
use crate::models::price::PriceSeries;
use async_trait::async_trait;
use indexmap::IndexMap;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;

/// 股票列表接口出错时使用的占位代码
const TICKER_LIST_SCOPE: &str = "*";

/// 评测服务价格历史接口
pub struct HttpSampleFetcher {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct TickerListResponse {
    // 公司名 -> 股票代码
    stocks: IndexMap<String, String>,
}

impl HttpSampleFetcher {
    /// 创建抓取器，HTTP客户端带上配置的 Bearer 令牌和超时
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.bearer_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| PriceHubError::Config(format!("Invalid bearer token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| PriceHubError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_text(&self, url: &str, query: &[(&str, String)], scope: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| PriceHubError::upstream(scope, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PriceHubError::upstream(scope, e))?;

        if !status.is_success() {
            return Err(PriceHubError::upstream(
                scope,
                UpstreamCause::Status {
                    status: status.as_u16(),
                    body: text,
                },
            ));
        }
        Ok(text)
    }
}

#[async_trait]
impl SampleFetcher for HttpSampleFetcher {
    async fn fetch_series(&self, ticker: &str, minutes: u32) -> Result<PriceSeries> {
        let ticker = ticker.to_uppercase();
        debug!("获取 {} 最近 {} 分钟的价格历史", ticker, minutes);

        let url = format!("{}/stocks/{}", self.base_url, ticker);
        let text = self
            .get_text(&url, &[("minutes", minutes.to_string())], &ticker)
            .await?;
        let series = parse_price_history(&ticker, &text)?;

        debug!("{} 返回 {} 条价格记录", ticker, series.len());
        Ok(series)
    }

    async fn list_tickers(&self) -> Result<Vec<String>> {
        let url = format!("{}/stocks", self.base_url);
        let text = self.get_text(&url, &[], TICKER_LIST_SCOPE).await?;
        let tickers = parse_ticker_list(&text)?;

        info!("Upstream lists {} tickers", tickers.len());
        Ok(tickers)
    }
}

/// 解析 `[{ "price": .., "lastUpdatedAt": .. }, ..]` 响应体，
/// 任一条目格式不符则整个拉取失败
pub fn parse_price_history(ticker: &str, body: &str) -> Result<PriceSeries> {
    serde_json::from_str::<PriceSeries>(body).map_err(|e| PriceHubError::upstream(ticker, e))
}

pub fn parse_ticker_list(body: &str) -> Result<Vec<String>> {
    let response: TickerListResponse =
        serde_json::from_str(body).map_err(|e| PriceHubError::upstream(TICKER_LIST_SCOPE, e))?;
    Ok(response
        .stocks
        .into_values()
        .map(|t| t.to_uppercase())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// 本地起一个只应答一次的HTTP服务，返回其地址和收到的请求头
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&head).into_owned()
        });

        (format!("http://{}", addr), handle)
    }

    #[tokio::test]
    async fn non_success_status_is_upstream_error_for_ticker() {
        let (base_url, server) = serve_once("503 Service Unavailable", "maintenance").await;
        let config = Config::new()
            .with_base_url(&base_url)
            .with_bearer_token("test-token");
        let fetcher = HttpSampleFetcher::new(&config).unwrap();

        match fetcher.fetch_series("nvda", 5).await {
            Err(PriceHubError::Upstream {
                ticker,
                cause: UpstreamCause::Status { status, body },
            }) => {
                assert_eq!(ticker, "NVDA");
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("expected upstream status error, got {:?}", other),
        }

        let head = server.await.unwrap();
        let request_line = head.lines().next().unwrap_or_default();
        assert_eq!(request_line, "GET /stocks/NVDA?minutes=5 HTTP/1.1");
        assert!(head
            .to_ascii_lowercase()
            .contains("authorization: bearer test-token"));
    }

    #[tokio::test]
    async fn successful_response_is_parsed() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"[{"price": 10.5, "lastUpdatedAt": "2025-05-08T04:00:00Z"}]"#,
        )
        .await;
        let fetcher = HttpSampleFetcher::new(&Config::new().with_base_url(&base_url)).unwrap();

        let series = fetcher.fetch_series("pypl", 30).await.unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.samples[0].price, 10.5);

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /stocks/PYPL?minutes=30 "));
        assert!(!head.to_ascii_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_request_error() {
        // 绑定后立即释放端口，连接会被拒绝
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = Config::new().with_base_url(&format!("http://{}", addr));
        let fetcher = HttpSampleFetcher::new(&config).unwrap();

        match fetcher.fetch_series("aapl", 5).await {
            Err(PriceHubError::Upstream {
                ticker,
                cause: UpstreamCause::Request(_),
            }) => assert_eq!(ticker, "AAPL"),
            other => panic!("expected upstream request error, got {:?}", other),
        }
    }

    #[test]
    fn parses_price_history() {
        let body = r#"[
            {"price": 231.95296, "lastUpdatedAt": "2025-05-08T04:11:42.465706306Z"},
            {"price": 124.95156, "lastUpdatedAt": "2025-05-08T04:12:12Z"}
        ]"#;
        let series = parse_price_history("NVDA", body).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.samples[0].price, 231.95296);
        assert_eq!(
            series.samples[1].observed_at,
            Utc.with_ymd_and_hms(2025, 5, 8, 4, 12, 12).unwrap()
        );
    }

    #[test]
    fn empty_history_is_not_an_error() {
        assert!(parse_price_history("NVDA", "[]").unwrap().is_empty());
    }

    #[test]
    fn malformed_entries_fail_the_fetch() {
        let bodies = [
            r#"[{"price": "231.9", "lastUpdatedAt": "2025-05-08T04:11:42Z"}]"#,
            r#"[{"price": 231.9}]"#,
            r#"[{"price": 231.9, "lastUpdatedAt": "yesterday"}]"#,
            r#"{"stock": {"price": 231.9, "lastUpdatedAt": "2025-05-08T04:11:42Z"}}"#,
            "not json",
        ];
        for body in bodies {
            match parse_price_history("PYPL", body) {
                Err(PriceHubError::Upstream {
                    ticker,
                    cause: UpstreamCause::Malformed(_),
                }) => assert_eq!(ticker, "PYPL"),
                other => panic!("expected malformed upstream error for {}, got {:?}", body, other),
            }
        }
    }

    #[test]
    fn parses_ticker_list_in_order() {
        let body = r#"{"stocks": {"Nvidia Corporation": "NVDA", "PayPal Holdings, Inc.": "pypl", "Apple Inc.": "AAPL"}}"#;
        assert_eq!(parse_ticker_list(body).unwrap(), vec!["NVDA", "PYPL", "AAPL"]);
    }

    #[test]
    fn rejects_invalid_token() {
        let config = Config::new().with_bearer_token("bad\ntoken");
        assert!(matches!(HttpSampleFetcher::new(&config), Err(PriceHubError::Config(_))));
    }

    #[test]
    fn uses_configured_base_url() {
        let config = Config::new().with_base_url("http://localhost:8080/");
        let fetcher = HttpSampleFetcher::new(&config).unwrap();
        assert_eq!(fetcher.base_url(), "http://localhost:8080");
    }
}
