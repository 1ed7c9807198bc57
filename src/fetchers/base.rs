use crate::errors::Result;
use crate::models::price::PriceSeries;
use async_trait::async_trait;

/// 股票价格历史数据源
#[async_trait]
pub trait SampleFetcher {
    /// 获取 `ticker` 最近 `minutes` 分钟的价格采样。
    ///
    /// 股票代码以大写形式发送给上游。任何失败都以带股票代码的
    /// `PriceHubError::Upstream` 返回。
    async fn fetch_series(&self, ticker: &str, minutes: u32) -> Result<PriceSeries>;

    /// 列出上游提供的全部股票代码，保持上游顺序
    async fn list_tickers(&self) -> Result<Vec<String>>;
}
