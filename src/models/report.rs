use crate::models::price::{CorrelationResult, PriceSeries};
use indexmap::IndexMap;
use serde::Serialize;

/// 单只股票的均价结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageReport {
    pub ticker: String,
    pub minutes: u32,
    pub average_price: f64,
    pub series: PriceSeries,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerStats {
    pub average_price: f64,
    pub series: PriceSeries,
}

/// 两只股票的相关性结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationReport {
    pub correlation: f64,
    pub minutes: u32,
    pub aligned_samples: usize,
    pub aligned: CorrelationResult,
    /// 按请求顺序，以股票代码为键
    pub per_ticker_stats: IndexMap<String, TickerStats>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairCorrelation {
    pub ticker_a: String,
    pub ticker_b: String,
    pub correlation: f64,
    pub aligned_samples: usize,
    pub average_a: f64,
    pub std_dev_a: f64,
    pub average_b: f64,
    pub std_dev_b: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedPair {
    pub ticker_a: String,
    pub ticker_b: String,
    pub reason: String,
}

/// 一组股票两两之间的相关性
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationMatrix {
    pub minutes: u32,
    pub tickers: Vec<String>,
    pub pairs: Vec<PairCorrelation>,
    pub skipped: Vec<SkippedPair>,
}
