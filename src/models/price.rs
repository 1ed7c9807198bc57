use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 单个价格采样点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub price: f64,
    #[serde(rename = "lastUpdatedAt")]
    pub observed_at: DateTime<Utc>,
}

/// 单只股票的价格序列，按 `observed_at` 非递减排列。
///
/// 顺序由上游保证，这里不重新排序。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSeries {
    pub samples: Vec<PriceSample>,
}

impl PriceSeries {
    pub fn new(samples: Vec<PriceSample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.price).collect()
    }
}

impl From<Vec<PriceSample>> for PriceSeries {
    fn from(samples: Vec<PriceSample>) -> Self {
        Self::new(samples)
    }
}

/// 两个等长价格序列，同一下标 `k` 对应时间上匹配的一对观测
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedPair {
    pub series_a: Vec<f64>,
    pub series_b: Vec<f64>,
}

impl AlignedPair {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            series_a: Vec::with_capacity(capacity),
            series_b: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, a: f64, b: f64) {
        self.series_a.push(a);
        self.series_b.push(b);
    }

    pub fn len(&self) -> usize {
        self.series_a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series_a.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationResult {
    pub coefficient: f64,
    pub mean_a: f64,
    pub mean_b: f64,
    pub std_dev_a: f64,
    pub std_dev_b: f64,
}
