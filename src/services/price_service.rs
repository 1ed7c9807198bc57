use crate::config::Config;
use crate::engine::{aggregation, alignment, correlation};
use crate::errors::{PriceHubError, Result};
use crate::fetchers::base::SampleFetcher;
use crate::models::price::PriceSeries;
use crate::models::report::{
    AverageReport, CorrelationMatrix, CorrelationReport, PairCorrelation, SkippedPair, TickerStats,
};
use crate::util;
use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use log::{info, warn};
use std::sync::Arc;

/// 请求处理核心：参数校验、拉取数据、计算并组装结果。
///
/// 不保存任何请求级状态，同一实例可并发处理多个请求。
pub struct PriceService {
    config: Config,
    fetcher: Arc<dyn SampleFetcher + Send + Sync>,
}

impl PriceService {
    pub fn new(config: Config, fetcher: Arc<dyn SampleFetcher + Send + Sync>) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 计算单只股票在回看窗口内的均价
    pub async fn average(&self, ticker: &str, minutes: i64) -> Result<AverageReport> {
        let ticker = util::normalize_ticker(ticker)?;
        let minutes = util::validate_minutes(minutes)?;

        let series = self.fetcher.fetch_series(&ticker, minutes).await?;
        let average_price = aggregation::average(&series);
        info!(
            "{} average over {}m: {:.4} ({} samples)",
            ticker,
            minutes,
            average_price,
            series.len()
        );

        Ok(AverageReport {
            ticker,
            minutes,
            average_price,
            series,
        })
    }

    /// 计算两只股票在回看窗口内的皮尔逊相关系数
    pub async fn correlation(&self, tickers: &[String], minutes: i64) -> Result<CorrelationReport> {
        let minutes = util::validate_minutes(minutes)?;
        if tickers.len() != 2 {
            return Err(PriceHubError::InvalidParameter(
                "Exactly two tickers must be provided for correlation".to_string(),
            ));
        }
        let ticker_a = util::normalize_ticker(&tickers[0])?;
        let ticker_b = util::normalize_ticker(&tickers[1])?;

        // 两次拉取互不依赖，并发执行；任一失败则整个请求失败
        let (series_a, series_b) = tokio::try_join!(
            self.fetcher.fetch_series(&ticker_a, minutes),
            self.fetcher.fetch_series(&ticker_b, minutes)
        )?;

        let pair = alignment::align(&series_a, &series_b, self.config.tolerance_ms);
        let aligned = correlation::correlate(&pair)?;
        info!(
            "{}/{} over {}m: r = {:.4} from {} aligned samples",
            ticker_a,
            ticker_b,
            minutes,
            aligned.coefficient,
            pair.len()
        );

        let mut per_ticker_stats = IndexMap::new();
        per_ticker_stats.insert(ticker_a, ticker_stats(series_a));
        per_ticker_stats.insert(ticker_b, ticker_stats(series_b));

        Ok(CorrelationReport {
            correlation: aligned.coefficient,
            minutes,
            aligned_samples: pair.len(),
            aligned,
            per_ticker_stats,
        })
    }

    /// 计算 `tickers` 两两之间的相关系数；列表为空时使用上游提供的全部股票。
    ///
    /// 每只股票只拉取一次。无法计算的组合（拉取失败、重叠不足）记入 `skipped`，
    /// 不会导致整个矩阵失败。
    pub async fn correlation_matrix(&self, tickers: &[String], minutes: i64) -> Result<CorrelationMatrix> {
        let minutes = util::validate_minutes(minutes)?;

        let requested = if tickers.is_empty() {
            self.fetcher.list_tickers().await?
        } else {
            tickers.to_vec()
        };
        let mut tickers: Vec<String> = Vec::with_capacity(requested.len());
        for raw in &requested {
            let ticker = util::normalize_ticker(raw)?;
            if !tickers.contains(&ticker) {
                tickers.push(ticker);
            }
        }
        if tickers.len() < 2 {
            return Err(PriceHubError::InvalidParameter(
                "At least two distinct tickers are required for a correlation matrix".to_string(),
            ));
        }

        let fetcher = &self.fetcher;
        let fetched: Vec<Result<PriceSeries>> = stream::iter(tickers.iter())
            .map(move |ticker| async move { fetcher.fetch_series(ticker, minutes).await })
            .buffered(self.config.matrix_concurrency.max(1))
            .collect()
            .await;

        for (ticker, result) in tickers.iter().zip(&fetched) {
            if let Err(e) = result {
                warn!("Skipping {} in correlation matrix: {}", ticker, e);
            }
        }

        let mut pairs = Vec::new();
        let mut skipped = Vec::new();
        for i in 0..tickers.len() {
            for j in (i + 1)..tickers.len() {
                let (ticker_a, ticker_b) = (&tickers[i], &tickers[j]);
                let outcome = match (&fetched[i], &fetched[j]) {
                    (Ok(a), Ok(b)) => self.correlate_pair(ticker_a, a, ticker_b, b),
                    (Err(e), _) | (_, Err(e)) => Err(e.to_string()),
                };
                match outcome {
                    Ok(pair) => pairs.push(pair),
                    Err(reason) => {
                        warn!("No correlation for {}/{}: {}", ticker_a, ticker_b, reason);
                        skipped.push(SkippedPair {
                            ticker_a: ticker_a.clone(),
                            ticker_b: ticker_b.clone(),
                            reason,
                        });
                    }
                }
            }
        }

        info!(
            "Correlation matrix over {}m: {} tickers, {} pairs, {} skipped",
            minutes,
            tickers.len(),
            pairs.len(),
            skipped.len()
        );

        Ok(CorrelationMatrix {
            minutes,
            tickers,
            pairs,
            skipped,
        })
    }

    fn correlate_pair(
        &self,
        ticker_a: &str,
        series_a: &PriceSeries,
        ticker_b: &str,
        series_b: &PriceSeries,
    ) -> std::result::Result<PairCorrelation, String> {
        let pair = alignment::align(series_a, series_b, self.config.tolerance_ms);
        let aligned = correlation::correlate(&pair).map_err(|e| e.to_string())?;

        let prices_a = series_a.prices();
        let prices_b = series_b.prices();
        Ok(PairCorrelation {
            ticker_a: ticker_a.to_string(),
            ticker_b: ticker_b.to_string(),
            correlation: aligned.coefficient,
            aligned_samples: pair.len(),
            average_a: aggregation::average(series_a),
            std_dev_a: correlation::std_dev(&prices_a).unwrap_or(0.0),
            average_b: aggregation::average(series_b),
            std_dev_b: correlation::std_dev(&prices_b).unwrap_or(0.0),
        })
    }
}

fn ticker_stats(series: PriceSeries) -> TickerStats {
    TickerStats {
        average_price: aggregation::average(&series),
        series,
    }
}
