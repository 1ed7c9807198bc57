use crate::models::price::PriceSeries;

/// 序列中所有价格的算术平均值，空序列返回 `0.0`
pub fn average(series: &PriceSeries) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    let sum: f64 = series.samples.iter().map(|s| s.price).sum();
    sum / series.len() as f64
}
