use crate::errors::{PriceHubError, Result};
use crate::models::price::{AlignedPair, CorrelationResult};

/// 算术平均值，空切片返回 `0.0`
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// 样本协方差（除以 n - 1）。长度不一致或少于2个值时返回 `None`
pub fn covariance(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }
    let (mean_x, mean_y) = (mean(x), mean(y));
    let sum: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum();
    Some(sum / (n - 1) as f64)
}

/// 样本标准差（除以 n - 1）。少于2个值时返回 `None`
pub fn std_dev(x: &[f64]) -> Option<f64> {
    let n = x.len();
    if n < 2 {
        return None;
    }
    let m = mean(x);
    let sum_sq: f64 = x.iter().map(|xi| (xi - m) * (xi - m)).sum();
    Some((sum_sq / (n - 1) as f64).sqrt())
}

/// 皮尔逊相关系数。
///
/// 常数序列的相关性无定义，此时返回 `Some(0.0)` 而不是 NaN；
/// 仅在数据不足以计算方差时返回 `None`。
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let cov = covariance(x, y)?;
    let std_x = std_dev(x)?;
    let std_y = std_dev(y)?;
    if std_x == 0.0 || std_y == 0.0 {
        return Some(0.0);
    }
    Some(cov / (std_x * std_y))
}

/// 计算对齐后序列的相关系数及均值、标准差。
///
/// 配对数少于2时返回 `InsufficientOverlap`，并带上实际配对数，
/// 以区分“完全无重叠”(0) 和“重叠不足”(1)。
pub fn correlate(pair: &AlignedPair) -> Result<CorrelationResult> {
    let insufficient = || PriceHubError::InsufficientOverlap { matched: pair.len() };

    let (x, y) = (&pair.series_a, &pair.series_b);
    let coefficient = pearson(x, y).ok_or_else(insufficient)?;
    let std_dev_a = std_dev(x).ok_or_else(insufficient)?;
    let std_dev_b = std_dev(y).ok_or_else(insufficient)?;

    Ok(CorrelationResult {
        coefficient,
        mean_a: mean(x),
        mean_b: mean(y),
        std_dev_a,
        std_dev_b,
    })
}
