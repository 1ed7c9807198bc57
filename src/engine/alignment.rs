use crate::models::price::{AlignedPair, PriceSeries};
use chrono::Duration;

/// 两个采样点视为同时发生的最大时间差（5分钟）
pub const DEFAULT_TOLERANCE_MS: i64 = 300_000;

/// 将两个按时间排序的序列中时间差不超过 `tolerance_ms` 的采样点配对。
///
/// 双指针单次贪心扫描：匹配时两个指针同时前进；否则较早的一侧前进，
/// 该采样点被永久丢弃，不会再与另一序列后面的点比较，
/// 因此在不规则交错的情况下可能少配对。
pub fn align(a: &PriceSeries, b: &PriceSeries, tolerance_ms: i64) -> AlignedPair {
    let mut pair = AlignedPair::with_capacity(a.len().min(b.len()));
    let tolerance = Duration::milliseconds(tolerance_ms);
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        let sample_a = &a.samples[i];
        let sample_b = &b.samples[j];
        // 保留纳秒精度，不能先截断成毫秒再比较
        let gap = sample_a.observed_at - sample_b.observed_at;

        if gap.abs() <= tolerance {
            pair.push(sample_a.price, sample_b.price);
            i += 1;
            j += 1;
        } else if gap < Duration::zero() {
            // A 太早，丢弃
            i += 1;
        } else {
            j += 1;
        }
    }

    pair
}
