//! 统计计算：均价、时间对齐、相关系数。全部为纯函数，无IO。
pub mod aggregation;
pub mod alignment;
pub mod correlation;
