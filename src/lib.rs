// 公开导出的模块，供外部使用
pub mod models;
pub mod engine;
pub mod errors;
pub mod fetchers;
pub mod services;
pub mod config;

#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use config::Config;
pub use errors::{ErrorBody, PriceHubError, Result, UpstreamCause};
pub use fetchers::base::SampleFetcher;
pub use fetchers::http::HttpSampleFetcher;
pub use models::price::{AlignedPair, CorrelationResult, PriceSample, PriceSeries};
pub use services::price_service::PriceService;
