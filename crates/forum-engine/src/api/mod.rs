//! Market data providers

pub mod news_apis;
pub mod sample;
pub mod yahoo;

pub use news_apis::FinnhubClient;
pub use sample::SampleMarketData;
pub use yahoo::YahooFinanceClient;
