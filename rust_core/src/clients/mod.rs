pub mod alpha_vantage;
pub mod chained_price;
pub mod error;
pub mod http;
pub mod newsapi;
pub mod polygon;
pub mod quote_provider;
pub mod synthetic;
pub mod yahoo;

// Re-export commonly used types
pub use alpha_vantage::AlphaVantageClient;
pub use chained_price::{ChainedQuoteProvider, ProviderHealth};
pub use error::{ProviderError, ProviderResult};
pub use http::build_http_client;
pub use newsapi::NewsApiClient;
pub use polygon::PolygonClient;
pub use quote_provider::{ProviderStatus, QuoteProvider};
pub use synthetic::{SyntheticDrift, SyntheticQuoteGenerator, VolatilityClass};
pub use yahoo::YahooChartClient;
