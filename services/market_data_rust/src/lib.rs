//! market_data_rust - HTTP front for the market data aggregator

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use app::create_app;
pub use config::ServiceConfig;
pub use error::AppError;
pub use state::AppState;
