pub mod config;
pub mod error;
pub mod logging;
pub mod market;
pub mod types;

pub use error::HarvestError;
pub use market::MarketConfig;
