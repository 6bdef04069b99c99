pub mod core;
pub mod nlp;
pub mod scraping;
pub mod tools;

// --- Primary core exports ---
pub use core::types;
pub use core::types::*;
pub use core::{HarvestError, MarketConfig};

pub use scraping::{BrowserSession, SessionFactory, SessionTimeouts};
pub use tools::{run_harvest, HarvestOptions};
