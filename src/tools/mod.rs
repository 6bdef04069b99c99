pub mod author;
pub mod collector;
pub mod detail;
pub mod dispatch;
pub mod export;
pub mod listing;
pub mod pipeline;

pub use pipeline::{run_harvest, HarvestOptions};
