pub mod catalog;
pub mod classify;
pub mod llm;
pub mod posted_by;

pub use classify::{classify_file, ClassifyOptions};
