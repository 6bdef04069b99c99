use thiserror::Error;

/// Failure taxonomy for a harvest run.
///
/// Only the fail-fast variants (`UnsupportedMarket`, `InvalidPageRange`,
/// `InvalidWorkerCount`, `BrowserUnavailable`, `Output`) ever end a run. The
/// per-page and per-URL variants are reported and the run moves on.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("page {page}: no candidate listing URL produced recognizable tiles (tried {})", attempted.join(", "))]
    PageLoadFailure { page: u32, attempted: Vec<String> },

    #[error("tile field '{field}' could not be extracted")]
    TileParseFailure { field: &'static str },

    #[error("detail fetch failed for {url}: {reason}")]
    DetailFetchFailure { url: String, reason: String },

    #[error("unsupported market code '{0}'")]
    UnsupportedMarket(String),

    #[error("invalid page range {start}..={stop}")]
    InvalidPageRange { start: u32, stop: u32 },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("worker count must be at least 1")]
    InvalidWorkerCount,

    #[error("browser unavailable: {0}")]
    BrowserUnavailable(String),

    #[error("output failed: {0}")]
    Output(String),
}

impl HarvestError {
    /// Whether this error aborts the whole run rather than a single page or URL.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            HarvestError::PageLoadFailure { .. }
                | HarvestError::TileParseFailure { .. }
                | HarvestError::DetailFetchFailure { .. }
        )
    }
}
