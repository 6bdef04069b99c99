use std::time::Duration;
use tracing::debug;

/// Realistic desktop user agents; one is drawn per launched browser.
pub const DESKTOP_USER_AGENTS: &[&str] = &[
    // Chrome 132 – Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36",
    // Chrome 132 – macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36",
    // Chrome 131 – Linux
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    // Edge 132 – Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36 Edg/132.0.0.0",
];

/// Returns a randomly-chosen desktop User-Agent string.
pub fn random_user_agent() -> &'static str {
    use rand::prelude::*;
    let mut rng = rand::rng();
    DESKTOP_USER_AGENTS[rng.random_range(0..DESKTOP_USER_AGENTS.len())]
}

/// Pause between page loads for polite scraping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDelay {
    /// Minimum delay in milliseconds between requests
    pub min_ms: u64,
    /// Maximum delay in milliseconds between requests
    pub max_ms: u64,
}

impl RequestDelay {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms,
            max_ms: max_ms.max(min_ms),
        }
    }

    /// No pause at all; used by tests and fixture runs.
    pub fn none() -> Self {
        Self { min_ms: 0, max_ms: 0 }
    }

    /// Random delay within the configured range, with ±20% jitter, never below `min_ms`.
    pub fn random_delay(&self) -> u64 {
        use rand::prelude::*;
        if self.max_ms == 0 {
            return 0;
        }
        let mut rng = rand::rng();
        let base_delay = rng.random_range(self.min_ms..=self.max_ms);

        let jitter_range = (base_delay as f64 * 0.2) as i64;
        let jitter = rng.random_range(-jitter_range..=jitter_range);

        (base_delay as i64 + jitter).max(self.min_ms as i64) as u64
    }

    pub async fn pause(&self) {
        let ms = self.random_delay();
        if ms > 0 {
            debug!("pacing: sleeping {}ms", ms);
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}
