//! The seam between harvesting logic and the browser.
//!
//! Crawlers and fetchers only ever talk to a [`BrowserSession`]; production
//! code hands them a Chromium tab (`browser_manager::ChromeSession`), tests hand
//! them canned HTML.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Bounds applied to every page load and DOM wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimeouts {
    pub navigation: Duration,
    pub selector_wait: Duration,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(30),
            selector_wait: Duration::from_secs(12),
        }
    }
}

/// One exclusively-owned browser session (a browser process plus its tab).
#[async_trait]
pub trait BrowserSession: Send {
    /// Load `url`, bounded by `timeout`.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Poll until any of `selectors` resolves in the live DOM or `timeout`
    /// elapses. Returns the first selector (in list order) that matched.
    async fn wait_for_any(&mut self, selectors: &[&str], timeout: Duration) -> Option<String>;

    /// Click the first element matching any of `selectors`.
    /// `Ok(false)` means no such element exists.
    async fn click_first(&mut self, selectors: &[&str]) -> Result<bool>;

    /// Snapshot of the current document's HTML.
    async fn html(&mut self) -> Result<String>;

    /// Tear the session down. Called exactly once by the owner.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Opens fresh, independent sessions.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn BrowserSession>>;
}
