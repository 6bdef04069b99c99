//! Native browser management using `chromiumoxide`.
//!
//! This module owns:
//! * Finding a usable browser executable (Chrome → Chromium → Brave, cross-platform).
//! * Building the launch config (headless or headed, stealth flags, random UA).
//! * `ChromeSession`: one browser process plus one tab, exclusively owned.
//! * `ChromeSessionFactory`: the production [`SessionFactory`].

use crate::core::config::chrome_executable_override;
use crate::scraping::pacing::random_user_agent;
use crate::scraping::session::{BrowserSession, SessionFactory};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

// ── Browser executable discovery ─────────────────────────────────────────────

/// Find a usable Chromium-family browser executable.
///
/// Resolution order:
/// 1. `CHROME_EXECUTABLE` env var (explicit override)
/// 2. PATH scan – finds package-manager installs on all platforms.
/// 3. OS-specific well-known install paths.
pub fn find_chrome_executable() -> Option<String> {
    if let Some(p) = chrome_executable_override() {
        return Some(p);
    }

    if let Ok(path_var) = std::env::var("PATH") {
        let candidates = [
            "google-chrome",
            "chromium",
            "chromium-browser",
            "chrome",
            "brave-browser",
        ];
        for dir in std::env::split_paths(&path_var) {
            for exe in candidates {
                let full = dir.join(exe);
                if full.exists() {
                    return Some(full.to_string_lossy().to_string());
                }
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        let candidates = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    #[cfg(target_os = "linux")]
    {
        let candidates = [
            "/usr/bin/google-chrome",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/local/bin/chromium",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    #[cfg(target_os = "windows")]
    {
        let candidates = [
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    None
}

// ── Launch config ────────────────────────────────────────────────────────────

/// Build a `BrowserConfig` with stealth defaults.
///
/// `--disable-blink-features=AutomationControlled` hides `navigator.webdriver`;
/// the UA is drawn from the pacing pool so parallel workers do not share one.
pub fn build_browser_config(
    exe: &str,
    headless: bool,
    request_timeout: Duration,
) -> Result<BrowserConfig> {
    let (width, height) = (1366, 900);
    let mut builder = BrowserConfig::builder()
        .chrome_executable(exe)
        .request_timeout(request_timeout)
        .viewport(Viewport {
            width,
            height,
            device_scale_factor: Some(1.0),
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        })
        .window_size(width, height)
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--disable-setuid-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-extensions")
        .arg("--disable-sync")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--mute-audio")
        .arg("--disable-blink-features=AutomationControlled")
        .arg(format!("--user-agent={}", random_user_agent()));

    if !headless {
        builder = builder.with_head();
    }

    builder
        .build()
        .map_err(|e| anyhow!("Failed to build browser config: {}", e))
}

// ── Session ──────────────────────────────────────────────────────────────────

/// A launched browser with a single working tab.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeSession {
    pub async fn launch(exe: &str, headless: bool, request_timeout: Duration) -> Result<Self> {
        let config = build_browser_config(exe, headless, request_timeout)?;
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| anyhow!("Failed to launch browser ({}): {}", exe, e))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(p) => p,
            Err(e) => {
                browser.close().await.ok();
                handler.abort();
                return Err(anyhow!("Failed to open tab: {}", e));
            }
        };

        Ok(Self {
            browser,
            page,
            handler,
        })
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(anyhow!("navigation to {} failed: {}", url, e)),
            Err(_) => Err(anyhow!(
                "navigation to {} timed out after {}ms",
                url,
                timeout.as_millis()
            )),
        }
    }

    async fn wait_for_any(&mut self, selectors: &[&str], timeout: Duration) -> Option<String> {
        let start = Instant::now();
        loop {
            for sel in selectors {
                if self.page.find_element(*sel).await.is_ok() {
                    return Some((*sel).to_string());
                }
            }
            if start.elapsed() >= timeout {
                debug!("wait_for_any: none of {} selectors after {}ms", selectors.len(), timeout.as_millis());
                return None;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn click_first(&mut self, selectors: &[&str]) -> Result<bool> {
        for sel in selectors {
            let Ok(element) = self.page.find_element(*sel).await else {
                continue;
            };
            element
                .click()
                .await
                .map_err(|e| anyhow!("click on '{}' failed: {}", sel, e))?;
            return Ok(true);
        }
        Ok(false)
    }

    async fn html(&mut self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| anyhow!("Failed to get page content: {}", e))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let ChromeSession {
            mut browser,
            page,
            handler,
        } = *self;
        drop(page);
        let closed = browser.close().await;
        handler.abort();
        closed
            .map(|_| ())
            .map_err(|e| anyhow!("Browser close error: {}", e))
    }
}

/// Launches one `ChromeSession` per `open()` call.
pub struct ChromeSessionFactory {
    exe: String,
    headless: bool,
    request_timeout: Duration,
}

impl ChromeSessionFactory {
    pub fn new(exe: impl Into<String>, headless: bool, request_timeout: Duration) -> Self {
        Self {
            exe: exe.into(),
            headless,
            request_timeout,
        }
    }

    /// Factory using the auto-discovered executable, `None` when no browser is installed.
    pub fn new_auto(headless: bool, request_timeout: Duration) -> Option<Self> {
        find_chrome_executable().map(|exe| Self::new(exe, headless, request_timeout))
    }
}

#[async_trait]
impl SessionFactory for ChromeSessionFactory {
    async fn open(&self) -> Result<Box<dyn BrowserSession>> {
        info!("🚀 launching browser session ({}, headless={})", self.exe, self.headless);
        match ChromeSession::launch(&self.exe, self.headless, self.request_timeout).await {
            Ok(session) => Ok(Box::new(session)),
            Err(e) => {
                warn!("browser launch failed: {}", e);
                Err(e)
            }
        }
    }
}
