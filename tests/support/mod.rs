//! In-memory browser sessions serving canned HTML by URL.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use forum_harvest::{BrowserSession, SessionFactory};
use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn init_logger() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// The "web" a fixture session can reach.
#[derive(Default)]
pub struct FixtureSite {
    pages: HashMap<String, String>,
    panic_on: HashSet<String>,
    snapshot_fails_on: HashSet<String>,
    delays: HashMap<String, Duration>,
    failing_opens: AtomicUsize,
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub navigations: Mutex<Vec<String>>,
}

impl FixtureSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Navigating to `url` panics the calling task.
    pub fn panic_on(mut self, url: impl Into<String>) -> Self {
        self.panic_on.insert(url.into());
        self
    }

    /// `url` loads, but every HTML snapshot of it fails.
    pub fn snapshot_fails_on(mut self, url: impl Into<String>) -> Self {
        self.snapshot_fails_on.insert(url.into());
        self
    }

    /// Navigating to `url` takes `delay` before it resolves.
    pub fn delay_on(mut self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(url.into(), delay);
        self
    }

    /// The first `n` calls to `open` fail.
    pub fn failing_opens(self, n: usize) -> Self {
        self.failing_opens.store(n, Ordering::SeqCst);
        self
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn visited(&self, url: &str) -> bool {
        self.navigations
            .lock()
            .map(|n| n.iter().any(|u| u == url))
            .unwrap_or(false)
    }
}

pub struct FixtureSession {
    site: Arc<FixtureSite>,
    current: Option<String>,
}

fn first_matching(html: &str, selectors: &[&str]) -> Option<String> {
    let document = Html::parse_document(html);
    selectors.iter().find_map(|sel| {
        let selector = Selector::parse(sel).ok()?;
        document.select(&selector).next().map(|_| sel.to_string())
    })
}

#[async_trait]
impl BrowserSession for FixtureSession {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<()> {
        if let Ok(mut log) = self.site.navigations.lock() {
            log.push(url.to_string());
        }
        if self.site.panic_on.contains(url) {
            panic!("fixture crash at {}", url);
        }
        if let Some(delay) = self.site.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        // Like a real tab, a failed load leaves the previous document in place.
        if self.site.pages.contains_key(url) {
            self.current = Some(url.to_string());
            Ok(())
        } else {
            Err(anyhow!("404 for {}", url))
        }
    }

    async fn wait_for_any(&mut self, selectors: &[&str], _timeout: Duration) -> Option<String> {
        let html = self.current.as_ref().and_then(|u| self.site.pages.get(u))?;
        first_matching(html, selectors)
    }

    async fn click_first(&mut self, _selectors: &[&str]) -> Result<bool> {
        Ok(false)
    }

    async fn html(&mut self) -> Result<String> {
        let url = self.current.as_ref().ok_or_else(|| anyhow!("no page loaded"))?;
        if self.site.snapshot_fails_on.contains(url) {
            return Err(anyhow!("target closed"));
        }
        self.site
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("no page loaded"))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.site.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FixtureFactory {
    pub site: Arc<FixtureSite>,
}

impl FixtureFactory {
    pub fn new(site: FixtureSite) -> Arc<Self> {
        Arc::new(Self {
            site: Arc::new(site),
        })
    }
}

#[async_trait]
impl SessionFactory for FixtureFactory {
    async fn open(&self) -> Result<Box<dyn BrowserSession>> {
        let remaining = self.site.failing_opens.load(Ordering::SeqCst);
        if remaining > 0 {
            self.site.failing_opens.store(remaining - 1, Ordering::SeqCst);
            return Err(anyhow!("browser failed to start"));
        }
        self.site.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FixtureSession {
            site: Arc::clone(&self.site),
            current: None,
        }))
    }
}

// ── Canned markup ────────────────────────────────────────────────────────────

pub const BASE: &str = "https://r2.community.samsung.com";

pub fn post_url(id: u32) -> String {
    format!("{}/t5/Galaxy-S/post-{}/td-p/{}", BASE, id, id)
}

pub fn tile(id: u32) -> String {
    format!(
        r#"<article class="custom-message-tile">
  <h3 class="custom-tile-title"><a href="/t5/Galaxy-S/post-{id}/td-p/{id}?nobounce">Post number {id}</a></h3>
  <div class="custom-tile-author-info">
    <a class="lia-user-name-link" href="/t5/user/viewprofilepage/user-id/{id}"><span class="login-bold">user{id}</span></a>
    <span class="local-friendly-date" title="08-14-2024 03:15 PM">Aug 14</span>
    <a href="/t5/Galaxy-S/bd-p/sg-galaxy-s">Galaxy S</a>
  </div>
  <div class="custom-tile-body">Snippet of post {id}</div>
  <li class="custom-tile-kudos">{id} Kudos</li>
  <li class="custom-tile-replies">2 Replies</li>
  <li class="custom-tile-views">1,000 views</li>
</article>"#,
        id = id
    )
}

pub fn listing(ids: &[u32]) -> String {
    let tiles: String = ids.iter().map(|id| tile(*id)).collect();
    format!("<html><body><div class=\"lia-content\">{}</div></body></html>", tiles)
}

pub fn post_page(id: u32, replies: &[&str]) -> String {
    let mut bodies = format!(
        r#"<div class="lia-message-body-content"><p>Full text of post {}</p></div>"#,
        id
    );
    for r in replies {
        bodies.push_str(&format!(r#"<div class="lia-message-body-content"><p>{}</p></div>"#, r));
    }
    format!("<html><body><div id=\"lia-body\">{}</div></body></html>", bodies)
}
