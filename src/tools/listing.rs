//! Listing crawler: one listing page in, one row per tile out.

use crate::core::error::HarvestError;
use crate::core::market::{MarketConfig, BASE_URL};
use crate::core::types::{ListingRow, PageCrawl};
use crate::scraping::pacing::RequestDelay;
use crate::scraping::selectors::{
    AUTHOR_BLOCK_SELECTORS, KUDOS_SELECTORS, REPLY_COUNT_SELECTORS, SNIPPET_SELECTORS,
    TILE_SELECTORS, TILE_TITLE_LINK_SELECTORS, VIEW_COUNT_SELECTORS,
};
use crate::scraping::session::{BrowserSession, SessionTimeouts};
use crate::scraping::text::{canonical_url, collapse_whitespace, parse_count, select_first};
use crate::tools::author;
use crate::tools::collector::UrlCollector;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

/// Rows gathered over a page range, plus what was skipped.
#[derive(Debug, Default)]
pub struct ListingSummary {
    pub rows: Vec<ListingRow>,
    pub pages_crawled: usize,
    pub pages_skipped: Vec<u32>,
    pub tiles_dropped: usize,
}

/// Crawl `start..=stop` sequentially. A page whose candidates all fail is
/// logged and skipped; the run continues with the next page.
pub async fn crawl_range(
    session: &mut dyn BrowserSession,
    market: &MarketConfig,
    start: u32,
    stop: u32,
    collector: &mut UrlCollector,
    timeouts: &SessionTimeouts,
    delay: &RequestDelay,
) -> ListingSummary {
    let mut summary = ListingSummary::default();

    for page in start..=stop {
        match crawl_page(session, market, page, collector, timeouts).await {
            Ok(crawl) => {
                info!(
                    "📄 {} page {}: {} rows from {} tiles ({} duplicate, {} without URL, {} partial) via {}",
                    market.code,
                    page,
                    crawl.rows.len(),
                    crawl.tiles_seen,
                    crawl.dropped_duplicate,
                    crawl.dropped_empty_url,
                    crawl.partial_tiles,
                    crawl.source_url
                );
                summary.pages_crawled += 1;
                summary.tiles_dropped += crawl.dropped_duplicate + crawl.dropped_empty_url;
                summary.rows.extend(crawl.rows);
            }
            Err(e) => {
                warn!("⚠️ skipping page: {}", e);
                summary.pages_skipped.push(page);
            }
        }

        if page < stop {
            delay.pause().await;
        }
    }

    summary
}

/// Try each candidate listing URL for `page` until one yields tiles.
pub async fn crawl_page(
    session: &mut dyn BrowserSession,
    market: &MarketConfig,
    page: u32,
    collector: &mut UrlCollector,
    timeouts: &SessionTimeouts,
) -> Result<PageCrawl, HarvestError> {
    let base = Url::parse(BASE_URL)
        .map_err(|e| HarvestError::InvalidUrl(format!("{}: {}", BASE_URL, e)))?;
    let candidates = market.candidate_listing_urls(page);

    for url in &candidates {
        debug!("page {}: trying {}", page, url);
        if let Err(e) = session.navigate(url, timeouts.navigation).await {
            debug!("page {}: {}", page, e);
            continue;
        }
        if session
            .wait_for_any(TILE_SELECTORS, timeouts.selector_wait)
            .await
            .is_none()
        {
            debug!("page {}: no tiles at {}", page, url);
            continue;
        }
        let html = match session.html().await {
            Ok(h) => h,
            Err(e) => {
                debug!("page {}: snapshot failed at {}: {}", page, url, e);
                continue;
            }
        };
        if let Some(mut crawl) = parse_listing_page(&html, page, &base, collector) {
            crawl.source_url = url.clone();
            return Ok(crawl);
        }
    }

    Err(HarvestError::PageLoadFailure {
        page,
        attempted: candidates,
    })
}

/// Parse a listing snapshot. `None` when no tile selector matches anything.
///
/// Rows whose canonical URL is empty or already in `collector` are dropped;
/// every other tile becomes a row, with unreadable fields left empty.
pub fn parse_listing_page(
    html: &str,
    page: u32,
    base: &Url,
    collector: &mut UrlCollector,
) -> Option<PageCrawl> {
    let document = Html::parse_document(html);

    let (tile_selector, tiles) = TILE_SELECTORS.iter().find_map(|sel| {
        let selector = Selector::parse(sel).ok()?;
        let tiles: Vec<ElementRef> = document.select(&selector).collect();
        (!tiles.is_empty()).then(|| (sel.to_string(), tiles))
    })?;

    let mut crawl = PageCrawl {
        page,
        tile_selector,
        tiles_seen: tiles.len(),
        ..Default::default()
    };

    for tile in tiles {
        let (row, issues) = parse_tile(&tile, page, base);
        if row.url.is_empty() {
            crawl.dropped_empty_url += 1;
            continue;
        }
        if !collector.insert(&row.url) {
            crawl.dropped_duplicate += 1;
            continue;
        }
        if !issues.is_empty() {
            debug!(
                "partial tile {}: {}",
                row.url,
                issues.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ")
            );
            crawl.partial_tiles += 1;
        }
        crawl.rows.push(row);
    }

    Some(crawl)
}

fn count_from(tile: &ElementRef, selectors: &[&str]) -> u64 {
    select_first(tile, selectors)
        .map(|el| parse_count(&el.text().collect::<String>()))
        .unwrap_or(0)
}

/// Extract one row from a tile. Never aborts: each field that cannot be read
/// is left empty and reported as a `TileParseFailure`.
pub fn parse_tile(tile: &ElementRef, page: u32, base: &Url) -> (ListingRow, Vec<HarvestError>) {
    let mut issues = Vec::new();

    let link = select_first(tile, TILE_TITLE_LINK_SELECTORS);
    let title = link
        .map(|a| collapse_whitespace(&a.text().collect::<String>()))
        .unwrap_or_default();
    let url = link
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| canonical_url(href, base))
        .unwrap_or_default();

    // No author block means no author fields; the rest of the tile is title
    // and body text, not a byline.
    let meta = select_first(tile, AUTHOR_BLOCK_SELECTORS)
        .map(|block| author::extract(&block))
        .unwrap_or_default();

    let snippet = select_first(tile, SNIPPET_SELECTORS)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default();

    for (field, value) in [
        ("title", &title),
        ("url", &url),
        ("author_name", &meta.author_name),
        ("date", &meta.date),
        ("snippet", &snippet),
    ] {
        if value.is_empty() {
            issues.push(HarvestError::TileParseFailure { field });
        }
    }

    let row = ListingRow {
        title,
        url,
        author_name: meta.author_name,
        date: meta.date,
        time: meta.time,
        category: meta.category,
        likes: count_from(tile, KUDOS_SELECTORS),
        comments: count_from(tile, REPLY_COUNT_SELECTORS),
        views: count_from(tile, VIEW_COUNT_SELECTORS),
        snippet,
        listing_page: page,
    };

    (row, issues)
}
