//! Detail fetcher: one post page in, one `DetailRecord` out.
//!
//! `fetch_detail` never fails. A URL that cannot be loaded gets the empty
//! sentinel record with `FetchStatus::Failed`. When the page loads but the
//! primary extraction breaks, it falls back to a bounded snapshot of a broader
//! container, and to the sentinel if even that is unreadable.

use crate::core::error::HarvestError;
use crate::core::types::{DetailFetch, DetailRecord, FetchStatus, REPLY_SEPARATOR};
use crate::scraping::selectors::{
    DETAIL_READY_SELECTORS, EXPAND_SELECTORS, FALLBACK_CONTAINER_SELECTORS, MAIN_BODY_SELECTORS,
    MESSAGE_BODY_SELECTOR,
};
use crate::scraping::session::{BrowserSession, SessionTimeouts};
use crate::scraping::text::{element_text, truncate_chars};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};

/// Rounds of "read more" clicks attempted before extraction.
pub const EXPAND_ROUNDS: usize = 2;
/// Upper bound on the degraded-path text snapshot.
pub const FALLBACK_MAX_CHARS: usize = 4000;

const EXPAND_SETTLE: Duration = Duration::from_millis(400);

pub async fn fetch_detail(
    session: &mut dyn BrowserSession,
    url: &str,
    timeouts: &SessionTimeouts,
) -> DetailFetch {
    // A failed navigation leaves the previous document in the tab; never
    // snapshot it under this URL.
    if let Err(e) = session.navigate(url, timeouts.navigation).await {
        let err = HarvestError::DetailFetchFailure {
            url: url.to_string(),
            reason: e.to_string(),
        };
        warn!("{}", err);
        return DetailFetch::failed(url, err.to_string());
    }

    match extract_loaded(session, url, timeouts).await {
        Ok(record) => DetailFetch::complete(record),
        Err(err) => {
            warn!("{}; falling back to page snapshot", err);
            fetch_fallback(session, url, err.to_string()).await
        }
    }
}

/// Extraction once `url` is the loaded document.
async fn extract_loaded(
    session: &mut dyn BrowserSession,
    url: &str,
    timeouts: &SessionTimeouts,
) -> Result<DetailRecord, HarvestError> {
    let failure = |reason: String| HarvestError::DetailFetchFailure {
        url: url.to_string(),
        reason,
    };

    if session
        .wait_for_any(DETAIL_READY_SELECTORS, timeouts.selector_wait)
        .await
        .is_none()
    {
        return Err(failure(format!(
            "no content container within {}ms",
            timeouts.selector_wait.as_millis()
        )));
    }

    expand_truncated(session).await;

    let html = session.html().await.map_err(|e| failure(e.to_string()))?;
    parse_detail(&html, url).ok_or_else(|| failure("no main body container".to_string()))
}

/// Click "read more" controls up to `EXPAND_ROUNDS` times; stop early when
/// none is present. Click errors are tolerated.
async fn expand_truncated(session: &mut dyn BrowserSession) {
    for round in 1..=EXPAND_ROUNDS {
        match session.click_first(EXPAND_SELECTORS).await {
            Ok(true) => {
                debug!("expanded truncated content (round {})", round);
                tokio::time::sleep(EXPAND_SETTLE).await;
            }
            Ok(false) => break,
            Err(e) => {
                debug!("expand click failed (round {}): {}", round, e);
                break;
            }
        }
    }
}

async fn fetch_fallback(session: &mut dyn BrowserSession, url: &str, reason: String) -> DetailFetch {
    let html = match session.html().await {
        Ok(h) => h,
        Err(e) => return DetailFetch::failed(url, format!("{}; snapshot failed: {}", reason, e)),
    };
    match fallback_snapshot(&html) {
        Some(text) => DetailFetch {
            record: DetailRecord {
                url: url.to_string(),
                main_text: text,
                replies_text: String::new(),
                replies_count: 0,
            },
            status: FetchStatus::Degraded(reason),
        },
        None => DetailFetch::failed(url, format!("{}; page empty", reason)),
    }
}

/// Extract the main body and the replies from a rendered post page.
///
/// `None` when no main-body container exists. Replies are every message body
/// after the first; empty ones are neither joined nor counted.
pub fn parse_detail(html: &str, url: &str) -> Option<DetailRecord> {
    let document = Html::parse_document(html);

    let main_text = MAIN_BODY_SELECTORS.iter().find_map(|sel| {
        let selector = Selector::parse(sel).ok()?;
        document.select(&selector).next().map(|el| element_text(&el))
    })?;

    let replies: Vec<String> = Selector::parse(MESSAGE_BODY_SELECTOR)
        .map(|selector| {
            document
                .select(&selector)
                .skip(1)
                .map(|el| element_text(&el))
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Some(DetailRecord {
        url: url.to_string(),
        main_text,
        replies_count: replies.len() as u64,
        replies_text: replies.join(REPLY_SEPARATOR),
    })
}

/// Bounded text of the first broad container; `None` if it has no text.
pub fn fallback_snapshot(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    FALLBACK_CONTAINER_SELECTORS
        .iter()
        .find_map(|sel| {
            let selector = Selector::parse(sel).ok()?;
            document.select(&selector).next().map(|el| element_text(&el))
        })
        .filter(|t| !t.is_empty())
        .map(|t| truncate_chars(&t, FALLBACK_MAX_CHARS))
}
