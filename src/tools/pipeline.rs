//! One harvest run: listing phase, detail phase, join.

use crate::core::error::HarvestError;
use crate::core::market::MarketConfig;
use crate::core::types::{DetailFetch, DetailRecord, FetchStatus, HarvestReport, HarvestRow, ListingRow};
use crate::scraping::pacing::RequestDelay;
use crate::scraping::session::{SessionFactory, SessionTimeouts};
use crate::tools::collector::UrlCollector;
use crate::tools::{dispatch, listing};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct HarvestOptions {
    pub market: String,
    pub start_page: u32,
    pub stop_page: u32,
    pub workers: usize,
    pub timeouts: SessionTimeouts,
    pub delay: RequestDelay,
}

impl HarvestOptions {
    /// Fail-fast checks; returns the resolved market.
    pub fn validate(&self) -> Result<&'static MarketConfig, HarvestError> {
        let market = MarketConfig::lookup(&self.market)?;
        if self.start_page == 0 || self.start_page > self.stop_page {
            return Err(HarvestError::InvalidPageRange {
                start: self.start_page,
                stop: self.stop_page,
            });
        }
        if self.workers == 0 {
            return Err(HarvestError::InvalidWorkerCount);
        }
        Ok(market)
    }
}

pub async fn run_harvest(
    options: &HarvestOptions,
    factory: Arc<dyn SessionFactory>,
) -> Result<HarvestReport, HarvestError> {
    let market = options.validate()?;
    let started = Instant::now();
    info!(
        "🚀 harvesting {} ({}) pages {}..={} with {} workers",
        market.code, market.region_label, options.start_page, options.stop_page, options.workers
    );

    let mut session = factory
        .open()
        .await
        .map_err(|e| HarvestError::BrowserUnavailable(e.to_string()))?;
    let mut collector = UrlCollector::new();
    let summary = listing::crawl_range(
        session.as_mut(),
        market,
        options.start_page,
        options.stop_page,
        &mut collector,
        &options.timeouts,
        &options.delay,
    )
    .await;
    if let Err(e) = session.close().await {
        warn!("listing session close failed: {}", e);
    }

    info!(
        "📋 listing phase done: {} unique posts, {} pages ok, {} skipped {:?}",
        summary.rows.len(),
        summary.pages_crawled,
        summary.pages_skipped.len(),
        summary.pages_skipped
    );

    let details = dispatch::fetch_all(
        factory,
        collector.urls(),
        options.workers,
        options.timeouts,
        options.delay,
    )
    .await;

    let mut report = join_rows(summary.rows, details);
    report.market = market.code.to_string();
    report.pages_crawled = summary.pages_crawled;
    report.pages_skipped = summary.pages_skipped;
    report.tiles_dropped = summary.tiles_dropped;

    info!(
        "✅ {} rows in {:.1}s (details: {} complete, {} degraded, {} failed)",
        report.rows.len(),
        started.elapsed().as_secs_f64(),
        report.details_complete,
        report.details_degraded,
        report.details_failed
    );
    Ok(report)
}

/// Attach details to rows in listing order. A URL with no detail gets the
/// empty sentinel and counts as failed.
pub fn join_rows(rows: Vec<ListingRow>, mut details: HashMap<String, DetailFetch>) -> HarvestReport {
    let mut report = HarvestReport::default();
    report.rows.reserve(rows.len());

    for listing in rows {
        let (detail, status) = match details.remove(&listing.url) {
            Some(fetch) => (fetch.record, fetch.status),
            None => (
                DetailRecord::empty(listing.url.as_str()),
                FetchStatus::Failed("no detail record".to_string()),
            ),
        };
        match status {
            FetchStatus::Complete => report.details_complete += 1,
            FetchStatus::Degraded(_) => report.details_degraded += 1,
            FetchStatus::Failed(_) => report.details_failed += 1,
        }
        report.rows.push(HarvestRow { listing, detail });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(url: &str) -> ListingRow {
        ListingRow {
            url: url.to_string(),
            title: format!("post {}", url),
            ..Default::default()
        }
    }

    fn options() -> HarvestOptions {
        HarvestOptions {
            market: "sg".into(),
            start_page: 1,
            stop_page: 3,
            workers: 2,
            timeouts: SessionTimeouts::default(),
            delay: RequestDelay::none(),
        }
    }

    #[test]
    fn join_keeps_listing_order_and_substitutes_sentinels() {
        let rows = vec![row("u1"), row("u2"), row("u3")];
        let mut details = HashMap::new();
        details.insert(
            "u3".to_string(),
            DetailFetch::complete(DetailRecord {
                url: "u3".into(),
                main_text: "three".into(),
                ..Default::default()
            }),
        );
        details.insert("u1".to_string(), DetailFetch::failed("u1", "timeout"));

        let report = join_rows(rows, details);
        let urls: Vec<&str> = report.rows.iter().map(|r| r.listing.url.as_str()).collect();
        assert_eq!(urls, ["u1", "u2", "u3"]);
        assert_eq!(report.rows[2].detail.main_text, "three");
        assert_eq!(report.rows[1].detail, DetailRecord::empty("u2"));
        assert_eq!(report.details_complete, 1);
        assert_eq!(report.details_failed, 2);
    }

    #[test]
    fn options_fail_fast() {
        assert!(options().validate().is_ok());

        let mut bad = options();
        bad.market = "zz".into();
        assert!(matches!(bad.validate(), Err(HarvestError::UnsupportedMarket(_))));

        let mut bad = options();
        bad.start_page = 4;
        assert!(matches!(bad.validate(), Err(HarvestError::InvalidPageRange { .. })));

        let mut bad = options();
        bad.start_page = 0;
        assert!(bad.validate().is_err());

        let mut bad = options();
        bad.workers = 0;
        assert!(matches!(bad.validate(), Err(HarvestError::InvalidWorkerCount)));
    }
}
