use serde::{Deserialize, Serialize};

/// Separator placed between reply bodies in `DetailRecord::replies_text`.
pub const REPLY_SEPARATOR: &str = " ||| ";

/// One post summary harvested from a listing page.
///
/// Created once while parsing a tile and never mutated afterwards; `url` is
/// unique within a run (see `UrlCollector`).
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ListingRow {
    pub title: String,
    pub url: String,
    pub author_name: String,
    pub date: String,
    pub time: String,
    pub category: String,
    pub likes: u64,
    pub comments: u64,
    pub views: u64,
    pub snippet: String,
    pub listing_page: u32,
}

/// Full text of one post page, keyed by URL for the join back onto `ListingRow`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct DetailRecord {
    pub url: String,
    pub main_text: String,
    pub replies_text: String,
    pub replies_count: u64,
}

impl DetailRecord {
    /// Sentinel used when no record could be produced for `url`.
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Individual reply bodies, in page order.
    pub fn reply_segments(&self) -> Vec<&str> {
        if self.replies_text.is_empty() {
            return Vec::new();
        }
        self.replies_text.split(REPLY_SEPARATOR).collect()
    }
}

/// How a detail fetch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// Primary extraction path succeeded.
    Complete,
    /// Primary path failed; the record holds a bounded page-text snapshot.
    Degraded(String),
    /// Nothing could be read; the record is the empty sentinel.
    Failed(String),
}

impl FetchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStatus::Complete => "complete",
            FetchStatus::Degraded(_) => "degraded",
            FetchStatus::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailFetch {
    pub record: DetailRecord,
    pub status: FetchStatus,
}

impl DetailFetch {
    pub fn complete(record: DetailRecord) -> Self {
        Self {
            record,
            status: FetchStatus::Complete,
        }
    }

    pub fn failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            record: DetailRecord::empty(url),
            status: FetchStatus::Failed(reason.into()),
        }
    }
}

/// Author block fields pulled from one post fragment. Missing fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorMeta {
    pub author_name: String,
    pub date: String,
    pub time: String,
    pub category: String,
    pub raw_text: String,
}

/// Outcome of crawling one listing page.
#[derive(Debug, Clone, Default)]
pub struct PageCrawl {
    pub page: u32,
    /// Listing URL that produced tiles.
    pub source_url: String,
    /// Tile selector that matched.
    pub tile_selector: String,
    pub tiles_seen: usize,
    pub rows: Vec<ListingRow>,
    /// Tiles emitted with at least one empty field.
    pub partial_tiles: usize,
    pub dropped_empty_url: usize,
    pub dropped_duplicate: usize,
}

/// A listing row joined with its detail record; one CSV line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestRow {
    pub listing: ListingRow,
    pub detail: DetailRecord,
}

#[derive(Debug, Clone, Default)]
pub struct HarvestReport {
    pub market: String,
    pub rows: Vec<HarvestRow>,
    pub pages_crawled: usize,
    pub pages_skipped: Vec<u32>,
    pub tiles_dropped: usize,
    pub details_complete: usize,
    pub details_degraded: usize,
    pub details_failed: usize,
}
