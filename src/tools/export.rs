//! CSV output for a harvest run.

use crate::core::error::HarvestError;
use crate::core::types::HarvestRow;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const COLUMNS: [&str; 14] = [
    "Title",
    "URL",
    "AuthorName",
    "Date",
    "Time",
    "Category",
    "Likes",
    "Comments",
    "Views",
    "Snippet",
    "ListingPage",
    "FullText",
    "Replies",
    "RepliesCount",
];

fn to_csv_record(row: &HarvestRow) -> [String; 14] {
    let l = &row.listing;
    let d = &row.detail;
    [
        l.title.clone(),
        l.url.clone(),
        l.author_name.clone(),
        l.date.clone(),
        l.time.clone(),
        l.category.clone(),
        l.likes.to_string(),
        l.comments.to_string(),
        l.views.to_string(),
        l.snippet.clone(),
        l.listing_page.to_string(),
        d.main_text.clone(),
        d.replies_text.clone(),
        d.replies_count.to_string(),
    ]
}

/// `<market>_posts_p<start>-<stop>_<YYYYmmdd_HHMM>.csv`
pub fn output_file_name(market: &str, start: u32, stop: u32, now: DateTime<Local>) -> String {
    format!(
        "{}_posts_p{}-{}_{}.csv",
        market,
        start,
        stop,
        now.format("%Y%m%d_%H%M")
    )
}

/// Desktop folders tried, in order, when no output directory is configured.
pub fn desktop_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(desktop) = dirs::desktop_dir() {
        candidates.push(desktop);
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join("Desktop"));
        candidates.push(home.join("OneDrive").join("Desktop"));
    }
    candidates
}

/// Directory for the output file: the explicit/configured directory if any,
/// else the first existing desktop candidate, else the current directory.
pub fn resolve_output_dir(configured: Option<PathBuf>, candidates: &[PathBuf]) -> PathBuf {
    if let Some(dir) = configured {
        return dir;
    }
    candidates
        .iter()
        .find(|p| p.is_dir())
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Write all rows to `path`. The file appears only once fully written.
pub fn write_csv(rows: &[HarvestRow], path: &Path) -> Result<(), HarvestError> {
    write_atomic(rows, path)
        .map_err(|e| HarvestError::Output(format!("{}: {:#}", path.display(), e)))
}

fn write_atomic(rows: &[HarvestRow], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let tmp = temp_path(path);
    let written = write_rows(rows, &tmp);
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    std::fs::rename(&tmp, path)
        .with_context(|| format!("moving {} into place at {}", tmp.display(), path.display()))?;

    info!("💾 wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

fn write_rows(rows: &[HarvestRow], tmp: &Path) -> Result<()> {
    debug!("writing CSV to {}", tmp.display());
    let mut wtr = csv::Writer::from_path(tmp)
        .with_context(|| format!("creating {}", tmp.display()))?;
    wtr.write_record(COLUMNS)?;
    for row in rows {
        wtr.write_record(to_csv_record(row))?;
    }
    wtr.flush().context("flushing CSV")?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.csv".to_string());
    path.with_file_name(format!(".{}.partial", name))
}
