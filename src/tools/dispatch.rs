//! Parallel detail fetching.
//!
//! URLs are dealt round-robin into one chunk per worker. Each worker is a
//! spawned task that opens its own session, walks its chunk in order, and
//! closes the session once, even after a panic. The orchestrator merges each
//! worker's results as that worker completes.

use crate::core::types::DetailFetch;
use crate::scraping::pacing::RequestDelay;
use crate::scraping::session::{BrowserSession, SessionFactory, SessionTimeouts};
use crate::tools::detail::fetch_detail;
use futures::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Deal `urls` into `worker_count` chunks: URL `i` goes to chunk `i % n`.
/// Chunks that would be empty are omitted.
pub fn partition_round_robin(urls: &[String], worker_count: usize) -> Vec<Vec<String>> {
    let n = worker_count.max(1).min(urls.len().max(1));
    let mut chunks: Vec<Vec<String>> = vec![Vec::new(); n];
    for (i, url) in urls.iter().enumerate() {
        chunks[i % n].push(url.clone());
    }
    chunks.retain(|c| !c.is_empty());
    chunks
}

/// Fetch every URL and return exactly one `DetailFetch` per input URL.
///
/// A worker that cannot open a session, panics, or dies leaves its unfinished
/// URLs as `FetchStatus::Failed` sentinels. Order is not preserved here; the
/// caller re-joins by URL.
pub async fn fetch_all(
    factory: Arc<dyn SessionFactory>,
    urls: &[String],
    worker_count: usize,
    timeouts: SessionTimeouts,
    delay: RequestDelay,
) -> HashMap<String, DetailFetch> {
    let mut results: HashMap<String, DetailFetch> = HashMap::with_capacity(urls.len());
    if urls.is_empty() {
        return results;
    }

    let chunks = partition_round_robin(urls, worker_count);
    info!(
        "🧵 fetching {} posts with {} workers (chunks: {:?})",
        urls.len(),
        chunks.len(),
        chunks.iter().map(Vec::len).collect::<Vec<_>>()
    );

    let mut workers = JoinSet::new();
    for (worker_id, chunk) in chunks.into_iter().enumerate() {
        let factory = Arc::clone(&factory);
        workers.spawn(run_worker(worker_id, factory, chunk, timeouts, delay));
    }

    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok((worker_id, fetched)) => {
                debug!("worker {} returned {} records", worker_id, fetched.len());
                results.extend(fetched);
            }
            Err(e) => error!("detail worker task failed: {}", e),
        }
    }

    for url in urls {
        results
            .entry(url.clone())
            .or_insert_with(|| DetailFetch::failed(url.as_str(), "worker did not return a record"));
    }

    results
}

async fn run_worker(
    worker_id: usize,
    factory: Arc<dyn SessionFactory>,
    chunk: Vec<String>,
    timeouts: SessionTimeouts,
    delay: RequestDelay,
) -> (usize, Vec<(String, DetailFetch)>) {
    let mut session = match factory.open().await {
        Ok(s) => s,
        Err(e) => {
            warn!("worker {}: could not open browser session: {}", worker_id, e);
            let reason = format!("session unavailable: {}", e);
            let failed = chunk
                .iter()
                .map(|url| (url.clone(), DetailFetch::failed(url.as_str(), reason.as_str())))
                .collect();
            return (worker_id, failed);
        }
    };

    let mut fetched: Vec<(String, DetailFetch)> = Vec::with_capacity(chunk.len());
    let outcome = AssertUnwindSafe(fetch_chunk(
        session.as_mut(),
        &chunk,
        &mut fetched,
        &timeouts,
        &delay,
    ))
    .catch_unwind()
    .await;

    if let Err(panic) = outcome {
        let msg = panic_message(panic.as_ref());
        error!(
            "worker {} panicked after {} of {} posts: {}",
            worker_id,
            fetched.len(),
            chunk.len(),
            msg
        );
        for url in chunk.iter().skip(fetched.len()) {
            fetched.push((
                url.clone(),
                DetailFetch::failed(url.as_str(), format!("worker panicked: {}", msg)),
            ));
        }
    }

    if let Err(e) = session.close().await {
        warn!("worker {}: session close failed: {}", worker_id, e);
    }

    (worker_id, fetched)
}

async fn fetch_chunk(
    session: &mut dyn BrowserSession,
    chunk: &[String],
    fetched: &mut Vec<(String, DetailFetch)>,
    timeouts: &SessionTimeouts,
    delay: &RequestDelay,
) {
    for (i, url) in chunk.iter().enumerate() {
        if i > 0 {
            delay.pause().await;
        }
        let result = fetch_detail(session, url, timeouts).await;
        debug!("{} -> {}", url, result.status.as_str());
        fetched.push((url.clone(), result));
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
