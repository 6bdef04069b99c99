use std::collections::HashSet;

/// Run-wide set of post URLs already turned into rows.
///
/// Owned and mutated only by the sequential listing phase.
#[derive(Debug, Default)]
pub struct UrlCollector {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl UrlCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `url`. Returns `false` for an empty or already-seen URL.
    pub fn insert(&mut self, url: &str) -> bool {
        if url.is_empty() || !self.seen.insert(url.to_string()) {
            return false;
        }
        self.order.push(url.to_string());
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Unique URLs in first-seen order.
    pub fn urls(&self) -> &[String] {
        &self.order
    }
}
