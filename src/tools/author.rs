//! Author-metadata extraction for a single post fragment.
//!
//! Each field is resolved by an ordered list of pure strategies; the first one
//! returning a value wins. Nothing here can fail: a field that no strategy
//! resolves is left empty.

use crate::core::types::AuthorMeta;
use crate::scraping::selectors::{
    AUTHOR_NAME_SELECTORS, TIMESTAMP_ATTR_SOURCES, USER_LINK_CLASS_MARKERS, USER_LINK_HREF_MARKERS,
};
use crate::scraping::text::{collapse_whitespace, element_text};
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::OnceLock;

pub type NameStrategy = for<'a> fn(&ElementRef<'a>) -> Option<String>;
pub type TimestampStrategy = for<'a> fn(&ElementRef<'a>) -> Option<(String, String)>;

/// Name strategies: structural login markup first, raw first line last.
pub const NAME_STRATEGIES: &[NameStrategy] = &[name_from_markup, name_from_first_line];

/// Timestamp strategies: machine-readable attributes first, block text last.
pub const TIMESTAMP_STRATEGIES: &[TimestampStrategy] =
    &[timestamp_from_attributes, timestamp_from_text];

static TIMESTAMP_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn timestamp_re() -> Option<&'static Regex> {
    TIMESTAMP_RE
        .get_or_init(|| {
            Regex::new(r"(\d{2}-\d{2}-\d{4})(?:[\s\u{200e}\u{00a0}]+(\d{1,2}:\d{2})\s*([AaPp][Mm]))?")
                .ok()
        })
        .as_ref()
}

/// Extract author name, date, time, category and the raw block text.
pub fn extract(block: &ElementRef) -> AuthorMeta {
    let raw_text = element_text(block);

    let author_name = NAME_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(block))
        .unwrap_or_default();

    let (date, time) = TIMESTAMP_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(block))
        .unwrap_or_default();

    AuthorMeta {
        author_name,
        date,
        time,
        category: category_from_links(block),
        raw_text,
    }
}

/// First non-empty text among the known author-name selectors.
pub fn name_from_markup(block: &ElementRef) -> Option<String> {
    AUTHOR_NAME_SELECTORS.iter().find_map(|sel| {
        let selector = Selector::parse(sel).ok()?;
        block
            .select(&selector)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .find(|t| !t.is_empty())
    })
}

/// First non-blank line of the block text.
pub fn name_from_first_line(block: &ElementRef) -> Option<String> {
    element_text(block)
        .lines()
        .next()
        .map(str::to_string)
        .filter(|l| !l.is_empty())
}

pub fn timestamp_from_attributes(block: &ElementRef) -> Option<(String, String)> {
    TIMESTAMP_ATTR_SOURCES.iter().find_map(|(sel, attr)| {
        let selector = Selector::parse(sel).ok()?;
        block
            .select(&selector)
            .filter_map(|el| el.value().attr(attr))
            .find_map(split_timestamp)
    })
}

pub fn timestamp_from_text(block: &ElementRef) -> Option<(String, String)> {
    split_timestamp(&block.text().collect::<Vec<_>>().join(" "))
}

/// Apply the fixed `MM-DD-YYYY HH:MM AM/PM` pattern.
///
/// A bare date yields an empty time. Relative phrases ("6h ago") do not
/// match and yield `None`; no relative-to-absolute inference is attempted.
pub fn split_timestamp(value: &str) -> Option<(String, String)> {
    let caps = timestamp_re()?.captures(value)?;
    let date = caps.get(1)?.as_str().to_string();
    let time = match (caps.get(2), caps.get(3)) {
        (Some(hm), Some(meridiem)) => {
            format!("{} {}", hm.as_str(), meridiem.as_str().to_ascii_uppercase())
        }
        _ => String::new(),
    };
    Some((date, time))
}

fn is_user_link(link: &ElementRef) -> bool {
    let classes = link.value().attr("class").unwrap_or("");
    if USER_LINK_CLASS_MARKERS.iter().any(|m| classes.contains(m)) {
        return true;
    }
    let href = link.value().attr("href").unwrap_or("");
    if USER_LINK_HREF_MARKERS.iter().any(|m| href.contains(m)) {
        return true;
    }
    Selector::parse(".login-bold")
        .map(|sel| link.select(&sel).next().is_some())
        .unwrap_or(false)
}

/// Scan the block's links last-to-first, skip user/profile links, and return
/// the first remaining link's text. Empty when every link is a user link.
pub fn category_from_links(block: &ElementRef) -> String {
    let Ok(anchor) = Selector::parse("a") else {
        return String::new();
    };
    let links: Vec<ElementRef> = block.select(&anchor).collect();
    links
        .iter()
        .rev()
        .find(|link| !is_user_link(link))
        .map(|link| collapse_whitespace(&link.text().collect::<String>()))
        .unwrap_or_default()
}
