//! Small text normalizers shared by the listing and detail extractors.

use scraper::{ElementRef, Selector};
use url::Url;

/// Count label → number. Non-digits are stripped; no digits means 0.
pub fn parse_count(label: &str) -> u64 {
    let digits: String = label.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<u64>().unwrap_or(0)
}

/// Trim every line and drop blank ones.
pub fn drop_blank_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse all whitespace runs into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Char-safe prefix of at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Text nodes of `el`, one per line, blank lines removed.
pub fn element_text(el: &ElementRef) -> String {
    drop_blank_lines(&el.text().collect::<Vec<_>>().join("\n"))
}

/// First element under `root` matching any of `selectors`, in list order.
pub fn select_first<'a>(root: &ElementRef<'a>, selectors: &[&str]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|sel| {
        let selector = Selector::parse(sel).ok()?;
        root.select(&selector).next()
    })
}

/// Absolute post URL with query and fragment removed.
///
/// Returns `None` for empty, in-page, `javascript:`/`mailto:` or non-http links.
pub fn canonical_url(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_query(None);
    url.set_fragment(None);

    let mut out = url.to_string();
    if out.ends_with('/') && url.path() != "/" {
        out.pop();
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn counts_without_digits_are_zero() {
        assert_eq!(parse_count("Kudos"), 0);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("1,234 views"), 1234);
        assert_eq!(parse_count(" 7 "), 7);
    }

    #[test]
    fn absurdly_long_digit_runs_degrade_to_zero() {
        assert_eq!(parse_count(&"9".repeat(40)), 0);
    }

    #[test]
    fn blank_lines_are_discarded() {
        assert_eq!(drop_blank_lines("  a \n\n \n b\n"), "a\nb");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn canonical_url_strips_query_and_fragment() {
        let base = Url::parse("https://r2.community.samsung.com").unwrap();
        assert_eq!(
            canonical_url("/t5/Galaxy-S/Battery/td-p/123?nobounce#M9", &base).as_deref(),
            Some("https://r2.community.samsung.com/t5/Galaxy-S/Battery/td-p/123")
        );
        assert_eq!(
            canonical_url("https://r2.community.samsung.com/t5/x/td-p/9/", &base).as_deref(),
            Some("https://r2.community.samsung.com/t5/x/td-p/9")
        );
        assert!(canonical_url("   ", &base).is_none());
        assert!(canonical_url("#top", &base).is_none());
        assert!(canonical_url("javascript:void(0)", &base).is_none());
    }

    #[test]
    fn select_first_honours_list_order() {
        let doc = Html::parse_document(r#"<div><b class="y">second</b><i class="x">first</i></div>"#);
        let root = doc.root_element();
        let el = select_first(&root, &[".x", ".y"]).unwrap();
        assert_eq!(element_text(&el), "first");
        assert!(select_first(&root, &[".missing"]).is_none());
    }
}
