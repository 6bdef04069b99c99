//! Static table of supported regional community instances.

use crate::core::error::HarvestError;

/// Base domain shared by every regional instance.
pub const BASE_URL: &str = "https://r2.community.samsung.com";

/// One regional forum instance. Loaded from a static table, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketConfig {
    pub code: &'static str,
    pub region_label: &'static str,
    /// Khoros category id (the `ct-p` / `category-id` path segment).
    pub category_id: &'static str,
    /// Human-readable category slug used in `/t5/<slug>/...` paths.
    pub slug: &'static str,
}

const MARKETS: &[MarketConfig] = &[
    MarketConfig {
        code: "sg",
        region_label: "Singapore",
        category_id: "sg",
        slug: "Singapore",
    },
    MarketConfig {
        code: "my",
        region_label: "Malaysia",
        category_id: "my",
        slug: "Malaysia",
    },
    MarketConfig {
        code: "ph",
        region_label: "Philippines",
        category_id: "ph",
        slug: "Philippines",
    },
    MarketConfig {
        code: "th",
        region_label: "Thailand",
        category_id: "th",
        slug: "Thailand",
    },
    MarketConfig {
        code: "vn",
        region_label: "Vietnam",
        category_id: "vn",
        slug: "Vietnam",
    },
    MarketConfig {
        code: "id",
        region_label: "Indonesia",
        category_id: "id",
        slug: "Indonesia",
    },
    MarketConfig {
        code: "in",
        region_label: "India",
        category_id: "in",
        slug: "India",
    },
];

impl MarketConfig {
    /// Case-insensitive lookup by market code.
    pub fn lookup(code: &str) -> Result<&'static MarketConfig, HarvestError> {
        let wanted = code.trim().to_ascii_lowercase();
        MARKETS
            .iter()
            .find(|m| m.code == wanted)
            .ok_or_else(|| HarvestError::UnsupportedMarket(code.trim().to_string()))
    }

    pub fn all() -> &'static [MarketConfig] {
        MARKETS
    }

    /// Candidate listing URLs for `page`, most preferred first.
    pub fn candidate_listing_urls(&self, page: u32) -> Vec<String> {
        let category = format!("{}/t5/{}/ct-p/{}", BASE_URL, self.slug, self.category_id);
        let recent = format!(
            "{}/t5/forums/recentpostspage/category-id/{}",
            BASE_URL, self.category_id
        );

        let mut urls = Vec::with_capacity(4);
        if page <= 1 {
            urls.push(category.clone());
        }
        urls.push(format!("{}/page/{}", recent, page));
        urls.push(format!("{}/page/{}", category, page));
        urls.push(format!("{}?page={}", category, page));
        urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let m = MarketConfig::lookup(" SG ").unwrap();
        assert_eq!(m.region_label, "Singapore");
    }

    #[test]
    fn unknown_market_fails_fast() {
        let err = MarketConfig::lookup("zz").unwrap_err();
        assert!(matches!(err, HarvestError::UnsupportedMarket(ref c) if c == "zz"));
    }

    #[test]
    fn first_page_prefers_unsuffixed_category() {
        let m = MarketConfig::lookup("my").unwrap();
        let urls = m.candidate_listing_urls(1);
        assert_eq!(urls[0], format!("{}/t5/Malaysia/ct-p/my", BASE_URL));
        assert_eq!(urls.len(), 4);

        let urls = m.candidate_listing_urls(3);
        assert_eq!(urls.len(), 3);
        assert!(urls[0].ends_with("/recentpostspage/category-id/my/page/3"));
        assert!(urls[2].ends_with("?page=3"));
    }
}
