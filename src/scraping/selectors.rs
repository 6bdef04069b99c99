//! CSS selector tables for the Khoros community markup.
//!
//! Every list is ordered: the first entry that resolves wins.

/// Containers of one post summary on a listing page.
pub const TILE_SELECTORS: &[&str] = &[
    "article.custom-message-tile",
    "div.custom-message-tile",
    "div.lia-message-tile",
    "div.lia-quilt-row-message-list-item",
    "tr.lia-list-row",
];

/// Link carrying the post title and URL inside a tile.
pub const TILE_TITLE_LINK_SELECTORS: &[&str] = &[
    ".custom-tile-title a[href]",
    ".message-subject a[href]",
    "h3 a[href]",
    "a.page-link.lia-link-navigation[href]",
    "a[href*='/td-p/']",
];

/// Author block inside a tile or message.
pub const AUTHOR_BLOCK_SELECTORS: &[&str] = &[
    ".custom-tile-author-info",
    ".lia-message-author-with-avatar",
    ".lia-message-author",
    ".custom-tile-author",
    ".lia-info-area",
];

/// Author name candidates, most specific login markup first.
pub const AUTHOR_NAME_SELECTORS: &[&str] = &[
    "span.login-bold",
    "a.lia-user-name-link span",
    "a.lia-user-name-link",
    "a[href*='/user/viewprofilepage/']",
    "a[href*='/user/']",
];

/// Elements carrying a machine-readable timestamp, with the attribute to read.
pub const TIMESTAMP_ATTR_SOURCES: &[(&str, &str)] = &[
    ("time[datetime]", "datetime"),
    ("span.local-friendly-date[title]", "title"),
    ("[data-timestamp]", "data-timestamp"),
];

/// Link markers identifying user/profile anchors (skipped by the category scan).
pub const USER_LINK_CLASS_MARKERS: &[&str] = &["lia-user-name-link", "login-bold", "UserAvatar"];
pub const USER_LINK_HREF_MARKERS: &[&str] = &["/user/viewprofilepage/", "/user/"];

pub const KUDOS_SELECTORS: &[&str] = &[
    ".custom-tile-kudos",
    ".lia-component-kudos-count",
    "[class*='kudos-count']",
];

pub const REPLY_COUNT_SELECTORS: &[&str] = &[
    ".custom-tile-replies",
    ".lia-component-messages-column-message-replies-count",
    "[class*='replies-count']",
];

pub const VIEW_COUNT_SELECTORS: &[&str] = &[
    ".custom-tile-views",
    ".lia-component-messages-column-message-views-count",
    "[class*='views-count']",
];

pub const SNIPPET_SELECTORS: &[&str] = &[
    ".custom-tile-body",
    ".lia-truncated-body-container",
    ".message-body-snippet",
    ".lia-message-body-content",
];

/// Any of these appearing means a post page has rendered.
pub const DETAIL_READY_SELECTORS: &[&str] = &[
    ".lia-message-body-content",
    ".lia-message-body",
    ".lia-quilt-forum-message",
];

/// Main post body, first match wins.
pub const MAIN_BODY_SELECTORS: &[&str] = &[
    ".lia-message-body-content",
    ".lia-message-body",
];

/// Every message body on a post page; the first one is the main post.
pub const MESSAGE_BODY_SELECTOR: &str = ".lia-message-body-content";

/// "Read more" style controls that reveal truncated content.
pub const EXPAND_SELECTORS: &[&str] = &[
    "a.lia-truncated-read-more",
    "button.custom-read-more",
    ".lia-message-body-read-more a",
    "a.show-more-link",
];

/// Broader containers read when the primary extraction fails.
pub const FALLBACK_CONTAINER_SELECTORS: &[&str] = &["#lia-body", "main", "body"];
