//! The news entry shared by the gateway, the cache and the UI.
//!
//! `NewsItem` mirrors one row of the local `news` table.  The gateway builds
//! them from the API payload, the cache persists them keyed by [`NewsItem::id`]
//! and the paged list hands them to the UI unchanged.  Read order is the
//! cache's concern; see [`crate::cache::NewsCache::load_page`].

/// A single news entry.
///
/// Everything except the id is optional: the API omits fields freely and the
/// decoder treats anything it cannot read as absent.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NewsItem {
    /// Server identifier, the primary key of the cache.
    pub id: String,

    /// URL of the lead image.
    pub image: Option<String>,

    /// Short label shown above the headline ("chapeu").
    pub chapeu: Option<String>,

    pub title: Option<String>,

    pub summary: Option<String>,

    /// URL of the full article.
    pub url: Option<String>,

    /// Publication time in milliseconds since the Unix epoch, UTC.
    pub publication: Option<i64>,
}

impl NewsItem {
    /// Create an item with only an id; handy for builders and tests.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            image: None,
            chapeu: None,
            title: None,
            summary: None,
            url: None,
            publication: None,
        }
    }
}
