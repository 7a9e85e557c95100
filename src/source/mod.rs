//! Remote fetch gateway.
//!
//! This module defines the [`NewsSource`] trait and the common [`NewsItem`]
//! type.  The concrete HTTP implementation lives in [`api`].
//!
//! ## For contributors: adding a new source
//!
//! 1. Create a new file in this directory.
//! 2. Define a struct and implement [`NewsSource`] for it.
//! 3. Add the `mod` line below and re-export your struct.
//! 4. Construct it in `main.rs` in place of [`ApiSource`].
//!
//! The paging controller, cache and UI are all source-agnostic.

mod api;
mod news_item;

pub use api::ApiSource;
pub use news_item::NewsItem;

use async_trait::async_trait;

use crate::error::FetchError;

/// A paginated, remote source of news.
///
/// The paging controller calls [`fetch()`](NewsSource::fetch) from a tokio
/// task, so implementations must be `Send + Sync`.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Human-readable label used in logs.
    fn name(&self) -> &str;

    /// Fetch one page of items.  `page` is 1-based.
    ///
    /// Exactly one of items or error is produced per call.  Items with
    /// malformed optional fields are returned with those fields absent rather
    /// than failing the page.
    async fn fetch(&self, page: u32) -> Result<Vec<NewsItem>, FetchError>;
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------
