//! A lazily loaded, restartable window over the cache.
//!
//! Rows are read from the cache `page_size` at a time, newest first.  When a
//! read comes back short the cache is exhausted and the list asks its
//! [`BoundaryCallback`] for more: `on_zero_items_loaded` if nothing is cached
//! at all, `on_item_at_end_loaded` otherwise.  The fetched page lands in the
//! cache, the cache notifies its subscribers, and the owner calls
//! [`PagedList::reload`] to pick the new rows up.

use tracing::debug;

use super::boundary::BoundaryCallback;
use crate::cache::NewsCache;
use crate::error::CacheError;
use crate::source::NewsItem;

pub struct PagedList {
    cache: NewsCache,
    boundary: BoundaryCallback,
    page_size: usize,
    items: Vec<NewsItem>,
}

impl PagedList {
    pub fn new(cache: NewsCache, boundary: BoundaryCallback, page_size: usize) -> Self {
        Self {
            cache,
            boundary,
            page_size: page_size.max(1),
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[NewsItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Load the first page from the cache.
    pub async fn load_initial(&mut self) -> Result<(), CacheError> {
        self.items = self.cache.load_page(self.page_size, 0).await?;
        debug!(loaded = self.items.len(), "initial page loaded");
        if self.items.len() < self.page_size {
            self.on_exhausted();
        }
        Ok(())
    }

    /// Append the next page from the cache, asking the network for more
    /// once the cache runs dry.
    pub async fn load_more(&mut self) -> Result<(), CacheError> {
        let page = self
            .cache
            .load_page(self.page_size, self.items.len())
            .await?;
        let short = page.len() < self.page_size;
        debug!(loaded = page.len(), offset = self.items.len(), "page loaded");
        self.items.extend(page);
        if short {
            self.on_exhausted();
        }
        Ok(())
    }

    /// Re-read from the top after the cache changed, keeping at least as many
    /// rows as were loaded before.  Fires no boundary trigger.
    pub async fn reload(&mut self) -> Result<(), CacheError> {
        let limit = self.items.len().max(self.page_size);
        self.items = self.cache.load_page(limit, 0).await?;
        debug!(loaded = self.items.len(), "list reloaded");
        Ok(())
    }

    fn on_exhausted(&self) {
        match self.items.last() {
            Some(last) => self.boundary.on_item_at_end_loaded(last),
            None => self.boundary.on_zero_items_loaded(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::paging::boundary::FetchOptions;
    use crate::paging::state::{RequestState, StatusChannels};
    use crate::source::testing::{item, ScriptedSource};
    use tokio::runtime::Handle;

    fn list(source: Arc<ScriptedSource>, cache: &NewsCache, page_size: usize) -> PagedList {
        let boundary = BoundaryCallback::new(
            source,
            cache.clone(),
            StatusChannels::new(),
            FetchOptions::default(),
            Handle::current(),
        );
        PagedList::new(cache.clone(), boundary, page_size)
    }

    async fn wait_settled(list: &PagedList) {
        let mut network = list.boundary.network_state();
        tokio::time::timeout(
            Duration::from_secs(5),
            network.wait_for(|s| matches!(s, Some(RequestState::Success | RequestState::Failed(_)))),
        )
        .await
        .expect("request settles")
        .expect("status channel open");
    }

    fn ids(list: &PagedList) -> Vec<&str> {
        list.items().iter().map(|i| i.id.as_str()).collect()
    }

    #[tokio::test]
    async fn empty_cache_fetches_first_page() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(vec![
            item("A", Some(2)),
            item("B", Some(1)),
        ])]));
        let cache = NewsCache::open_in_memory().unwrap();
        let mut list = list(source.clone(), &cache, 10);

        list.load_initial().await.unwrap();
        assert!(list.is_empty());
        wait_settled(&list).await;

        assert_eq!(source.requested_pages(), [1]);
        list.reload().await.unwrap();
        assert_eq!(ids(&list), ["A", "B"]);
    }

    #[tokio::test]
    async fn full_cache_page_does_not_hit_network() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let cache = NewsCache::open_in_memory().unwrap();
        cache
            .insert((0..5).map(|n| item(&format!("n{n}"), Some(n))).collect())
            .await
            .unwrap();
        let mut list = list(source.clone(), &cache, 2);

        list.load_initial().await.unwrap();
        list.load_more().await.unwrap();

        assert_eq!(ids(&list), ["n4", "n3", "n2", "n1"]);
        assert!(source.requested_pages().is_empty());
        assert!(!list.boundary.is_loading());
    }

    #[tokio::test]
    async fn running_out_of_cache_fetches_next_page() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(vec![item("old", Some(1))])]));
        let cache = NewsCache::open_in_memory().unwrap();
        cache
            .insert(vec![item("new", Some(3)), item("mid", Some(2))])
            .await
            .unwrap();
        let mut list = list(source.clone(), &cache, 2);

        list.load_initial().await.unwrap();
        assert!(source.requested_pages().is_empty());

        list.load_more().await.unwrap();
        wait_settled(&list).await;
        assert_eq!(source.requested_pages(), [1]);

        list.reload().await.unwrap();
        assert_eq!(ids(&list), ["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn short_initial_page_asks_for_more() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let cache = NewsCache::open_in_memory().unwrap();
        cache.insert(vec![item("only", Some(1))]).await.unwrap();
        let mut list = list(source.clone(), &cache, 10);

        list.load_initial().await.unwrap();
        wait_settled(&list).await;

        assert_eq!(ids(&list), ["only"]);
        assert_eq!(source.requested_pages(), [1]);
    }

    #[tokio::test]
    async fn reload_keeps_loaded_window() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let cache = NewsCache::open_in_memory().unwrap();
        cache
            .insert((0..6).map(|n| item(&format!("n{n}"), Some(n))).collect())
            .await
            .unwrap();
        let mut list = list(source, &cache, 2);

        list.load_initial().await.unwrap();
        list.load_more().await.unwrap();
        assert_eq!(list.len(), 4);

        cache.insert(vec![item("latest", Some(100))]).await.unwrap();
        list.reload().await.unwrap();

        assert_eq!(list.len(), 4);
        assert_eq!(list.items()[0].id, "latest");
    }
}
