//! Composition root for the news feed: cache + gateway + boundary callback.

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use super::boundary::{BoundaryCallback, FetchOptions};
use super::paged_list::PagedList;
use super::state::{StatusChannels, StatusReceiver};
use crate::cache::NewsCache;
use crate::error::CacheError;
use crate::source::NewsSource;

/// Everything the presentation layer needs to show the feed.
pub struct NewsFeed {
    /// Paged view over the cache; pages in more news at its end.
    pub pages: PagedList,
    /// Status of zero-items / end-of-list requests.
    pub network_state: StatusReceiver,
    /// Status of forced refreshes.
    pub refresh_state: StatusReceiver,
}

pub struct NewsRepository {
    source: Arc<dyn NewsSource>,
    cache: NewsCache,
    options: FetchOptions,
    page_size: usize,
    runtime: Handle,
    status: StatusChannels,
    boundary: BoundaryCallback,
}

impl NewsRepository {
    pub fn new(
        source: Arc<dyn NewsSource>,
        cache: NewsCache,
        options: FetchOptions,
        page_size: usize,
        runtime: Handle,
    ) -> Self {
        let status = StatusChannels::new();
        let boundary = BoundaryCallback::new(
            source.clone(),
            cache.clone(),
            status.clone(),
            options,
            runtime.clone(),
        );
        Self {
            source,
            cache,
            options,
            page_size,
            runtime,
            status,
            boundary,
        }
    }

    /// Build a fresh paged view of the cache, bound to a fresh boundary
    /// callback.  The status receivers always follow the same live streams,
    /// whichever callback is currently publishing.
    pub fn fetch(&mut self) -> NewsFeed {
        debug!("building news feed");
        self.boundary = BoundaryCallback::new(
            self.source.clone(),
            self.cache.clone(),
            self.status.clone(),
            self.options,
            self.runtime.clone(),
        );

        NewsFeed {
            pages: PagedList::new(self.cache.clone(), self.boundary.clone(), self.page_size),
            network_state: self.status.network(),
            refresh_state: self.status.refresh(),
        }
    }

    /// Build a feed, force a refresh and load the first cached page.
    ///
    /// The refresh is launched before the cache is read, so the short-read
    /// trigger of a sparse cache cannot take the guard first; the refresh
    /// replaces whatever was cached and the trigger is dropped.
    pub async fn open(&mut self) -> Result<NewsFeed, CacheError> {
        let mut feed = self.fetch();
        if !self.refresh() {
            warn!("startup refresh was not accepted");
        }
        feed.pages.load_initial().await?;
        Ok(feed)
    }

    /// Force a refresh.  Returns `false` if a request was already running.
    pub fn refresh(&self) -> bool {
        info!("refreshing news");
        self.boundary.refresh().is_some()
    }

    /// Retry the last failed request.  Returns `false` if there was nothing to
    /// retry or a request was already running.
    pub fn retry(&self) -> bool {
        info!("retrying news request");
        self.boundary.retry().is_some()
    }

    pub fn cache(&self) -> &NewsCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio::sync::Semaphore;

    use crate::paging::state::RequestState;
    use crate::source::testing::{failure, item, ScriptedSource};

    fn repository(source: Arc<ScriptedSource>) -> NewsRepository {
        NewsRepository::new(
            source,
            NewsCache::open_in_memory().unwrap(),
            FetchOptions::default(),
            10,
            Handle::current(),
        )
    }

    async fn wait_for(
        rx: &mut StatusReceiver,
        done: impl FnMut(&Option<RequestState>) -> bool,
    ) {
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(done))
            .await
            .expect("status reached")
            .expect("status channel open");
    }

    fn settled(state: &Option<RequestState>) -> bool {
        matches!(state, Some(RequestState::Success | RequestState::Failed(_)))
    }

    #[tokio::test]
    async fn fetch_pages_from_network_into_cache() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(vec![
            item("A", Some(2)),
            item("B", Some(1)),
        ])]));
        let mut repo = repository(source.clone());

        let mut feed = repo.fetch();
        feed.pages.load_initial().await.unwrap();
        wait_for(&mut feed.network_state, settled).await;

        feed.pages.reload().await.unwrap();
        assert_eq!(feed.pages.len(), 2);
        assert_eq!(repo.cache().count().await.unwrap(), 2);
        assert_eq!(source.requested_pages(), [1]);
    }

    #[tokio::test]
    async fn refresh_replaces_cached_news() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(vec![item("A", Some(1)), item("B", Some(2))]),
            Ok(vec![item("C", Some(3))]),
        ]));
        let mut repo = repository(source.clone());
        let mut feed = repo.fetch();

        feed.pages.load_initial().await.unwrap();
        wait_for(&mut feed.network_state, settled).await;

        assert!(repo.refresh());
        wait_for(&mut feed.refresh_state, settled).await;

        feed.pages.reload().await.unwrap();
        let ids: Vec<&str> = feed.pages.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["C"]);
        assert_eq!(source.requested_pages(), [1, 1]);
    }

    #[tokio::test]
    async fn retry_delegates_to_current_callback() {
        let source = Arc::new(ScriptedSource::new(vec![
            failure("unreachable"),
            Ok(vec![item("A", None)]),
        ]));
        let mut repo = repository(source.clone());
        let mut feed = repo.fetch();

        assert!(!repo.retry(), "nothing to retry yet");

        feed.pages.load_initial().await.unwrap();
        wait_for(&mut feed.network_state, settled).await;
        assert_eq!(
            *feed.network_state.borrow(),
            Some(RequestState::Failed("unreachable".to_string()))
        );

        assert!(repo.retry());
        wait_for(&mut feed.network_state, |s| *s == Some(RequestState::Success)).await;
        assert_eq!(source.requested_pages(), [1, 1]);
    }

    #[tokio::test]
    async fn open_refreshes_a_sparse_cache() {
        let gate = Arc::new(Semaphore::new(0));
        let source = Arc::new(ScriptedSource::gated(
            vec![Ok(vec![item("fresh", Some(2))])],
            gate.clone(),
        ));
        let cache = NewsCache::open_in_memory().unwrap();
        cache.insert(vec![item("stale", Some(1))]).await.unwrap();
        let mut repo = NewsRepository::new(
            source.clone(),
            cache.clone(),
            FetchOptions::default(),
            10,
            Handle::current(),
        );

        let mut feed = repo.open().await.unwrap();
        let ids: Vec<&str> = feed.pages.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["stale"]);
        assert!(!repo.retry(), "the refresh still holds the guard");

        gate.add_permits(1);
        wait_for(&mut feed.refresh_state, |s| *s == Some(RequestState::Success)).await;

        let ids: Vec<String> = cache
            .load_page(10, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, ["fresh"]);
        assert_eq!(source.requested_pages(), [1]);
        assert_eq!(*feed.network_state.borrow(), None, "short read was dropped");
    }

    #[tokio::test]
    async fn refetch_keeps_the_same_status_streams() {
        let source = Arc::new(ScriptedSource::new(vec![failure("down")]));
        let mut repo = repository(source);

        let mut first = repo.fetch();
        first.pages.load_initial().await.unwrap();
        wait_for(&mut first.network_state, settled).await;

        let second = repo.fetch();
        assert_eq!(
            *second.network_state.borrow(),
            Some(RequestState::Failed("down".to_string())),
            "new feed sees the last published status"
        );
        assert!(!repo.retry(), "a fresh callback has no failure to retry");
    }
}
