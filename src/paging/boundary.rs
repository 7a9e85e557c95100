//! The boundary callback: decides when the network is asked for more news.
//!
//! The paged list calls [`BoundaryCallback::on_zero_items_loaded`] when the
//! cache is empty and [`BoundaryCallback::on_item_at_end_loaded`] when it has
//! run out of cached rows.  Either trigger fetches the page under the cursor
//! and upserts it into the cache, which in turn makes the list grow.
//! [`BoundaryCallback::refresh`] starts over from page 1 and replaces the
//! cache; [`BoundaryCallback::retry`] repeats the last failed request.
//!
//! At most one request is in flight per controller.  The guard is a plain
//! reject-if-busy flag: a trigger that arrives while a request is running is
//! dropped, never queued.
//!
//! Triggers return immediately.  The request itself runs as a task on the
//! runtime handed to [`BoundaryCallback::new`]; the returned [`JoinHandle`]
//! may be awaited or ignored.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::state::{RequestKind, RequestState, StatusChannels, StatusReceiver};
use crate::cache::NewsCache;
use crate::error::FetchError;
use crate::network::NetworkPolicy;
use crate::source::{NewsItem, NewsSource};

/// Knobs applied to every request a controller makes.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub policy: NetworkPolicy,
    /// Upper bound on one gateway call.  A transport that never answers
    /// would otherwise hold the in-flight guard forever.
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            policy: NetworkPolicy::default(),
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Clone)]
pub struct BoundaryCallback {
    inner: Arc<Inner>,
}

struct Inner {
    source: Arc<dyn NewsSource>,
    cache: NewsCache,
    status: StatusChannels,
    options: FetchOptions,
    runtime: Handle,
    /// Next page to request, 1-based.
    next_page: AtomicU32,
    in_flight: AtomicBool,
    last_failed: Mutex<Option<RequestKind>>,
}

impl BoundaryCallback {
    pub fn new(
        source: Arc<dyn NewsSource>,
        cache: NewsCache,
        status: StatusChannels,
        options: FetchOptions,
        runtime: Handle,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                cache,
                status,
                options,
                runtime,
                next_page: AtomicU32::new(1),
                in_flight: AtomicBool::new(false),
                last_failed: Mutex::new(None),
            }),
        }
    }

    // -- triggers ------------------------------------------------------------

    /// The cache had nothing to show on the initial load.
    pub fn on_zero_items_loaded(&self) -> Option<JoinHandle<()>> {
        debug!("zero items loaded");
        self.request_and_save(RequestKind::Append)
    }

    /// The last cached item has been loaded into the list.
    pub fn on_item_at_end_loaded(&self, item: &NewsItem) -> Option<JoinHandle<()>> {
        debug!(id = %item.id, "item at end loaded");
        self.request_and_save(RequestKind::Append)
    }

    /// Drop the cache and reload from page 1.
    pub fn refresh(&self) -> Option<JoinHandle<()>> {
        debug!("refresh requested");
        self.request_and_save(RequestKind::Refresh)
    }

    /// Repeat the most recent failed request with the cursor untouched.
    ///
    /// Returns `None` when a request is in flight or nothing has failed since
    /// the last success.
    pub fn retry(&self) -> Option<JoinHandle<()>> {
        if !self.inner.try_acquire() {
            debug!("retry dropped, request already in flight");
            return None;
        }
        let Some(kind) = self.inner.take_failed() else {
            debug!("retry dropped, nothing to retry");
            self.inner.release();
            return None;
        };
        debug!(?kind, "retrying failed request");
        Some(self.launch(kind))
    }

    // -- observers -----------------------------------------------------------

    /// The page the next append request will ask for.
    pub fn next_page(&self) -> u32 {
        self.inner.next_page.load(Ordering::Acquire)
    }

    pub fn is_loading(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    pub fn network_state(&self) -> StatusReceiver {
        self.inner.status.network()
    }

    pub fn refresh_state(&self) -> StatusReceiver {
        self.inner.status.refresh()
    }

    // -- request flow ----------------------------------------------------------

    fn request_and_save(&self, kind: RequestKind) -> Option<JoinHandle<()>> {
        if !self.inner.try_acquire() {
            debug!(?kind, "request already in flight, trigger dropped");
            return None;
        }
        Some(self.launch(kind))
    }

    /// Start a request.  The caller holds the in-flight guard.
    fn launch(&self, kind: RequestKind) -> JoinHandle<()> {
        let inner = &self.inner;
        inner.status.publish(kind, RequestState::Running);

        if kind == RequestKind::Refresh {
            inner.next_page.store(1, Ordering::Release);
        }
        let page = inner.next_page.load(Ordering::Acquire);

        let inner = Arc::clone(inner);
        self.inner.runtime.spawn(async move { inner.run(kind, page).await })
    }
}

impl Inner {
    fn try_acquire(&self) -> bool {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn release(&self) {
        self.in_flight.store(false, Ordering::Release);
    }

    fn take_failed(&self) -> Option<RequestKind> {
        self.last_failed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn set_failed(&self, kind: Option<RequestKind>) {
        *self
            .last_failed
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = kind;
    }

    async fn run(&self, kind: RequestKind, page: u32) {
        match self.fetch_and_save(kind, page).await {
            Ok(count) => {
                self.next_page.store(page + 1, Ordering::Release);
                self.set_failed(None);
                self.release();
                info!(?kind, page, count, "news page saved");
                self.status.publish(kind, RequestState::Success);
            }
            Err(err) => {
                warn!(?kind, page, error = %err, "news request failed");
                self.set_failed(Some(kind));
                self.release();
                self.status.publish(kind, RequestState::Failed(err.to_string()));
            }
        }
    }

    async fn fetch_and_save(&self, kind: RequestKind, page: u32) -> Result<usize, FetchError> {
        self.options.policy.check()?;

        debug!(source = self.source.name(), page, "fetching news");
        let items = tokio::time::timeout(self.options.timeout, self.source.fetch(page))
            .await
            .map_err(|_| FetchError::Timeout(self.options.timeout))??;

        let count = items.len();
        match kind {
            RequestKind::Refresh => self.cache.replace_all(items).await?,
            RequestKind::Append => self.cache.insert(items).await?,
        }
        Ok(count)
    }
}
