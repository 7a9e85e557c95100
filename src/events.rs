//! Feed event pump.
//!
//! Runs as a task on the tokio runtime, watching the cache's change counter
//! and both request-status streams, and forwards every change to the UI
//! thread over an [`mpsc`] channel.  The UI loop drains the receiver once per
//! tick, so it never blocks on the runtime.
//!
//! ## For contributors
//!
//! To surface another stream in the UI, add a [`FeedEvent`] variant and one
//! more `select!` arm below.

use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::paging::{RequestState, StatusReceiver};

/// Messages sent from the pump to the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// The cache was written; the paged list should reload.
    CacheChanged,
    /// New status for zero-items / end-of-list requests.
    Network(RequestState),
    /// New status for forced refreshes.
    Refresh(RequestState),
}

/// Spawn the pump on `runtime`.
///
/// The task ends when the returned receiver is dropped or every watched
/// stream has closed.
pub fn spawn(
    runtime: &Handle,
    mut changes: watch::Receiver<u64>,
    mut network: StatusReceiver,
    mut refresh: StatusReceiver,
) -> mpsc::UnboundedReceiver<FeedEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    runtime.spawn(async move {
        loop {
            let event = tokio::select! {
                changed = changes.changed() => match changed {
                    Ok(()) => Some(FeedEvent::CacheChanged),
                    Err(_) => break,
                },
                changed = network.changed() => match changed {
                    Ok(()) => network.borrow_and_update().clone().map(FeedEvent::Network),
                    Err(_) => break,
                },
                changed = refresh.changed() => match changed {
                    Ok(()) => refresh.borrow_and_update().clone().map(FeedEvent::Refresh),
                    Err(_) => break,
                },
            };

            if let Some(event) = event {
                // If the receiver is gone the UI has exited; stop pumping.
                if tx.send(event).is_err() {
                    break;
                }
            }
        }
        debug!("feed event pump stopped");
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::cache::NewsCache;
    use crate::paging::state::{RequestKind, StatusChannels};
    use crate::source::testing::item;

    async fn next(rx: &mut mpsc::UnboundedReceiver<FeedEvent>) -> FeedEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event arrives")
            .expect("pump running")
    }

    #[tokio::test]
    async fn forwards_status_changes() {
        let cache = NewsCache::open_in_memory().unwrap();
        let status = StatusChannels::new();
        let mut rx = spawn(
            &Handle::current(),
            cache.subscribe(),
            status.network(),
            status.refresh(),
        );

        status.publish(RequestKind::Append, RequestState::Running);
        assert_eq!(next(&mut rx).await, FeedEvent::Network(RequestState::Running));

        status.publish(RequestKind::Refresh, RequestState::Failed("down".into()));
        assert_eq!(
            next(&mut rx).await,
            FeedEvent::Refresh(RequestState::Failed("down".into()))
        );
    }

    #[tokio::test]
    async fn forwards_cache_writes() {
        let cache = NewsCache::open_in_memory().unwrap();
        let status = StatusChannels::new();
        let mut rx = spawn(
            &Handle::current(),
            cache.subscribe(),
            status.network(),
            status.refresh(),
        );

        cache.insert(vec![item("a", None)]).await.unwrap();
        assert_eq!(next(&mut rx).await, FeedEvent::CacheChanged);
    }
}
