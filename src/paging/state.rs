use std::sync::Arc;

use tokio::sync::watch;

/// Status of the latest request on one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestState {
    Running,
    Success,
    /// Carries a message suitable for showing to the user.
    Failed(String),
}

/// Which path a request takes through the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Zero-items or end-of-list paging: upsert into the cache.
    Append,
    /// Forced refresh: restart at page 1 and replace the cache.
    Refresh,
}

/// A status stream.  `None` until the first request on that channel.
pub type StatusReceiver = watch::Receiver<Option<RequestState>>;

/// The write side of the normal-paging and refresh status streams.
///
/// Owned by the repository so that every controller it builds publishes into
/// the same live streams.
#[derive(Clone)]
pub struct StatusChannels {
    network: Arc<watch::Sender<Option<RequestState>>>,
    refresh: Arc<watch::Sender<Option<RequestState>>>,
}

impl StatusChannels {
    pub fn new() -> Self {
        let (network, _) = watch::channel(None);
        let (refresh, _) = watch::channel(None);
        Self {
            network: Arc::new(network),
            refresh: Arc::new(refresh),
        }
    }

    pub fn publish(&self, kind: RequestKind, state: RequestState) {
        let channel = match kind {
            RequestKind::Append => &self.network,
            RequestKind::Refresh => &self.refresh,
        };
        // `send_replace` stores the value even when nobody is subscribed yet.
        channel.send_replace(Some(state));
    }

    pub fn network(&self) -> StatusReceiver {
        self.network.subscribe()
    }

    pub fn refresh(&self) -> StatusReceiver {
        self.refresh.subscribe()
    }
}

impl Default for StatusChannels {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_start_idle() {
        let status = StatusChannels::new();
        assert_eq!(*status.network().borrow(), None);
        assert_eq!(*status.refresh().borrow(), None);
    }

    #[test]
    fn publish_routes_by_kind() {
        let status = StatusChannels::new();
        let network = status.network();
        let refresh = status.refresh();

        status.publish(RequestKind::Refresh, RequestState::Running);
        assert_eq!(*refresh.borrow(), Some(RequestState::Running));
        assert_eq!(*network.borrow(), None);

        status.publish(RequestKind::Append, RequestState::Failed("boom".into()));
        assert_eq!(*network.borrow(), Some(RequestState::Failed("boom".into())));
    }

    #[test]
    fn late_subscribers_see_last_value() {
        let status = StatusChannels::new();
        status.publish(RequestKind::Append, RequestState::Success);
        assert_eq!(*status.network().borrow(), Some(RequestState::Success));
    }
}
