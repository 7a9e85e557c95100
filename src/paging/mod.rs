//! Incremental loading of the news feed.
//!
//! * [`boundary`]: the controller that decides when to hit the network.
//! * [`paged_list`]: the lazily loaded view over the cache that fires it.
//! * [`repository`]: wires both to a cache and a source.
//! * [`state`]: request status types and their broadcast channels.

pub mod boundary;
pub mod paged_list;
pub mod repository;
pub mod state;

pub use boundary::FetchOptions;
pub use repository::NewsRepository;
pub use state::{RequestState, StatusReceiver};
