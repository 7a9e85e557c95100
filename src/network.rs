//! Metered-connection policy.
//!
//! The reader may be told to download only over WiFi.  The paging controller
//! consults [`NetworkPolicy::check`] before every request; a refusal is
//! reported like any other failed fetch and can be retried once the
//! connection or the preference changes.

use std::str::FromStr;

use tracing::debug;

use crate::error::FetchError;

/// The kind of connection currently available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    Wifi,
    /// Cellular or any other metered link.
    Mobile,
    Offline,
}

impl FromStr for Connection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wifi" => Ok(Connection::Wifi),
            "mobile" | "metered" | "cellular" => Ok(Connection::Mobile),
            "offline" | "none" => Ok(Connection::Offline),
            other => Err(format!("unknown connection kind: {other}")),
        }
    }
}

/// Whether a fetch may go out over the current connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkPolicy {
    pub connection: Connection,
    /// User preference: allow downloads over metered connections.
    pub allow_metered: bool,
}

impl Default for NetworkPolicy {
    fn default() -> Self {
        Self {
            connection: Connection::Wifi,
            allow_metered: false,
        }
    }
}

impl NetworkPolicy {
    pub fn check(&self) -> Result<(), FetchError> {
        match (self.connection, self.allow_metered) {
            (Connection::Wifi, _) => Ok(()),
            (Connection::Mobile, true) => {
                debug!("downloading over a metered connection");
                Ok(())
            }
            (Connection::Mobile, false) => Err(FetchError::Blocked(
                "feed can only be downloaded over WiFi".to_string(),
            )),
            (Connection::Offline, _) => Err(FetchError::Blocked(
                "no network connection available".to_string(),
            )),
        }
    }
}
