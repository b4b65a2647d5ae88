//! Live connection status module
//!
//! Joins parsed peers with telemetry reported by the WireGuard tooling.
//! Status is read on demand and never persisted.

pub mod merge;
pub mod transfer;
pub mod wg_show;

use crate::error::StatusError;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;

// Public re-exports
pub use merge::{merge, sort_views, PeerView, SortKey, SortOrder};
pub use transfer::parse_data_size;
pub use wg_show::WgShow;

/// Transfer counter shown for peers without telemetry
pub const ZERO_TRANSFER: &str = "0 B";

/// Telemetry for one peer, keyed elsewhere by public key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    /// Whether the peer completed a handshake recently
    pub is_connected: bool,
    /// Latest handshake as reported, e.g. `1 minute, 3 seconds ago`
    pub latest_handshake: Option<String>,
    /// Remote endpoint, e.g. `203.0.113.7:51820`
    pub endpoint: Option<String>,
    /// Human-readable received counter, e.g. `512 MiB`
    pub transfer_received: String,
    /// Human-readable sent counter
    pub transfer_sent: String,
}

impl ConnectionStatus {
    /// Status for a peer the source knows nothing about
    pub fn disconnected() -> Self {
        Self {
            is_connected: false,
            latest_handshake: None,
            endpoint: None,
            transfer_received: ZERO_TRANSFER.to_string(),
            transfer_sent: ZERO_TRANSFER.to_string(),
        }
    }

    /// Received plus sent, in bytes
    pub fn total_usage(&self) -> u64 {
        parse_data_size(&self.transfer_received).saturating_add(parse_data_size(&self.transfer_sent))
    }
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::disconnected()
    }
}

/// Source of live status, keyed by public key
pub trait StatusSource {
    /// Fetch the current status of every known peer
    fn fetch(
        &self,
    ) -> impl Future<Output = Result<HashMap<String, ConnectionStatus>, StatusError>> + Send;
}
