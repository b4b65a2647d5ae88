//! Join of peers with live status, plus presentation sorting
//!
//! Sorting happens here and only here; the peer sequence itself always
//! keeps file order.

use crate::peers::PeerRecord;
use crate::status::ConnectionStatus;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

/// A peer together with its current status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerView {
    #[serde(flatten)]
    pub peer: PeerRecord,
    pub connection_status: ConnectionStatus,
}

/// Join `peers` with `status_by_key`; unknown peers get a disconnected status
pub fn merge(
    peers: &[PeerRecord],
    status_by_key: &HashMap<String, ConnectionStatus>,
) -> Vec<PeerView> {
    peers
        .iter()
        .map(|peer| PeerView {
            peer: peer.clone(),
            connection_status: status_by_key
                .get(&peer.public_key)
                .cloned()
                .unwrap_or_default(),
        })
        .collect()
}

/// Column to sort a status listing by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Name,
    Status,
    #[default]
    Connection,
    Usage,
}

impl SortKey {
    /// Order used when a column is first selected
    pub fn default_order(self) -> SortOrder {
        match self {
            SortKey::Name => SortOrder::Ascending,
            SortKey::Status | SortKey::Connection | SortKey::Usage => SortOrder::Descending,
        }
    }

    fn compare(self, a: &PeerView, b: &PeerView) -> Ordering {
        match self {
            SortKey::Name => a.peer.name.to_lowercase().cmp(&b.peer.name.to_lowercase()),
            SortKey::Status => a.peer.enabled.cmp(&b.peer.enabled),
            SortKey::Connection => a
                .connection_status
                .is_connected
                .cmp(&b.connection_status.is_connected),
            SortKey::Usage => a
                .connection_status
                .total_usage()
                .cmp(&b.connection_status.total_usage()),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "status" => Ok(SortKey::Status),
            "connection" => Ok(SortKey::Connection),
            "usage" => Ok(SortKey::Usage),
            other => Err(format!("unknown sort key: {}", other)),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Stable sort of a listing; ties keep file order
pub fn sort_views(views: &mut [PeerView], key: SortKey, order: SortOrder) {
    views.sort_by(|a, b| {
        let ordering = key.compare(a, b);
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}
