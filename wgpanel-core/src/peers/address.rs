//! Sequential address allocation
//!
//! Addresses are handed out by bumping the last octet of the most recently
//! assigned one. Freed addresses are never reused, and there is no rollover
//! into the third octet: `x.y.z.255` has no successor.

use crate::error::PeerError;
use crate::peers::PeerRecord;
use std::net::Ipv4Addr;

/// Next candidate after `last_assigned`, failing if a peer already holds it
///
/// Only one step is taken; a collision is reported rather than skipped.
pub fn next_allowed_address(
    peers: &[PeerRecord],
    last_assigned: &str,
) -> Result<String, PeerError> {
    let last = parse_ipv4(last_assigned)?;
    let [a, b, c, d] = last.octets();

    let next = d.checked_add(1).ok_or_else(|| PeerError::InvalidAddress {
        address: format!("{}.{}.{}.256", a, b, c),
    })?;
    let candidate = Ipv4Addr::new(a, b, c, next).to_string();

    if address_in_use(peers, &candidate) {
        return Err(PeerError::AddressInUse { address: candidate });
    }

    Ok(candidate)
}

/// Whether any peer's allowance lists exactly `address`
pub fn address_in_use(peers: &[PeerRecord], address: &str) -> bool {
    peers
        .iter()
        .any(|peer| peer.allowed_addresses().any(|allowed| allowed == address))
}

/// Highest IPv4 address found in any peer's allowance
pub fn last_assigned_address(peers: &[PeerRecord]) -> Option<Ipv4Addr> {
    peers
        .iter()
        .flat_map(|peer| peer.allowed_addresses())
        .filter_map(|address| address.parse::<Ipv4Addr>().ok())
        .max()
}

fn parse_ipv4(address: &str) -> Result<Ipv4Addr, PeerError> {
    let trimmed = address.trim();
    let host = trimmed.split('/').next().unwrap_or(trimmed);
    host.parse().map_err(|_| PeerError::InvalidAddress {
        address: address.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_cidr_suffix() {
        assert_eq!(next_allowed_address(&[], "10.0.0.7/32").unwrap(), "10.0.0.8");
    }

    #[test]
    fn test_no_rollover() {
        let err = next_allowed_address(&[], "10.0.0.255").unwrap_err();
        assert!(matches!(err, PeerError::InvalidAddress { .. }));
    }

    #[test]
    fn test_rejects_garbage() {
        let err = next_allowed_address(&[], "not-an-ip").unwrap_err();
        assert_eq!(
            err,
            PeerError::InvalidAddress {
                address: "not-an-ip".to_string()
            }
        );
    }

    #[test]
    fn test_prefix_match_is_not_a_collision() {
        let peers = vec![PeerRecord::new("a", "", "K=", "10.0.0.25/32")];
        assert_eq!(next_allowed_address(&peers, "10.0.0.1").unwrap(), "10.0.0.2");
    }

    #[test]
    fn test_last_assigned_address_picks_highest() {
        let peers = vec![
            PeerRecord::new("a", "", "KA=", "10.0.0.9/32"),
            PeerRecord::new("b", "", "KB=", "10.0.0.10/32, fd00::a/128"),
            PeerRecord::new("c", "", "KC=", "10.0.0.2/32"),
        ];
        assert_eq!(
            last_assigned_address(&peers),
            Some(Ipv4Addr::new(10, 0, 0, 10))
        );
        assert_eq!(last_assigned_address(&[]), None);
    }
}
