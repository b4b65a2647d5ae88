//! Tests for peer mutations and address allocation

use wgpanel_core::error::PeerError;
use wgpanel_core::peers::{
    bulk_set_enabled, insert, last_assigned_address, next_allowed_address, set_enabled, PeerRecord,
};

fn peers() -> Vec<PeerRecord> {
    vec![
        PeerRecord::new("alice", "alice@example.com", "KA=", "10.0.0.2/32"),
        PeerRecord::new("bob", "bob@example.com", "KB=", "10.0.0.3/32"),
        PeerRecord::new("carol", "", "KC=", "10.0.0.4/32"),
    ]
}

#[test]
fn test_set_enabled_is_idempotent() {
    let once = set_enabled(&peers(), "KB=", false).unwrap();
    let twice = set_enabled(&once, "KB=", false).unwrap();
    assert_eq!(once, twice);
    assert!(!twice[1].enabled);
}

#[test]
fn test_enable_already_enabled_is_noop() {
    let original = peers();
    let next = set_enabled(&original, "KA=", true).unwrap();
    assert_eq!(next, original);
}

#[test]
fn test_set_enabled_unknown_key() {
    let err = set_enabled(&peers(), "NOPE=", false).unwrap_err();
    assert_eq!(
        err,
        PeerError::NotFound {
            public_key: "NOPE=".to_string()
        }
    );
    assert_eq!(err.to_string(), "Peer not found: NOPE=");
}

#[test]
fn test_bulk_partial_success() {
    let update = bulk_set_enabled(&peers(), ["KA=", "MISSING=", "KC="], false);

    assert_eq!(update.updated, vec!["KA=", "KC="]);
    assert_eq!(update.not_found, vec!["MISSING="]);
    assert!(!update.peers[0].enabled);
    assert!(update.peers[1].enabled);
    assert!(!update.peers[2].enabled);
}

#[test]
fn test_bulk_with_no_matches_changes_nothing() {
    let original = peers();
    let update = bulk_set_enabled(&original, vec!["X=".to_string(), "Y=".to_string()], false);
    assert!(update.updated.is_empty());
    assert_eq!(update.not_found.len(), 2);
    assert_eq!(update.peers, original);
}

#[test]
fn test_insert_appends_at_end() {
    let next = insert(&peers(), PeerRecord::new("dave", "dave@example.com", "KD=", "10.0.0.5/32")).unwrap();
    assert_eq!(next.len(), 4);
    assert_eq!(next[3].name, "dave");
    assert!(next[3].enabled);
    assert_eq!(&next[..3], &peers()[..]);
}

#[test]
fn test_insert_rejects_duplicate_key() {
    let err = insert(&peers(), PeerRecord::new("zed", "", "KB=", "10.0.0.9/32")).unwrap_err();
    assert_eq!(
        err,
        PeerError::DuplicateKey {
            identity: "KB=".to_string()
        }
    );
}

#[test]
fn test_insert_rejects_duplicate_name_or_email() {
    assert!(matches!(
        insert(&peers(), PeerRecord::new("carol", "", "NEW1=", "10.0.0.9/32")),
        Err(PeerError::DuplicateKey { .. })
    ));
    assert!(matches!(
        insert(&peers(), PeerRecord::new("robert", "bob@example.com", "NEW2=", "10.0.0.9/32")),
        Err(PeerError::DuplicateKey { .. })
    ));
}

#[test]
fn test_insert_allows_two_peers_without_email() {
    let next = insert(&peers(), PeerRecord::new("erin", "", "KE=", "10.0.0.6/32")).unwrap();
    assert_eq!(next.len(), 4);
}

#[test]
fn test_next_address_on_empty_config() {
    assert_eq!(next_allowed_address(&[], "10.0.0.1").unwrap(), "10.0.0.2");
}

#[test]
fn test_next_address_accepts_prefix_length() {
    assert_eq!(next_allowed_address(&[], "10.0.0.7/32").unwrap(), "10.0.0.8");
}

#[test]
fn test_next_address_collision_is_reported() {
    let taken = vec![PeerRecord::new("alice", "", "KA=", "10.0.0.2/32")];
    assert_eq!(
        next_allowed_address(&taken, "10.0.0.1").unwrap_err(),
        PeerError::AddressInUse {
            address: "10.0.0.2".to_string()
        }
    );
}

#[test]
fn test_next_address_does_not_match_substrings() {
    let peers = vec![PeerRecord::new("alice", "", "KA=", "10.0.0.20/32")];
    assert_eq!(next_allowed_address(&peers, "10.0.0.1").unwrap(), "10.0.0.2");
}

#[test]
fn test_next_address_does_not_roll_over() {
    assert!(matches!(
        next_allowed_address(&[], "10.0.0.255"),
        Err(PeerError::InvalidAddress { .. })
    ));
}

#[test]
fn test_next_address_rejects_garbage() {
    assert!(matches!(
        next_allowed_address(&[], "not-an-ip"),
        Err(PeerError::InvalidAddress { .. })
    ));
}

#[test]
fn test_last_assigned_is_highest_address() {
    let mut list = peers();
    list.push(PeerRecord::new("wide", "", "KW=", "10.0.0.10/32, 192.168.1.0/24"));
    assert_eq!(
        last_assigned_address(&list).map(|a| a.to_string()),
        Some("192.168.1.0".to_string())
    );
    assert_eq!(last_assigned_address(&[]), None);
}
