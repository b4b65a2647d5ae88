//! Pure mutations over the peer sequence
//!
//! Every operation returns a new sequence and leaves its input untouched.
//! Writing the result back to disk is the store's job.

use crate::error::PeerError;
use crate::peers::PeerRecord;
use serde::Serialize;

/// Outcome of a bulk enable/disable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkUpdate {
    /// Resulting peer sequence
    #[serde(skip)]
    pub peers: Vec<PeerRecord>,
    /// Keys that matched a peer, in request order
    pub updated: Vec<String>,
    /// Keys that matched nothing, in request order
    pub not_found: Vec<String>,
}

/// Set the enabled flag of the peer with `public_key`
///
/// Setting a flag to its current value succeeds and changes nothing.
pub fn set_enabled(
    peers: &[PeerRecord],
    public_key: &str,
    enabled: bool,
) -> Result<Vec<PeerRecord>, PeerError> {
    let index = peers
        .iter()
        .position(|peer| peer.public_key == public_key)
        .ok_or_else(|| PeerError::NotFound {
            public_key: public_key.to_string(),
        })?;

    let mut next = peers.to_vec();
    next[index].enabled = enabled;
    Ok(next)
}

/// Apply `set_enabled` to every key; missing keys are reported, not fatal
pub fn bulk_set_enabled<I, K>(peers: &[PeerRecord], public_keys: I, enabled: bool) -> BulkUpdate
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    let mut update = BulkUpdate {
        peers: peers.to_vec(),
        ..BulkUpdate::default()
    };

    for key in public_keys {
        let key = key.as_ref();
        if update.updated.iter().any(|k| k == key) || update.not_found.iter().any(|k| k == key) {
            continue;
        }

        match update.peers.iter_mut().find(|peer| peer.public_key == key) {
            Some(peer) => {
                peer.enabled = enabled;
                update.updated.push(key.to_string());
            }
            None => update.not_found.push(key.to_string()),
        }
    }

    update
}

/// Append `new_peer`, rejecting any collision on key, name or email
///
/// The label must also survive a write and re-read unchanged.
pub fn insert(peers: &[PeerRecord], new_peer: PeerRecord) -> Result<Vec<PeerRecord>, PeerError> {
    new_peer.label().validate()?;

    if let Some(identity) = find_collision(peers, &new_peer) {
        return Err(PeerError::DuplicateKey { identity });
    }

    let mut next = peers.to_vec();
    next.push(new_peer);
    Ok(next)
}

/// First identity of `candidate` already used by an existing peer
pub(crate) fn find_collision(peers: &[PeerRecord], candidate: &PeerRecord) -> Option<String> {
    peers.iter().find_map(|peer| {
        if !candidate.public_key.is_empty() && peer.public_key == candidate.public_key {
            Some(candidate.public_key.clone())
        } else if !candidate.name.is_empty() && peer.name == candidate.name {
            Some(candidate.name.clone())
        } else if !candidate.email.is_empty() && peer.email == candidate.email {
            Some(candidate.email.clone())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<PeerRecord> {
        vec![
            PeerRecord::new("alice", "alice@example.com", "KA=", "10.0.0.2/32"),
            PeerRecord::new("bob", "", "KB=", "10.0.0.3/32"),
        ]
    }

    #[test]
    fn test_set_enabled_does_not_touch_input() {
        let peers = sample();
        let next = set_enabled(&peers, "KA=", false).unwrap();
        assert!(!next[0].enabled);
        assert!(peers[0].enabled);
        assert_eq!(next[1], peers[1]);
    }

    #[test]
    fn test_bulk_skips_repeated_keys() {
        let update = bulk_set_enabled(&sample(), ["KB=", "KB=", "KX=", "KX="], false);
        assert_eq!(update.updated, vec!["KB="]);
        assert_eq!(update.not_found, vec!["KX="]);
    }

    #[test]
    fn test_collision_by_email() {
        let candidate = PeerRecord::new("alice2", "alice@example.com", "KN=", "10.0.0.9/32");
        assert_eq!(
            find_collision(&sample(), &candidate),
            Some("alice@example.com".to_string())
        );
    }

    #[test]
    fn test_empty_email_never_collides() {
        let candidate = PeerRecord::new("carol", "", "KC=", "10.0.0.4/32");
        assert_eq!(find_collision(&sample(), &candidate), None);
    }
}
