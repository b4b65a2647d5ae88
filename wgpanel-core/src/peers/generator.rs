//! Configuration text generator
//!
//! Inverse of the parser for its own output: every peer becomes a fixed
//! four-line block, commented out line by line when the peer is disabled.

use crate::peers::{
    LineForm, PeerRecord, ALLOWED_IPS_FIELD, COMMENT_MARKER, PEER_MARKER, PUBLIC_KEY_FIELD,
};
use std::fmt::Write;

/// A peer block ready to be rendered
#[derive(Debug, Clone, Copy)]
pub enum PeerBlock<'a> {
    Active(&'a PeerRecord),
    Disabled(&'a PeerRecord),
}

impl<'a> From<&'a PeerRecord> for PeerBlock<'a> {
    fn from(peer: &'a PeerRecord) -> Self {
        if peer.enabled {
            PeerBlock::Active(peer)
        } else {
            PeerBlock::Disabled(peer)
        }
    }
}

impl PeerBlock<'_> {
    fn form(&self) -> LineForm {
        match self {
            PeerBlock::Active(_) => LineForm::Active,
            PeerBlock::Disabled(_) => LineForm::Commented,
        }
    }

    fn peer(&self) -> &PeerRecord {
        match self {
            PeerBlock::Active(peer) | PeerBlock::Disabled(peer) => peer,
        }
    }

    /// Write the block followed by a blank separator line
    fn render_into(&self, out: &mut String) {
        let peer = self.peer();
        let (field_prefix, label_prefix) = match self.form() {
            LineForm::Active => (String::new(), COMMENT_MARKER.to_string()),
            LineForm::Commented => (COMMENT_MARKER.to_string(), format!("{} ", COMMENT_MARKER)),
        };

        // Writing into a String cannot fail
        let _ = writeln!(out, "{}{}", field_prefix, PEER_MARKER);
        let _ = writeln!(out, "{}{}", label_prefix, peer.label().render());
        let _ = writeln!(out, "{}{} = {}", field_prefix, PUBLIC_KEY_FIELD, peer.public_key);
        let _ = writeln!(
            out,
            "{}{} = {}",
            field_prefix, ALLOWED_IPS_FIELD, peer.allowed_networks
        );
        out.push('\n');
    }
}

/// Render the interface prefix followed by one block per peer, in order
pub fn generate(interface_prefix: &str, peers: &[PeerRecord]) -> String {
    let mut out = String::new();

    if !interface_prefix.is_empty() {
        out.push_str(interface_prefix);
        out.push_str("\n\n");
    }

    for peer in peers {
        PeerBlock::from(peer).render_into(&mut out);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_block_layout() {
        let peer = PeerRecord::new("alice", "", "K1=", "10.0.0.2/32");
        let text = generate("[Interface]", &[peer]);
        assert_eq!(
            text,
            "[Interface]\n\n[Peer]\n#alice\nPublicKey = K1=\nAllowedIPs = 10.0.0.2/32\n\n"
        );
    }

    #[test]
    fn test_disabled_block_layout() {
        let mut peer = PeerRecord::new("bob", "bob@example.com", "K2=", "10.0.0.3/32");
        peer.enabled = false;
        let text = generate("", &[peer]);
        assert_eq!(
            text,
            "#[Peer]\n# bob (bob@example.com)\n#PublicKey = K2=\n#AllowedIPs = 10.0.0.3/32\n\n"
        );
    }

    #[test]
    fn test_no_peers_emits_prefix_only() {
        assert_eq!(generate("[Interface]\nListenPort = 51820", &[]), "[Interface]\nListenPort = 51820\n\n");
        assert_eq!(generate("", &[]), "");
    }
}
