//! Peer record model
//!
//! One `[Peer]` block of the server configuration, plus the human-readable
//! label stored in the comment line that precedes its key fields.

use crate::error::PeerError;
use crate::peers::PEER_MARKER;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// In-memory representation of one peer entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRecord {
    /// Display name taken from the label comment
    pub name: String,

    /// Email taken from the label comment, empty when absent
    pub email: String,

    /// Opaque public key, the stable handle for toggling
    pub public_key: String,

    /// Raw AllowedIPs value, kept verbatim
    pub allowed_networks: String,

    /// Whether the block is active (uncommented)
    pub enabled: bool,
}

impl PeerRecord {
    /// Create an enabled peer
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        public_key: impl Into<String>,
        allowed_networks: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            public_key: public_key.into(),
            allowed_networks: allowed_networks.into(),
            enabled: true,
        }
    }

    /// A record is worth keeping only if it has a key or an allowance
    pub fn has_content(&self) -> bool {
        !self.public_key.is_empty() || !self.allowed_networks.is_empty()
    }

    /// Label as it is written back into the configuration
    pub fn label(&self) -> PeerLabel {
        PeerLabel {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    /// Individual addresses listed in the allowance, without prefix lengths
    pub fn allowed_addresses(&self) -> impl Iterator<Item = &str> {
        self.allowed_networks
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| entry.split('/').next().unwrap_or(entry))
    }
}

/// Name and email carried by a peer's label comment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerLabel {
    pub name: String,
    pub email: String,
}

impl PeerLabel {
    /// Interpret the text of a bare comment line (marker already stripped)
    ///
    /// Accepted shapes, in order: `name (email)`, a bare email (name becomes
    /// the local part), or a plain name.
    pub fn parse(text: &str) -> Self {
        static NAME_EMAIL: OnceLock<Regex> = OnceLock::new();
        let pattern = NAME_EMAIL.get_or_init(|| {
            Regex::new(r"^(.+?)\s*\((.+@.+)\)$").expect("Failed to compile label pattern")
        });

        let text = text.trim();

        if let Some(caps) = pattern.captures(text) {
            return Self {
                name: caps[1].trim().to_string(),
                email: caps[2].trim().to_string(),
            };
        }

        if text.contains('@') {
            return Self {
                name: text.split('@').next().unwrap_or_default().to_string(),
                email: text.to_string(),
            };
        }

        Self {
            name: text.to_string(),
            email: String::new(),
        }
    }

    /// Reject labels that would not parse back to the same name and email
    ///
    /// The name may not look like an email, a field or a section marker,
    /// and an email needs a name to sit next to.
    pub fn validate(&self) -> Result<(), PeerError> {
        let name = self.name.as_str();
        let email = self.email.as_str();

        let name_ok = name == name.trim()
            && !name.contains(['=', '@', '\n', '\r'])
            && name != PEER_MARKER
            && (email.is_empty() || !name.contains(['(', ')']));

        let email_ok = email.is_empty()
            || (!name.is_empty()
                && !email.contains(|c: char| c.is_whitespace() || matches!(c, '=' | '(' | ')'))
                && email
                    .split_once('@')
                    .is_some_and(|(local, domain)| {
                        !local.is_empty() && !domain.is_empty() && !domain.contains('@')
                    }));

        if name_ok && email_ok {
            Ok(())
        } else {
            Err(PeerError::UnrepresentableLabel {
                label: self.render(),
            })
        }
    }

    /// Render the label text; email is kept so it survives a rewrite
    pub fn render(&self) -> String {
        if self.email.is_empty() {
            self.name.clone()
        } else if self.name.is_empty() {
            self.email.clone()
        } else {
            format!("{} ({})", self.name, self.email)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_name_and_email() {
        let label = PeerLabel::parse("alice (alice@example.com)");
        assert_eq!(label.name, "alice");
        assert_eq!(label.email, "alice@example.com");
    }

    #[test]
    fn test_label_bare_email() {
        let label = PeerLabel::parse(" bob@example.com ");
        assert_eq!(label.name, "bob");
        assert_eq!(label.email, "bob@example.com");
    }

    #[test]
    fn test_label_plain_name() {
        let label = PeerLabel::parse("office router");
        assert_eq!(label.name, "office router");
        assert!(label.email.is_empty());
    }

    #[test]
    fn test_label_render_roundtrip() {
        for text in ["alice (alice@example.com)", "Carol Smith (c.smith@example.org)", "laptop"] {
            assert_eq!(PeerLabel::parse(text).render(), text);
        }
    }

    #[test]
    fn test_validate_accepts_parseable_labels() {
        for (name, email) in [
            ("alice", "alice@example.com"),
            ("dave's phone", ""),
            ("dave (laptop)", ""),
            ("#ops", ""),
            ("", ""),
        ] {
            let label = PeerLabel {
                name: name.to_string(),
                email: email.to_string(),
            };
            assert!(label.validate().is_ok(), "{:?} should be accepted", label);
        }
    }

    #[test]
    fn test_validate_rejects_ambiguous_labels() {
        for (name, email) in [
            ("bob@home", ""),
            ("", "x@example.com"),
            ("a=b", ""),
            ("[Peer]", ""),
            (" padded", ""),
            ("dave (laptop)", "dave@example.com"),
            ("carol", "not-an-email"),
            ("carol", "carol smith@example.com"),
        ] {
            let label = PeerLabel {
                name: name.to_string(),
                email: email.to_string(),
            };
            assert!(
                matches!(label.validate(), Err(PeerError::UnrepresentableLabel { .. })),
                "{:?} should be rejected",
                label
            );
        }
    }

    #[test]
    fn test_allowed_addresses_strip_prefix() {
        let peer = PeerRecord::new("a", "", "K=", "10.0.0.2/32, fd00::2/128");
        let addresses: Vec<&str> = peer.allowed_addresses().collect();
        assert_eq!(addresses, vec!["10.0.0.2", "fd00::2"]);
    }

    #[test]
    fn test_has_content() {
        assert!(!PeerRecord::default().has_content());
        assert!(PeerRecord::new("", "", "K=", "").has_content());
        assert!(PeerRecord::new("", "", "", "10.0.0.2/32").has_content());
    }
}
