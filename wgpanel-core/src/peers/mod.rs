//! Peer configuration module
//!
//! Parses peer entries out of a WireGuard server configuration, mutates
//! them in memory and renders them back to text. Enabled and disabled
//! peers differ only in whether their lines carry a comment marker.

pub mod address;
pub mod generator;
pub mod mutation;
pub mod parser;
pub mod record;

use regex::Regex;
use std::sync::OnceLock;

// Public re-exports
pub use address::{last_assigned_address, next_allowed_address};
pub use generator::generate;
pub use mutation::{bulk_set_enabled, insert, set_enabled, BulkUpdate};
pub use parser::{parse, ParsedConfig};
pub use record::{PeerLabel, PeerRecord};

/// Section header that starts a peer block
pub const PEER_MARKER: &str = "[Peer]";

/// Comment marker used to disable lines
pub const COMMENT_MARKER: char = '#';

/// Key field name
pub const PUBLIC_KEY_FIELD: &str = "PublicKey";

/// Allowance field name
pub const ALLOWED_IPS_FIELD: &str = "AllowedIPs";

/// Replacement text used when masking key material
pub const KEY_MASK: &str = "••••••••••••••••••••";

/// Whether a line is written as-is or behind a comment marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineForm {
    /// Plain, active line
    Active,
    /// Line prefixed with the comment marker
    Commented,
}

impl LineForm {
    /// Form used for every line of a peer with the given enabled flag
    pub fn for_enabled(enabled: bool) -> Self {
        if enabled {
            LineForm::Active
        } else {
            LineForm::Commented
        }
    }

    /// Whether lines in this form are active
    pub fn is_active(self) -> bool {
        matches!(self, LineForm::Active)
    }
}

/// Replace public and private key values with a mask
///
/// Used when showing the raw configuration to an administrator.
pub fn mask_keys(text: &str) -> String {
    static KEY_PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = KEY_PATTERN.get_or_init(|| {
        Regex::new(r"(PublicKey|PrivateKey|PresharedKey)\s*=\s*[A-Za-z0-9+/=]+")
            .expect("Failed to compile key mask pattern")
    });

    pattern
        .replace_all(text, |caps: &regex::Captures| {
            format!("{} = {}", &caps[1], KEY_MASK)
        })
        .into_owned()
}
