//! Line-oriented parser for the server configuration
//!
//! The parser is tolerant: lines it does not recognise are skipped, never
//! rejected. Text before the first peer marker is kept verbatim as the
//! interface prefix.

use crate::peers::{
    LineForm, PeerLabel, PeerRecord, ALLOWED_IPS_FIELD, COMMENT_MARKER, PEER_MARKER,
    PUBLIC_KEY_FIELD,
};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Result of parsing a configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedConfig {
    /// Everything before the first peer marker, trailing blank lines removed
    pub interface_prefix: String,
    /// Peers in source order
    pub peers: Vec<PeerRecord>,
}

/// Field of a peer block the parser extracts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    PublicKey,
    AllowedIps,
}

/// Classification of a single trimmed line
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConfigLine<'a> {
    /// `[Peer]` or `#[Peer]`
    PeerMarker(LineForm),
    /// Bare comment carrying a name/email
    Label(&'a str),
    /// `PublicKey = ...` or `AllowedIPs = ...`, possibly commented
    Field {
        field: Field,
        value: &'a str,
        form: LineForm,
    },
    /// Anything else inside a peer block
    Other,
}

impl<'a> ConfigLine<'a> {
    fn classify(line: &'a str) -> Self {
        if line == PEER_MARKER {
            return ConfigLine::PeerMarker(LineForm::Active);
        }
        if line.strip_prefix(COMMENT_MARKER) == Some(PEER_MARKER) {
            return ConfigLine::PeerMarker(LineForm::Commented);
        }

        let form = if line.starts_with(COMMENT_MARKER) {
            LineForm::Commented
        } else {
            LineForm::Active
        };

        if let Some(value) = field_value(line, PUBLIC_KEY_FIELD) {
            return ConfigLine::Field {
                field: Field::PublicKey,
                value,
                form,
            };
        }
        if let Some(value) = field_value(line, ALLOWED_IPS_FIELD) {
            return ConfigLine::Field {
                field: Field::AllowedIps,
                value,
                form,
            };
        }

        if let Some(text) = line.strip_prefix(COMMENT_MARKER) {
            let text = text.trim();
            if !text.is_empty() && !text.contains('=') {
                return ConfigLine::Label(text);
            }
        }

        ConfigLine::Other
    }
}

/// Extract the value of `field` from a line like `# Field = value`
fn field_value<'a>(line: &'a str, field: &str) -> Option<&'a str> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^(?:#\s*)?(\w+)\s*=\s*(.+)$").expect("Failed to compile field pattern")
    });

    let caps = pattern.captures(line)?;
    if caps.get(1)?.as_str() != field {
        return None;
    }
    let value = caps.get(2)?.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Peer under construction
#[derive(Debug, Default)]
struct PeerAccumulator {
    record: PeerRecord,
    labelled: bool,
}

impl PeerAccumulator {
    fn start(form: LineForm) -> Self {
        Self {
            record: PeerRecord {
                enabled: form.is_active(),
                ..PeerRecord::default()
            },
            labelled: false,
        }
    }

    fn apply(&mut self, line: ConfigLine<'_>) {
        match line {
            ConfigLine::Label(text) => {
                // First label wins; later bare comments are ignored
                if !self.labelled {
                    let label = PeerLabel::parse(text);
                    self.record.name = label.name;
                    self.record.email = label.email;
                    self.labelled = true;
                }
            }
            ConfigLine::Field { field, value, form } => {
                match field {
                    Field::PublicKey => self.record.public_key = value.to_string(),
                    Field::AllowedIps => self.record.allowed_networks = value.to_string(),
                }
                if !form.is_active() {
                    self.record.enabled = false;
                }
            }
            ConfigLine::PeerMarker(_) | ConfigLine::Other => {}
        }
    }

    fn finish(self, peers: &mut Vec<PeerRecord>) {
        if self.record.has_content() {
            peers.push(self.record);
        } else {
            debug!("Dropping peer block without key or allowance");
        }
    }
}

/// Parser state machine
enum ParseState<'a> {
    BeforeFirstPeer { prefix: Vec<&'a str> },
    InPeer(PeerAccumulator),
}

/// Parse configuration text into its interface prefix and peers
pub fn parse(text: &str) -> ParsedConfig {
    let mut peers = Vec::new();
    let mut prefix_lines: Vec<&str> = Vec::new();
    let mut state = ParseState::BeforeFirstPeer { prefix: Vec::new() };

    for raw in text.lines() {
        let line = ConfigLine::classify(raw.trim());

        state = match (state, line) {
            (ParseState::BeforeFirstPeer { prefix }, ConfigLine::PeerMarker(form)) => {
                prefix_lines = prefix;
                ParseState::InPeer(PeerAccumulator::start(form))
            }
            (ParseState::BeforeFirstPeer { mut prefix }, _) => {
                prefix.push(raw);
                ParseState::BeforeFirstPeer { prefix }
            }
            (ParseState::InPeer(current), ConfigLine::PeerMarker(form)) => {
                current.finish(&mut peers);
                ParseState::InPeer(PeerAccumulator::start(form))
            }
            (ParseState::InPeer(mut current), line) => {
                current.apply(line);
                ParseState::InPeer(current)
            }
        };
    }

    match state {
        ParseState::BeforeFirstPeer { prefix } => prefix_lines = prefix,
        ParseState::InPeer(current) => current.finish(&mut peers),
    }

    while prefix_lines.last().is_some_and(|line| line.trim().is_empty()) {
        prefix_lines.pop();
    }

    debug!("Parsed {} peers from configuration", peers.len());

    ParsedConfig {
        interface_prefix: prefix_lines.join("\n"),
        peers,
    }
}
