//! Status source backed by `wg show <interface>`
//!
//! Parses the human-readable output of the WireGuard tool into one
//! `ConnectionStatus` per peer.

use crate::error::StatusError;
use crate::status::{ConnectionStatus, StatusSource, ZERO_TRANSFER};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Status source that shells out to `wg show`
#[derive(Debug, Clone)]
pub struct WgShow {
    /// Interface to query, e.g. `wg0`
    interface: String,
    /// A peer counts as connected if its last handshake is younger than this
    handshake_timeout: Duration,
}

impl WgShow {
    /// Create a source for `interface`
    pub fn new(interface: impl Into<String>, handshake_timeout: Duration) -> Self {
        Self {
            interface: interface.into(),
            handshake_timeout,
        }
    }
}

impl StatusSource for WgShow {
    async fn fetch(&self) -> Result<HashMap<String, ConnectionStatus>, StatusError> {
        let wg = which::which("wg").map_err(|e| StatusError::ToolUnavailable {
            reason: e.to_string(),
        })?;

        let output = Command::new(wg)
            .args(["show", &self.interface])
            .env("WG_COLOR_MODE", "never")
            .output()
            .await
            .map_err(|e| StatusError::QueryFailed {
                interface: self.interface.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(StatusError::QueryFailed {
                interface: self.interface.clone(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let statuses = parse_wg_show(&stdout, self.handshake_timeout);
        debug!(
            "Fetched status for {} peers on {}",
            statuses.len(),
            self.interface
        );
        Ok(statuses)
    }
}

/// Parse `wg show` output into status keyed by peer public key
pub fn parse_wg_show(output: &str, handshake_timeout: Duration) -> HashMap<String, ConnectionStatus> {
    let mut statuses = HashMap::new();
    let mut current: Option<(String, ConnectionStatus)> = None;

    for line in output.lines() {
        let line = line.trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim() {
            "peer" => {
                if let Some((public_key, status)) = current.take() {
                    statuses.insert(public_key, status);
                }
                current = Some((value.to_string(), ConnectionStatus::disconnected()));
            }
            "interface" => {
                if let Some((public_key, status)) = current.take() {
                    statuses.insert(public_key, status);
                }
            }
            field => {
                let Some((_, status)) = current.as_mut() else {
                    continue;
                };
                match field {
                    "endpoint" => status.endpoint = Some(value.to_string()),
                    "latest handshake" => {
                        status.is_connected = handshake_age(value)
                            .is_some_and(|age| age < handshake_timeout);
                        status.latest_handshake = Some(value.to_string());
                    }
                    "transfer" => {
                        let (received, sent) = parse_transfer(value);
                        status.transfer_received = received;
                        status.transfer_sent = sent;
                    }
                    _ => {}
                }
            }
        }
    }

    if let Some((public_key, status)) = current {
        statuses.insert(public_key, status);
    }

    statuses
}

/// Split `1.52 MiB received, 3.10 MiB sent` into its two counters
fn parse_transfer(value: &str) -> (String, String) {
    let mut received = ZERO_TRANSFER.to_string();
    let mut sent = ZERO_TRANSFER.to_string();

    for part in value.split(',') {
        let part = part.trim();
        if let Some(size) = part.strip_suffix("received") {
            received = size.trim().to_string();
        } else if let Some(size) = part.strip_suffix("sent") {
            sent = size.trim().to_string();
        }
    }

    (received, sent)
}

/// Age of a handshake such as `1 hour, 2 minutes, 5 seconds ago`
pub fn handshake_age(value: &str) -> Option<Duration> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"(\d+)\s+(year|day|hour|minute|second)s?")
            .expect("Failed to compile handshake pattern")
    });

    if value.eq_ignore_ascii_case("now") {
        return Some(Duration::ZERO);
    }

    let mut seconds: u64 = 0;
    let mut matched = false;
    for caps in pattern.captures_iter(value) {
        let amount: u64 = caps[1].parse().ok()?;
        let unit = match &caps[2] {
            "year" => 365 * 24 * 3600,
            "day" => 24 * 3600,
            "hour" => 3600,
            "minute" => 60,
            _ => 1,
        };
        seconds = seconds.saturating_add(amount.saturating_mul(unit));
        matched = true;
    }

    matched.then(|| Duration::from_secs(seconds))
}
