//! Type definitions and wrappers for secure data handling
//!
//! This module provides type-safe wrappers for sensitive data using the
//! secrecy crate to prevent accidental exposure in logs or debug output.

use secrecy::{ExposeSecret, Secret};

/// Generated client-side WireGuard configuration
///
/// The text embeds the client's private key, so it is kept behind a
/// `Secret` and never printed through `Debug`.
#[derive(Clone, Debug)]
pub struct ClientConfig(Secret<String>);

impl ClientConfig {
    /// Wrap the text of a client configuration file
    pub fn new(text: String) -> Self {
        Self(Secret::new(text))
    }

    /// Expose the configuration text (use with caution!)
    ///
    /// This should only be called when handing the file to the
    /// administrator, e.g. printing it to stdout.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<String> for ClientConfig {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Result of provisioning a new peer
#[derive(Clone, Debug)]
pub struct NewPeer {
    /// Username derived from the email local part
    pub username: String,
    /// Email the peer was created for
    pub email: String,
    /// Address assigned to the peer
    pub address: String,
    /// Path of the client configuration file
    pub config_path: std::path::PathBuf,
    /// Client configuration text, if it could be read back
    pub client_config: Option<ClientConfig>,
}

/// Outcome of a configuration write
///
/// The write itself always committed when this is returned; a reload
/// failure is only reported as a warning.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Backup snapshot of the previous text, if one was taken
    pub backup: Option<std::path::PathBuf>,
    /// Warning raised by the reload action
    pub reload_warning: Option<String>,
}

impl WriteOutcome {
    /// Whether the service reload succeeded
    pub fn reloaded(&self) -> bool {
        self.reload_warning.is_none()
    }
}
