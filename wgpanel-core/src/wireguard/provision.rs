//! Key material provisioning for new peers
//!
//! The provisioning script receives `<username> <address> <wg_config_path>`
//! and writes the client configuration to
//! `<clients_dir>/<username>/<username>.conf`. It either prints the new
//! peer's public key as `PublicKey: <key>` and leaves the server
//! configuration alone, or appends the peer block to the server
//! configuration itself, in which case the key is read back from there.

use crate::error::{CommandError, PanelError, PeerError};
use crate::peers::parse;
use crate::types::ClientConfig;
use crate::wireguard::run_program;
use regex::Regex;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Key material returned by a provisioner
#[derive(Debug, Clone)]
pub struct ProvisionedPeer {
    /// Public key to insert into the server configuration
    pub public_key: String,
    /// Where the client configuration was written
    pub config_path: PathBuf,
    /// Client configuration text, if it could be read
    pub client_config: Option<ClientConfig>,
}

/// Creates key material and a client configuration for a new peer
pub trait Provisioner {
    fn provision(
        &self,
        username: &str,
        address: &str,
    ) -> impl Future<Output = Result<ProvisionedPeer, PanelError>> + Send;
}

/// Provisioner running an external shell script
#[derive(Debug, Clone)]
pub struct ScriptProvisioner {
    script: Option<PathBuf>,
    clients_dir: PathBuf,
    wg_config_path: PathBuf,
    settle: Duration,
}

impl ScriptProvisioner {
    pub fn new(
        script: Option<PathBuf>,
        clients_dir: impl Into<PathBuf>,
        wg_config_path: impl Into<PathBuf>,
        settle: Duration,
    ) -> Self {
        Self {
            script,
            clients_dir: clients_dir.into(),
            wg_config_path: wg_config_path.into(),
            settle,
        }
    }

    /// Key of the peer the script appended at `address`, if any
    async fn appended_key(&self, address: &str) -> Option<String> {
        let text = tokio::fs::read_to_string(&self.wg_config_path).await.ok()?;
        parse(&text)
            .peers
            .into_iter()
            .find(|peer| peer.allowed_addresses().any(|allowed| allowed == address))
            .map(|peer| peer.public_key)
            .filter(|key| !key.is_empty())
    }
}

impl Provisioner for ScriptProvisioner {
    async fn provision(&self, username: &str, address: &str) -> Result<ProvisionedPeer, PanelError> {
        let script = self.script.as_ref().ok_or(CommandError::ScriptNotConfigured)?;
        let config_path = client_config_path(&self.clients_dir, username)?;

        let script_arg = script.to_string_lossy().to_string();
        let config_arg = self.wg_config_path.to_string_lossy().to_string();
        let output = run_program(
            "bash",
            &[script_arg.as_str(), username, address, config_arg.as_str()],
        )
        .await?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if stdout.contains("Error:") || stderr.contains("Error:") {
            return Err(CommandError::ScriptReportedError {
                output: format!("{} {}", stdout.trim(), stderr.trim()),
            }
            .into());
        }

        let public_key = match extract_public_key(&stdout) {
            Some(key) => key,
            None => self.appended_key(address).await.ok_or_else(|| {
                CommandError::ScriptReportedError {
                    output: "script neither printed a public key nor added the peer".to_string(),
                }
            })?,
        };

        if !tokio::fs::try_exists(&config_path).await.unwrap_or(false) {
            return Err(CommandError::ClientConfigMissing {
                path: config_path.to_string_lossy().to_string(),
            }
            .into());
        }

        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        let client_config = match tokio::fs::read_to_string(&config_path).await {
            Ok(text) => Some(ClientConfig::new(text)),
            Err(e) => {
                warn!("Error reading client config {:?}: {}", config_path, e);
                None
            }
        };

        info!("Provisioned key material for {} at {}", username, address);
        Ok(ProvisionedPeer {
            public_key,
            config_path,
            client_config,
        })
    }
}

/// Find `PublicKey: <key>` (or `PublicKey = <key>`) in script output
fn extract_public_key(output: &str) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"(?im)^\s*public\s*key\s*[:=]\s*(\S+)\s*$")
            .expect("Failed to compile public key pattern")
    });

    pattern
        .captures(output)
        .map(|caps| caps[1].to_string())
}

/// Path of a client's configuration file, rejecting unsafe usernames
pub fn client_config_path(clients_dir: &Path, username: &str) -> Result<PathBuf, PeerError> {
    let valid = !username.is_empty()
        && !username.starts_with('.')
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '+'));

    if !valid {
        return Err(PeerError::InvalidUsername {
            username: username.to_string(),
        });
    }

    Ok(clients_dir
        .join(username)
        .join(format!("{}.conf", username)))
}

/// Read the stored client configuration of `username`
pub async fn read_client_config(clients_dir: &Path, username: &str) -> Result<ClientConfig, PanelError> {
    let path = client_config_path(clients_dir, username)?;

    match tokio::fs::read_to_string(&path).await {
        Ok(text) => Ok(ClientConfig::new(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CommandError::ClientConfigMissing {
            path: path.to_string_lossy().to_string(),
        }
        .into()),
        Err(e) => Err(e.into()),
    }
}

/// Ask the last-address script which address was handed out last
///
/// Any failure falls back to `None` so the caller can use its default.
pub async fn last_address_from_script(script: &Path, wg_config_path: &Path) -> Option<String> {
    let script_arg = script.to_string_lossy().to_string();
    let config_arg = wg_config_path.to_string_lossy().to_string();

    match run_program("bash", &[script_arg.as_str(), config_arg.as_str()]).await {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let address = stdout
                .trim()
                .trim_start_matches("Last assigned IP address:")
                .trim()
                .to_string();
            debug!("Last-address script reported {:?}", address);
            (!address.is_empty()).then_some(address)
        }
        Err(e) => {
            warn!("Error getting last used IP: {}", e);
            None
        }
    }
}
