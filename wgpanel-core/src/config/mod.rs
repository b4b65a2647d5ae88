//! Configuration module
//!
//! Panel settings: where the WireGuard configuration lives, where backups
//! go, and which external commands provision peers and reload the service.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

pub mod toml_config;

/// Panel settings
///
/// Every field has a default matching a stock `wg-quick` deployment, so a
/// missing settings file is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// WireGuard server configuration file
    pub wg_config_path: PathBuf,

    /// Interface name passed to `wg show`
    pub interface: String,

    /// Directory receiving timestamped snapshots before each write
    pub backup_dir: PathBuf,

    /// Number of snapshots kept
    pub backup_retention: usize,

    /// Directory holding `<user>/<user>.conf` client configurations
    pub clients_dir: PathBuf,

    /// Script creating key material for a new peer
    pub add_user_script: Option<PathBuf>,

    /// Script printing the last assigned address
    pub last_ip_script: Option<PathBuf>,

    /// Address used when nothing has been assigned yet
    pub default_last_address: String,

    /// Shell commands run in order to reload the interface
    pub reload_commands: Vec<String>,

    /// Delay after the provisioning script before reading its output files
    pub provision_settle_ms: u64,

    /// Handshake age under which a peer counts as connected
    pub handshake_timeout_secs: u64,
}

impl PanelConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.wg_config_path.as_os_str().is_empty() {
            return Err("WireGuard config path cannot be empty".to_string());
        }

        if self.wg_config_path.file_name().is_none() {
            return Err("WireGuard config path must name a file".to_string());
        }

        if self.interface.is_empty() {
            return Err("Interface cannot be empty".to_string());
        }

        if !self
            .interface
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err("Interface contains invalid characters".to_string());
        }

        if self.backup_dir.as_os_str().is_empty() {
            return Err("Backup directory cannot be empty".to_string());
        }

        if self.backup_retention == 0 {
            return Err("Backup retention cannot be zero".to_string());
        }

        if self.default_last_address.parse::<Ipv4Addr>().is_err() {
            return Err(format!(
                "Default last address is not an IPv4 address: {}",
                self.default_last_address
            ));
        }

        if self.reload_commands.is_empty() {
            return Err("Reload commands cannot be empty".to_string());
        }

        if self.reload_commands.iter().any(|cmd| cmd.trim().is_empty()) {
            return Err("Reload commands cannot be blank".to_string());
        }

        Ok(())
    }

    /// File name prefix shared by all backups of the configuration
    pub fn backup_prefix(&self) -> String {
        let name = self
            .wg_config_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "wg.conf".to_string());
        format!("{}.backup.", name)
    }

    pub fn provision_settle(&self) -> Duration {
        Duration::from_millis(self.provision_settle_ms)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            wg_config_path: PathBuf::from("/etc/wireguard/wg0.conf"),
            interface: "wg0".to_string(),
            backup_dir: PathBuf::from("/var/lib/wgpanel/backup"),
            backup_retention: 10,
            clients_dir: PathBuf::from("/etc/wireguard/clients"),
            add_user_script: None,
            last_ip_script: None,
            default_last_address: "10.0.0.1".to_string(),
            reload_commands: vec![
                "sudo wg-quick down wg0".to_string(),
                "sudo wg-quick up wg0".to_string(),
            ],
            provision_settle_ms: 2000,
            handshake_timeout_secs: 180,
        }
    }
}
