//! Administration operations
//!
//! Ties the peer engine, the store and the external collaborators together.
//! Every operation reads the file afresh; nothing is cached between calls.

use crate::config::PanelConfig;
use crate::error::{ConfigError, PanelError, PeerError, Result};
use crate::peers::address::address_in_use;
use crate::peers::mutation::find_collision;
use crate::peers::{
    bulk_set_enabled, insert, last_assigned_address, mask_keys, next_allowed_address, set_enabled,
    PeerRecord,
};
use crate::status::{merge, PeerView, StatusSource, WgShow};
use crate::store::{BackupEntry, BackupManager, ConfigStore};
use crate::types::{ClientConfig, NewPeer, WriteOutcome};
use crate::wireguard::{
    last_address_from_script, read_client_config, Provisioner, ReloadAction, ScriptProvisioner,
    ShellReload,
};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{info, warn};

/// Result of a bulk enable/disable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkResult {
    pub updated: Vec<String>,
    pub not_found: Vec<String>,
    #[serde(skip)]
    pub outcome: WriteOutcome,
}

/// Panel wired to the real `wg`, provisioning script and reload commands
pub type Panel = PanelService<WgShow, ScriptProvisioner, ShellReload>;

/// Administration service over one WireGuard configuration file
pub struct PanelService<S, P, R> {
    config: PanelConfig,
    store: ConfigStore,
    status: S,
    provisioner: P,
    reloader: R,
}

impl Panel {
    /// Build a panel from its settings
    pub fn from_config(config: PanelConfig) -> Self {
        let status = WgShow::new(config.interface.clone(), config.handshake_timeout());
        let provisioner = ScriptProvisioner::new(
            config.add_user_script.clone(),
            config.clients_dir.clone(),
            config.wg_config_path.clone(),
            config.provision_settle(),
        );
        let reloader = ShellReload::new(config.reload_commands.clone());
        Self::new(config, status, provisioner, reloader)
    }
}

impl<S, P, R> PanelService<S, P, R>
where
    S: StatusSource,
    P: Provisioner,
    R: ReloadAction,
{
    pub fn new(config: PanelConfig, status: S, provisioner: P, reloader: R) -> Self {
        let backups = BackupManager::new(
            config.backup_dir.clone(),
            config.backup_prefix(),
            config.backup_retention,
        );
        let store = ConfigStore::new(config.wg_config_path.clone(), backups);

        Self {
            config,
            store,
            status,
            provisioner,
            reloader,
        }
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Peers fit for display: those with both a name and an allowance
    pub async fn list_peers(&self) -> Result<Vec<PeerRecord>> {
        let parsed = self.store.load().await?;

        Ok(parsed
            .peers
            .into_iter()
            .filter(|peer| {
                let valid = !peer.name.is_empty() && !peer.allowed_networks.is_empty();
                if !valid {
                    warn!("Invalid user found: key={:?}, name={:?}", peer.public_key, peer.name);
                }
                valid
            })
            .collect())
    }

    /// Displayable peers joined with live status
    ///
    /// An unavailable status source degrades to "all disconnected".
    pub async fn peers_with_status(&self) -> Result<Vec<PeerView>> {
        let peers = self.list_peers().await?;

        let status = match self.status.fetch().await {
            Ok(status) => status,
            Err(e) => {
                warn!("Could not fetch peer status: {}", e);
                HashMap::new()
            }
        };

        Ok(merge(&peers, &status))
    }

    /// Enable or disable one peer
    pub async fn set_enabled(&self, public_key: &str, enabled: bool) -> Result<WriteOutcome> {
        let committed = self
            .store
            .modify(|parsed| set_enabled(&parsed.peers, public_key, enabled).map(|peers| (peers, ())))
            .await?;

        info!(
            "Peer {} {}",
            public_key,
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(self.after_write(committed.backup, committed.changed).await)
    }

    /// Enable or disable several peers; unknown keys are reported back
    pub async fn bulk_set_enabled(&self, public_keys: &[String], enabled: bool) -> Result<BulkResult> {
        let committed = self
            .store
            .modify(|parsed| {
                let update = bulk_set_enabled(&parsed.peers, public_keys, enabled);
                Ok((update.peers, (update.updated, update.not_found)))
            })
            .await?;

        let (updated, not_found) = committed.value;
        if !not_found.is_empty() {
            warn!("Bulk update skipped unknown peers: {}", not_found.join(", "));
        }
        info!(
            "Bulk {} {} peers",
            if enabled { "enabled" } else { "disabled" },
            updated.len()
        );

        let outcome = self.after_write(committed.backup, committed.changed).await;
        Ok(BulkResult {
            updated,
            not_found,
            outcome,
        })
    }

    /// Provision and insert a peer for `email`
    pub async fn add_peer(&self, email: &str) -> Result<(NewPeer, WriteOutcome)> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(PeerError::InvalidEmail {
                email: email.to_string(),
            }
            .into());
        }

        let username = email.split('@').next().unwrap_or_default().to_string();
        let parsed = self.store.load().await?;

        let candidate = PeerRecord::new(username.clone(), email, "", "");
        candidate.label().validate()?;
        if let Some(identity) = find_collision(&parsed.peers, &candidate) {
            return Err(PeerError::DuplicateKey { identity }.into());
        }

        let last = self.last_assigned(&parsed.peers).await;
        let address = next_allowed_address(&parsed.peers, &last)?;

        let provisioned = self.provisioner.provision(&username, &address).await?;

        let new_peer = PeerRecord::new(
            username.clone(),
            email,
            provisioned.public_key.clone(),
            format!("{}/32", address),
        );
        let committed = self
            .store
            .modify(|parsed| place_provisioned(&parsed.peers, new_peer, &address).map(|peers| (peers, ())))
            .await;
        let committed = match committed {
            Ok(committed) => committed,
            Err(e) => {
                warn!(
                    "Peer {} was provisioned but not added; client config left at {:?}",
                    username, provisioned.config_path
                );
                return Err(e);
            }
        };

        info!("Added peer {} at {}", username, address);
        // The script may have written the file itself
        let outcome = self.after_write(committed.backup, true).await;

        Ok((
            NewPeer {
                username,
                email: email.to_string(),
                address,
                config_path: provisioned.config_path,
                client_config: provisioned.client_config,
            },
            outcome,
        ))
    }

    /// Stored client configuration of `username`
    pub async fn client_config(&self, username: &str) -> Result<ClientConfig> {
        read_client_config(&self.config.clients_dir, username).await
    }

    /// Raw configuration with key material masked
    pub async fn masked_config(&self) -> Result<String> {
        Ok(mask_keys(&self.store.read_text().await?))
    }

    /// Replace the whole configuration with administrator-supplied text
    pub async fn replace_config(&self, text: &str) -> Result<WriteOutcome> {
        if text.trim().is_empty() {
            return Err(PanelError::Config(ConfigError::ValidationError {
                message: "Configuration content is required".to_string(),
            }));
        }

        let backup = self.store.replace(text).await?;
        info!("Configuration replaced");
        Ok(self.after_write(backup, true).await)
    }

    /// Backups of the configuration, newest first
    pub async fn backups(&self) -> Result<Vec<BackupEntry>> {
        Ok(self.store.backups().list().await?)
    }

    /// Last assigned address: script, then highest peer address, then default
    async fn last_assigned(&self, peers: &[PeerRecord]) -> String {
        if let Some(script) = &self.config.last_ip_script {
            if let Some(address) =
                last_address_from_script(script, &self.config.wg_config_path).await
            {
                return address;
            }
        }

        last_assigned_address(peers)
            .map(|address| address.to_string())
            .unwrap_or_else(|| self.config.default_last_address.clone())
    }

    /// Reload after a committed write; failure becomes a warning
    async fn after_write(&self, backup: Option<PathBuf>, changed: bool) -> WriteOutcome {
        if !changed {
            return WriteOutcome {
                backup,
                reload_warning: None,
            };
        }

        let reload_warning = match self.reloader.reload().await {
            Ok(()) => None,
            Err(e) => {
                warn!("Failed to reload WireGuard configuration: {}", e);
                Some(format!(
                    "WireGuard configuration not reloaded automatically: {}",
                    e
                ))
            }
        };

        WriteOutcome {
            backup,
            reload_warning,
        }
    }
}

/// Peer sequence once `new_peer` has been provisioned at `address`
///
/// A provisioning script may append the peer to the file itself. Such a
/// peer is recognised by its key and relabelled; otherwise the peer is
/// inserted, provided nobody took the address in the meantime.
fn place_provisioned(
    peers: &[PeerRecord],
    new_peer: PeerRecord,
    address: &str,
) -> std::result::Result<Vec<PeerRecord>, PeerError> {
    if let Some(index) = peers
        .iter()
        .position(|peer| !new_peer.public_key.is_empty() && peer.public_key == new_peer.public_key)
    {
        new_peer.label().validate()?;
        let mut next = peers.to_vec();
        next[index].name = new_peer.name;
        next[index].email = new_peer.email;
        return Ok(next);
    }

    if address_in_use(peers, address) {
        return Err(PeerError::AddressInUse {
            address: address.to_string(),
        });
    }
    insert(peers, new_peer)
}

/// Loose email shape check: `local@domain.tld` without whitespace
pub fn is_valid_email(email: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Failed to compile email pattern")
        })
        .is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@localhost"));
        assert!(!is_valid_email("al ice@example.com"));
        assert!(!is_valid_email("a@b@example.com"));
    }
}
