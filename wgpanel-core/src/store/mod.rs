//! Configuration store
//!
//! The on-disk text is the only source of truth. Writers go through a single
//! lock so read-modify-write cycles never interleave; readers take no lock
//! and rely on writes landing through an atomic rename.

pub mod backup;

use crate::error::{PeerError, Result};
use crate::peers::{generate, parse, ParsedConfig, PeerRecord};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub use backup::{BackupEntry, BackupManager};

/// Result of a committed read-modify-write cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed<T> {
    /// Value returned by the mutation
    pub value: T,
    /// Snapshot of the previous text, if one was written
    pub backup: Option<PathBuf>,
    /// Whether the file content changed
    pub changed: bool,
}

/// Serialized access to the WireGuard configuration file
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    backups: BackupManager,
    write_lock: Mutex<()>,
}

impl ConfigStore {
    /// Create a store for the file at `path`
    pub fn new(path: impl Into<PathBuf>, backups: BackupManager) -> Self {
        Self {
            path: path.into(),
            backups,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    /// Read the raw configuration text
    pub async fn read_text(&self) -> Result<String> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }

    /// Read and parse the configuration
    pub async fn load(&self) -> Result<ParsedConfig> {
        Ok(parse(&self.read_text().await?))
    }

    /// Run one read-modify-write cycle under the write lock
    ///
    /// `mutate` receives the freshly parsed file and returns the next peer
    /// sequence. Nothing is written unless it succeeds and the sequence
    /// actually differs from the parsed one.
    pub async fn modify<F, T>(&self, mutate: F) -> Result<Committed<T>>
    where
        F: FnOnce(&ParsedConfig) -> std::result::Result<(Vec<PeerRecord>, T), PeerError>,
    {
        let _guard = self.write_lock.lock().await;

        let current = self.read_text().await?;
        let parsed = parse(&current);
        let (peers, value) = mutate(&parsed)?;

        if peers == parsed.peers {
            debug!("Peers unchanged, skipping write");
            return Ok(Committed {
                value,
                backup: None,
                changed: false,
            });
        }

        let next = generate(&parsed.interface_prefix, &peers);
        let backup = self.commit(&current, &next).await?;
        Ok(Committed {
            value,
            backup,
            changed: true,
        })
    }

    /// Replace the whole file with `text`, under the write lock
    pub async fn replace(&self, text: &str) -> Result<Option<PathBuf>> {
        let _guard = self.write_lock.lock().await;

        let current = match tokio::fs::read_to_string(&self.path).await {
            Ok(current) => current,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        self.commit(&current, text).await
    }

    /// Snapshot `previous`, then atomically install `next`
    async fn commit(&self, previous: &str, next: &str) -> Result<Option<PathBuf>> {
        let backup = if previous.is_empty() {
            None
        } else {
            match self.backups.snapshot(previous).await {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("Could not create backup: {}", e);
                    None
                }
            }
        };

        self.write_atomic(next).await?;
        info!("Wrote configuration to {:?}", self.path);
        Ok(backup)
    }

    /// Write to a sibling temp file and rename it over the target
    async fn write_atomic(&self, text: &str) -> Result<()> {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let tmp_path = self.path.with_file_name(format!(".{}.wgpanel.tmp", file_name));

        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(text.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        if let Ok(metadata) = tokio::fs::metadata(&self.path).await {
            tokio::fs::set_permissions(&tmp_path, metadata.permissions()).await?;
        }

        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}
