//! Timestamped configuration snapshots
//!
//! Each write of the WireGuard configuration is preceded by a copy of the
//! previous text. Only the newest `retention` snapshots are kept; eviction
//! goes by modification time, oldest first.

use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// One snapshot on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Bounded directory of snapshots
#[derive(Debug, Clone)]
pub struct BackupManager {
    dir: PathBuf,
    prefix: String,
    retention: usize,
}

impl BackupManager {
    /// Create a manager writing `<prefix><timestamp>` files into `dir`
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, retention: usize) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            retention,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `text` to a new snapshot and prune old ones
    pub async fn snapshot(&self, text: &str) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.unused_path(&timestamp()).await;
        tokio::fs::write(&path, text).await?;
        debug!("Wrote backup {:?}", path);

        self.prune().await;
        Ok(path)
    }

    /// Snapshots, newest first
    pub async fn list(&self) -> std::io::Result<Vec<BackupEntry>> {
        let mut entries = Vec::new();

        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
            Err(e) => return Err(e),
        };

        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            if !name.to_string_lossy().starts_with(&self.prefix) {
                continue;
            }
            match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(modified) => entries.push(BackupEntry {
                    path: entry.path(),
                    modified,
                }),
                Err(e) => warn!("Could not stat backup file {:?}: {}", name, e),
            }
        }

        entries.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| b.path.cmp(&a.path))
        });
        Ok(entries)
    }

    /// Delete snapshots beyond the retention limit
    ///
    /// Failures are logged; a stale backup never blocks a write.
    pub async fn prune(&self) -> Vec<PathBuf> {
        let entries = match self.list().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Could not cleanup old backups: {}", e);
                return Vec::new();
            }
        };

        let mut removed = Vec::new();
        for entry in entries.into_iter().skip(self.retention) {
            match tokio::fs::remove_file(&entry.path).await {
                Ok(()) => removed.push(entry.path),
                Err(e) => warn!("Could not delete old backup {:?}: {}", entry.path, e),
            }
        }

        if !removed.is_empty() {
            debug!("Pruned {} old backups", removed.len());
        }
        removed
    }

    async fn unused_path(&self, stamp: &str) -> PathBuf {
        let base = self.dir.join(format!("{}{}", self.prefix, stamp));
        let mut candidate = base.clone();
        let mut counter = 1;
        while tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            candidate = PathBuf::from(format!("{}-{}", base.display(), counter));
            counter += 1;
        }
        candidate
    }
}

/// ISO-8601 UTC timestamp with `:` and `.` replaced by `-`
fn timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H-%M-%S-%3fZ")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_filename_safe() {
        let stamp = timestamp();
        assert!(!stamp.contains(':'));
        assert!(!stamp.contains('.'));
        assert!(stamp.ends_with('Z'));
        assert_eq!(stamp.len(), "2025-01-01T00-00-00-000Z".len());
    }

    #[tokio::test]
    async fn test_list_missing_dir_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let manager = BackupManager::new(temp_dir.path().join("none"), "wg0.conf.backup.", 10);
        assert!(manager.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_same_millisecond_snapshots_do_not_overwrite() {
        let temp_dir = tempfile::tempdir().unwrap();
        let manager = BackupManager::new(temp_dir.path(), "wg0.conf.backup.", 10);

        let first = manager.unused_path("stamp").await;
        tokio::fs::write(&first, "one").await.unwrap();
        let second = manager.unused_path("stamp").await;

        assert_ne!(first, second);
        assert!(second.to_string_lossy().ends_with("stamp-1"));
    }
}
