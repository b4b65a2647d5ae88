//! TOML configuration file I/O
//!
//! Handles loading and saving panel settings to/from TOML files
//! in the user's configuration directory.

use crate::config::PanelConfig;
use crate::error::{ConfigError, PanelError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Complete TOML configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Panel settings
    #[serde(default)]
    pub panel: PanelConfig,
}

/// Default configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the default configuration directory
///
/// Returns ~/.config/wgpanel, or WGPANEL_CONFIG_DIR if set
pub fn get_config_dir() -> Result<PathBuf, PanelError> {
    if let Ok(config_dir) = std::env::var("WGPANEL_CONFIG_DIR") {
        return Ok(PathBuf::from(config_dir));
    }

    let home = std::env::var("HOME").map_err(|_| {
        PanelError::Config(ConfigError::IoError {
            message: "HOME environment variable not set".to_string(),
        })
    })?;

    Ok(PathBuf::from(home).join(".config").join("wgpanel"))
}

/// Get the default configuration file path
pub fn get_config_path() -> Result<PathBuf, PanelError> {
    let config_dir = get_config_dir()?;
    Ok(config_dir.join(CONFIG_FILE_NAME))
}

/// Check whether a settings file exists at `path` or the default location
pub fn config_exists(path: Option<&Path>) -> Result<bool, PanelError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => get_config_path()?,
    };
    Ok(path.exists())
}

/// Load panel settings, falling back to defaults when no file exists
pub fn load_config_or_default(path: Option<&Path>) -> Result<PanelConfig, PanelError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => get_config_path()?,
    };

    if !path.exists() {
        debug!("No settings file at {:?}, using defaults", path);
        return Ok(PanelConfig::default());
    }

    load_config_from_path(&path)
}

/// Load panel settings from a specific TOML file
pub fn load_config_from_path<P: AsRef<Path>>(path: P) -> Result<PanelConfig, PanelError> {
    let contents = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PanelError::Config(ConfigError::LoadFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        }),
        _ => PanelError::Config(ConfigError::IoError {
            message: format!("Failed to read config file: {}", e),
        }),
    })?;

    let config: TomlConfig = toml::from_str(&contents).map_err(|e| {
        PanelError::Config(ConfigError::IoError {
            message: format!("Failed to parse TOML: {}", e),
        })
    })?;

    config
        .panel
        .validate()
        .map_err(|e| PanelError::Config(ConfigError::ValidationError { message: e }))?;

    debug!(
        "Loaded settings: wg_config_path={:?}, interface={}, backup_dir={:?}, retention={}",
        config.panel.wg_config_path,
        config.panel.interface,
        config.panel.backup_dir,
        config.panel.backup_retention
    );

    Ok(config.panel)
}

/// Save panel settings to a specific TOML file
pub fn save_config_to_path<P: AsRef<Path>>(config: &PanelConfig, path: P) -> Result<(), PanelError> {
    config
        .validate()
        .map_err(|e| PanelError::Config(ConfigError::ValidationError { message: e }))?;

    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            PanelError::Config(ConfigError::IoError {
                message: format!("Failed to create config directory: {}", e),
            })
        })?;
    }

    let toml_string = toml::to_string_pretty(&TomlConfig {
        panel: config.clone(),
    })?;

    std::fs::write(&path, toml_string).map_err(|_e| {
        PanelError::Config(ConfigError::SaveFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        })
    })?;

    info!("Saved panel settings to {:?}", path.as_ref());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let original = PanelConfig {
            interface: "wg1".to_string(),
            backup_retention: 3,
            add_user_script: Some(PathBuf::from("/opt/wg/add_new_user.sh")),
            ..PanelConfig::default()
        };

        save_config_to_path(&original, &config_path).unwrap();
        let loaded = load_config_from_path(&config_path).unwrap();

        assert_eq!(original, loaded);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = tempdir().unwrap();
        let absent = temp_dir.path().join("absent.toml");
        let config = load_config_or_default(Some(absent.as_path())).unwrap();
        assert_eq!(config, PanelConfig::default());
    }

    #[test]
    fn test_invalid_config_is_rejected_on_save() {
        let temp_dir = tempdir().unwrap();
        let config = PanelConfig {
            backup_retention: 0,
            ..PanelConfig::default()
        };
        assert!(save_config_to_path(&config, temp_dir.path().join("c.toml")).is_err());
    }
}
