//! Configuration inspection and replacement commands

use colored::Colorize;
use std::path::Path;
use wgpanel_core::config::{toml_config, PanelConfig};
use wgpanel_core::error::{ConfigError, PanelError};
use wgpanel_core::service::Panel;

use super::print_outcome;

/// Print the configuration with key material masked
pub async fn run_show(panel: &Panel) -> Result<(), PanelError> {
    print!("{}", panel.masked_config().await?);
    Ok(())
}

/// Replace the configuration with the contents of `file`
pub async fn run_replace(panel: &Panel, file: &Path) -> Result<(), PanelError> {
    let text = std::fs::read_to_string(file)?;
    let outcome = panel.replace_config(&text).await?;

    println!("✓ Configuration updated successfully");
    print_outcome(&outcome);
    Ok(())
}

/// List backups, newest first
pub async fn run_backups(panel: &Panel) -> Result<(), PanelError> {
    let backups = panel.backups().await?;

    if backups.is_empty() {
        println!("No backups in {}", panel.store().backups().dir().display());
        return Ok(());
    }

    for entry in &backups {
        let modified = chrono::DateTime::<chrono::Local>::from(entry.modified);
        println!(
            "{}  {}",
            modified.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            entry.path.display()
        );
    }
    Ok(())
}

/// Write default panel settings
pub fn run_init(path: Option<&Path>, force: bool) -> Result<(), PanelError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => toml_config::get_config_path()?,
    };

    if toml_config::config_exists(Some(&path))? && !force {
        return Err(PanelError::Config(ConfigError::ValidationError {
            message: format!(
                "Settings already exist at {} (use --force to overwrite)",
                path.display()
            ),
        }));
    }

    toml_config::save_config_to_path(&PanelConfig::default(), &path)?;
    println!("✓ Wrote default settings to {}", path.display());
    println!("Edit add_user_script and reload_commands to match your server.");
    Ok(())
}
