//! CLI command implementations
//!
//! This module contains the implementation of all CLI subcommands.

pub mod config;
pub mod peers;
pub mod status;

use colored::Colorize;
use serde::Serialize;
use wgpanel_core::error::PanelError;
use wgpanel_core::types::WriteOutcome;

/// Print `value` as pretty JSON on stdout
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), PanelError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| PanelError::Io(std::io::Error::other(e)))?;
    println!("{}", text);
    Ok(())
}

/// Report where the backup went and whether the reload worked
pub(crate) fn print_outcome(outcome: &WriteOutcome) {
    if let Some(backup) = &outcome.backup {
        println!("  backup: {}", backup.display());
    }
    if let Some(warning) = &outcome.reload_warning {
        println!("{} {}", "⚠️ ".yellow(), warning.yellow());
        println!("  Please reload WireGuard manually.");
    }
}
