//! External WireGuard actions
//!
//! Wrappers around the shell commands the panel depends on: reloading the
//! interface after a write and provisioning key material for new peers.

pub mod provision;
pub mod reload;

use crate::error::CommandError;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

// Public re-exports
pub use provision::{
    client_config_path, last_address_from_script, read_client_config, ProvisionedPeer,
    Provisioner, ScriptProvisioner,
};
pub use reload::{ReloadAction, ShellReload};

/// Run `command` through `sh -c` and fail on a non-zero exit
pub(crate) async fn run_shell(command: &str) -> Result<Output, CommandError> {
    debug!("Running `{}`", command);

    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .output()
        .await
        .map_err(|e| CommandError::SpawnFailed {
            command: command.to_string(),
            reason: e.to_string(),
        })?;

    check_status(command, output)
}

/// Run a program with arguments and fail on a non-zero exit
pub(crate) async fn run_program(program: &str, args: &[&str]) -> Result<Output, CommandError> {
    let shown = format!("{} {}", program, args.join(" "));
    debug!("Running `{}`", shown);

    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| CommandError::SpawnFailed {
            command: shown.clone(),
            reason: e.to_string(),
        })?;

    check_status(&shown, output)
}

fn check_status(command: &str, output: Output) -> Result<Output, CommandError> {
    if output.status.success() {
        Ok(output)
    } else {
        Err(CommandError::NonZeroExit {
            command: command.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_shell_captures_stdout() {
        let output = run_shell("echo hello").await.unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_shell_reports_exit_code() {
        let err = run_shell("echo oops >&2; exit 3").await.unwrap_err();
        match err {
            CommandError::NonZeroExit { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "oops");
            }
            other => panic!("Expected NonZeroExit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_program_missing_binary() {
        let err = run_program("/nonexistent/wgpanel-binary", &[]).await.unwrap_err();
        assert!(matches!(err, CommandError::SpawnFailed { .. }));
    }

    #[tokio::test]
    async fn test_run_program_names_command_on_failure() {
        let err = run_program("sh", &["-c", "exit 4"]).await.unwrap_err();
        match err {
            CommandError::NonZeroExit { command, code, .. } => {
                assert_eq!(command, "sh -c exit 4");
                assert_eq!(code, Some(4));
            }
            other => panic!("Expected NonZeroExit, got {:?}", other),
        }
    }
}
