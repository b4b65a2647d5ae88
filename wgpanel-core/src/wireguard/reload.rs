//! Interface reload after a configuration write

use crate::error::CommandError;
use crate::wireguard::run_shell;
use std::future::Future;
use tracing::info;

/// Action that makes the running interface pick up the new file
pub trait ReloadAction {
    fn reload(&self) -> impl Future<Output = Result<(), CommandError>> + Send;
}

/// Reload by running shell commands in order, stopping at the first failure
#[derive(Debug, Clone)]
pub struct ShellReload {
    commands: Vec<String>,
}

impl ShellReload {
    pub fn new(commands: Vec<String>) -> Self {
        Self { commands }
    }
}

impl ReloadAction for ShellReload {
    async fn reload(&self) -> Result<(), CommandError> {
        for command in &self.commands {
            run_shell(command).await?;
        }
        info!("WireGuard configuration reloaded");
        Ok(())
    }
}
