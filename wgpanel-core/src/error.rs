//! Error types for the wgpanel administration tool
//!
//! This module defines all error types used throughout the application,
//! providing consistent error handling and user-friendly error messages.

use thiserror::Error;

/// Main error type for the wgpanel application
#[derive(Error, Debug)]
pub enum PanelError {
    /// Errors related to panel settings loading/parsing
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors raised by peer model operations
    #[error("Peer error: {0}")]
    Peer(#[from] PeerError),

    /// Errors related to the live status source
    #[error("Status error: {0}")]
    Status(#[from] StatusError),

    /// Errors raised by external commands (provisioning, reload)
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Panel settings errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {path}")]
    LoadFailed { path: String },

    #[error("Failed to save configuration file: {path}")]
    SaveFailed { path: String },

    #[error("Configuration validation error: {message}")]
    ValidationError { message: String },

    #[error("I/O error: {message}")]
    IoError { message: String },
}

/// Peer model and mutation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeerError {
    /// Reserved: the line parser skips malformed lines instead of failing
    #[error("Malformed configuration line: {line}")]
    ParseMalformed { line: String },

    #[error("Peer not found: {public_key}")]
    NotFound { public_key: String },

    #[error("Peer already exists: {identity}")]
    DuplicateKey { identity: String },

    #[error("Address already in use: {address}")]
    AddressInUse { address: String },

    #[error("Invalid IPv4 address: {address}")]
    InvalidAddress { address: String },

    #[error("Invalid email format: {email}")]
    InvalidEmail { email: String },

    #[error("Invalid username: {username}")]
    InvalidUsername { username: String },

    #[error("Name or email cannot be stored in a peer label: {label:?}")]
    UnrepresentableLabel { label: String },
}

/// Live status source errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[error("WireGuard tool not available: {reason}")]
    ToolUnavailable { reason: String },

    #[error("Failed to query interface {interface}: {reason}")]
    QueryFailed { interface: String, reason: String },
}

/// External command errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Failed to spawn `{command}`: {reason}")]
    SpawnFailed { command: String, reason: String },

    #[error("`{command}` exited with status {code:?}: {stderr}")]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Provisioning script reported an error: {output}")]
    ScriptReportedError { output: String },

    #[error("Provisioning script is not configured")]
    ScriptNotConfigured,

    #[error("Client configuration not found: {path}")]
    ClientConfigMissing { path: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PanelError>;
