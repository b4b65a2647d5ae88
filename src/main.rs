//! wgpanel - WireGuard peer administration CLI
//!
//! Lists peers with their live status, enables and disables them by
//! rewriting the server configuration, and provisions new peers.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use wgpanel_core::config::toml_config;
use wgpanel_core::error::PanelError;
use wgpanel_core::init_logging;
use wgpanel_core::service::Panel;
use wgpanel_core::status::{SortKey, SortOrder};

mod cli;

#[derive(Parser)]
#[command(name = "wgpanel")]
#[command(about = "Administration panel for WireGuard peer configuration")]
struct Cli {
    /// Panel settings file (default: ~/.config/wgpanel/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage peers (list/enable/disable/add)
    Peers {
        #[command(subcommand)]
        action: PeerCommands,
    },
    /// Show peers with their live connection status
    Status(StatusArgs),
    /// Inspect or replace the WireGuard configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum PeerCommands {
    /// List peers in configuration order
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Enable a peer by public key
    Enable { public_key: String },
    /// Disable a peer by public key
    Disable { public_key: String },
    /// Enable or disable several peers at once
    Bulk {
        /// Enable the listed peers
        #[arg(long, conflicts_with = "disable", required_unless_present = "disable")]
        enable: bool,
        /// Disable the listed peers
        #[arg(long)]
        disable: bool,
        /// Public keys to update
        #[arg(required = true)]
        public_keys: Vec<String>,
    },
    /// Provision a new peer for an email address
    Add { email: String },
    /// Print the client configuration of a user
    ClientConfig { username: String },
}

#[derive(Args)]
struct StatusArgs {
    /// Sort column: name, status, connection or usage
    #[arg(long, default_value = "connection", value_parser = parse_sort_key)]
    sort: SortKey,

    /// Reverse the column's default order
    #[arg(long)]
    reverse: bool,

    /// Refresh every 15 seconds until interrupted
    #[arg(long)]
    watch: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the configuration with keys masked
    Show,
    /// Replace the configuration with the contents of a file
    Replace { file: PathBuf },
    /// List configuration backups, newest first
    Backups,
    /// Write default panel settings
    Init {
        /// Overwrite existing settings
        #[arg(long)]
        force: bool,
    },
}

fn parse_sort_key(value: &str) -> Result<SortKey, String> {
    value.parse()
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(2);
    }

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(exit_code(&e));
        }
    }
}

async fn run(cli: Cli) -> Result<(), PanelError> {
    if let Commands::Config {
        action: ConfigCommands::Init { force },
    } = cli.command
    {
        return cli::config::run_init(cli.config.as_deref(), force);
    }

    let settings = toml_config::load_config_or_default(cli.config.as_deref())?;
    let panel = Panel::from_config(settings);

    match cli.command {
        Commands::Peers { action } => match action {
            PeerCommands::List { json } => cli::peers::run_list(&panel, json).await,
            PeerCommands::Enable { public_key } => {
                cli::peers::run_set_enabled(&panel, &public_key, true).await
            }
            PeerCommands::Disable { public_key } => {
                cli::peers::run_set_enabled(&panel, &public_key, false).await
            }
            PeerCommands::Bulk {
                enable,
                disable: _,
                public_keys,
            } => cli::peers::run_bulk(&panel, &public_keys, enable).await,
            PeerCommands::Add { email } => cli::peers::run_add(&panel, &email).await,
            PeerCommands::ClientConfig { username } => {
                cli::peers::run_client_config(&panel, &username).await
            }
        },
        Commands::Status(args) => {
            let order = match (args.sort.default_order(), args.reverse) {
                (order, false) => order,
                (SortOrder::Ascending, true) => SortOrder::Descending,
                (SortOrder::Descending, true) => SortOrder::Ascending,
            };
            cli::status::run_status(&panel, args.sort, order, args.watch, args.json).await
        }
        Commands::Config { action } => match action {
            ConfigCommands::Show => cli::config::run_show(&panel).await,
            ConfigCommands::Replace { file } => cli::config::run_replace(&panel, &file).await,
            ConfigCommands::Backups => cli::config::run_backups(&panel).await,
            ConfigCommands::Init { .. } => Ok(()),
        },
    }
}

/// Configuration problems exit with 2, runtime failures with 1
fn exit_code(error: &PanelError) -> i32 {
    match error {
        PanelError::Config(_) | PanelError::Toml(_) | PanelError::TomlSerialize(_) => 2,
        PanelError::Peer(_) => 1,
        PanelError::Status(_) => 1,
        PanelError::Command(_) => 1,
        PanelError::Io(_) => 1,
    }
}
