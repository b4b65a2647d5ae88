//! Peer management commands

use colored::Colorize;
use wgpanel_core::error::PanelError;
use wgpanel_core::service::Panel;

use super::{print_json, print_outcome};

/// List peers in configuration order
pub async fn run_list(panel: &Panel, json: bool) -> Result<(), PanelError> {
    let peers = panel.list_peers().await?;

    if json {
        return print_json(&peers);
    }

    if peers.is_empty() {
        println!("No peers configured in {}", panel.config().wg_config_path.display());
        return Ok(());
    }

    for peer in &peers {
        let state = if peer.enabled {
            "active".green()
        } else {
            "disabled".red()
        };
        let email = if peer.email.is_empty() {
            String::new()
        } else {
            format!(" <{}>", peer.email)
        };
        println!(
            "{:<9} {}{}  {}  {}",
            state,
            peer.name.bold(),
            email,
            peer.allowed_networks,
            peer.public_key.dimmed()
        );
    }
    println!();
    println!(
        "{} peers, {} active",
        peers.len(),
        peers.iter().filter(|p| p.enabled).count()
    );

    Ok(())
}

/// Enable or disable one peer
pub async fn run_set_enabled(panel: &Panel, public_key: &str, enabled: bool) -> Result<(), PanelError> {
    let outcome = panel.set_enabled(public_key, enabled).await?;
    let verb = if enabled { "enabled" } else { "disabled" };

    if outcome.reloaded() {
        println!("✓ Peer {} and WireGuard configuration reloaded", verb);
    } else {
        println!("✓ Peer {}, but WireGuard reload failed", verb);
    }
    print_outcome(&outcome);
    Ok(())
}

/// Enable or disable several peers
pub async fn run_bulk(panel: &Panel, public_keys: &[String], enabled: bool) -> Result<(), PanelError> {
    let result = panel.bulk_set_enabled(public_keys, enabled).await?;
    let verb = if enabled { "enabled" } else { "disabled" };

    println!("✓ {} peers {}", result.updated.len(), verb);
    for key in &result.not_found {
        println!("  {} {}", "not found:".yellow(), key);
    }
    print_outcome(&result.outcome);
    Ok(())
}

/// Provision a new peer and show its client configuration
pub async fn run_add(panel: &Panel, email: &str) -> Result<(), PanelError> {
    let (peer, outcome) = panel.add_peer(email).await?;

    println!("✓ Added {} <{}> at {}", peer.username.bold(), peer.email, peer.address);
    println!("  client config: {}", peer.config_path.display());
    print_outcome(&outcome);

    match &peer.client_config {
        Some(config) => {
            println!();
            println!("{}", config.expose());
        }
        None => println!("Configuration file not found. Please check the server logs."),
    }
    Ok(())
}

/// Print a stored client configuration
pub async fn run_client_config(panel: &Panel, username: &str) -> Result<(), PanelError> {
    let config = panel.client_config(username).await?;
    print!("{}", config.expose());
    Ok(())
}
