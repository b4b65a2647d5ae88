//! Live status listing

use colored::Colorize;
use std::time::Duration;
use tracing::info;
use wgpanel_core::error::PanelError;
use wgpanel_core::service::Panel;
use wgpanel_core::status::{sort_views, PeerView, SortKey, SortOrder};

use super::print_json;

/// Refresh period of `--watch`
const WATCH_INTERVAL: Duration = Duration::from_secs(15);

/// Show peers with status, optionally refreshing until Ctrl+C
pub async fn run_status(
    panel: &Panel,
    key: SortKey,
    order: SortOrder,
    watch: bool,
    json: bool,
) -> Result<(), PanelError> {
    if !watch {
        return show_once(panel, key, order, json).await;
    }

    let mut interval = tokio::time::interval(WATCH_INTERVAL);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if !json {
                    // Clear screen and move cursor home
                    print!("\x1B[2J\x1B[H");
                }
                show_once(panel, key, order, json).await?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping status watch");
                return Ok(());
            }
        }
    }
}

async fn show_once(panel: &Panel, key: SortKey, order: SortOrder, json: bool) -> Result<(), PanelError> {
    let mut views = panel.peers_with_status().await?;
    sort_views(&mut views, key, order);

    if json {
        return print_json(&views);
    }

    for view in &views {
        print_row(view);
    }

    let connected = views
        .iter()
        .filter(|v| v.connection_status.is_connected)
        .count();
    let active = views.iter().filter(|v| v.peer.enabled).count();
    println!();
    println!(
        "{} peers, {} active, {} connected",
        views.len(),
        active,
        connected
    );
    Ok(())
}

fn print_row(view: &PeerView) {
    let status = &view.connection_status;
    let indicator = if status.is_connected {
        "● Connected".green()
    } else {
        "○ Offline".dimmed()
    };
    let state = if view.peer.enabled {
        "active".normal()
    } else {
        "disabled".red()
    };

    println!(
        "{:<14} {:<9} {:<20} {:<18} ↓ {:<12} ↑ {}",
        indicator,
        state,
        view.peer.name,
        view.peer.allowed_networks,
        status.transfer_received,
        status.transfer_sent
    );

    if status.is_connected {
        if let Some(handshake) = &status.latest_handshake {
            println!("{:<14} handshake {}", "", handshake.dimmed());
        }
    }
    if let Some(endpoint) = &status.endpoint {
        println!("{:<14} endpoint {}", "", endpoint.dimmed());
    }
}
