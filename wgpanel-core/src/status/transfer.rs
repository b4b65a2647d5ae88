//! Human-readable transfer sizes
//!
//! `wg show` prints counters like `1.52 MiB`. The `*iB` units are base-1024,
//! the bare-letter units base-1000.

use regex::Regex;
use std::sync::OnceLock;

/// Multiplier for a size unit; unknown units count as bytes
fn unit_multiplier(unit: &str) -> f64 {
    match unit {
        "B" => 1.0,
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        "TiB" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        "KB" => 1_000.0,
        "MB" => 1_000_000.0,
        "GB" => 1_000_000_000.0,
        "TB" => 1_000_000_000_000.0,
        _ => 1.0,
    }
}

/// Parse a size such as `512 MiB` into bytes
///
/// Malformed input yields 0 so that a bad counter never breaks a listing.
pub fn parse_data_size(text: &str) -> u64 {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^([\d.]+)\s*(\w+)$").expect("Failed to compile data size pattern")
    });

    let Some(caps) = pattern.captures(text.trim()) else {
        return 0;
    };
    let Ok(value) = caps[1].parse::<f64>() else {
        return 0;
    };

    (value * unit_multiplier(&caps[2])).round() as u64
}
