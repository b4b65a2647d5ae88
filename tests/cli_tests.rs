//! Integration tests for the wgpanel binary
//!
//! Each test writes its own settings file and WireGuard configuration into
//! a temporary directory and drives the binary through `--config`.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::{tempdir, TempDir};

const WGPANEL_BINARY: &str = env!("CARGO_BIN_EXE_wgpanel");

const SERVER_CONFIG: &str = "\
[Interface]
Address = 10.0.0.1/24
ListenPort = 51820
PrivateKey = c2VydmVyLXByaXZhdGUta2V5

[Peer]
#alice (alice@example.com)
PublicKey = QUxJQ0U=
AllowedIPs = 10.0.0.2/32

#[Peer]
# bob (bob@example.com)
#PublicKey = Qk9C
#AllowedIPs = 10.0.0.3/32
";

/// Temporary panel setup: settings file plus WireGuard configuration
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("wg0.conf"), SERVER_CONFIG).unwrap();

        let settings = format!(
            "[panel]\n\
             wg_config_path = {:?}\n\
             interface = \"wgtest0\"\n\
             backup_dir = {:?}\n\
             clients_dir = {:?}\n\
             reload_commands = [\"true\"]\n\
             provision_settle_ms = 0\n",
            dir.path().join("wg0.conf"),
            dir.path().join("backup"),
            dir.path().join("clients"),
        );
        std::fs::write(dir.path().join("config.toml"), settings).unwrap();

        Self { dir }
    }

    fn settings_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    fn wg_config(&self) -> String {
        std::fs::read_to_string(self.dir.path().join("wg0.conf")).unwrap()
    }

    fn run(&self, args: &[&str]) -> Output {
        run_with_config(&self.settings_path(), args)
    }
}

fn run_with_config(config: &Path, args: &[&str]) -> Output {
    Command::new(WGPANEL_BINARY)
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("JOURNAL_STREAM")
        .output()
        .expect("Failed to run wgpanel")
}

#[test]
fn test_help_lists_subcommands() {
    let output = Command::new(WGPANEL_BINARY)
        .arg("--help")
        .output()
        .expect("Failed to run wgpanel --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("peers"));
    assert!(stdout.contains("status"));
    assert!(stdout.contains("config"));
}

#[test]
fn test_config_init_writes_defaults_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let output = run_with_config(&path, &["config", "init"]);
    assert!(output.status.success());
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("[panel]"));
    assert!(written.contains("wg_config_path"));

    let again = run_with_config(&path, &["config", "init"]);
    assert_eq!(again.status.code(), Some(2));

    let forced = run_with_config(&path, &["config", "init", "--force"]);
    assert!(forced.status.success());
}

#[test]
fn test_peers_list_json() {
    let fixture = Fixture::new();

    let output = fixture.run(&["peers", "list", "--json"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let peers: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let peers = peers.as_array().unwrap();
    assert_eq!(peers.len(), 2);
    assert_eq!(peers[0]["name"], "alice");
    assert_eq!(peers[0]["enabled"], true);
    assert_eq!(peers[1]["email"], "bob@example.com");
    assert_eq!(peers[1]["enabled"], false);
}

#[test]
fn test_peers_enable_rewrites_config() {
    let fixture = Fixture::new();

    let output = fixture.run(&["peers", "enable", "Qk9C"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let text = fixture.wg_config();
    assert!(text.contains("[Peer]\n#bob (bob@example.com)\nPublicKey = Qk9C\n"));
    assert!(text.starts_with("[Interface]\nAddress = 10.0.0.1/24\n"));
    assert!(fixture.dir.path().join("backup").read_dir().unwrap().next().is_some());
}

#[test]
fn test_peers_disable_unknown_key_fails() {
    let fixture = Fixture::new();

    let output = fixture.run(&["peers", "disable", "NOPE="]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Peer not found: NOPE="));
    assert_eq!(fixture.wg_config(), SERVER_CONFIG);
}

#[test]
fn test_config_show_masks_keys() {
    let fixture = Fixture::new();

    let output = fixture.run(&["config", "show"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("c2VydmVyLXByaXZhdGUta2V5"));
    assert!(stdout.contains("AllowedIPs = 10.0.0.2/32"));
}

#[test]
fn test_status_json_without_live_interface() {
    let fixture = Fixture::new();

    let output = fixture.run(&["status", "--json", "--sort", "name"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let views: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let views = views.as_array().unwrap();
    assert_eq!(views[0]["name"], "alice");
    assert_eq!(views[0]["connection_status"]["is_connected"], false);
    assert_eq!(views[0]["connection_status"]["transfer_received"], "0 B");
}

#[test]
fn test_invalid_settings_exit_with_config_code() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[panel]\nbackup_retention = 0\n").unwrap();

    let output = run_with_config(&path, &["peers", "list"]);

    assert_eq!(output.status.code(), Some(2));
}
