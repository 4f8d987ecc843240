//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.oldnet/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OldnetConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Milliseconds between printed characters.
    pub print_delay_ms: Option<u64>,
    /// Skip the animated boot sequence.
    pub skip_boot: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChatConfig {
    /// Host of the chat server (login over https, messages over wss).
    pub server_host: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_PRINT_DELAY_MS: u64 = crate::screen::DEFAULT_PRINT_DELAY_MS;
pub const DEFAULT_CHAT_SERVER_HOST: &str = "ws-chat-server.tomng.dev";

const CONFIG_TEMPLATE: &str = "\
# oldnet configuration. Uncomment to override.

[general]
# print_delay_ms = 30
# skip_boot = false

[chat]
# server_host = \"ws-chat-server.tomng.dev\"
";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub print_delay_ms: u64,
    pub skip_boot: bool,
    pub chat_server_host: String,
    pub history_path: PathBuf,
}

/// CLI-level overrides, applied last.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub fast: bool,
    pub skip_boot: bool,
    pub chat_server: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.oldnet`, or `None` when no home directory exists.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".oldnet"))
}

/// Load the config file, generating a commented template on first run.
pub fn load_config() -> Result<OldnetConfig, ConfigError> {
    let Some(dir) = config_dir() else {
        return Ok(OldnetConfig::default());
    };
    let path = dir.join("config.toml");
    match fs::read_to_string(&path) {
        Ok(raw) => toml::from_str(&raw).map_err(ConfigError::Parse),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            if fs::create_dir_all(&dir).is_ok()
                && let Err(write_err) = fs::write(&path, CONFIG_TEMPLATE)
            {
                debug!("Could not write config template: {}", write_err);
            }
            Ok(OldnetConfig::default())
        }
        Err(err) => Err(ConfigError::Io(err)),
    }
}

/// Resolve the final configuration: defaults, then config file, then
/// environment variables, then CLI flags.
pub fn resolve(file: OldnetConfig, cli: CliOverrides) -> ResolvedConfig {
    let mut print_delay_ms = file
        .general
        .print_delay_ms
        .unwrap_or(DEFAULT_PRINT_DELAY_MS);
    let mut skip_boot = file.general.skip_boot.unwrap_or(false);
    let mut chat_server_host = file
        .chat
        .server_host
        .unwrap_or_else(|| DEFAULT_CHAT_SERVER_HOST.to_string());

    if let Ok(value) = std::env::var("OLDNET_PRINT_DELAY_MS") {
        match value.parse() {
            Ok(ms) => print_delay_ms = ms,
            Err(_) => warn!("Ignoring non-numeric OLDNET_PRINT_DELAY_MS={value}"),
        }
    }
    if let Ok(host) = std::env::var("OLDNET_CHAT_SERVER") {
        chat_server_host = host;
    }

    if cli.fast {
        print_delay_ms = 0;
    }
    if cli.skip_boot {
        skip_boot = true;
    }
    if let Some(host) = cli.chat_server {
        chat_server_host = host;
    }

    let history_path = config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("history.json");

    ResolvedConfig {
        print_delay_ms,
        skip_boot,
        chat_server_host,
        history_path,
    }
}
