use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use config::{Config, File};
use log::debug;
use serde::Deserialize;

use crate::cli::Args;
use crate::controller::{RefreshOn, RefreshPolicy};
use crate::resolver::View;

pub const DEFAULT_SERVER: &str = "http://localhost";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    pub server: Option<String>,
    pub user: Option<String>,
    pub view: Option<String>,
    pub timeout_secs: Option<u64>,
    pub subscribe_refresh: Option<RefreshOn>,
    pub unsubscribe_refresh: Option<RefreshOn>,
}

/// Fully resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub server: String,
    pub user: String,
    pub view: View,
    pub timeout: Duration,
    pub policy: RefreshPolicy,
}

const CONFIG_FILE_NAME: &str = env!("CARGO_PKG_NAME");

// Function to get the XDG_CONFIG_HOME path
fn get_xdg_config_path() -> Option<PathBuf> {
    // First check XDG_CONFIG_HOME environment variable
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config));
    }

    // If XDG_CONFIG_HOME is not set, fall back to $HOME/.config
    if let Ok(home) = env::var("HOME") {
        return Some(PathBuf::from(home).join(".config"));
    }

    None
}

pub fn default_config_path() -> Option<PathBuf> {
    get_xdg_config_path().map(|xdg_config| xdg_config.join(CONFIG_FILE_NAME).join("config.toml"))
}

pub fn load_settings_from(config_path: &Path) -> anyhow::Result<Settings> {
    if !config_path.exists() {
        return Ok(Settings::default());
    }

    Config::builder()
        .add_source(File::from(config_path).required(false))
        .build()?
        .try_deserialize()
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to deserialize config file {}: {}",
                config_path.display(),
                e
            )
        })
}

pub fn load_settings() -> anyhow::Result<Settings> {
    match default_config_path() {
        Some(config_path) => load_settings_from(&config_path),
        None => Ok(Settings::default()),
    }
}

/// Command line values win over the config file, which wins over defaults.
pub fn merge_settings_with_args(args: &Args, settings: Settings) -> anyhow::Result<ClientConfig> {
    let view = match (args.view, settings.view) {
        (Some(view), _) => view,
        (None, Some(label)) => label
            .parse::<View>()
            .map_err(|e: String| anyhow::anyhow!("invalid view in config file: {e}"))?,
        (None, None) => View::default(),
    };

    let defaults = RefreshPolicy::default();

    let config = ClientConfig {
        server: args
            .server
            .clone()
            .or(settings.server)
            .unwrap_or_else(|| DEFAULT_SERVER.to_string()),
        user: args.user.clone().or(settings.user).unwrap_or_default(),
        view,
        timeout: Duration::from_secs(
            args.timeout
                .or(settings.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        ),
        policy: RefreshPolicy {
            subscribe: settings.subscribe_refresh.unwrap_or(defaults.subscribe),
            unsubscribe: settings.unsubscribe_refresh.unwrap_or(defaults.unsubscribe),
        },
    };

    debug!("merged config: {:?}", config);

    Ok(config)
}
