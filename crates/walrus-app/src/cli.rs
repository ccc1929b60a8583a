//! CLI argument definitions for the Walrus application.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use walrus_core::WalrusConfig;

/// Workshop Walrus: turns a workshop description into a list of activities.
#[derive(Parser, Debug)]
#[command(name = "walrus", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the relay server. Requires OPENAI_API_KEY.
    Serve {
        /// Listening port.
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,
        /// Interface to bind.
        #[arg(long = "host")]
        host: Option<String>,
    },
    /// Send one prompt through the relay and print the result.
    Ask {
        /// Workshop description.
        prompt: String,
        /// Relay base URL.
        #[arg(long = "backend-url")]
        backend_url: Option<String>,
        /// Write workshop_activities.csv into this directory.
        #[arg(long = "csv")]
        csv: Option<PathBuf>,
        /// Copy the activities to the clipboard.
        #[arg(long = "copy")]
        copy: bool,
    },
    /// Start an interactive session.
    Chat {
        /// Relay base URL.
        #[arg(long = "backend-url")]
        backend_url: Option<String>,
    },
}

/// Where the configuration file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPath {
    pub path: PathBuf,
    /// Named by `--config` or `WALRUS_CONFIG`. Such a file must load.
    pub explicit: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > WALRUS_CONFIG env var > ~/.walrus/config.toml.
    pub fn resolve_config_path(&self) -> ConfigPath {
        self.resolve_config_path_with(|key| std::env::var(key).ok())
    }

    pub fn resolve_config_path_with<F>(&self, lookup: F) -> ConfigPath
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ref p) = self.config {
            return ConfigPath {
                path: p.clone(),
                explicit: true,
            };
        }
        if let Some(p) = lookup("WALRUS_CONFIG").filter(|p| !p.is_empty()) {
            return ConfigPath {
                path: PathBuf::from(p),
                explicit: true,
            };
        }
        ConfigPath {
            path: default_config_path(),
            explicit: false,
        }
    }

    /// Apply command-line overrides on top of file and environment values.
    pub fn apply_overrides(&self, config: &mut WalrusConfig) {
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
        match &self.command {
            Command::Serve { port, host } => {
                if let Some(port) = port {
                    config.relay.port = *port;
                }
                if let Some(host) = host {
                    config.relay.host = host.clone();
                }
            }
            Command::Ask { backend_url, .. } | Command::Chat { backend_url } => {
                if let Some(url) = backend_url {
                    config.client.backend_url = url.clone();
                }
            }
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".walrus").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".walrus").join("config.toml");
    }
    PathBuf::from("config.toml")
}
