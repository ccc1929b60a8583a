use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, WalrusError};

/// Environment variable holding the upstream bearer credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable overriding the relay listening port.
pub const PORT_ENV: &str = "PORT";
/// Environment variable overriding the relay base URL used by the client.
pub const BACKEND_URL_ENV: &str = "BACKEND_URL";

/// Instruction sent as the system message on every relayed request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful workshop walrus, an expert in designing and facilitating workshops. \
When given a workshop description, always return a structured list of activities. \
Each activity must have a title and a short description. \
Strictly follow this format with no extra text: \
[{\"title\": \"Activity Name\", \"description\": \"Brief Description\"}]";

/// Top-level configuration for Workshop Walrus.
///
/// Loaded from `~/.walrus/config.toml` by default. The upstream credential is
/// deliberately absent: it lives in [`Credentials`] and never touches disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalrusConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

impl WalrusConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: WalrusConfig = toml::from_str(&content)?;
        debug!("Configuration read from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent
    /// or broken.
    ///
    /// With `required` set (the path was named explicitly) any failure is
    /// returned as an error. Otherwise the failure is handed back next to the
    /// defaults so the caller can report it once logging is up.
    pub fn load_with_fallback(path: &Path, required: bool) -> Result<(Self, Option<WalrusError>)> {
        match Self::load(path) {
            Ok(config) => Ok((config, None)),
            Err(e) if required => Err(WalrusError::Config(format!(
                "Failed to load config from {}: {}",
                path.display(),
                e
            ))),
            Err(e) => Ok((Self::default(), Some(e))),
        }
    }

    /// Overlay `PORT` and `BACKEND_URL` from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Overlay environment values resolved through `lookup`.
    ///
    /// An unparsable `PORT` is ignored with a warning; empty values are
    /// treated as unset.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(PORT_ENV).filter(|v| !v.trim().is_empty()) {
            match raw.trim().parse::<u16>() {
                Ok(port) => self.relay.port = port,
                Err(_) => warn!(value = %raw, "Ignoring invalid {} value", PORT_ENV),
            }
        }
        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.client.backend_url = url.trim().to_string();
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Relay server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Interface to bind.
    pub host: String,
    /// Listening port.
    pub port: u16,
    /// Fixed model identifier sent upstream.
    pub model: String,
    /// Chat-completions endpoint of the model provider.
    pub upstream_url: String,
    /// Upper bound on a single upstream round trip.
    pub timeout_secs: u64,
    /// System message fixing the output grammar.
    pub system_prompt: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            model: "gpt-3.5-turbo".to_string(),
            upstream_url: "https://api.openai.com/v1/chat/completions".to_string(),
            timeout_secs: 30,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Client session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the relay.
    pub backend_url: String,
    /// Upper bound on a single relay round trip.
    pub timeout_secs: u64,
    /// Prompt pre-seeded into a fresh session.
    pub default_prompt: String,
    /// Directory receiving CSV exports.
    pub export_dir: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:3001".to_string(),
            // Slightly above the relay's own upstream bound.
            timeout_secs: 35,
            default_prompt: "Plan a 1-hour onboarding session for a team of eight new hires"
                .to_string(),
            export_dir: ".".to_string(),
        }
    }
}

/// Bearer credential for the model provider.
///
/// Resolved once at startup and handed to the relay explicitly. `Debug`
/// never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    /// Wrap an explicit key. Empty keys are rejected.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(WalrusError::Config(format!("{} is empty", API_KEY_ENV)));
        }
        Ok(Self { api_key })
    }

    /// Read the key from `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the key through `lookup`. Missing or empty keys are a
    /// configuration error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = lookup(API_KEY_ENV)
            .ok_or_else(|| WalrusError::Config(format!("{} is not set", API_KEY_ENV)))?;
        Self::new(key)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = WalrusConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.relay.port, 3001);
        assert_eq!(config.relay.host, "127.0.0.1");
        assert_eq!(config.relay.model, "gpt-3.5-turbo");
        assert_eq!(
            config.relay.upstream_url,
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(config.relay.timeout_secs, 30);
        assert_eq!(config.client.backend_url, "http://localhost:3001");
        assert!(!config.client.default_prompt.is_empty());
    }

    #[test]
    fn test_default_system_prompt_fixes_grammar() {
        let config = RelayConfig::default();
        assert!(config.system_prompt.contains("workshop walrus"));
        assert!(config
            .system_prompt
            .ends_with(r#"[{"title": "Activity Name", "description": "Brief Description"}]"#));
    }

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(
            r#"
[general]
log_level = "debug"

[relay]
port = 4000
model = "gpt-4o-mini"
timeout_secs = 10

[client]
backend_url = "http://relay.local:4000"
"#,
        );
        let config = WalrusConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.relay.port, 4000);
        assert_eq!(config.relay.model, "gpt-4o-mini");
        assert_eq!(config.relay.timeout_secs, 10);
        // Unspecified fields keep their defaults.
        assert_eq!(config.relay.host, "127.0.0.1");
        assert_eq!(config.client.backend_url, "http://relay.local:4000");
        assert_eq!(config.client.export_dir, ".");
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let file = create_temp_config("");
        let config = WalrusConfig::load(file.path()).unwrap();
        assert_eq!(config.relay.port, 3001);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("relay = [[[");
        let err = WalrusConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, WalrusError::Config(_)));
    }

    #[test]
    fn test_fallback_valid_file_has_no_error() {
        let file = create_temp_config("[relay]\nport = 4000\n");
        let (config, error) = WalrusConfig::load_with_fallback(file.path(), true).unwrap();
        assert_eq!(config.relay.port, 4000);
        assert!(error.is_none());
    }

    #[test]
    fn test_fallback_missing_default_file_uses_defaults() {
        let (config, error) =
            WalrusConfig::load_with_fallback(Path::new("/nonexistent/walrus.toml"), false).unwrap();
        assert_eq!(config.relay.port, 3001);
        assert!(error.unwrap().is_not_found());
    }

    #[test]
    fn test_fallback_broken_default_file_reports_error() {
        let file = create_temp_config("relay = [[[");
        let (config, error) = WalrusConfig::load_with_fallback(file.path(), false).unwrap();
        assert_eq!(config.relay.port, 3001);
        let error = error.unwrap();
        assert!(matches!(error, WalrusError::Config(_)));
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_fallback_explicit_missing_file_is_fatal() {
        let err = WalrusConfig::load_with_fallback(Path::new("/nonexistent/walrus.toml"), true)
            .unwrap_err();
        assert!(matches!(err, WalrusError::Config(ref m) if m.contains("/nonexistent/walrus.toml")));
    }

    #[test]
    fn test_fallback_explicit_broken_file_is_fatal() {
        let file = create_temp_config("relay = [[[");
        let err = WalrusConfig::load_with_fallback(file.path(), true).unwrap_err();
        assert!(matches!(err, WalrusError::Config(_)));
    }

    #[test]
    fn test_apply_env_overrides_port_and_backend() {
        let mut config = WalrusConfig::default();
        config.apply_env_with(env(&[
            ("PORT", "8080"),
            ("BACKEND_URL", "https://walrus.example.com"),
        ]));
        assert_eq!(config.relay.port, 8080);
        assert_eq!(config.client.backend_url, "https://walrus.example.com");
    }

    #[test]
    fn test_apply_env_ignores_invalid_port() {
        let mut config = WalrusConfig::default();
        config.apply_env_with(env(&[("PORT", "not-a-port"), ("BACKEND_URL", "  ")]));
        assert_eq!(config.relay.port, 3001);
        assert_eq!(config.client.backend_url, "http://localhost:3001");
    }

    #[test]
    fn test_apply_env_without_values_keeps_config() {
        let mut config = WalrusConfig::default();
        config.relay.port = 9000;
        config.apply_env_with(env(&[]));
        assert_eq!(config.relay.port, 9000);
    }

    #[test]
    fn test_credentials_from_lookup() {
        let creds = Credentials::from_lookup(env(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(creds.api_key(), "sk-test");
    }

    #[test]
    fn test_credentials_missing_is_config_error() {
        let err = Credentials::from_lookup(env(&[])).unwrap_err();
        assert!(matches!(err, WalrusError::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: OPENAI_API_KEY is not set"
        );
    }

    #[test]
    fn test_credentials_empty_is_config_error() {
        let err = Credentials::from_lookup(env(&[("OPENAI_API_KEY", "   ")])).unwrap_err();
        assert!(matches!(err, WalrusError::Config(_)));
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = Credentials::new("sk-very-secret").unwrap();
        let dbg = format!("{:?}", creds);
        assert!(!dbg.contains("sk-very-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn test_credentials_never_serialized_into_config() {
        let toml = toml::to_string_pretty(&WalrusConfig::default()).unwrap();
        assert!(!toml.contains("api_key"));
    }
}
