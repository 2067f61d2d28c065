//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `relayhub.toml` in the working directory. Every field except the
//! API key has a sensible default so the file is optional. Environment
//! variables take precedence over file values.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Shared-secret authentication.
    pub auth: AuthConfig,
    /// Persisted relay state document.
    pub storage: StorageConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// How relay lines are driven.
    pub outputs: OutputsConfig,
    /// Relay port → GPIO pin mapping.
    pub relays: Vec<RelayConfig>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Value every request must carry in `X-API-Key`.
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON document path.
    pub path: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputBackend {
    /// Linux sysfs GPIO.
    Sysfs,
    /// In-memory lines, no hardware.
    Virtual,
}

impl std::str::FromStr for OutputBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sysfs" => Ok(Self::Sysfs),
            "virtual" => Ok(Self::Virtual),
            other => Err(ConfigError::Validation(format!(
                "unknown output backend {other:?}, expected \"sysfs\" or \"virtual\""
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputsConfig {
    pub backend: OutputBackend,
    /// Relay boards that switch on when the line is driven low.
    pub active_low: bool,
    /// sysfs GPIO class directory.
    pub sysfs_root: PathBuf,
}

/// One relay: the port clients address and the pin that drives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RelayConfig {
    pub port: u16,
    pub pin: u32,
}

impl Config {
    /// Load configuration from `relayhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, an
    /// override is invalid, or the result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("relayhub.toml")?;
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = var("RELAYHUB_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("RELAYHUB_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("RELAYHUB_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = var("RELAYHUB_API_KEY") {
            self.auth.api_key = val;
        }
        if let Some(val) = var("RELAYHUB_STATE_PATH") {
            self.storage.path = PathBuf::from(val);
        }
        if let Some(val) = var("RELAYHUB_OUTPUT_BACKEND") {
            self.outputs.backend = val.parse()?;
        }
        if let Some(val) = var("RELAYHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.auth.api_key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "an API key is required (auth.api_key or RELAYHUB_API_KEY)".to_string(),
            ));
        }
        if self.relays.is_empty() {
            return Err(ConfigError::Validation(
                "at least one relay must be configured".to_string(),
            ));
        }
        let mut ports = HashSet::new();
        let mut pins = HashSet::new();
        for relay in &self.relays {
            if !ports.insert(relay.port) {
                return Err(ConfigError::Validation(format!(
                    "relay port {} configured twice",
                    relay.port
                )));
            }
            if !pins.insert(relay.pin) {
                return Err(ConfigError::Validation(format!(
                    "gpio pin {} assigned to more than one relay",
                    relay.pin
                )));
            }
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
            outputs: OutputsConfig::default(),
            relays: default_relays(),
        }
    }
}

/// Relay HAT wiring: ports 1-6 on the board's fixed GPIO lines.
fn default_relays() -> Vec<RelayConfig> {
    [(1, 526), (2, 527), (3, 530), (4, 535), (5, 536), (6, 537)]
        .into_iter()
        .map(|(port, pin)| RelayConfig { port, pin })
        .collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("relayStates.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "relayhubd=info,relayhub=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for OutputsConfig {
    fn default() -> Self {
        Self {
            backend: OutputBackend::Sysfs,
            active_low: true,
            sysfs_root: PathBuf::from(relayhub_adapter_gpio_sysfs::DEFAULT_SYSFS_ROOT),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn with_key() -> Config {
        let mut config = Config::default();
        config.auth.api_key = "secret".to_string();
        config
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.path, PathBuf::from("relayStates.json"));
        assert_eq!(config.outputs.backend, OutputBackend::Sysfs);
        assert!(config.outputs.active_low);
        assert_eq!(config.outputs.sysfs_root, PathBuf::from("/sys/class/gpio"));
    }

    #[test]
    fn should_default_to_six_relay_mapping() {
        let pins: Vec<(u16, u32)> = Config::default()
            .relays
            .iter()
            .map(|r| (r.port, r.pin))
            .collect();
        assert_eq!(
            pins,
            vec![(1, 526), (2, 527), (3, 530), (4, 535), (5, 536), (6, 537)]
        );
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.relays.len(), 6);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090

            [auth]
            api_key = 'hunter2'

            [storage]
            path = '/var/lib/relayhub/state.json'

            [logging]
            filter = 'debug'

            [outputs]
            backend = 'virtual'
            active_low = false
            sysfs_root = '/tmp/gpio'

            [[relays]]
            port = 1
            pin = 17

            [[relays]]
            port = 2
            pin = 27
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.auth.api_key, "hunter2");
        assert_eq!(config.storage.path, PathBuf::from("/var/lib/relayhub/state.json"));
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.outputs.backend, OutputBackend::Virtual);
        assert!(!config.outputs.active_low);
        assert_eq!(
            config.relays,
            vec![RelayConfig { port: 1, pin: 17 }, RelayConfig { port: 2, pin: 27 }]
        );
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_unknown_backend_in_toml() {
        let result: Result<Config, _> = toml::from_str("[outputs]\nbackend = 'serial'");
        assert!(result.is_err());
    }

    #[test]
    fn should_apply_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_overrides(env(&[
                ("RELAYHUB_API_KEY", "from-env"),
                ("RELAYHUB_STATE_PATH", "/data/relays.json"),
                ("RELAYHUB_OUTPUT_BACKEND", "virtual"),
                ("RELAYHUB_PORT", "8080"),
                ("RELAYHUB_LOG", "warn"),
            ]))
            .unwrap();
        assert_eq!(config.auth.api_key, "from-env");
        assert_eq!(config.storage.path, PathBuf::from("/data/relays.json"));
        assert_eq!(config.outputs.backend, OutputBackend::Virtual);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn should_prefer_bind_over_host_and_port() {
        let mut config = Config::default();
        config
            .apply_env_overrides(env(&[
                ("RELAYHUB_HOST", "10.0.0.1"),
                ("RELAYHUB_BIND", "127.0.0.1:4000"),
            ]))
            .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:4000");
    }

    #[test]
    fn should_prefer_rust_log_over_relayhub_log() {
        let mut config = Config::default();
        config
            .apply_env_overrides(env(&[("RELAYHUB_LOG", "warn"), ("RUST_LOG", "trace")]))
            .unwrap();
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_reject_unknown_backend_override() {
        let mut config = Config::default();
        let result = config.apply_env_overrides(env(&[("RELAYHUB_OUTPUT_BACKEND", "serial")]));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_accept_defaults_with_api_key() {
        assert!(with_key().validate().is_ok());
    }

    #[test]
    fn should_reject_missing_api_key() {
        assert!(matches!(
            Config::default().validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = with_key();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_empty_relay_list() {
        let mut config = with_key();
        config.relays.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_duplicate_relay_port() {
        let mut config = with_key();
        config.relays.push(RelayConfig { port: 1, pin: 600 });
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_shared_pin() {
        let mut config = with_key();
        config.relays.push(RelayConfig { port: 7, pin: 526 });
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_format_bind_addr() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }
}
