//! Runtime configuration loaded from a TOML file.

use crate::error::{Error, Result};
use ipnet::Ipv6Net;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub engine: EngineConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the RA redirection engine itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Interface the spoofed advertisements are transmitted on
    pub interface: String,
    /// Advertised on-link prefix; the length is fixed at /64
    pub prefix: Ipv6Net,
    /// Router lifetime advertised in each RA; also used as the prefix
    /// valid/preferred lifetime and the RDNSS lifetime
    #[serde(default = "default_router_lifetime")]
    pub router_lifetime_secs: u16,
    /// Seconds between broadcast cycles
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// A firing that is later than this is skipped instead of run late
    #[serde(default = "default_misfire_grace")]
    pub misfire_grace_secs: u64,
    /// How frames are addressed to devices
    #[serde(default)]
    pub targeting: TargetingMode,
    /// Ping ff02::1 before each cycle so the kernel neighbor table is warm
    #[serde(default = "default_true")]
    pub refresh_neighbors: bool,
}

/// Frame addressing mode.
///
/// `Unicast` steers each device individually: the Ethernet destination is
/// the device MAC and the IPv6 destination its link-local address. In
/// `AllNodes` mode every frame goes to the all-nodes group, so every host
/// on the link sees every advertisement; only meaningful when a tag has a
/// single gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetingMode {
    #[default]
    Unicast,
    AllNodes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_listen")]
    pub listen: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: default_api_listen(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: Config =
            toml::from_str(&raw).map_err(|e| Error::Config(format!("parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.engine.interface.is_empty() {
            return Err(Error::Config("engine.interface must be set".into()));
        }
        if self.engine.prefix.prefix_len() != 64 {
            return Err(Error::Config(format!(
                "engine.prefix must be a /64, got /{}",
                self.engine.prefix.prefix_len()
            )));
        }
        if self.engine.interval_secs == 0 {
            return Err(Error::Config("engine.interval_secs must be nonzero".into()));
        }
        Ok(())
    }
}

fn default_router_lifetime() -> u16 {
    300
}

fn default_interval() -> u64 {
    120
}

fn default_misfire_grace() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_api_listen() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("rasteer.db")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_parses_with_defaults() {
        let config: Config = toml::from_str(
            r#"
            [engine]
            interface = "br0"
            prefix = "2001:db8::/64"
            "#,
        )
        .unwrap();

        config.validate().unwrap();
        assert_eq!(config.engine.router_lifetime_secs, 300);
        assert_eq!(config.engine.interval_secs, 120);
        assert_eq!(config.engine.misfire_grace_secs, 30);
        assert_eq!(config.engine.targeting, TargetingMode::Unicast);
        assert!(config.engine.refresh_neighbors);
        assert_eq!(config.api.listen, "0.0.0.0:8000");
    }

    #[test]
    fn test_rejects_non_64_prefix() {
        let config: Config = toml::from_str(
            r#"
            [engine]
            interface = "br0"
            prefix = "2001:db8::/56"
            "#,
        )
        .unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_targeting_mode_names() {
        let config: Config = toml::from_str(
            r#"
            [engine]
            interface = "eth0"
            prefix = "2001:db8::/64"
            targeting = "all-nodes"
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.targeting, TargetingMode::AllNodes);
    }
}
