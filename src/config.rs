//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::controller::PadLayout;
use crate::error::{PilotError, Result};
use crate::registry::TargetIdentity;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub gamepad: GamepadConfig,
    #[serde(default)]
    pub drone: DroneConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Gamepad discovery and polling configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GamepadConfig {
    #[serde(default)]
    pub layout: PadLayout,

    /// Overrides the layout's vendor ID
    #[serde(default)]
    pub vendor: Option<u16>,

    /// Overrides the layout's product ID
    #[serde(default)]
    pub product: Option<u16>,

    #[serde(default = "default_registry_path")]
    pub registry_path: PathBuf,

    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// Drone link configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DroneConfig {
    #[serde(default = "default_drone_address")]
    pub address: String,

    #[serde(default = "default_at_port")]
    pub at_port: u16,

    #[serde(default = "default_keepalive_ms")]
    pub keepalive_ms: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily log files; empty logs to stdout only
    #[serde(default)]
    pub log_dir: String,
}

// Default value functions
fn default_registry_path() -> PathBuf { PathBuf::from("/proc/bus/input/devices") }
fn default_input_dir() -> PathBuf { PathBuf::from("/dev/input") }
fn default_poll_interval_ms() -> u64 { 20 }

fn default_drone_address() -> String { "192.168.1.1".to_string() }
fn default_at_port() -> u16 { crate::drone::at::AT_PORT }
fn default_keepalive_ms() -> u64 { 30 }

fn default_log_level() -> String { "info".to_string() }

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Default for GamepadConfig {
    fn default() -> Self {
        Self {
            layout: PadLayout::default(),
            vendor: None,
            product: None,
            registry_path: default_registry_path(),
            input_dir: default_input_dir(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for DroneConfig {
    fn default() -> Self {
        Self {
            address: default_drone_address(),
            at_port: default_at_port(),
            keepalive_ms: default_keepalive_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

impl GamepadConfig {
    /// Identity to search the registry for.
    ///
    /// Each of `vendor`/`product` falls back to the layout's reference pad.
    ///
    /// # Examples
    ///
    /// ```
    /// use gamepad_pilot::config::GamepadConfig;
    ///
    /// let mut gamepad = GamepadConfig::default();
    /// gamepad.product = Some(0xc216);
    /// assert_eq!(gamepad.target().to_string(), "046d:c216");
    /// ```
    #[must_use]
    pub fn target(&self) -> TargetIdentity {
        let fallback = self.layout.default_identity();
        TargetIdentity::new(
            self.vendor.unwrap_or(fallback.vendor),
            self.product.unwrap_or(fallback.product),
        )
    }
}

impl DroneConfig {
    /// Socket address of the drone's AT command port.
    ///
    /// # Errors
    ///
    /// Returns `Config` if `address` is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.address.parse().map_err(|_| {
            PilotError::Config(toml::de::Error::custom(format!(
                "drone address '{}' is not a valid IP address",
                self.address
            )))
        })?;
        Ok(SocketAddr::new(ip, self.at_port))
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gamepad_pilot::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.gamepad.registry_path.as_os_str().is_empty() {
            return Err(PilotError::Config(
                toml::de::Error::custom("registry_path cannot be empty")
            ));
        }

        if self.gamepad.input_dir.as_os_str().is_empty() {
            return Err(PilotError::Config(
                toml::de::Error::custom("input_dir cannot be empty")
            ));
        }

        if self.gamepad.poll_interval_ms == 0 || self.gamepad.poll_interval_ms > 1000 {
            return Err(PilotError::Config(
                toml::de::Error::custom("poll_interval_ms must be between 1 and 1000")
            ));
        }

        // Validate drone link
        self.drone.socket_addr()?;

        if self.drone.at_port == 0 {
            return Err(PilotError::Config(
                toml::de::Error::custom("at_port cannot be 0")
            ));
        }

        if self.drone.keepalive_ms == 0 || self.drone.keepalive_ms > 2000 {
            return Err(PilotError::Config(
                toml::de::Error::custom("keepalive_ms must be between 1 and 2000")
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(PilotError::Config(
                toml::de::Error::custom(format!(
                    "log level must be one of: {}",
                    LOG_LEVELS.join(", ")
                ))
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_config() -> Config {
        Config::default()
    }

    fn load_str(toml_content: &str) -> Result<Config> {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        Config::load(temp_file.path())
    }

    #[test]
    fn test_default_config() {
        assert!(create_valid_config().validate().is_ok());
    }

    #[test]
    fn test_load_config_from_file() {
        let toml_content = r#"
[gamepad]
layout = "ps3"
poll_interval_ms = 10

[drone]
address = "10.0.0.2"
keepalive_ms = 50

[logging]
level = "debug"
"#;

        let config = load_str(toml_content).unwrap();
        assert_eq!(config.gamepad.layout, PadLayout::Ps3);
        assert_eq!(config.gamepad.poll_interval_ms, 10);
        assert_eq!(config.drone.address, "10.0.0.2");
        assert_eq!(config.drone.at_port, 5556);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_empty_file_uses_defaults() {
        let config = load_str("").unwrap();
        assert_eq!(config.gamepad.layout, PadLayout::Logitech);
        assert_eq!(config.gamepad.registry_path, PathBuf::from("/proc/bus/input/devices"));
        assert_eq!(config.drone.address, "192.168.1.1");
        assert!(config.logging.log_dir.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/gamepad-pilot.toml");
        assert!(matches!(result, Err(PilotError::Io(_))));
    }

    #[test]
    fn test_load_unknown_layout() {
        let result = load_str("[gamepad]\nlayout = \"xbox\"\n");
        assert!(matches!(result, Err(PilotError::Config(_))));
    }

    #[test]
    fn test_load_shipped_default_config() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml");
        assert!(Config::load(path).is_ok());
    }

    // ==================== Target identity ====================

    #[test]
    fn test_target_defaults_to_layout_identity() {
        let mut config = create_valid_config();
        assert_eq!(config.gamepad.target(), TargetIdentity::new(0x046d, 0xc21a));

        config.gamepad.layout = PadLayout::Ps3;
        assert_eq!(config.gamepad.target(), TargetIdentity::new(0x054c, 0x0268));
    }

    #[test]
    fn test_target_overrides() {
        let config = load_str("[gamepad]\nvendor = 0x046d\nproduct = 0xc216\n").unwrap();
        assert_eq!(config.gamepad.target(), TargetIdentity::new(0x046d, 0xc216));
    }

    // ==================== Validation ====================

    #[test]
    fn test_empty_registry_path() {
        let mut config = create_valid_config();
        config.gamepad.registry_path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_input_dir() {
        let mut config = create_valid_config();
        config.gamepad.input_dir = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_interval_zero() {
        let mut config = create_valid_config();
        config.gamepad.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_interval_too_high() {
        let mut config = create_valid_config();
        config.gamepad.poll_interval_ms = 1001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_drone_address() {
        let mut config = create_valid_config();
        config.drone.address = "drone.local".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ipv6_drone_address() {
        let mut config = create_valid_config();
        config.drone.address = "::1".to_string();
        assert!(config.validate().is_ok());
        assert_eq!(config.drone.socket_addr().unwrap().to_string(), "[::1]:5556");
    }

    #[test]
    fn test_at_port_zero() {
        let mut config = create_valid_config();
        config.drone.at_port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_keepalive_zero() {
        let mut config = create_valid_config();
        config.drone.keepalive_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_keepalive_too_high() {
        let mut config = create_valid_config();
        config.drone.keepalive_ms = 2001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = create_valid_config();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_log_levels() {
        for level in LOG_LEVELS {
            let mut config = create_valid_config();
            config.logging.level = level.to_string();
            assert!(config.validate().is_ok(), "Level {} should be valid", level);
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = create_valid_config();
        assert_eq!(config.drone.socket_addr().unwrap().to_string(), "192.168.1.1:5556");
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_registry_path(), PathBuf::from("/proc/bus/input/devices"));
        assert_eq!(default_input_dir(), PathBuf::from("/dev/input"));
        assert_eq!(default_poll_interval_ms(), 20);
        assert_eq!(default_drone_address(), "192.168.1.1");
        assert_eq!(default_at_port(), 5556);
        assert_eq!(default_keepalive_ms(), 30);
        assert_eq!(default_log_level(), "info");
    }
}
