//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every field has a default matching the stock car and an Xbox-style pad,
//! so an empty file (or no file at all) is a working configuration.

use serde::Deserialize;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use crate::error::{BridgeError, Result};

/// Highest evdev absolute axis code (ABS_MAX)
const MAX_AXIS_CODE: u16 = 0x3f;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub vehicle: VehicleConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Vehicle network configuration
#[derive(Debug, Deserialize, Clone)]
pub struct VehicleConfig {
    #[serde(default = "default_vehicle_address")]
    pub address: String,

    #[serde(default = "default_vehicle_port")]
    pub port: u16,

    #[serde(default = "default_local_port")]
    pub local_port: u16,
}

/// Controller configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ControllerConfig {
    #[serde(default)]
    pub device_path: String,

    #[serde(default = "default_throttle_axis")]
    pub throttle_axis: u16,

    #[serde(default = "default_steering_axis")]
    pub steering_axis: u16,

    #[serde(default = "default_deadzone_throttle")]
    pub deadzone_throttle: f32,

    #[serde(default = "default_deadzone_steering")]
    pub deadzone_steering: f32,
}

/// Control loop timing
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_reply_timeout_ms")]
    pub reply_timeout_ms: u64,

    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,

    #[serde(default = "default_status_interval_ticks")]
    pub status_interval_ticks: u64,
}

// Default value functions
fn default_vehicle_address() -> String { "192.168.0.1".to_string() }
fn default_vehicle_port() -> u16 { 8234 }
fn default_local_port() -> u16 { 8234 }

fn default_throttle_axis() -> u16 { crate::controller::joystick::DEFAULT_THROTTLE_AXIS }
fn default_steering_axis() -> u16 { crate::controller::joystick::DEFAULT_STEERING_AXIS }
fn default_deadzone_throttle() -> f32 { crate::controller::calibration::DEFAULT_THROTTLE_DEAD_ZONE }
fn default_deadzone_steering() -> f32 { crate::controller::calibration::DEFAULT_STEERING_DEAD_ZONE }

fn default_tick_interval_ms() -> u64 { 100 }
fn default_reply_timeout_ms() -> u64 { 100 }
fn default_handshake_timeout_ms() -> u64 { 2000 }
fn default_status_interval_ticks() -> u64 { 100 }


impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            address: default_vehicle_address(),
            port: default_vehicle_port(),
            local_port: default_local_port(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            device_path: String::new(),
            throttle_axis: default_throttle_axis(),
            steering_axis: default_steering_axis(),
            deadzone_throttle: default_deadzone_throttle(),
            deadzone_steering: default_deadzone_steering(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            reply_timeout_ms: default_reply_timeout_ms(),
            handshake_timeout_ms: default_handshake_timeout_ms(),
            status_interval_ticks: default_status_interval_ticks(),
        }
    }
}

impl VehicleConfig {
    /// Vehicle socket address
    ///
    /// # Errors
    ///
    /// Returns `Config` if `address` is not an IP address
    pub fn remote_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.address.parse().map_err(|_| {
            BridgeError::Config(format!("vehicle address '{}' is not an IP address", self.address))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl SessionConfig {
    /// Control loop period
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Bound on the per-tick wait for a reply
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }

    /// Bound on the wait for a handshake reply
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
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
    /// use mako_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `Config` naming the first value out of its valid range
    pub fn validate(&self) -> Result<()> {
        self.vehicle.remote_addr()?;

        if self.vehicle.port == 0 {
            return Err(BridgeError::Config("vehicle port must not be 0".to_string()));
        }

        for (name, value) in [
            ("throttle_axis", self.controller.throttle_axis),
            ("steering_axis", self.controller.steering_axis),
        ] {
            if value > MAX_AXIS_CODE {
                return Err(BridgeError::Config(format!(
                    "{} must be an evdev ABS_* code between 0 and {}",
                    name, MAX_AXIS_CODE
                )));
            }
        }

        // A threshold of 1.0 would divide by zero when rescaling
        for (name, value) in [
            ("deadzone_throttle", self.controller.deadzone_throttle),
            ("deadzone_steering", self.controller.deadzone_steering),
        ] {
            if !value.is_finite() || !(0.0..1.0).contains(&value) {
                return Err(BridgeError::Config(format!(
                    "{} must be at least 0.0 and below 1.0, got {}",
                    name, value
                )));
            }
        }

        for (name, value) in [
            ("tick_interval_ms", self.session.tick_interval_ms),
            ("reply_timeout_ms", self.session.reply_timeout_ms),
            ("handshake_timeout_ms", self.session.handshake_timeout_ms),
        ] {
            if value == 0 || value > 10000 {
                return Err(BridgeError::Config(format!(
                    "{} must be between 1 and 10000",
                    name
                )));
            }
        }

        if self.session.reply_timeout_ms > self.session.tick_interval_ms {
            return Err(BridgeError::Config(
                "reply_timeout_ms must not exceed tick_interval_ms".to_string(),
            ));
        }

        if self.session.status_interval_ticks == 0 {
            return Err(BridgeError::Config(
                "status_interval_ticks must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
