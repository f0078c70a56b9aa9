//! # Mako Bridge
//!
//! Drive a Wi-Fi RC car from a USB joystick.
//!
//! This application reads a joystick, encodes throttle and steering into the
//! car's command protocol and streams it over UDP.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

use mako_bridge::config::Config;
use mako_bridge::controller::joystick::Joystick;
use mako_bridge::mako::encoder::CommandEncoder;
use mako_bridge::session::Session;
use mako_bridge::transport::VehicleLink;

/// Configuration file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for Mako Bridge
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (first argument, `config/default.toml`, or defaults)
///    - Open the joystick, failing fast if none is attached
///    - Bind the UDP socket
///
/// 2. **Session**
///    - Handshake with the car
///    - Stream commands every tick until Ctrl+C
///
/// 3. **Graceful Shutdown**
///    - Send one idle command
///    - Release the socket and log totals
///
/// # Errors
///
/// Returns error if:
/// - The configuration is unreadable or invalid
/// - No joystick is attached
/// - The UDP port cannot be bound
///
/// # Examples
///
/// ```bash
/// RUST_LOG=mako_bridge=debug cargo run --release -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Mako Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    // Installed before startup so Ctrl+C during the handshake still idles the car
    let mut interrupt =
        signal(SignalKind::interrupt()).context("Failed to install Ctrl+C handler")?;

    let config = load_config(std::env::args().nth(1))?;

    let encoder = CommandEncoder::from_thresholds(
        config.controller.deadzone_throttle,
        config.controller.deadzone_steering,
    )?;
    info!(
        "Dead zones: throttle {}, steering {}",
        encoder.throttle_dead_zone().threshold(),
        encoder.steering_dead_zone().threshold()
    );

    let joystick = Joystick::open(
        &config.controller.device_path,
        config.controller.throttle_axis,
        config.controller.steering_axis,
    )
    .context("A joystick must be connected before starting")?;
    info!(
        "Joystick ready: {} at {}",
        joystick.name().unwrap_or("unnamed"),
        joystick.device_path()
    );

    let remote = config.vehicle.remote_addr()?;
    let link = VehicleLink::open(config.vehicle.local_port, remote).await?;

    let mut session = Session::new(link, joystick, encoder, config.session.clone());

    info!("Press Ctrl+C to exit");
    session
        .run(async {
            interrupt.recv().await;
        })
        .await;

    let stats = session.close().await;
    info!("Total packets sent: {}", stats.packets_sent);

    Ok(())
}

/// Load the configuration from `arg`, the default file, or built-in defaults
fn load_config(arg: Option<String>) -> Result<Config> {
    match config_path(arg, Path::new(DEFAULT_CONFIG_PATH).exists()) {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            Config::load(&path).with_context(|| format!("Failed to load {}", path.display()))
        }
        None => {
            info!("No configuration file found, using defaults");
            Ok(Config::default())
        }
    }
}

fn config_path(arg: Option<String>, default_exists: bool) -> Option<PathBuf> {
    match arg {
        Some(path) => Some(PathBuf::from(path)),
        None if default_exists => Some(PathBuf::from(DEFAULT_CONFIG_PATH)),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let path = config_path(Some("car.toml".to_string()), true);
        assert_eq!(path, Some(PathBuf::from("car.toml")));
    }

    #[test]
    fn test_default_path_when_present() {
        assert_eq!(config_path(None, true), Some(PathBuf::from(DEFAULT_CONFIG_PATH)));
    }

    #[test]
    fn test_builtin_defaults_when_absent() {
        assert_eq!(config_path(None, false), None);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(load_config(Some("/nonexistent/car.toml".to_string())).is_err());
    }
}
