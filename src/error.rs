//! # Error Types
//!
//! Custom error types for Mako Bridge using `thiserror`.

use thiserror::Error;

use crate::session::ConnectionState;

/// Main error type for Mako Bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Malformed configuration file
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Invalid configuration value (dead zone, timing, address)
    #[error("Configuration error: {0}")]
    Config(String),

    /// No joystick exposing the configured axes is attached
    #[error("No joystick with the configured axes was found")]
    ControllerNotFound,

    /// Joystick opened but could not be read
    #[error("Controller error: {0}")]
    Controller(String),

    /// Socket bind or send failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Drive command requested outside `Streaming`
    #[error("Session is not streaming (state {0:?})")]
    NotStreaming(ConnectionState),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Mako Bridge
pub type Result<T> = std::result::Result<T, BridgeError>;
