//! # Error Types
//!
//! Custom error types for Gamepad Pilot using `thiserror`.

use thiserror::Error;

/// Main error type for Gamepad Pilot
#[derive(Debug, Error)]
pub enum PilotError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors (registry stream, joystick device, UDP socket)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No registry block matched the configured gamepad identity
    #[error("No joystick found for device {vendor:04x}:{product:04x}")]
    DeviceNotFound {
        /// Vendor ID that was searched for
        vendor: u16,
        /// Product ID that was searched for
        product: u16,
    },

    /// Drone command link errors
    #[error("Drone link error: {0}")]
    Link(String),
}

/// Result type alias for Gamepad Pilot
pub type Result<T> = std::result::Result<T, PilotError>;
