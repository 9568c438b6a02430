//! Error types for hid-watchdog-core.

use thiserror::Error;

/// Core library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HID device communication failure.
    #[error("HID error: {0}")]
    Hid(String),

    /// No attached device matched the requested vendor/product pair.
    #[error("watchdog device not found (VID=0x{vendor_id:04X} PID=0x{product_id:04X})")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    /// Timeout is not a positive multiple of 10 or does not fit the report byte.
    #[error("invalid timeout {0}s: timeout values must be a positive multiple of 10 (max 2430)")]
    InvalidTimeout(u32),

    /// Settings file could not be read, parsed, or validated.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
