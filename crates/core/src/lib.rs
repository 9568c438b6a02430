//! hid-watchdog-core: keep-alive session for USB-HID hardware watchdog timers.
//!
//! This crate locates the watchdog among attached HID devices, arms it with a
//! timeout, and feeds it with a fixed 64-byte heartbeat report until shutdown.

pub mod device;
pub mod error;
#[cfg(test)]
mod integration_tests;
pub mod keepalive;
pub mod report;
pub mod settings;
pub mod transport;
pub mod watchdog;

pub use error::{Error, Result};
pub use settings::Settings;
pub use watchdog::{Heartbeat, WatchDog};
