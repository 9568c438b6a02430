//! Runtime settings: device identity, timeout, and heartbeat interval.
//!
//! Settings can come from a JSON file; command-line flags are layered on top
//! by the binary with [`Settings::override_with`].

use crate::device::{DEFAULT_PID, DEFAULT_VID};
use crate::error::{Error, Result};
use crate::report::WatchdogTimeout;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Default timeout before the watchdog forces a reset.
pub const DEFAULT_TIMEOUT_SECS: u32 = 160;
/// Default heartbeat interval.
pub const DEFAULT_FREQUENCY_SECS: u64 = 9;

/// Watchdog service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub vendor_id: u16,
    pub product_id: u16,
    /// Seconds without a heartbeat before the device resets the host.
    pub timeout_secs: u32,
    /// Seconds between heartbeats.
    pub frequency_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vendor_id: DEFAULT_VID,
            product_id: DEFAULT_PID,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            frequency_secs: DEFAULT_FREQUENCY_SECS,
        }
    }
}

/// Values explicitly given on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
    pub timeout_secs: Option<u32>,
    pub frequency_secs: Option<u64>,
}

impl Settings {
    /// Parse settings from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Config(format!("invalid settings: {e}")))
    }

    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("read {}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Apply command-line values on top of these settings.
    pub fn override_with(mut self, overrides: Overrides) -> Self {
        if let Some(vid) = overrides.vendor_id {
            self.vendor_id = vid;
        }
        if let Some(pid) = overrides.product_id {
            self.product_id = pid;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }
        if let Some(frequency) = overrides.frequency_secs {
            self.frequency_secs = frequency;
        }
        self
    }

    /// Check the settings before any device I/O.
    ///
    /// A heartbeat interval at or above the timeout is allowed but will let
    /// the watchdog expire between heartbeats.
    pub fn validate(&self) -> Result<WatchdogTimeout> {
        let timeout = WatchdogTimeout::from_secs(self.timeout_secs)?;
        if self.frequency_secs == 0 {
            return Err(Error::Config("frequency must be at least 1 second".into()));
        }
        if self.frequency_secs >= u64::from(timeout.as_secs()) {
            warn!(
                frequency_secs = self.frequency_secs,
                timeout_secs = timeout.as_secs(),
                "Heartbeat interval is not shorter than the watchdog timeout"
            );
        }
        Ok(timeout)
    }

    /// Heartbeat interval.
    pub fn frequency(&self) -> Duration {
        Duration::from_secs(self.frequency_secs)
    }
}
