//! Watchdog report encoding and decoding.
//!
//! The device speaks a vendor-fixed layout:
//! - Output: one 64-byte report. Byte 0 carries the timeout code
//!   (`timeout_secs / 10 + 12`), all other bytes are zero.
//! - Input: up to 2 status bytes acknowledging the heartbeat.

use crate::error::{Error, Result};
use std::fmt;

/// Length of the heartbeat/configuration report.
pub const REPORT_LEN: usize = 64;
/// Number of status bytes read back after each heartbeat.
pub const STATUS_LEN: usize = 2;
/// Read timeout for the acknowledgement.
pub const READ_TIMEOUT_MS: i32 = 2000;

/// Timeouts are expressed in steps of this many seconds.
pub const TIMEOUT_STEP_SECS: u32 = 10;
/// Offset added to the step count when encoding byte 0.
pub const TIMEOUT_CODE_OFFSET: u8 = 12;
/// Largest timeout whose code still fits in one byte.
pub const MAX_TIMEOUT_SECS: u32 = (u8::MAX - TIMEOUT_CODE_OFFSET) as u32 * TIMEOUT_STEP_SECS;

/// A validated watchdog timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchdogTimeout(u32);

impl WatchdogTimeout {
    /// Validate a timeout given in seconds.
    pub fn from_secs(secs: u32) -> Result<Self> {
        if secs == 0 || secs % TIMEOUT_STEP_SECS != 0 || secs > MAX_TIMEOUT_SECS {
            return Err(Error::InvalidTimeout(secs));
        }
        Ok(Self(secs))
    }

    /// Timeout in seconds.
    pub fn as_secs(&self) -> u32 {
        self.0
    }

    /// Byte 0 of the heartbeat report.
    pub fn code(&self) -> u8 {
        // from_secs bounds the step count to 243
        (self.0 / TIMEOUT_STEP_SECS) as u8 + TIMEOUT_CODE_OFFSET
    }
}

impl fmt::Display for WatchdogTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} seconds", self.0)
    }
}

/// The 64-byte report written to arm and feed the watchdog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatReport {
    buf: [u8; REPORT_LEN],
}

impl HeartbeatReport {
    pub fn new(timeout: WatchdogTimeout) -> Self {
        let mut buf = [0u8; REPORT_LEN];
        buf[0] = timeout.code();
        Self { buf }
    }

    /// Raw report bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}

/// Acknowledgement read back from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReply {
    bytes: Vec<u8>,
}

impl StatusReply {
    /// Decode a reply. Returns `None` for an empty read.
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.is_empty() {
            return None;
        }
        let len = data.len().min(STATUS_LEN);
        Some(Self {
            bytes: data[..len].to_vec(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex rendering, e.g. `0102`.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}
