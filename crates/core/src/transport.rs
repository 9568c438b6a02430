//! HID transport abstraction for device communication.
//!
//! Provides a trait-based transport layer so that real HID devices and
//! mock devices share the same interface.

use crate::error::{Error, Result};
use tracing::trace;

/// Abstraction over raw HID read/write.
pub trait HidTransport {
    /// Write a raw output report. Returns the number of bytes written.
    fn write_report(&self, data: &[u8]) -> Result<usize>;

    /// Read an input report, waiting at most `timeout_ms`.
    ///
    /// Returns 0 if nothing arrived before the timeout.
    fn read_report(&self, buf: &mut [u8], timeout_ms: i32) -> Result<usize>;
}

impl HidTransport for hidapi::HidDevice {
    fn write_report(&self, data: &[u8]) -> Result<usize> {
        trace!(report_hex = format_args!("{:02X?}", data), "HID TX");
        self.write(data).map_err(|e| Error::Hid(format!("write: {e}")))
    }

    fn read_report(&self, buf: &mut [u8], timeout_ms: i32) -> Result<usize> {
        let n = self
            .read_timeout(buf, timeout_ms)
            .map_err(|e| Error::Hid(format!("read_timeout: {e}")))?;
        trace!(report_hex = format_args!("{:02X?}", &buf[..n]), "HID RX");
        Ok(n)
    }
}
