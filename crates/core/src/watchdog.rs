//! Watchdog session: owns the device handle and the heartbeat report.

use crate::device::{find_device, DeviceBackend};
use crate::error::{Error, Result};
use crate::report::{HeartbeatReport, StatusReply, WatchdogTimeout, READ_TIMEOUT_MS, STATUS_LEN};
use crate::settings::Settings;
use crate::transport::HidTransport;
use tracing::{debug, error, info, warn};

/// Outcome of one heartbeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Heartbeat {
    /// The device acknowledged the heartbeat.
    Acknowledged(StatusReply),
    /// The report was written but nothing was read back before the timeout.
    NoReply,
    /// No device is attached; nothing was sent.
    Skipped,
}

/// A keep-alive session with one USB-HID watchdog.
pub struct WatchDog {
    vendor_id: u16,
    product_id: u16,
    timeout: WatchdogTimeout,
    report: HeartbeatReport,
    device: Option<Box<dyn HidTransport>>,
}

impl std::fmt::Debug for WatchDog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchDog")
            .field("vendor_id", &format_args!("0x{:04X}", self.vendor_id))
            .field("product_id", &format_args!("0x{:04X}", self.product_id))
            .field("timeout", &self.timeout)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl WatchDog {
    /// Create an unattached session. Fails if the timeout is invalid.
    pub fn new(settings: &Settings) -> Result<Self> {
        let timeout = WatchdogTimeout::from_secs(settings.timeout_secs)?;
        Ok(Self {
            vendor_id: settings.vendor_id,
            product_id: settings.product_id,
            timeout,
            report: HeartbeatReport::new(timeout),
            device: None,
        })
    }

    /// Create a session and attach it to the first matching device.
    pub fn connect(backend: &mut dyn DeviceBackend, settings: &Settings) -> Result<Self> {
        let mut watchdog = Self::new(settings)?;
        watchdog.attach(backend)?;
        Ok(watchdog)
    }

    /// Locate and open the watchdog, then arm it with the configured timeout.
    ///
    /// If no attached device matches, the handle stays absent and nothing is
    /// opened or written.
    pub fn attach(&mut self, backend: &mut dyn DeviceBackend) -> Result<()> {
        let devices = backend.enumerate()?;
        let Some(info) = find_device(&devices, self.vendor_id, self.product_id) else {
            error!(
                vid = format_args!("0x{:04X}", self.vendor_id),
                pid = format_args!("0x{:04X}", self.product_id),
                "Could not locate USB-HID watchdog device"
            );
            self.device = None;
            return Err(Error::DeviceNotFound {
                vendor_id: self.vendor_id,
                product_id: self.product_id,
            });
        };

        let device = backend.open(info)?;
        info!(
            vid = format_args!("0x{:04X}", info.vendor_id),
            pid = format_args!("0x{:04X}", info.product_id),
            "Found {} ({}) at {}",
            info.product.as_deref().unwrap_or("unknown"),
            info.serial.as_deref().unwrap_or("none"),
            info.path_lossy()
        );

        device.write_report(self.report.as_bytes())?;
        self.device = Some(device);
        info!(timeout_secs = self.timeout.as_secs(), "Watchdog set to {}", self.timeout);
        Ok(())
    }

    /// Write the "still alive" report and read back the acknowledgement.
    pub fn send_status(&mut self) -> Result<Heartbeat> {
        let Some(device) = self.device.as_ref() else {
            warn!("Watchdog device not available, cannot send status");
            return Ok(Heartbeat::Skipped);
        };

        debug!("Sending 'server alive' report to watchdog");
        device.write_report(self.report.as_bytes())?;

        debug!("Reading status report from watchdog");
        let mut buf = [0u8; STATUS_LEN];
        let n = device.read_report(&mut buf, READ_TIMEOUT_MS)?;
        match StatusReply::decode(&buf[..n]) {
            Some(reply) => {
                debug!(response = %reply.to_hex(), "Watchdog response");
                Ok(Heartbeat::Acknowledged(reply))
            }
            None => {
                error!(timeout_ms = READ_TIMEOUT_MS, "Could not read from watchdog");
                Ok(Heartbeat::NoReply)
            }
        }
    }

    /// Release the device handle so the watchdog can expire.
    ///
    /// Safe to call more than once.
    pub fn close(&mut self) {
        match self.device.take() {
            Some(device) => {
                warn!("Closing watchdog device");
                drop(device);
            }
            None => debug!("Watchdog device not available, nothing to close"),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.device.is_some()
    }

    pub fn timeout(&self) -> WatchdogTimeout {
        self.timeout
    }

    /// The report written on every heartbeat.
    pub fn report(&self) -> &HeartbeatReport {
        &self.report
    }
}
