//! Device discovery: enumeration, matching, and opening.

use crate::error::{Error, Result};
use crate::transport::HidTransport;
use std::ffi::CString;
use tracing::debug;

/// Default vendor ID of the common STM32-based USB watchdog sticks (0x0483).
pub const DEFAULT_VID: u16 = 1155;
/// Default product ID of the common STM32-based USB watchdog sticks (0x5750).
pub const DEFAULT_PID: u16 = 22352;

/// Information about an attached HID device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub path: CString,
    pub serial: Option<String>,
    pub product: Option<String>,
    pub manufacturer: Option<String>,
}

impl DeviceInfo {
    /// Whether this device has exactly the given vendor/product pair.
    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }

    /// Path as printable text.
    pub fn path_lossy(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl From<&hidapi::DeviceInfo> for DeviceInfo {
    fn from(info: &hidapi::DeviceInfo) -> Self {
        Self {
            vendor_id: info.vendor_id(),
            product_id: info.product_id(),
            path: info.path().to_owned(),
            serial: info.serial_number().map(|s| s.to_string()),
            product: info.product_string().map(|s| s.to_string()),
            manufacturer: info.manufacturer_string().map(|s| s.to_string()),
        }
    }
}

/// Source of HID devices.
///
/// Implemented by [`HidApiBackend`] for real hardware and by a mock in tests.
pub trait DeviceBackend {
    /// List every currently attached HID device.
    fn enumerate(&mut self) -> Result<Vec<DeviceInfo>>;

    /// Open a device by its path.
    fn open(&self, info: &DeviceInfo) -> Result<Box<dyn HidTransport>>;
}

/// [`DeviceBackend`] backed by the system hidapi library.
pub struct HidApiBackend {
    api: hidapi::HidApi,
}

impl HidApiBackend {
    pub fn new() -> Result<Self> {
        let api = hidapi::HidApi::new().map_err(|e| Error::Hid(format!("hidapi init: {e}")))?;
        Ok(Self { api })
    }
}

impl DeviceBackend for HidApiBackend {
    fn enumerate(&mut self) -> Result<Vec<DeviceInfo>> {
        debug!("Starting HID device enumeration");
        self.api
            .refresh_devices()
            .map_err(|e| Error::Hid(format!("refresh devices: {e}")))?;

        let devices: Vec<DeviceInfo> = self.api.device_list().map(DeviceInfo::from).collect();
        debug!(count = devices.len(), "Device enumeration complete");
        Ok(devices)
    }

    fn open(&self, info: &DeviceInfo) -> Result<Box<dyn HidTransport>> {
        let device = self.api.open_path(&info.path).map_err(|e| {
            Error::Hid(format!(
                "open HID device (VID=0x{:04X} PID=0x{:04X}) at {}: {e}",
                info.vendor_id,
                info.product_id,
                info.path_lossy()
            ))
        })?;
        Ok(Box::new(device))
    }
}

/// First device matching the vendor/product pair, in enumeration order.
pub fn find_device(devices: &[DeviceInfo], vendor_id: u16, product_id: u16) -> Option<&DeviceInfo> {
    devices.iter().find(|d| d.matches(vendor_id, product_id))
}
