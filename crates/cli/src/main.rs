//! hid-watchdog CLI: keeps a USB-HID hardware watchdog timer alive.

use anyhow::{Context, Result};
use clap::Parser;
use hid_watchdog_core::device::{DeviceBackend, HidApiBackend};
use hid_watchdog_core::settings::{Overrides, Settings};
use hid_watchdog_core::{keepalive, Error, WatchDog};
use std::path::PathBuf;
use std::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "hid-watchdog",
    version,
    about = "Service to talk to cheap USB-HID watchdog timers"
)]
struct Cli {
    /// Product ID, decimal or 0x-prefixed hex (default: 22352).
    #[arg(short = 'p', long = "pid", value_parser = parse_id)]
    pid: Option<u16>,

    /// Vendor ID, decimal or 0x-prefixed hex (default: 1155).
    #[arg(short = 'v', long = "vid", value_parser = parse_id)]
    vid: Option<u16>,

    /// Seconds before a reboot is forced, multiple of 10 (default: 160).
    #[arg(short = 't', long)]
    timeout: Option<u32>,

    /// Seconds between watchdog updates (default: 9).
    #[arg(short = 'f', long)]
    frequency: Option<u64>,

    /// JSON settings file; command-line flags take precedence.
    #[arg(short = 'c', long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// List attached HID devices and exit.
    #[arg(long)]
    list_devices: bool,

    /// Print debug messages to stderr.
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            vendor_id: self.vid,
            product_id: self.pid,
            timeout_secs: self.timeout,
            frequency_secs: self.frequency,
        }
    }

    /// Settings file (or defaults) with command-line values applied.
    fn settings(&self) -> Result<Settings> {
        let base = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        Ok(base.override_with(self.overrides()))
    }
}

/// Parse a USB ID given as decimal or `0x` hex.
fn parse_id(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid USB id '{s}': {e}"))
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn list_devices() -> Result<()> {
    let mut backend = HidApiBackend::new()?;
    let devices = backend.enumerate()?;
    if devices.is_empty() {
        println!("No HID devices found.");
    }
    for dev in &devices {
        println!(
            "{} (VID: 0x{:04X} / {}, PID: 0x{:04X} / {}, serial: {}, path: {})",
            dev.product.as_deref().unwrap_or("unknown"),
            dev.vendor_id,
            dev.vendor_id,
            dev.product_id,
            dev.product_id,
            dev.serial.as_deref().unwrap_or("none"),
            dev.path_lossy()
        );
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let settings = cli.settings()?;
    settings.validate()?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        info!("Termination signal received");
        let _ = shutdown_tx.send(());
    })
    .context("failed to install signal handler")?;

    let mut backend = HidApiBackend::new()?;
    let mut watchdog = match WatchDog::connect(&mut backend, &settings) {
        Ok(wd) => wd,
        Err(e @ Error::DeviceNotFound { .. }) => {
            error!("Watchdog device not found. Exiting.");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    let heartbeats = keepalive::run(&mut watchdog, settings.frequency(), &shutdown_rx)?;
    info!(heartbeats, "Watchdog released, exiting");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if cli.list_devices {
        return list_devices();
    }

    run(&cli)
}
