//! Integration tests: exercise the full flow using a simulated watchdog stick.
//!
//! These tests load settings, attach through a mock backend, run the
//! keep-alive loop, and check the exact bytes that reached the device.

#[cfg(test)]
mod tests {
    use crate::device::mock::{device, MockBackend};
    use crate::error::Error;
    use crate::keepalive;
    use crate::report::{READ_TIMEOUT_MS, REPORT_LEN};
    use crate::settings::{Overrides, Settings};
    use crate::watchdog::{Heartbeat, WatchDog};
    use std::sync::mpsc;
    use std::time::Duration;

    const VID: u16 = 0x0483;
    const PID: u16 = 0x5750;

    /// A bus with a keyboard, a mouse, and the watchdog stick.
    fn create_mock_bus() -> MockBackend {
        MockBackend::new(vec![
            device(0x046D, 0xC08B, "/dev/hidraw0"),
            device(0x1532, 0x0084, "/dev/hidraw1"),
            device(VID, PID, "/dev/hidraw2"),
        ])
    }

    /// Test: settings file + CLI overrides → attach → heartbeats → shutdown.
    #[test]
    fn full_session_cycle() {
        let mut backend = create_mock_bus();
        let settings = Settings::from_json(r#"{ "timeout_secs": 300, "frequency_secs": 30 }"#)
            .unwrap()
            .override_with(Overrides {
                timeout_secs: Some(60),
                ..Overrides::default()
            });
        let timeout = settings.validate().unwrap();
        assert_eq!(timeout.as_secs(), 60);

        let mut wd = WatchDog::connect(&mut backend, &settings).unwrap();
        assert_eq!(
            backend.opened_paths()[0].to_str().unwrap(),
            "/dev/hidraw2"
        );

        backend.transport.queue_reply(&[0x01, 0x02]);
        let (tx, rx) = mpsc::channel();
        let stopper = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            tx.send(()).unwrap();
        });
        let sent = keepalive::run(&mut wd, settings.frequency(), &rx).unwrap();
        stopper.join().unwrap();
        assert_eq!(sent, 1);

        let writes = backend.transport.writes();
        assert_eq!(writes.len(), 2);
        for w in &writes {
            assert_eq!(w.len(), REPORT_LEN);
            assert_eq!(w[0], 60 / 10 + 12);
            assert!(w[1..].iter().all(|&b| b == 0));
        }
        assert_eq!(backend.transport.read_timeouts(), vec![READ_TIMEOUT_MS]);
        assert!(backend.transport.is_closed());
    }

    /// Test: every valid timeout arms the device with its own code.
    #[test]
    fn arm_byte_tracks_timeout() {
        for timeout_secs in [10, 100, 160, 600, 2430] {
            let mut backend = create_mock_bus();
            let settings = Settings {
                vendor_id: VID,
                product_id: PID,
                timeout_secs,
                ..Settings::default()
            };
            WatchDog::connect(&mut backend, &settings).unwrap();
            let writes = backend.transport.writes();
            assert_eq!(writes[0][0] as u32, timeout_secs / 10 + 12);
        }
    }

    /// Test: an invalid timeout fails before the bus is touched.
    #[test]
    fn invalid_timeout_never_enumerates() {
        let mut backend = create_mock_bus();
        let settings = Settings {
            vendor_id: VID,
            product_id: PID,
            timeout_secs: 165,
            ..Settings::default()
        };
        let result = WatchDog::connect(&mut backend, &settings);
        assert!(matches!(result, Err(Error::InvalidTimeout(165))));
        assert_eq!(backend.enumerations, 0);
        assert!(backend.transport.writes().is_empty());
    }

    /// Test: a missing stick leaves the session detached and the bus untouched.
    #[test]
    fn missing_device_sends_nothing() {
        let mut backend = create_mock_bus();
        let settings = Settings {
            vendor_id: VID,
            product_id: 0xFFFF,
            ..Settings::default()
        };
        let mut wd = WatchDog::new(&settings).unwrap();
        assert!(matches!(
            wd.attach(&mut backend),
            Err(Error::DeviceNotFound { .. })
        ));
        assert_eq!(wd.send_status().unwrap(), Heartbeat::Skipped);
        wd.close();

        assert!(backend.opened_paths().is_empty());
        assert!(backend.transport.writes().is_empty());
        assert!(backend.transport.read_timeouts().is_empty());
    }

    /// Test: a silent device keeps being fed.
    #[test]
    fn silent_device_is_not_fatal() {
        let mut backend = create_mock_bus();
        let settings = Settings {
            vendor_id: VID,
            product_id: PID,
            ..Settings::default()
        };
        let mut wd = WatchDog::connect(&mut backend, &settings).unwrap();

        let (tx, rx) = mpsc::channel();
        let stopper = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            tx.send(()).unwrap();
        });
        let sent = keepalive::run(&mut wd, Duration::from_millis(5), &rx).unwrap();
        stopper.join().unwrap();

        let writes = backend.transport.writes().len() as u64;
        assert!(writes > 2);
        assert_eq!(sent, writes - 1);
        assert_eq!(
            backend.transport.read_timeouts().len() as u64,
            sent,
            "every heartbeat waits for an acknowledgement"
        );
    }
}
