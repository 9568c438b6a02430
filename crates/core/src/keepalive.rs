//! The keep-alive loop: heartbeat, then wait for the next tick or shutdown.

use crate::error::Result;
use crate::watchdog::{Heartbeat, WatchDog};
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;
use tracing::{debug, info};

/// Feed the watchdog every `frequency` until `shutdown` fires.
///
/// A message on `shutdown`, or its sender being dropped, ends the loop without
/// waiting out the interval. A shutdown already pending on entry stops the
/// loop before any heartbeat. The device is closed on every exit path.
/// Returns the number of heartbeats written, acknowledged or not.
pub fn run(watchdog: &mut WatchDog, frequency: Duration, shutdown: &Receiver<()>) -> Result<u64> {
    let mut sent = 0u64;
    info!(interval_secs = frequency.as_secs(), "Starting keep-alive loop");

    let result = match shutdown.try_recv() {
        Ok(()) | Err(TryRecvError::Disconnected) => {
            info!("Shutdown requested before first heartbeat");
            Ok(sent)
        }
        Err(TryRecvError::Empty) => loop {
            match watchdog.send_status() {
                Ok(Heartbeat::Acknowledged(_) | Heartbeat::NoReply) => sent += 1,
                Ok(Heartbeat::Skipped) => {}
                Err(e) => break Err(e),
            }

            match shutdown.recv_timeout(frequency) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) => {
                    info!("Shutdown requested");
                    break Ok(sent);
                }
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("Shutdown channel closed");
                    break Ok(sent);
                }
            }
        },
    };

    watchdog.close();
    result
}
