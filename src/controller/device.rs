//! # Joystick Device
//!
//! Non-blocking reader for a `/dev/input/jsN` joystick node.
//!
//! Each call to [`JoystickDevice::read_batch`] performs one read of up to
//! [`MAX_BATCH_EVENTS`] records. An empty read or a would-block condition is
//! not an error, it simply yields no events.

use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use tracing::{debug, info};

use super::event::{parse_batch, RawEvent, JS_EVENT_SIZE, MAX_BATCH_EVENTS};
use crate::error::Result;

/// Size of the read buffer: one full batch.
const BATCH_BYTES: usize = JS_EVENT_SIZE * MAX_BATCH_EVENTS;

/// Joystick event source.
///
/// Generic over the reader so tests can feed recorded byte streams.
pub struct JoystickDevice<R = File> {
    reader: R,
    device_path: String,
    buffer: [u8; BATCH_BYTES],
}

impl<R> std::fmt::Debug for JoystickDevice<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoystickDevice")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl JoystickDevice<File> {
    /// Opens a joystick node read-only in non-blocking mode.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the node cannot be opened (missing, permission denied).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gamepad_pilot::controller::device::JoystickDevice;
    ///
    /// let mut device = JoystickDevice::open("/dev/input/js0")?;
    /// let events = device.read_batch()?;
    /// # Ok::<(), gamepad_pilot::error::PilotError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)?;

        info!("Opened joystick device {}", path.display());
        Ok(Self::from_reader(file, path.to_string_lossy()))
    }
}

impl<R: Read> JoystickDevice<R> {
    /// Wraps an already-open reader.
    pub fn from_reader(reader: R, device_path: impl Into<String>) -> Self {
        Self {
            reader,
            device_path: device_path.into(),
            buffer: [0u8; BATCH_BYTES],
        }
    }

    /// Path this device was opened from.
    #[must_use]
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Reads whatever records are available right now.
    ///
    /// Returns an empty batch on a zero-length read, `WouldBlock` or
    /// `Interrupted`. A trailing partial record is discarded.
    ///
    /// # Errors
    ///
    /// Returns `Io` for any other read failure (e.g. the pad was unplugged).
    pub fn read_batch(&mut self) -> Result<Vec<RawEvent>> {
        let count = match self.reader.read(&mut self.buffer) {
            Ok(count) => count,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if count % JS_EVENT_SIZE != 0 {
            debug!(
                "Discarding {} trailing bytes of a partial event record",
                count % JS_EVENT_SIZE
            );
        }

        Ok(parse_batch(&self.buffer[..count]))
    }
}
