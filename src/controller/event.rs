//! # Raw Joystick Events
//!
//! Decoding of the Linux joystick API record (`struct js_event`):
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | timestamp (ms, u32) |
//! | 4 | 2 | value (i16) |
//! | 6 | 1 | type flags (u8) |
//! | 7 | 1 | axis/button number (u8) |
//!
//! All fields are in native byte order.

/// Button pressed/released.
pub const JS_EVENT_BUTTON: u8 = 0x01;
/// Axis moved.
pub const JS_EVENT_AXIS: u8 = 0x02;
/// Initial state replay flag, set by the driver on open.
pub const JS_EVENT_INIT: u8 = 0x80;

/// Size of one record in bytes.
pub const JS_EVENT_SIZE: usize = 8;

/// Maximum records read per batch.
pub const MAX_BATCH_EVENTS: usize = 64;

/// Classification of a record's type flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Any record carrying [`JS_EVENT_INIT`]
    Init,
    /// Button record
    Button,
    /// Axis record
    Axis,
    /// Unknown type flags
    Other,
}

impl EventKind {
    /// Classifies raw type flags. The init flag takes precedence.
    #[must_use]
    pub fn from_flags(flags: u8) -> Self {
        if flags & JS_EVENT_INIT != 0 {
            EventKind::Init
        } else if flags & JS_EVENT_BUTTON != 0 {
            EventKind::Button
        } else if flags & JS_EVENT_AXIS != 0 {
            EventKind::Axis
        } else {
            EventKind::Other
        }
    }
}

/// One record read from the joystick device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    /// Driver timestamp in milliseconds
    pub time_ms: u32,
    /// Button state (0/1) or signed axis position
    pub value: i16,
    /// Record classification
    pub kind: EventKind,
    /// Button or axis number
    pub index: u8,
}

impl RawEvent {
    /// Button record.
    #[must_use]
    pub const fn button(index: u8, value: i16) -> Self {
        Self {
            time_ms: 0,
            value,
            kind: EventKind::Button,
            index,
        }
    }

    /// Axis record.
    #[must_use]
    pub const fn axis(index: u8, value: i16) -> Self {
        Self {
            time_ms: 0,
            value,
            kind: EventKind::Axis,
            index,
        }
    }

    /// Init-flagged record.
    #[must_use]
    pub const fn init(index: u8, value: i16) -> Self {
        Self {
            time_ms: 0,
            value,
            kind: EventKind::Init,
            index,
        }
    }

    /// Decodes one record.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; JS_EVENT_SIZE]) -> Self {
        Self {
            time_ms: u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            value: i16::from_ne_bytes([bytes[4], bytes[5]]),
            kind: EventKind::from_flags(bytes[6]),
            index: bytes[7],
        }
    }
}

/// Decodes every complete record in `bytes`. A trailing partial record is
/// dropped.
///
/// # Examples
///
/// ```
/// use gamepad_pilot::controller::event::{parse_batch, EventKind};
///
/// let mut bytes = Vec::new();
/// bytes.extend_from_slice(&0u32.to_ne_bytes());
/// bytes.extend_from_slice(&1i16.to_ne_bytes());
/// bytes.extend_from_slice(&[0x01, 4]);
/// bytes.extend_from_slice(&[0xAA, 0xBB]); // truncated second record
///
/// let events = parse_batch(&bytes);
/// assert_eq!(events.len(), 1);
/// assert_eq!(events[0].kind, EventKind::Button);
/// ```
#[must_use]
pub fn parse_batch(bytes: &[u8]) -> Vec<RawEvent> {
    bytes
        .chunks_exact(JS_EVENT_SIZE)
        .filter_map(|chunk| <&[u8; JS_EVENT_SIZE]>::try_from(chunk).ok())
        .map(RawEvent::from_bytes)
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Encodes a record the way the driver lays it out.
    pub(crate) fn record(time_ms: u32, value: i16, flags: u8, index: u8) -> [u8; JS_EVENT_SIZE] {
        let mut bytes = [0u8; JS_EVENT_SIZE];
        bytes[0..4].copy_from_slice(&time_ms.to_ne_bytes());
        bytes[4..6].copy_from_slice(&value.to_ne_bytes());
        bytes[6] = flags;
        bytes[7] = index;
        bytes
    }

    #[test]
    fn test_kind_from_flags() {
        assert_eq!(EventKind::from_flags(JS_EVENT_BUTTON), EventKind::Button);
        assert_eq!(EventKind::from_flags(JS_EVENT_AXIS), EventKind::Axis);
        assert_eq!(EventKind::from_flags(JS_EVENT_INIT), EventKind::Init);
        assert_eq!(EventKind::from_flags(JS_EVENT_INIT | JS_EVENT_BUTTON), EventKind::Init);
        assert_eq!(EventKind::from_flags(JS_EVENT_INIT | JS_EVENT_AXIS), EventKind::Init);
        assert_eq!(EventKind::from_flags(0x00), EventKind::Other);
        assert_eq!(EventKind::from_flags(0x04), EventKind::Other);
    }

    #[test]
    fn test_from_bytes_fields() {
        let event = RawEvent::from_bytes(&record(123_456, -16384, JS_EVENT_AXIS, 5));
        assert_eq!(event.time_ms, 123_456);
        assert_eq!(event.value, -16384);
        assert_eq!(event.kind, EventKind::Axis);
        assert_eq!(event.index, 5);
    }

    #[test]
    fn test_parse_batch_drops_partial_tail() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&record(1, 1, JS_EVENT_BUTTON, 0));
        bytes.extend_from_slice(&record(2, 300, JS_EVENT_AXIS, 1));
        bytes.extend_from_slice(&record(3, 0, JS_EVENT_BUTTON, 0)[..5]);

        let events = parse_batch(&bytes);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], RawEvent { time_ms: 2, value: 300, kind: EventKind::Axis, index: 1 });
    }

    #[test]
    fn test_parse_batch_short_input_is_empty() {
        assert!(parse_batch(&[]).is_empty());
        assert!(parse_batch(&[0u8; JS_EVENT_SIZE - 1]).is_empty());
    }

    #[test]
    fn test_constructors() {
        assert_eq!(RawEvent::button(3, 1).kind, EventKind::Button);
        assert_eq!(RawEvent::axis(0, -5).value, -5);
        assert_eq!(RawEvent::init(0, 0).kind, EventKind::Init);
    }
}
