//! # Registry Module
//!
//! Locates the gamepad's joystick handle by scanning the kernel input-device
//! registry (`/proc/bus/input/devices`).
//!
//! The registry is a sequence of blocks, one per device:
//!
//! ```text
//! I: Bus=0003 Vendor=046d Product=c216 Version=0110
//! N: Name="Logitech Logitech Dual Action"
//! P: Phys=usb-0000:00:1d.1-2/input0
//! S: Sysfs=/devices/pci0000:00/0000:00:1d.1/usb3/3-2/3-2:1.0/input/input4
//! H: Handlers=event4 js0
//! B: EV=1b
//! ```
//!
//! Only the `I`, `N` and `H` lines are tokenized. A block is evaluated as soon
//! as its `H` line has been read.
//!
//! ## Usage
//!
//! ```
//! use gamepad_pilot::registry::{find_handler, TargetIdentity};
//!
//! let registry = "I: Bus=0003 Vendor=046d Product=c216\nN: Name=\"Gamepad\"\nH: Handlers=js0";
//! let target = TargetIdentity::new(0x046d, 0xc216);
//!
//! let handler = find_handler(registry.as_bytes(), target)?;
//! assert_eq!(handler.as_deref(), Some("js0"));
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod lexer;
pub mod scanner;

use std::fmt;
use std::io::{self, Read};

pub use lexer::{BoundedString, MAX_TOKEN_LEN};
pub use scanner::{RegistryScanner, JOYSTICK_HANDLERS, MAX_HANDLER_CANDIDATES};

/// The (vendor, product) pair identifying the gamepad to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetIdentity {
    /// USB vendor ID
    pub vendor: u16,
    /// USB product ID
    pub product: u16,
}

impl TargetIdentity {
    /// Creates a target identity.
    #[must_use]
    pub const fn new(vendor: u16, product: u16) -> Self {
        Self { vendor, product }
    }

    /// Combined 32-bit key: `(vendor << 16) | product`.
    ///
    /// # Examples
    ///
    /// ```
    /// use gamepad_pilot::registry::TargetIdentity;
    ///
    /// assert_eq!(TargetIdentity::new(0x046d, 0xc216).key(), 0x046d_c216);
    /// ```
    #[must_use]
    pub const fn key(&self) -> u32 {
        ((self.vendor as u32) << 16) | self.product as u32
    }
}

impl fmt::Display for TargetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor, self.product)
    }
}

/// One device block parsed from the registry.
///
/// Integer fields hold whatever was accumulated while parsing, even when the
/// field was malformed (see [`DeviceRecord::malformed_fields`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceRecord {
    /// Bus type
    pub bus: u32,
    /// Vendor ID
    pub vendor: u32,
    /// Product ID
    pub product: u32,
    /// Version
    pub version: u32,
    /// Display name
    pub name: BoundedString,
    /// Distinct handler tokens from the `H` line, in order of appearance
    pub handler_candidates: Vec<BoundedString>,
    /// First candidate found in [`JOYSTICK_HANDLERS`]
    pub handler: Option<BoundedString>,
    /// Number of integer fields that failed to parse
    pub malformed_fields: usize,
}

impl DeviceRecord {
    /// Combined identity key, using the low 16 bits of vendor and product.
    #[must_use]
    pub fn key(&self) -> u32 {
        (self.vendor << 16) | (self.product & 0xffff)
    }

    /// Returns `true` if this record's identity equals `target`.
    #[must_use]
    pub fn matches(&self, target: TargetIdentity) -> bool {
        self.key() == target.key()
    }

    /// Records a handler token.
    ///
    /// Duplicates are ignored and at most [`MAX_HANDLER_CANDIDATES`] tokens
    /// are kept. The first token on the joystick allow-list becomes the
    /// record's handler; later matches do not replace it.
    pub fn add_handler_candidate(&mut self, token: BoundedString) {
        if self.handler.is_none()
            && JOYSTICK_HANDLERS
                .iter()
                .any(|name| name.as_bytes() == token.as_bytes())
        {
            self.handler = Some(token.clone());
        }

        if self.handler_candidates.len() < MAX_HANDLER_CANDIDATES
            && !self.handler_candidates.contains(&token)
        {
            self.handler_candidates.push(token);
        }
    }
}

/// Scans a registry stream for `target` and returns its joystick handler name.
///
/// Returns `Ok(None)` when no complete block matches, including when the
/// stream ends partway through a block.
///
/// # Errors
///
/// Returns any I/O error raised while reading the stream.
pub fn find_handler<R: Read>(reader: R, target: TargetIdentity) -> io::Result<Option<String>> {
    let mut scanner = RegistryScanner::new(reader)?;
    Ok(scanner
        .find(target)?
        .and_then(|record| record.handler)
        .map(|handler| handler.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_key() {
        assert_eq!(TargetIdentity::new(0x054c, 0x0268).key(), 0x054c_0268);
        assert_eq!(TargetIdentity::new(0xffff, 0xffff).key(), 0xffff_ffff);
    }

    #[test]
    fn test_target_display() {
        assert_eq!(TargetIdentity::new(0x046d, 0xc21a).to_string(), "046d:c21a");
    }

    #[test]
    fn test_record_key_masks_oversized_fields() {
        let record = DeviceRecord {
            vendor: 0x1_046d,
            product: 0x2_c216,
            ..Default::default()
        };
        assert_eq!(record.key(), 0x046d_c216);
        assert!(record.matches(TargetIdentity::new(0x046d, 0xc216)));
    }

    #[test]
    fn test_first_joystick_handler_wins() {
        let mut record = DeviceRecord::default();
        for token in ["event4", "js2", "js0"] {
            record.add_handler_candidate(BoundedString::from(token));
        }
        assert_eq!(record.handler, Some(BoundedString::from("js2")));
        assert_eq!(record.handler_candidates.len(), 3);
    }

    #[test]
    fn test_handler_outside_allow_list_ignored() {
        let mut record = DeviceRecord::default();
        record.add_handler_candidate(BoundedString::from("js4"));
        record.add_handler_candidate(BoundedString::from("js01"));
        record.add_handler_candidate(BoundedString::from("mouse0"));
        assert!(record.handler.is_none());
    }

    #[test]
    fn test_handler_candidates_are_bounded_and_distinct() {
        let mut record = DeviceRecord::default();
        record.add_handler_candidate(BoundedString::from("kbd"));
        record.add_handler_candidate(BoundedString::from("kbd"));
        assert_eq!(record.handler_candidates.len(), 1);

        for i in 0..100 {
            record.add_handler_candidate(BoundedString::from(format!("event{}", i).as_str()));
        }
        assert_eq!(record.handler_candidates.len(), MAX_HANDLER_CANDIDATES);
    }

    #[test]
    fn test_find_handler_spec_example() {
        let registry = "I: Bus=0003 Vendor=046d Product=c216\nN: Name=\"Gamepad\"\nH: Handlers=js0";
        let handler = find_handler(registry.as_bytes(), TargetIdentity::new(0x046d, 0xc216)).unwrap();
        assert_eq!(handler.as_deref(), Some("js0"));
    }

    #[test]
    fn test_find_handler_not_found() {
        let registry = "I: Bus=0003 Vendor=046d Product=c216\nN: Name=\"Gamepad\"\nH: Handlers=js0\n";
        let handler = find_handler(registry.as_bytes(), TargetIdentity::new(0x054c, 0x0268)).unwrap();
        assert!(handler.is_none());
    }
}
