//! # AT Command Encoder
//!
//! Encodes AR.Drone AT commands.
//!
//! ## Frame Format
//!
//! Each command is a single ASCII line terminated by `\r`:
//!
//! ```text
//! AT*<NAME>=<sequence>[,<arg>...]\r
//! ```
//!
//! Float arguments are sent as the signed 32-bit integer sharing the float's
//! IEEE-754 bit pattern (e.g. `-0.8` is sent as `-1085485875`).

/// UDP port the drone listens on for AT commands.
pub const AT_PORT: u16 = 5556;

/// Bits that must always be set in an `AT*REF` input word.
pub const REF_BASE: u32 = 0x1154_0000;

/// `AT*REF` bit requesting take-off (cleared to land).
pub const REF_TAKEOFF: u32 = 1 << 9;

/// `AT*REF` bit signalling emergency.
pub const REF_EMERGENCY: u32 = 1 << 8;

/// `AT*PCMD` flag enabling progressive commands.
pub const PCMD_PROGRESSIVE: i32 = 1;

/// `AT*PCMD` flag for hovering (arguments ignored).
pub const PCMD_HOVER: i32 = 0;

/// Reinterprets a float's bits as a signed integer argument.
///
/// # Examples
///
/// ```
/// use gamepad_pilot::drone::at::float_arg;
///
/// assert_eq!(float_arg(-0.8), -1085485875);
/// assert_eq!(float_arg(0.0), 0);
/// ```
#[must_use]
pub fn float_arg(value: f32) -> i32 {
    value.to_bits() as i32
}

/// A single AT command, without its sequence number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AtCommand {
    /// `AT*REF`: take-off/land and emergency control
    Ref {
        /// Take-off requested
        takeoff: bool,
        /// Emergency signal
        emergency: bool,
    },
    /// `AT*PCMD`: progressive flight command
    Pcmd {
        /// Progressive flag; `false` means hover
        progressive: bool,
        /// Roll in `-1.0..=1.0`
        roll: f32,
        /// Pitch in `-1.0..=1.0`
        pitch: f32,
        /// Vertical speed in `-1.0..=1.0`
        gaz: f32,
        /// Yaw speed in `-1.0..=1.0`
        yaw: f32,
    },
    /// `AT*FTRIM`: flat-trim calibration
    FlatTrim,
}

impl AtCommand {
    /// Hover command: progressive flag off, all arguments zero.
    #[must_use]
    pub const fn hover() -> Self {
        AtCommand::Pcmd {
            progressive: false,
            roll: 0.0,
            pitch: 0.0,
            gaz: 0.0,
            yaw: 0.0,
        }
    }

    /// `AT*REF` input word.
    #[must_use]
    pub const fn ref_input(takeoff: bool, emergency: bool) -> u32 {
        let mut input = REF_BASE;
        if takeoff {
            input |= REF_TAKEOFF;
        }
        if emergency {
            input |= REF_EMERGENCY;
        }
        input
    }

    /// Encodes the command with sequence number `sequence`.
    ///
    /// # Examples
    ///
    /// ```
    /// use gamepad_pilot::drone::at::AtCommand;
    ///
    /// assert_eq!(AtCommand::FlatTrim.encode(7), "AT*FTRIM=7\r");
    /// assert_eq!(AtCommand::hover().encode(1), "AT*PCMD=1,0,0,0,0,0\r");
    /// ```
    #[must_use]
    pub fn encode(&self, sequence: u32) -> String {
        match *self {
            AtCommand::Ref { takeoff, emergency } => {
                format!("AT*REF={},{}\r", sequence, Self::ref_input(takeoff, emergency))
            }
            AtCommand::Pcmd {
                progressive,
                roll,
                pitch,
                gaz,
                yaw,
            } => {
                let flag = if progressive { PCMD_PROGRESSIVE } else { PCMD_HOVER };
                format!(
                    "AT*PCMD={},{},{},{},{},{}\r",
                    sequence,
                    flag,
                    float_arg(roll),
                    float_arg(pitch),
                    float_arg(gaz),
                    float_arg(yaw)
                )
            }
            AtCommand::FlatTrim => format!("AT*FTRIM={}\r", sequence),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_arg_bit_patterns() {
        assert_eq!(float_arg(0.5), 0x3F00_0000);
        assert_eq!(float_arg(1.0), 1_065_353_216);
        assert_eq!(float_arg(-0.1), -1_110_651_699);
        assert_eq!(float_arg(-0.8), -1_085_485_875);
    }

    #[test]
    fn test_ref_input_words() {
        assert_eq!(AtCommand::ref_input(false, false), 290_717_696);
        assert_eq!(AtCommand::ref_input(true, false), 290_718_208);
        assert_eq!(AtCommand::ref_input(false, true), 290_717_952);
        assert_eq!(AtCommand::ref_input(true, true), 0x1154_0300);
    }

    #[test]
    fn test_encode_ref() {
        let cmd = AtCommand::Ref { takeoff: true, emergency: false };
        assert_eq!(cmd.encode(3), "AT*REF=3,290718208\r");
    }

    #[test]
    fn test_encode_progressive_pcmd() {
        let cmd = AtCommand::Pcmd {
            progressive: true,
            roll: 0.5,
            pitch: 0.0,
            gaz: -0.8,
            yaw: 0.0,
        };
        assert_eq!(cmd.encode(42), "AT*PCMD=42,1,1056964608,0,-1085485875,0\r");
    }

    #[test]
    fn test_encode_hover() {
        assert_eq!(AtCommand::hover().encode(9), "AT*PCMD=9,0,0,0,0,0\r");
    }

    #[test]
    fn test_encode_flat_trim() {
        assert_eq!(AtCommand::FlatTrim.encode(100), "AT*FTRIM=100\r");
    }

    #[test]
    fn test_frames_are_single_cr_terminated_lines() {
        for cmd in [
            AtCommand::hover(),
            AtCommand::FlatTrim,
            AtCommand::Ref { takeoff: false, emergency: true },
        ] {
            let text = cmd.encode(1);
            assert!(text.starts_with("AT*"));
            assert!(text.ends_with('\r'));
            assert_eq!(text.matches('\r').count(), 1);
        }
    }
}
