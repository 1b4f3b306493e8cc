//! # Pad Layouts
//!
//! Index-to-meaning tables for the two supported controller families.
//!
//! ## Axes
//!
//! | Axis | Logitech | PS3 |
//! |------|----------|-----|
//! | Roll | 0 | 0 |
//! | Pitch | 1 | 1 |
//! | Yaw | 2 | 2 |
//! | Throttle | 5 | 3 |
//!
//! ## Buttons
//!
//! | Button | Logitech | PS3 |
//! |--------|----------|-----|
//! | Start | 0 | 3 |
//! | Select | 1 | 0 |
//! | Zap | 2 | 12 |
//! | Auto | 3 | 13 |
//! | Up / Right / Down / Left | 4-7 | 4-7 |
//! | L2 / R2 / L1 / R1 | 8-11 | 8-11 |
//! | Hover | 12 | 14 |
//! | Flat trim | 13 | 15 |

use serde::Deserialize;

use crate::registry::TargetIdentity;

/// Logical pad button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadButton {
    /// Take-off / land toggle
    Start,
    /// Emergency signal
    Select,
    /// Auxiliary button forwarded to the autopilot agent
    Zap,
    /// Engage autopilot
    Auto,
    /// Pitch forward
    Up,
    /// Roll right
    Right,
    /// Pitch backward
    Down,
    /// Roll left
    Left,
    /// Yaw left
    L2,
    /// Yaw right
    R2,
    /// Descend
    L1,
    /// Climb
    R1,
    /// Zero all axes
    Hover,
    /// Flat-trim calibration
    FlatTrim,
}

/// Logical pad axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadAxis {
    /// Left/right tilt (phi)
    Roll,
    /// Front/back tilt (theta)
    Pitch,
    /// Rotation
    Yaw,
    /// Vertical speed (gaz)
    Throttle,
}

const LOGITECH_AXES: &[(u8, PadAxis)] = &[
    (0, PadAxis::Roll),
    (1, PadAxis::Pitch),
    (2, PadAxis::Yaw),
    (5, PadAxis::Throttle),
];

const PS3_AXES: &[(u8, PadAxis)] = &[
    (0, PadAxis::Roll),
    (1, PadAxis::Pitch),
    (2, PadAxis::Yaw),
    (3, PadAxis::Throttle),
];

const LOGITECH_BUTTONS: &[(u8, PadButton)] = &[
    (0, PadButton::Start),
    (1, PadButton::Select),
    (2, PadButton::Zap),
    (3, PadButton::Auto),
    (4, PadButton::Up),
    (5, PadButton::Right),
    (6, PadButton::Down),
    (7, PadButton::Left),
    (8, PadButton::L2),
    (9, PadButton::R2),
    (10, PadButton::L1),
    (11, PadButton::R1),
    (12, PadButton::Hover),
    (13, PadButton::FlatTrim),
];

const PS3_BUTTONS: &[(u8, PadButton)] = &[
    (0, PadButton::Select),
    (3, PadButton::Start),
    (4, PadButton::Up),
    (5, PadButton::Right),
    (6, PadButton::Down),
    (7, PadButton::Left),
    (8, PadButton::L2),
    (9, PadButton::R2),
    (10, PadButton::L1),
    (11, PadButton::R1),
    (12, PadButton::Zap),
    (13, PadButton::Auto),
    (14, PadButton::Hover),
    (15, PadButton::FlatTrim),
];

/// Supported controller families, selected in configuration.
///
/// # Examples
///
/// ```
/// use gamepad_pilot::controller::layout::{PadButton, PadLayout};
///
/// assert_eq!(PadLayout::Ps3.button(3), Some(PadButton::Start));
/// assert_eq!(PadLayout::Logitech.button(0), Some(PadButton::Start));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PadLayout {
    /// Logitech Precision / Dual Action family
    #[default]
    Logitech,
    /// Sony PLAYSTATION 3 controller
    Ps3,
}

impl PadLayout {
    /// USB identity of the reference controller for this layout.
    #[must_use]
    pub const fn default_identity(self) -> TargetIdentity {
        match self {
            PadLayout::Logitech => TargetIdentity::new(0x046d, 0xc21a),
            PadLayout::Ps3 => TargetIdentity::new(0x054c, 0x0268),
        }
    }

    fn axes(self) -> &'static [(u8, PadAxis)] {
        match self {
            PadLayout::Logitech => LOGITECH_AXES,
            PadLayout::Ps3 => PS3_AXES,
        }
    }

    fn buttons(self) -> &'static [(u8, PadButton)] {
        match self {
            PadLayout::Logitech => LOGITECH_BUTTONS,
            PadLayout::Ps3 => PS3_BUTTONS,
        }
    }

    /// Resolves a raw button number. Unmapped numbers yield `None`.
    #[must_use]
    pub fn button(self, index: u8) -> Option<PadButton> {
        self.buttons()
            .iter()
            .find(|&&(i, _)| i == index)
            .map(|&(_, button)| button)
    }

    /// Resolves a raw axis number. Unmapped numbers yield `None`.
    #[must_use]
    pub fn axis(self, index: u8) -> Option<PadAxis> {
        self.axes()
            .iter()
            .find(|&&(i, _)| i == index)
            .map(|&(_, axis)| axis)
    }

    /// Raw button number of `button` in this layout.
    #[must_use]
    pub fn button_index(self, button: PadButton) -> u8 {
        self.buttons()
            .iter()
            .find(|&&(_, b)| b == button)
            .map(|&(i, _)| i)
            .unwrap_or(u8::MAX)
    }

    /// Raw axis number of `axis` in this layout.
    #[must_use]
    pub fn axis_index(self, axis: PadAxis) -> u8 {
        self.axes()
            .iter()
            .find(|&&(_, a)| a == axis)
            .map(|&(i, _)| i)
            .unwrap_or(u8::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_BUTTONS: [PadButton; 14] = [
        PadButton::Start,
        PadButton::Select,
        PadButton::Zap,
        PadButton::Auto,
        PadButton::Up,
        PadButton::Right,
        PadButton::Down,
        PadButton::Left,
        PadButton::L2,
        PadButton::R2,
        PadButton::L1,
        PadButton::R1,
        PadButton::Hover,
        PadButton::FlatTrim,
    ];

    #[test]
    fn test_every_button_is_mapped_once_per_layout() {
        for layout in [PadLayout::Logitech, PadLayout::Ps3] {
            for button in ALL_BUTTONS {
                let index = layout.button_index(button);
                assert_ne!(index, u8::MAX, "{:?} missing from {:?}", button, layout);
                assert_eq!(layout.button(index), Some(button));
            }
        }
    }

    #[test]
    fn test_every_axis_is_mapped_per_layout() {
        for layout in [PadLayout::Logitech, PadLayout::Ps3] {
            for axis in [PadAxis::Roll, PadAxis::Pitch, PadAxis::Yaw, PadAxis::Throttle] {
                assert_eq!(layout.axis(layout.axis_index(axis)), Some(axis));
            }
        }
    }

    #[test]
    fn test_throttle_axis_differs_between_layouts() {
        assert_eq!(PadLayout::Logitech.axis(5), Some(PadAxis::Throttle));
        assert_eq!(PadLayout::Logitech.axis(3), None);
        assert_eq!(PadLayout::Ps3.axis(3), Some(PadAxis::Throttle));
        assert_eq!(PadLayout::Ps3.axis(5), None);
    }

    #[test]
    fn test_ps3_gaps_are_unmapped() {
        assert_eq!(PadLayout::Ps3.button(1), None);
        assert_eq!(PadLayout::Ps3.button(2), None);
        assert_eq!(PadLayout::Ps3.button(16), None);
        assert_eq!(PadLayout::Logitech.button(14), None);
    }

    #[test]
    fn test_zap_index() {
        assert_eq!(PadLayout::Ps3.button_index(PadButton::Zap), 12);
        assert_eq!(PadLayout::Logitech.button_index(PadButton::Zap), 2);
    }

    #[test]
    fn test_default_identities() {
        assert_eq!(PadLayout::Logitech.default_identity().key(), 0x046d_c21a);
        assert_eq!(PadLayout::Ps3.default_identity().key(), 0x054c_0268);
        assert_eq!(PadLayout::default(), PadLayout::Logitech);
    }

    #[test]
    fn test_layout_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            layout: PadLayout,
        }
        let w: Wrapper = toml::from_str("layout = \"ps3\"").unwrap();
        assert_eq!(w.layout, PadLayout::Ps3);
        assert!(toml::from_str::<Wrapper>("layout = \"xbox\"").is_err());
    }
}
