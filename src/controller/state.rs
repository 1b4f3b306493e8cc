//! # Control State
//!
//! The persistent flight-control state built up by the decoder.

/// The four control axes, each in `-1.0..=1.0`.
///
/// Axes are only ever replaced as a whole group, so a command can never be
/// built from a mix of old and new values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Axes {
    /// Left/right tilt (phi)
    pub roll: f32,
    /// Front/back tilt (theta)
    pub pitch: f32,
    /// Rotation speed
    pub yaw: f32,
    /// Vertical speed (gaz)
    pub throttle: f32,
}

impl Axes {
    /// All axes neutral.
    pub const ZERO: Axes = Axes {
        roll: 0.0,
        pitch: 0.0,
        yaw: 0.0,
        throttle: 0.0,
    };

    /// Returns `true` if every axis is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.roll == 0.0 && self.pitch == 0.0 && self.yaw == 0.0 && self.throttle == 0.0
    }
}

/// Flight-control state persisted across batches.
///
/// Mutated only by the decoder. The autopilot agent reads
/// [`ControlState::autopilot_engaged`] and drains
/// [`ControlState::take_notification`].
///
/// # Examples
///
/// ```
/// use gamepad_pilot::controller::state::ControlState;
///
/// let mut state = ControlState::new();
/// assert!(state.axes().is_zero());
/// assert!(!state.start_toggled());
/// assert_eq!(state.take_notification(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControlState {
    axes: Axes,
    start_toggled: bool,
    autopilot_engaged: bool,
    pending_notification: Option<u8>,
}

impl ControlState {
    /// Neutral state: zero axes, not started, autopilot off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current axes.
    #[must_use]
    pub fn axes(&self) -> Axes {
        self.axes
    }

    /// Replaces all four axes at once.
    pub(crate) fn set_axes(&mut self, axes: Axes) {
        self.axes = axes;
    }

    /// Whether the start toggle is currently on.
    #[must_use]
    pub fn start_toggled(&self) -> bool {
        self.start_toggled
    }

    pub(crate) fn set_start_toggled(&mut self, started: bool) {
        self.start_toggled = started;
    }

    /// Whether the autopilot agent currently has control.
    #[must_use]
    pub fn autopilot_engaged(&self) -> bool {
        self.autopilot_engaged
    }

    pub(crate) fn set_autopilot_engaged(&mut self, engaged: bool) {
        self.autopilot_engaged = engaged;
    }

    /// Unconsumed auxiliary button press, as the raw button number.
    #[must_use]
    pub fn pending_notification(&self) -> Option<u8> {
        self.pending_notification
    }

    /// Stores a notification, silently replacing an unconsumed one.
    pub(crate) fn notify(&mut self, button_index: u8) {
        self.pending_notification = Some(button_index);
    }

    /// Returns and clears the pending notification.
    pub fn take_notification(&mut self) -> Option<u8> {
        self.pending_notification.take()
    }
}
