//! # Event Decoder
//!
//! Turns batches of raw joystick events into updates of a [`ControlState`]
//! and the commands those updates produce.
//!
//! ## Button Behavior
//!
//! | Button | Press | Release |
//! |--------|-------|---------|
//! | Start | flip start toggle, drop autopilot | - |
//! | Select | send select signal, stop the batch | - |
//! | Zap | store pending notification | - |
//! | Auto | engage autopilot, or resend if engaged | - |
//! | Hover | zero all axes | zero all axes |
//! | Up / Down | pitch -0.1 / +0.1 | zero all axes |
//! | Left / Right | roll -0.1 / +0.1 | zero all axes |
//! | L1 / R1 | throttle -0.2 / +0.2 | zero all axes |
//! | L2 / R2 | yaw -0.2 / +0.2 | zero all axes |
//! | Flat trim | request calibration | - |
//!
//! A directional or shoulder press replaces all four axes, so holding two of
//! them at once is not supported: the last event wins.
//!
//! ## Usage
//!
//! ```
//! use gamepad_pilot::controller::decoder::{Command, EventDecoder};
//! use gamepad_pilot::controller::event::RawEvent;
//! use gamepad_pilot::controller::layout::PadLayout;
//!
//! let mut decoder = EventDecoder::new(PadLayout::Ps3);
//! let commands = decoder.process_batch(&[RawEvent::button(4, 1)]); // Up pressed
//!
//! assert_eq!(
//!     commands,
//!     vec![Command::Progressive { roll: 0.0, pitch: -0.1, throttle: 0.0, yaw: 0.0 }]
//! );
//! ```

use tracing::debug;

use super::event::{EventKind, RawEvent};
use super::layout::{PadAxis, PadButton, PadLayout};
use super::state::{Axes, ControlState};

/// Axis magnitude set by a directional button.
pub const DIRECTIONAL_STEP: f32 = 0.1;

/// Axis magnitude set by a shoulder button.
pub const SHOULDER_STEP: f32 = 0.2;

/// Largest raw axis magnitude reported by the device.
pub const AXIS_RAW_MAX: i16 = i16::MAX;

/// Request for the command sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Neutral command: all axes zero
    Disarm,
    /// Armed command carrying the four axes
    Progressive {
        /// Roll in `-1.0..=1.0`
        roll: f32,
        /// Pitch in `-1.0..=1.0`
        pitch: f32,
        /// Throttle in `-1.0..=1.0`
        throttle: f32,
        /// Yaw in `-1.0..=1.0`
        yaw: f32,
    },
    /// One-shot flat-trim calibration
    Calibrate,
    /// New value of the start toggle
    StartToggle(bool),
    /// Select signal with the raw button value
    Select(i16),
}

impl Command {
    /// Command carrying `axes`: disarmed when they are all zero.
    #[must_use]
    pub fn from_axes(axes: Axes) -> Self {
        if axes.is_zero() {
            Command::Disarm
        } else {
            Command::Progressive {
                roll: axes.roll,
                pitch: axes.pitch,
                throttle: axes.throttle,
                yaw: axes.yaw,
            }
        }
    }
}

/// Outcome of decoding one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// State after the batch
    pub state: ControlState,
    /// Whether the batch changed the axes (or forced a resend)
    pub changed: bool,
    /// Commands to send, in order
    pub commands: Vec<Command>,
}

/// Normalizes a raw axis value to `-1.0..=1.0`.
///
/// # Examples
///
/// ```
/// use gamepad_pilot::controller::decoder::normalize_axis;
///
/// assert_eq!(normalize_axis(32767), 1.0);
/// assert_eq!(normalize_axis(-32768), -1.0);
/// assert_eq!(normalize_axis(0), 0.0);
/// ```
#[must_use]
pub fn normalize_axis(value: i16) -> f32 {
    (f32::from(value) / f32::from(AXIS_RAW_MAX)).clamp(-1.0, 1.0)
}

/// Axes produced by pressing a directional or shoulder button.
fn button_axes(button: PadButton) -> Option<Axes> {
    let axes = match button {
        PadButton::Up => Axes { pitch: -DIRECTIONAL_STEP, ..Axes::ZERO },
        PadButton::Down => Axes { pitch: DIRECTIONAL_STEP, ..Axes::ZERO },
        PadButton::Left => Axes { roll: -DIRECTIONAL_STEP, ..Axes::ZERO },
        PadButton::Right => Axes { roll: DIRECTIONAL_STEP, ..Axes::ZERO },
        PadButton::L1 => Axes { throttle: -SHOULDER_STEP, ..Axes::ZERO },
        PadButton::R1 => Axes { throttle: SHOULDER_STEP, ..Axes::ZERO },
        PadButton::L2 => Axes { yaw: -SHOULDER_STEP, ..Axes::ZERO },
        PadButton::R2 => Axes { yaw: SHOULDER_STEP, ..Axes::ZERO },
        _ => return None,
    };
    Some(axes)
}

/// Decodes one batch of events against `previous`.
///
/// Pure: the returned [`Transition`] carries the new state and every command
/// to send. Events are handled in order:
///
/// - An init-flagged event ends the batch; events before it still count.
/// - A Select press emits [`Command::Select`] and returns immediately. Axis
///   changes from earlier in the batch are kept in the state but no axis
///   command is emitted and `changed` is `false`.
/// - Unmapped buttons and axes are ignored.
///
/// When the batch changed the axes, the autopilot is dropped and exactly one
/// [`Command::Disarm`] or [`Command::Progressive`] is appended.
#[must_use]
pub fn decode_batch(previous: &ControlState, events: &[RawEvent], layout: PadLayout) -> Transition {
    let mut state = previous.clone();
    let mut axes = state.axes();
    let mut changed = false;
    let mut commands = Vec::new();

    for event in events {
        match event.kind {
            EventKind::Init => {
                debug!("Init event in batch, ignoring the rest");
                break;
            }
            EventKind::Button => {
                let Some(button) = layout.button(event.index) else {
                    continue;
                };
                let pressed = event.value == 1;

                match button {
                    PadButton::Start => {
                        if pressed {
                            let started = !state.start_toggled();
                            state.set_start_toggled(started);
                            state.set_autopilot_engaged(false);
                            commands.push(Command::StartToggle(started));
                        }
                    }
                    PadButton::Select => {
                        if pressed {
                            commands.push(Command::Select(event.value));
                            state.set_axes(axes);
                            return Transition {
                                state,
                                changed: false,
                                commands,
                            };
                        }
                    }
                    PadButton::Zap => {
                        if pressed {
                            state.notify(event.index);
                        }
                    }
                    PadButton::Hover => {
                        axes = Axes::ZERO;
                        changed = true;
                    }
                    PadButton::FlatTrim => {
                        if pressed {
                            commands.push(Command::Calibrate);
                        }
                    }
                    PadButton::Auto => {
                        if pressed {
                            if state.autopilot_engaged() {
                                changed = true;
                            } else {
                                state.set_autopilot_engaged(true);
                            }
                        }
                    }
                    PadButton::Up
                    | PadButton::Down
                    | PadButton::Left
                    | PadButton::Right
                    | PadButton::L1
                    | PadButton::R1
                    | PadButton::L2
                    | PadButton::R2 => {
                        axes = if pressed {
                            button_axes(button).unwrap_or(Axes::ZERO)
                        } else {
                            Axes::ZERO
                        };
                        changed = true;
                    }
                }
            }
            EventKind::Axis => {
                let Some(axis) = layout.axis(event.index) else {
                    continue;
                };
                let angle = normalize_axis(event.value);
                match axis {
                    PadAxis::Roll => axes.roll = angle,
                    PadAxis::Pitch => axes.pitch = angle,
                    PadAxis::Yaw => axes.yaw = angle,
                    // Push forward climbs
                    PadAxis::Throttle => axes.throttle = normalize_axis(event.value.saturating_neg()),
                }
                changed = true;
            }
            EventKind::Other => {}
        }
    }

    if changed {
        state.set_autopilot_engaged(false);
        state.set_axes(axes);
        commands.push(Command::from_axes(axes));
    }

    Transition {
        state,
        changed,
        commands,
    }
}

/// Owns the run's single [`ControlState`] and applies batches to it.
///
/// # Thread Safety
///
/// `EventDecoder` is not thread-safe. Use from a single task/thread only.
#[derive(Debug)]
pub struct EventDecoder {
    layout: PadLayout,
    state: ControlState,
}

impl EventDecoder {
    /// Creates a decoder with neutral state.
    #[must_use]
    pub fn new(layout: PadLayout) -> Self {
        Self {
            layout,
            state: ControlState::new(),
        }
    }

    /// Layout used to resolve button and axis numbers.
    #[must_use]
    pub fn layout(&self) -> PadLayout {
        self.layout
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &ControlState {
        &self.state
    }

    /// Mutable access for the autopilot agent (draining notifications).
    pub fn state_mut(&mut self) -> &mut ControlState {
        &mut self.state
    }

    /// Decodes a batch, commits the new state and returns the commands to
    /// send.
    pub fn process_batch(&mut self, events: &[RawEvent]) -> Vec<Command> {
        if events.is_empty() {
            return Vec::new();
        }

        let transition = decode_batch(&self.state, events, self.layout);
        if transition.changed {
            debug!("Control state changed: {:?}", transition.state.axes());
        }
        self.state = transition.state;
        transition.commands
    }

    /// Resets to neutral state.
    pub fn reset(&mut self) {
        self.state = ControlState::new();
    }
}
