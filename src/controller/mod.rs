//! # Controller Module
//!
//! Gamepad input handling over the Linux joystick API.
//!
//! This module handles:
//! - Reading raw `js_event` records from a non-blocking joystick node
//! - Resolving button/axis numbers through one of two pad layouts
//! - Decoding event batches into a persistent control state
//! - Emitting flight commands only when that state changes

pub mod decoder;
pub mod device;
pub mod event;
pub mod layout;
pub mod state;

pub use decoder::{decode_batch, Command, EventDecoder, Transition};
pub use device::JoystickDevice;
pub use event::RawEvent;
pub use layout::PadLayout;
pub use state::{Axes, ControlState};
