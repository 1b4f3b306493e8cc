//! # Drone Module
//!
//! Outbound side of the pilot: the [`link::CommandSink`] seam the decoder's
//! commands are dispatched to, and the AR.Drone AT command link behind it.

pub mod at;
pub mod link;
pub mod transport;

pub use at::AtCommand;
pub use link::{dispatch, CommandSink, DroneLink};
