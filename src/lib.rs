//! # Gamepad Pilot Library
//!
//! Fly an AR.Drone with a USB gamepad.
//!
//! This library locates the gamepad's joystick node through the kernel
//! input-device registry, decodes its event stream into flight commands and
//! sends those commands to the drone as AT commands over UDP.

pub mod config;
pub mod controller;
pub mod drone;
pub mod error;
pub mod registry;
