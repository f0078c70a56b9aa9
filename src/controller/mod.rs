//! # Controller Module
//!
//! Joystick input handling.
//!
//! This module handles:
//! - Joystick detection and axis polling via evdev
//! - Dead-zone shaping of normalized axis readings
//! - The [`AxisSource`] seam used by the session loop

pub mod calibration;
pub mod joystick;
pub mod source;

pub use source::{AxisReading, AxisSource};
