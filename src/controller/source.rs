//! Input source abstraction so the session can be driven without hardware.

use crate::error::Result;

/// One tick's worth of normalized stick positions.
///
/// Both values are expected in -1.0 to 1.0. Out-of-range readings are
/// passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisReading {
    /// Throttle/reverse axis. Positive drives forward, negative reverses.
    pub throttle: f32,
    /// Steering axis. Negative steers left, positive steers right.
    pub steering: f32,
}

impl AxisReading {
    /// Creates a reading from raw normalized values.
    #[must_use]
    pub fn new(throttle: f32, steering: f32) -> Self {
        Self { throttle, steering }
    }
}

/// Trait for anything that can be polled once per tick for axis values.
///
/// Implementations must not block: the control loop calls `read` on every
/// tick and relies on it returning immediately.
#[cfg_attr(test, mockall::automock)]
pub trait AxisSource: Send {
    /// Returns the current throttle and steering positions.
    fn read(&mut self) -> Result<AxisReading>;
}
