//! # Mako Command Encoder
//!
//! Turns dead-zone-shaped stick positions into the three command bytes of a
//! drive packet and assembles the packet.
//!
//! ## Byte Mapping
//!
//! [`map_to_command_byte`] is piecewise and deliberately asymmetric:
//!
//! - `value < 0`: `[input_min, 0]` maps onto `[output_min, 0x2e]`
//! - `value > 0`: `[0, input_max]` maps onto `[0x80, output_max]`
//! - `value == 0`: exactly `0x80`
//!
//! Results are truncated toward zero, never rounded.
//!
//! ## Usage
//!
//! ```
//! use mako_bridge::mako::encoder::{Command, CommandEncoder};
//!
//! let encoder = CommandEncoder::default();
//! assert_eq!(encoder.encode(0.0, 0.0), Command::IDLE);
//! ```

use std::fmt;

use super::protocol::*;
use crate::controller::calibration::DeadZone;
use crate::controller::AxisReading;
use crate::error::Result;

/// A single protocol byte for one control axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandByte(pub u8);

impl CommandByte {
    /// Raw byte value
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for CommandByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}", self.0)
    }
}

/// Map an axis value onto a command byte
///
/// # Arguments
///
/// * `value` - Axis value, normally within `[input_min, input_max]`
/// * `input_min` - Value that maps to `output_min` (must be negative for the negative branch)
/// * `input_max` - Value that maps to `output_max`
/// * `output_min` - Byte for full negative deflection
/// * `output_max` - Byte for full positive deflection
///
/// # Returns
///
/// * `CommandByte` - Truncated mapped byte
///
/// Out-of-range values are not clamped; the float-to-byte cast saturates at
/// `0x00` and `0xff`. A NaN reading takes the zero branch.
///
/// # Examples
///
/// ```
/// use mako_bridge::mako::encoder::{map_to_command_byte, CommandByte};
///
/// assert_eq!(map_to_command_byte(0.0, -1.0, 1.0, 46, 210), CommandByte(0x80));
/// assert_eq!(map_to_command_byte(1.0, -1.0, 1.0, 46, 210), CommandByte(0xd2));
/// ```
#[must_use]
pub fn map_to_command_byte(
    value: f32,
    input_min: f32,
    input_max: f32,
    output_min: u8,
    output_max: u8,
) -> CommandByte {
    let output_min = output_min as f32;
    let output_max = output_max as f32;
    let anchor = NEGATIVE_ANCHOR as f32;
    let center = CENTER_BYTE as f32;

    let mapped = if value < 0.0 {
        ((value - input_min) / (0.0 - input_min)) * (anchor - output_min) + output_min
    } else if value > 0.0 {
        (value / input_max) * (output_max - center) + center
    } else {
        return CommandByte(CENTER_BYTE);
    };

    CommandByte(mapped as u8)
}

/// The three control bytes of a drive packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    /// Forward throttle byte (`0x00` when not driving forward)
    pub forward: CommandByte,
    /// Reverse throttle byte (`0x00` when not reversing)
    pub reverse: CommandByte,
    /// Steering byte (`0x80` is centred)
    pub steering: CommandByte,
}

impl Command {
    /// Zero throttle, centred steering.
    pub const IDLE: Command = Command {
        forward: CommandByte(IDLE_THROTTLE),
        reverse: CommandByte(IDLE_THROTTLE),
        steering: CommandByte(CENTER_BYTE),
    };

    /// Creates a command from raw bytes.
    #[must_use]
    pub fn new(forward: u8, reverse: u8, steering: u8) -> Self {
        Self {
            forward: CommandByte(forward),
            reverse: CommandByte(reverse),
            steering: CommandByte(steering),
        }
    }

    /// Builds the full 11-byte packet behind the given header.
    #[must_use]
    pub fn to_packet(&self, header: PacketHeader) -> [u8; COMMAND_PACKET_LEN] {
        let mut packet = [0u8; COMMAND_PACKET_LEN];
        packet[..4].copy_from_slice(&header.bytes());
        packet[4..6].copy_from_slice(&RESERVED_SEQUENCE);
        packet[6..8].copy_from_slice(&COMMAND_CLASS_DRIVE);
        packet[8] = self.forward.0;
        packet[9] = self.reverse.0;
        packet[10] = self.steering.0;
        packet
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.forward, self.reverse, self.steering)
    }
}

/// Encodes stick positions into drive commands using per-axis dead zones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandEncoder {
    throttle: DeadZone,
    steering: DeadZone,
}

impl Default for CommandEncoder {
    fn default() -> Self {
        Self {
            throttle: DeadZone::throttle_default(),
            steering: DeadZone::steering_default(),
        }
    }
}

impl CommandEncoder {
    /// Creates an encoder from already validated dead zones.
    #[must_use]
    pub fn new(throttle: DeadZone, steering: DeadZone) -> Self {
        Self { throttle, steering }
    }

    /// Creates an encoder from raw thresholds.
    ///
    /// # Errors
    ///
    /// Returns `Config` if either threshold is outside `[0.0, 1.0)`.
    pub fn from_thresholds(throttle: f32, steering: f32) -> Result<Self> {
        Ok(Self::new(DeadZone::new(throttle)?, DeadZone::new(steering)?))
    }

    /// Throttle/reverse dead zone
    #[must_use]
    pub fn throttle_dead_zone(&self) -> DeadZone {
        self.throttle
    }

    /// Steering dead zone
    #[must_use]
    pub fn steering_dead_zone(&self) -> DeadZone {
        self.steering
    }

    /// Encode raw stick positions into a drive command
    ///
    /// Throttle and steering are dead-zone shaped first. The shaped throttle
    /// then feeds the forward mapping over `[0, 1]` onto `[45, 230]` when
    /// positive, or the reverse mapping of its magnitude onto `[42, 230]`
    /// when negative. Steering is always mapped over `[-1, 1]` onto
    /// `[46, 210]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mako_bridge::mako::encoder::{Command, CommandEncoder};
    ///
    /// let encoder = CommandEncoder::default();
    /// assert_eq!(encoder.encode(1.0, 0.0), Command::new(0xe6, 0x00, 0x80));
    /// assert_eq!(encoder.encode(0.0, -1.0), Command::new(0x00, 0x00, 0x2e));
    /// ```
    #[must_use]
    pub fn encode(&self, throttle: f32, steering: f32) -> Command {
        let throttle = self.throttle.apply(throttle);
        let steering = self.steering.apply(steering);

        let forward = if throttle > 0.0 {
            map_to_command_byte(throttle, 0.0, 1.0, FORWARD_OUTPUT_MIN, FORWARD_OUTPUT_MAX)
        } else {
            CommandByte(IDLE_THROTTLE)
        };

        let reverse = if throttle < 0.0 {
            map_to_command_byte(-throttle, 0.0, 1.0, REVERSE_OUTPUT_MIN, REVERSE_OUTPUT_MAX)
        } else {
            CommandByte(IDLE_THROTTLE)
        };

        let steering = map_to_command_byte(
            steering,
            -1.0,
            1.0,
            STEERING_OUTPUT_MIN,
            STEERING_OUTPUT_MAX,
        );

        Command {
            forward,
            reverse,
            steering,
        }
    }

    /// Encodes one tick's reading.
    #[must_use]
    pub fn encode_reading(&self, reading: &AxisReading) -> Command {
        self.encode(reading.throttle, reading.steering)
    }
}
