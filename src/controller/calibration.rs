//! # Calibration Module
//!
//! Dead-zone shaping for joystick axes.
//!
//! ## Dead Zone
//!
//! A dead zone suppresses small stick movements around centre so that a
//! resting stick never drives the car. Readings strictly inside
//! `(-threshold, threshold)` become exactly `0.0`; the remaining range is
//! stretched linearly so the edge of the dead zone maps to `0.0` and full
//! deflection still maps to `±1.0`:
//!
//! ```text
//! value > 0:  (value - threshold) / (1 - threshold)
//! value < 0:  (value + threshold) / (1 - threshold)
//! ```
//!
//! No clamping is applied. A threshold of `1.0` or more would divide by a
//! zero or negative span, so [`DeadZone::new`] rejects it.
//!
//! ## Usage
//!
//! ```
//! use mako_bridge::controller::calibration::DeadZone;
//!
//! let dz = DeadZone::new(0.15)?;
//!
//! assert_eq!(dz.apply(0.1), 0.0);
//! assert_eq!(dz.apply(1.0), 1.0);
//! # Ok::<(), mako_bridge::error::BridgeError>(())
//! ```

use crate::error::{BridgeError, Result};

/// Default dead zone for the throttle/reverse axis.
pub const DEFAULT_THROTTLE_DEAD_ZONE: f32 = 0.05;

/// Default dead zone for the steering axis.
pub const DEFAULT_STEERING_DEAD_ZONE: f32 = 0.15;

/// Applies a dead zone to a normalized axis reading.
///
/// Callers must guarantee `threshold < 1.0`; use [`DeadZone`] to get that
/// checked once at configuration time.
///
/// # Examples
///
/// ```
/// use mako_bridge::controller::calibration::apply_dead_zone;
///
/// assert_eq!(apply_dead_zone(0.04, 0.05), 0.0);
/// assert_eq!(apply_dead_zone(-1.0, 0.05), -1.0);
/// ```
#[must_use]
pub fn apply_dead_zone(value: f32, threshold: f32) -> f32 {
    if -threshold < value && value < threshold {
        return 0.0;
    }

    if value > 0.0 {
        (value - threshold) / (1.0 - threshold)
    } else {
        (value + threshold) / (1.0 - threshold)
    }
}

/// A validated dead-zone threshold for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeadZone {
    threshold: f32,
}

impl DeadZone {
    /// Creates a dead zone after checking the threshold.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if the threshold is negative,
    /// not finite, or `>= 1.0`.
    pub fn new(threshold: f32) -> Result<Self> {
        if !threshold.is_finite() || !(0.0..1.0).contains(&threshold) {
            return Err(BridgeError::Config(format!(
                "dead zone threshold {} must be in [0.0, 1.0)",
                threshold
            )));
        }

        Ok(Self { threshold })
    }

    /// Throttle/reverse dead zone tuned for the stock firmware (0.05).
    #[must_use]
    pub fn throttle_default() -> Self {
        Self {
            threshold: DEFAULT_THROTTLE_DEAD_ZONE,
        }
    }

    /// Steering dead zone tuned for the stock firmware (0.15).
    #[must_use]
    pub fn steering_default() -> Self {
        Self {
            threshold: DEFAULT_STEERING_DEAD_ZONE,
        }
    }

    /// Returns the configured threshold.
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Applies this dead zone to a normalized reading.
    #[must_use]
    pub fn apply(&self, value: f32) -> f32 {
        apply_dead_zone(value, self.threshold)
    }
}

/// Converts a raw evdev axis value to the range -1.0 to 1.0.
///
/// `minimum` and `maximum` come from the device's absinfo. A degenerate
/// range (`maximum <= minimum`) reads as centred.
///
/// # Examples
///
/// ```
/// use mako_bridge::controller::calibration::normalize_raw_axis;
///
/// assert_eq!(normalize_raw_axis(-32768, -32768, 32767), -1.0);
/// assert_eq!(normalize_raw_axis(32767, -32768, 32767), 1.0);
/// assert_eq!(normalize_raw_axis(0, 0, 255), -1.0);
/// ```
#[must_use]
pub fn normalize_raw_axis(raw: i32, minimum: i32, maximum: i32) -> f32 {
    if maximum <= minimum {
        return 0.0;
    }

    let span = (maximum as f64) - (minimum as f64);
    let offset = (raw as f64) - (minimum as f64);
    (2.0 * offset / span - 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Dead Zone Tests ====================

    #[test]
    fn test_inside_dead_zone_is_neutral() {
        for &threshold in &[0.05_f32, 0.15, 0.5, 0.9] {
            for step in 0..100 {
                let v = threshold * (step as f32 / 100.0);
                assert_eq!(apply_dead_zone(v, threshold), 0.0);
                assert_eq!(apply_dead_zone(-v, threshold), 0.0);
            }
        }
    }

    #[test]
    fn test_boundary_maps_to_zero() {
        for &threshold in &[0.05_f32, 0.15, 0.3, 0.75, 0.99] {
            assert_eq!(apply_dead_zone(threshold, threshold), 0.0);
            assert_eq!(apply_dead_zone(-threshold, threshold), 0.0);
        }
    }

    #[test]
    fn test_full_deflection_preserved() {
        for &threshold in &[0.05_f32, 0.15, 0.3, 0.75] {
            assert_eq!(apply_dead_zone(1.0, threshold), 1.0);
            assert_eq!(apply_dead_zone(-1.0, threshold), -1.0);
        }
    }

    #[test]
    fn test_rescaling_is_linear() {
        // Halfway between 0.1 and 1.0
        let result = apply_dead_zone(0.55, 0.1);
        assert!((result - 0.5).abs() < 0.001);

        let result = apply_dead_zone(-0.55, 0.1);
        assert!((result + 0.5).abs() < 0.001);
    }

    #[test]
    fn test_out_of_range_is_not_clamped() {
        let result = apply_dead_zone(1.5, 0.5);
        assert!((result - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_zero_threshold_is_identity() {
        assert_eq!(apply_dead_zone(0.3, 0.0), 0.3);
        assert_eq!(apply_dead_zone(-0.7, 0.0), -0.7);
    }

    // ==================== DeadZone Tests ====================

    #[test]
    fn test_dead_zone_new_valid() {
        let dz = DeadZone::new(0.15).unwrap();
        assert_eq!(dz.threshold(), 0.15);
        assert_eq!(dz.apply(0.1), 0.0);
        assert_eq!(dz.apply(1.0), 1.0);
    }

    #[test]
    fn test_dead_zone_rejects_one() {
        assert!(matches!(DeadZone::new(1.0), Err(BridgeError::Config(_))));
    }

    #[test]
    fn test_dead_zone_rejects_above_one() {
        assert!(DeadZone::new(1.5).is_err());
    }

    #[test]
    fn test_dead_zone_rejects_negative() {
        assert!(DeadZone::new(-0.1).is_err());
    }

    #[test]
    fn test_dead_zone_rejects_nan() {
        assert!(DeadZone::new(f32::NAN).is_err());
        assert!(DeadZone::new(f32::INFINITY).is_err());
    }

    // ==================== Raw Axis Tests ====================

    #[test]
    fn test_normalize_signed_range() {
        assert_eq!(normalize_raw_axis(-32768, -32768, 32767), -1.0);
        assert_eq!(normalize_raw_axis(32767, -32768, 32767), 1.0);
        assert!(normalize_raw_axis(0, -32768, 32767).abs() < 0.001);
    }

    #[test]
    fn test_normalize_unsigned_range() {
        assert_eq!(normalize_raw_axis(0, 0, 255), -1.0);
        assert_eq!(normalize_raw_axis(255, 0, 255), 1.0);
        assert!(normalize_raw_axis(128, 0, 255).abs() < 0.01);
    }

    #[test]
    fn test_normalize_degenerate_range() {
        assert_eq!(normalize_raw_axis(10, 5, 5), 0.0);
        assert_eq!(normalize_raw_axis(10, 9, 3), 0.0);
    }
}
