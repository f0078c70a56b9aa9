//! # Joystick Module
//!
//! Detects a joystick through the Linux evdev interface and polls its
//! absolute axes once per control tick.
//!
//! ## Axis Codes
//!
//! Axes are selected by evdev `ABS_*` code. The defaults match an Xbox-style
//! pad:
//!
//! | Role | Code | evdev name |
//! |------|------|------------|
//! | Throttle/reverse | 4 | ABS_RY (right stick Y) |
//! | Steering | 0 | ABS_X (left stick X) |
//!
//! Reading uses `EVIOCGABS` snapshots rather than the event queue, so a
//! read never blocks and always reflects the latest stick position.

use evdev::{AbsoluteAxisType, Device};
use std::path::Path;
use tracing::{debug, info};

use super::calibration::normalize_raw_axis;
use super::source::{AxisReading, AxisSource};
use crate::error::{BridgeError, Result};

/// Default throttle axis (ABS_RY).
pub const DEFAULT_THROTTLE_AXIS: u16 = 4;

/// Default steering axis (ABS_X).
pub const DEFAULT_STEERING_AXIS: u16 = 0;

/// Directory scanned for event devices when no path is configured.
const INPUT_DIR: &str = "/dev/input";

/// An opened joystick polled for two absolute axes.
pub struct Joystick {
    device: Device,
    device_path: String,
    throttle_axis: AbsoluteAxisType,
    steering_axis: AbsoluteAxisType,
}

impl std::fmt::Debug for Joystick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Joystick")
            .field("device_path", &self.device_path)
            .field("throttle_axis", &self.throttle_axis.0)
            .field("steering_axis", &self.steering_axis.0)
            .finish_non_exhaustive()
    }
}

impl Joystick {
    /// Open a joystick exposing both axes
    ///
    /// With an empty `device_path`, scans `/dev/input/event*` in sorted order
    /// and picks the first device that supports both axes.
    ///
    /// # Errors
    ///
    /// - `ControllerNotFound`: nothing suitable is attached
    /// - `Controller`: the configured device cannot be opened or lacks the axes
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mako_bridge::controller::joystick::Joystick;
    ///
    /// let joystick = Joystick::open("", 4, 0)?;
    /// println!("Using {}", joystick.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(device_path: &str, throttle_axis: u16, steering_axis: u16) -> Result<Self> {
        let throttle_axis = AbsoluteAxisType(throttle_axis);
        let steering_axis = AbsoluteAxisType(steering_axis);

        if !device_path.is_empty() {
            let device = Device::open(device_path).map_err(|e| {
                BridgeError::Controller(format!("Failed to open {}: {}", device_path, e))
            })?;

            if !supports_axes(&device, throttle_axis, steering_axis) {
                return Err(BridgeError::Controller(format!(
                    "{} does not report axes {} and {}",
                    device_path, throttle_axis.0, steering_axis.0
                )));
            }

            info!("Opened joystick at {}", device_path);
            return Ok(Self {
                device,
                device_path: device_path.to_string(),
                throttle_axis,
                steering_axis,
            });
        }

        Self::scan(throttle_axis, steering_axis)
    }

    fn scan(throttle_axis: AbsoluteAxisType, steering_axis: AbsoluteAxisType) -> Result<Self> {
        let input_dir = Path::new(INPUT_DIR);
        if !input_dir.exists() {
            return Err(BridgeError::ControllerNotFound);
        }

        let mut entries: Vec<_> = std::fs::read_dir(input_dir)
            .map_err(|e| BridgeError::Controller(format!("Failed to read {}: {}", INPUT_DIR, e)))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().starts_with("event"))
                    .unwrap_or(false)
            })
            .collect();

        // Deterministic pick when several pads are attached
        entries.sort();

        for path in entries {
            match Device::open(&path) {
                Ok(device) => {
                    debug!(
                        "Found input device: {} ({})",
                        path.display(),
                        device.name().unwrap_or("unnamed")
                    );

                    if supports_axes(&device, throttle_axis, steering_axis) {
                        let device_path = path.to_string_lossy().to_string();
                        info!(
                            "Found joystick {} at {}",
                            device.name().unwrap_or("unnamed"),
                            device_path
                        );
                        return Ok(Self {
                            device,
                            device_path,
                            throttle_axis,
                            steering_axis,
                        });
                    }
                }
                Err(e) => {
                    debug!("Could not open {}: {}", path.display(), e);
                }
            }
        }

        Err(BridgeError::ControllerNotFound)
    }

    /// Path of the opened event device.
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Human-readable device name, if the driver reports one.
    pub fn name(&self) -> Option<&str> {
        self.device.name()
    }
}

impl AxisSource for Joystick {
    fn read(&mut self) -> Result<AxisReading> {
        let state = self
            .device
            .get_abs_state()
            .map_err(|e| BridgeError::Controller(format!("Failed to read axes: {}", e)))?;

        let axis = |code: AbsoluteAxisType| {
            let info = &state[code.0 as usize];
            normalize_raw_axis(info.value, info.minimum, info.maximum)
        };

        Ok(AxisReading::new(axis(self.throttle_axis), axis(self.steering_axis)))
    }
}

fn supports_axes(device: &Device, throttle: AbsoluteAxisType, steering: AbsoluteAxisType) -> bool {
    device
        .supported_absolute_axes()
        .map(|axes| axes.contains(throttle) && axes.contains(steering))
        .unwrap_or(false)
}
