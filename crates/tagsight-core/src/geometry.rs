//! Targeting geometry: angular readings to physical distance and heading.
//!
//! Everything here is a pure function of its inputs. The geometric model is a
//! fixed-height planar target viewed from a fixed-height, fixed-tilt sensor;
//! outputs are clamped so that noisy input can never produce a non-finite or
//! physically nonsensical number. Both the production resolver and the live
//! test harness call these same functions, so there is exactly one copy of
//! each formula in the workspace.

use serde::{Deserialize, Serialize};

/// Sightline angles closer to horizontal than this (radians) would blow up
/// the tangent in the distance formula.
pub const NEAR_HORIZONTAL_EPSILON_RAD: f64 = 0.01;

/// Distance reported for a near-horizontal sightline instead of dividing by a
/// near-zero tangent. A required literal, not an approximation.
pub const OUT_OF_RANGE_DISTANCE: f64 = 1000.0;

/// Upper clamp for computed distances, in inches. Nothing on the field is
/// farther away than this.
pub const MAX_TARGET_DISTANCE: f64 = 200.0;

/// Physical mounting geometry and optics of the targeting sensor.
///
/// Read-only process-wide configuration: fixed when the resolver is built,
/// shared freely between any number of resolver instances, never mutated at
/// runtime. The values parameterize the geometry functions in this module but
/// are not state of their own.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorCalibration {
    /// Height of the sensor lens above the floor, inches.
    pub sensor_height: f64,
    /// Upward tilt of the sensor mount, degrees.
    pub mount_angle_deg: f64,
    /// Height of the alliance marker centers above the floor, inches.
    pub target_height: f64,
    /// Horizontal field-of-view half-angle, degrees.
    pub half_fov_x_deg: f64,
    /// Vertical field-of-view half-angle, degrees.
    pub half_fov_y_deg: f64,
}

impl Default for SensorCalibration {
    /// Current robot's measured mount geometry and the sensor's optics.
    fn default() -> Self {
        Self {
            sensor_height: 40.0,
            mount_angle_deg: 15.0,
            target_height: 36.0,
            half_fov_x_deg: 29.8,
            half_fov_y_deg: 24.85,
        }
    }
}

impl SensorCalibration {
    /// Distance to a marker given its vertical angular offset, degrees.
    pub fn distance_to(&self, angle_y_deg: f64) -> f64 {
        distance_from_vertical_angle(
            angle_y_deg,
            self.target_height,
            self.sensor_height,
            self.mount_angle_deg,
        )
    }

    /// Normalized screen-space x for a horizontal angular offset, degrees.
    pub fn norm_x(&self, angle_x_deg: f64) -> f64 {
        normalize(angle_x_deg, self.half_fov_x_deg)
    }

    /// Normalized screen-space y for a vertical angular offset, degrees.
    pub fn norm_y(&self, angle_y_deg: f64) -> f64 {
        normalize(angle_y_deg, self.half_fov_y_deg)
    }
}

/// Distance along the floor to a target of known height.
///
/// The sightline angle is `mount_angle_deg + angle_y_deg`; the target sits
/// `target_height - sensor_height` above (or below) the lens, and the
/// horizontal distance follows from the tangent. Near-horizontal sightlines
/// return [`OUT_OF_RANGE_DISTANCE`]; everything else is clamped to
/// `[0, MAX_TARGET_DISTANCE]`.
pub fn distance_from_vertical_angle(
    angle_y_deg: f64,
    target_height: f64,
    sensor_height: f64,
    mount_angle_deg: f64,
) -> f64 {
    let sightline_rad = (mount_angle_deg + angle_y_deg).to_radians();
    if sightline_rad.abs() < NEAR_HORIZONTAL_EPSILON_RAD {
        return OUT_OF_RANGE_DISTANCE;
    }
    let rise = target_height - sensor_height;
    (rise / sightline_rad.tan()).clamp(0.0, MAX_TARGET_DISTANCE)
}

/// Heading offset to a target from its horizontal angular offset.
///
/// The sensor's horizontal angle already is the heading offset; this is a
/// unit conversion, nothing more.
pub fn heading_radians(angle_x_deg: f64) -> f64 {
    angle_x_deg.to_radians()
}

/// Normalize an angular offset against a field-of-view half-angle.
///
/// Deliberately unclamped: a detection at the very edge of the lens can read
/// slightly past ±1 from distortion, and callers want to see that.
pub fn normalize(angle_deg: f64, half_fov_deg: f64) -> f64 {
    angle_deg / half_fov_deg
}
