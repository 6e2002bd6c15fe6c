//! Resolved targeting answers and the small domain enumerations behind them.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::frame::MarkerDetection;
use crate::geometry::{heading_radians, SensorCalibration};

/// Which side of the field this robot plays for. Each alliance has its own
/// fixed goal marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alliance {
    Blue,
    Red,
}

impl Alliance {
    /// The goal marker id this alliance targets.
    pub const fn marker_id(self) -> i32 {
        match self {
            Alliance::Blue => 20,
            Alliance::Red => 24,
        }
    }
}

/// Color of a game piece. There are exactly two in play; "no color" is not a
/// color and is expressed as `Option<GamePieceColor>` where it can occur.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePieceColor {
    Purple,
    Green,
}

/// What category of thing a [`TargetDescriptor`] describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    /// A numbered fiducial marker.
    Marker,
    /// A generic color blob.
    ColorBlob,
    /// Nothing found.
    None,
}

/// One resolved targeting answer: raw angular readings plus the derived
/// physical quantities, captured at a single instant.
///
/// Value type, constructed anew per query and never mutated. `found` is
/// `false` exactly when `kind` is [`TargetKind::None`], and in that case every
/// measurement field is zero and `marker_id` is `-1`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    /// What was found.
    pub kind: TargetKind,
    /// Horizontal offset from the crosshair, degrees.
    pub angle_x: f64,
    /// Vertical offset from the crosshair, degrees.
    pub angle_y: f64,
    /// Covered image area, percent.
    pub area: f64,
    /// Distance along the floor, inches, clamped to `[0, 200]`.
    pub distance: f64,
    /// Heading offset to face the target, radians.
    pub heading: f64,
    /// Normalized screen x, nominally `[-1, 1]`.
    pub norm_x: f64,
    /// Normalized screen y, nominally `[-1, 1]`.
    pub norm_y: f64,
    /// Marker id, `-1` when the target is not a marker.
    pub marker_id: i32,
    /// Game-piece color for blob targets.
    pub color: Option<GamePieceColor>,
    /// Whether anything was found at all.
    pub found: bool,
    /// Wall-clock capture time, milliseconds since the Unix epoch.
    pub captured_at_millis: i64,
}

impl TargetDescriptor {
    /// The no-target answer.
    pub fn none() -> Self {
        Self {
            kind: TargetKind::None,
            angle_x: 0.0,
            angle_y: 0.0,
            area: 0.0,
            distance: 0.0,
            heading: 0.0,
            norm_x: 0.0,
            norm_y: 0.0,
            marker_id: -1,
            color: None,
            found: false,
            captured_at_millis: unix_millis(),
        }
    }

    /// Describe a marker detection, deriving distance, heading and normalized
    /// screen coordinates from the given calibration.
    pub fn marker(detection: &MarkerDetection, calibration: &SensorCalibration) -> Self {
        Self {
            kind: TargetKind::Marker,
            angle_x: detection.angle_x,
            angle_y: detection.angle_y,
            area: detection.area,
            distance: calibration.distance_to(detection.angle_y),
            heading: heading_radians(detection.angle_x),
            norm_x: calibration.norm_x(detection.angle_x),
            norm_y: calibration.norm_y(detection.angle_y),
            marker_id: detection.id,
            color: None,
            found: true,
            captured_at_millis: unix_millis(),
        }
    }
}

fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
