//! Core types and targeting geometry for the `tagsight-*` workspace.
//!
//! This crate is intentionally small and purely value-oriented. It does *not*
//! talk to any sensor: the backends in `tagsight-transport` normalize their
//! native payloads into [`DetectionFrame`], and everything downstream works
//! on that one shape regardless of how the sensor is attached.

mod frame;
mod geometry;
mod logger;
mod mode;
mod target;

pub use frame::{BlobDetection, DetectionFrame, MarkerDetection};
pub use geometry::{
    distance_from_vertical_angle, heading_radians, normalize, SensorCalibration,
    MAX_TARGET_DISTANCE, NEAR_HORIZONTAL_EPSILON_RAD, OUT_OF_RANGE_DISTANCE,
};
pub use mode::Mode;
pub use target::{Alliance, GamePieceColor, TargetDescriptor, TargetKind};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
