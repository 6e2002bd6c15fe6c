//! Snapshot model for one sensor read.

use serde::{Deserialize, Serialize};

/// One fiducial marker detection: a numbered marker with angular offsets from
/// the sensor crosshair and the fraction of the image it covers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerDetection {
    /// Marker number.
    pub id: i32,
    /// Horizontal offset from the crosshair, degrees. Positive is right.
    pub angle_x: f64,
    /// Vertical offset from the crosshair, degrees. Positive is up.
    pub angle_y: f64,
    /// Covered image area, percent (0-100).
    pub area: f64,
}

/// One generic color-blob detection. Same units as [`MarkerDetection`], but a
/// blob carries no identity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlobDetection {
    /// Horizontal offset from the crosshair, degrees.
    pub angle_x: f64,
    /// Vertical offset from the crosshair, degrees.
    pub angle_y: f64,
    /// Covered image area, percent (0-100).
    pub area: f64,
}

/// One atomic read from the sensor.
///
/// Produced fresh on every fetch, owned by the caller that fetched it, never
/// mutated. A frame either carries a coherent set of detections (`valid`) or
/// stands for "nothing usable this cycle": connectivity failures and garbage
/// payloads are both reported as [`DetectionFrame::invalid`], so downstream
/// code has exactly one no-target path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    /// Whether the sensor had a coherent result this cycle.
    pub valid: bool,
    /// Marker detections, in the order the sensor reported them.
    pub markers: Vec<MarkerDetection>,
    /// Color-blob detections, in reported order.
    pub blobs: Vec<BlobDetection>,
    /// Pipeline index the sensor reports itself to be running. Zero on the
    /// failure value.
    pub reported_mode: i32,
}

impl DetectionFrame {
    /// The uniform failure value: not valid, no detections.
    pub fn invalid() -> Self {
        Self {
            valid: false,
            markers: Vec::new(),
            blobs: Vec::new(),
            reported_mode: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_frame_is_empty() {
        let frame = DetectionFrame::invalid();
        assert!(!frame.valid);
        assert!(frame.markers.is_empty());
        assert!(frame.blobs.is_empty());
    }

    #[test]
    fn frame_round_trips_through_json() {
        let frame = DetectionFrame {
            valid: true,
            markers: vec![MarkerDetection {
                id: 20,
                angle_x: 5.0,
                angle_y: -3.0,
                area: 1.2,
            }],
            blobs: vec![BlobDetection {
                angle_x: -1.0,
                angle_y: 0.5,
                area: 4.0,
            }],
            reported_mode: 2,
        };
        let text = serde_json::to_string(&frame).expect("serialize");
        let back: DetectionFrame = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(frame, back);
    }
}
