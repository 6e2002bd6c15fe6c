//! Detection modes of the targeting sensor.

use serde::{Deserialize, Serialize};

use crate::target::GamePieceColor;

/// One preconfigured on-sensor detection pipeline.
///
/// The enumeration is closed: there is no way to request a pipeline outside
/// these four, and the wire-index mapping is total. What each pipeline is
/// tuned for lives on the sensor itself; this type only names them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Purple game-piece color detection.
    ColorPurple,
    /// Green game-piece color detection.
    ColorGreen,
    /// Alliance marker detection (markers 20 and 24 only).
    AllianceMarkers,
    /// Sequence marker detection (markers 21-23 only).
    SequenceMarkers,
}

impl Mode {
    /// On-sensor pipeline index this mode maps to.
    pub const fn wire_index(self) -> i32 {
        match self {
            Mode::ColorPurple => 0,
            Mode::ColorGreen => 1,
            Mode::AllianceMarkers => 2,
            Mode::SequenceMarkers => 3,
        }
    }

    /// Inverse of [`Mode::wire_index`]. `None` for indices that do not name a
    /// configured pipeline (the sensor has slots we never use).
    pub const fn from_wire_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Mode::ColorPurple),
            1 => Some(Mode::ColorGreen),
            2 => Some(Mode::AllianceMarkers),
            3 => Some(Mode::SequenceMarkers),
            _ => None,
        }
    }

    /// Detection mode for one game-piece color.
    pub const fn for_color(color: GamePieceColor) -> Self {
        match color {
            GamePieceColor::Purple => Mode::ColorPurple,
            GamePieceColor::Green => Mode::ColorGreen,
        }
    }
}
