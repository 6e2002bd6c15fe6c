//! Sequence-marker decoding.
//!
//! One marker in a fixed three-id range encodes the order in which game
//! pieces must be collected. The id-to-sequence mapping is a calibration
//! table published for the season, not a formula; reproduce it exactly.

use std::ops::RangeInclusive;

use tagsight_core::GamePieceColor;

/// Marker ids that carry a collection sequence.
pub const SEQUENCE_MARKER_IDS: RangeInclusive<i32> = 21..=23;

/// Collection order encoded by a sequence marker, or `None` for ids outside
/// the table.
pub const fn sequence_for_marker(id: i32) -> Option<[GamePieceColor; 3]> {
    use GamePieceColor::{Green, Purple};
    match id {
        21 => Some([Green, Purple, Purple]),
        22 => Some([Purple, Green, Purple]),
        23 => Some([Purple, Purple, Green]),
        _ => None,
    }
}
