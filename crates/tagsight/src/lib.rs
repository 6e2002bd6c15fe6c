//! High-level facade for the `tagsight-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the core model and transport crates
//! - [`ModeController`], which tracks the sensor's detection pipeline and
//!   elides redundant switches
//! - [`TargetResolver`], the two domain queries robot code actually asks:
//!   "where is our alliance marker" and "what collection sequence is posted".
//!
//! ## Quickstart
//!
//! ```no_run
//! use tagsight::transport::{HttpConfig, NoBusRegistry, TransportAdapter};
//! use tagsight::{Alliance, SensorCalibration, TargetResolver};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let adapter = TransportAdapter::connect(
//!     &mut NoBusRegistry,
//!     "targetcam",
//!     &HttpConfig::default(),
//! )?;
//! let mut resolver = TargetResolver::new(adapter, SensorCalibration::default());
//!
//! let target = resolver.alliance_target(Alliance::Blue);
//! if target.found {
//!     println!("marker {} at {:.1} in", target.marker_id, target.distance);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `tagsight::core`: frame model, modes, descriptors, targeting geometry.
//! - `tagsight::transport`: the two backends and the connection adapter.
//! - `tagsight::{ModeController, TargetResolver}`: the resolver layer.

pub use tagsight_core as core;
pub use tagsight_transport as transport;

pub use tagsight_core::{
    Alliance, DetectionFrame, GamePieceColor, MarkerDetection, Mode, SensorCalibration,
    TargetDescriptor, TargetKind,
};
pub use tagsight_transport::{SensorTransport, TransportAdapter};

mod resolver;
mod sequence;

pub use resolver::{ModeController, TargetResolver};
pub use sequence::{sequence_for_marker, SEQUENCE_MARKER_IDS};
