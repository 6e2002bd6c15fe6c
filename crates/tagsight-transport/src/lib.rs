//! Transport layer for the tagsight targeting sensor.
//!
//! The sensor is reachable two ways: directly on the robot's device bus, or
//! over its HTTP results API when it hangs off the network instead. Both
//! backends implement [`SensorTransport`] and normalize their native payloads
//! into the shared `DetectionFrame` shape (degrees for angles, percent for
//! area), so nothing downstream knows or cares which one is in use.
//!
//! [`TransportAdapter::connect`] picks one backend at construction (bus
//! first, HTTP fallback) and keeps it for the adapter's lifetime. A backend
//! that goes dark mid-session degrades to invalid frames; it is never
//! re-probed or swapped out.

mod adapter;
mod bus;
mod http;

pub use adapter::{ConnectError, Connection, TransportAdapter, MODE_SETTLE_DELAY};
pub use bus::{
    BusDevice, BusRegistry, BusTransport, NoBusRegistry, RawBusBlob, RawBusFrame, RawBusMarker,
};
pub use http::{parse_results, HttpConfig, HttpTransport, POLL_TIMEOUT, PROBE_TIMEOUT};

use tagsight_core::{DetectionFrame, Mode};

/// Uniform capability surface over the two sensor backends.
///
/// `fetch_frame` never fails: timeouts, unreachable hosts and malformed
/// payloads all come back as `DetectionFrame::invalid()`, which downstream
/// code treats exactly like "no target in view". `switch_mode` reports only
/// whether the request appeared to go through; the pipeline itself settles
/// asynchronously (see [`MODE_SETTLE_DELAY`]), and a caller that needs
/// certainty must re-read `reported_mode` from a later frame.
pub trait SensorTransport {
    /// Latest detection frame, or the invalid frame on any failure.
    fn fetch_frame(&mut self) -> DetectionFrame;

    /// Request a pipeline switch. Fire-and-forget: `true` means the request
    /// was accepted, not that the pipeline has finished changing.
    fn switch_mode(&mut self, mode: Mode) -> bool;

    /// Whether the backend currently answers at all.
    fn probe(&mut self) -> bool;

    /// Release the backend. Fetches after this return invalid frames.
    fn stop(&mut self);
}
