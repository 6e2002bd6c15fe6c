//! Local device-bus backend.
//!
//! On the robot, the sensor can be plugged straight into the controller and
//! shows up as a named device on the local bus. The platform driver behind
//! [`BusDevice`] is not part of this workspace; only its observable contract
//! is: select a pipeline, start polling, hand out the latest raw result,
//! stop. Simulators and tests implement the same trait.

use log::debug;

use crate::SensorTransport;
use tagsight_core::{BlobDetection, DetectionFrame, MarkerDetection, Mode};

/// Raw marker entry as the bus device reports it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawBusMarker {
    pub id: i32,
    pub x_degrees: f64,
    pub y_degrees: f64,
    pub area_percent: f64,
}

/// Raw blob entry as the bus device reports it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawBusBlob {
    pub x_degrees: f64,
    pub y_degrees: f64,
    pub area_percent: f64,
}

/// One unparsed result read from the bus device.
#[derive(Clone, Debug, PartialEq)]
pub struct RawBusFrame {
    pub valid: bool,
    pub pipeline_index: i32,
    pub markers: Vec<RawBusMarker>,
    pub blobs: Vec<RawBusBlob>,
}

/// Observable contract of a targeting sensor attached to the local bus.
pub trait BusDevice {
    /// Select the detection pipeline by index.
    fn set_mode(&mut self, index: i32);
    /// Begin polling the sensor.
    fn start(&mut self);
    /// Most recent raw result, or `None` when nothing has arrived yet.
    fn latest_frame(&mut self) -> Option<RawBusFrame>;
    /// Stop polling.
    fn stop(&mut self);
}

/// Named-device lookup against the robot's bus configuration.
pub trait BusRegistry {
    /// Open the named device, or `None` when it is absent from the
    /// configuration.
    fn open(&mut self, name: &str) -> Option<Box<dyn BusDevice>>;
}

/// Registry for environments with no device bus at all, such as a laptop
/// driving the sensor over the network.
pub struct NoBusRegistry;

impl BusRegistry for NoBusRegistry {
    fn open(&mut self, _name: &str) -> Option<Box<dyn BusDevice>> {
        None
    }
}

/// [`SensorTransport`] over an opened bus device.
pub struct BusTransport {
    device: Box<dyn BusDevice>,
    stopped: bool,
}

impl BusTransport {
    /// Wrap an opened device and start it polling.
    pub fn new(mut device: Box<dyn BusDevice>) -> Self {
        device.start();
        Self {
            device,
            stopped: false,
        }
    }
}

fn normalize(raw: RawBusFrame) -> DetectionFrame {
    DetectionFrame {
        valid: raw.valid,
        markers: raw
            .markers
            .iter()
            .map(|m| MarkerDetection {
                id: m.id,
                angle_x: m.x_degrees,
                angle_y: m.y_degrees,
                area: m.area_percent,
            })
            .collect(),
        blobs: raw
            .blobs
            .iter()
            .map(|b| BlobDetection {
                angle_x: b.x_degrees,
                angle_y: b.y_degrees,
                area: b.area_percent,
            })
            .collect(),
        reported_mode: raw.pipeline_index,
    }
}

impl SensorTransport for BusTransport {
    fn fetch_frame(&mut self) -> DetectionFrame {
        if self.stopped {
            return DetectionFrame::invalid();
        }
        match self.device.latest_frame() {
            Some(raw) => normalize(raw),
            None => DetectionFrame::invalid(),
        }
    }

    fn switch_mode(&mut self, mode: Mode) -> bool {
        if self.stopped {
            return false;
        }
        debug!("bus: pipeline {}", mode.wire_index());
        self.device.set_mode(mode.wire_index());
        true
    }

    fn probe(&mut self) -> bool {
        !self.stopped
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.device.stop();
            self.stopped = true;
        }
    }
}
