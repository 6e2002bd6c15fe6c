//! HTTP results-API backend.
//!
//! When the sensor sits on the network instead of the device bus, it serves a
//! JSON snapshot of the running pipeline's detections at `GET /results` and
//! accepts pipeline switches at `POST /settings` with `{"pipeline": n}`.
//! Field names follow the sensor's wire format: `v` validity (0/1), `pID`
//! pipeline index, `Fiducial` marker entries (`fID`, `tx`, `ty`, `ta`) and
//! `Detector` blob entries (`tx`, `ty`, `ta`). Angles arrive in degrees and
//! areas in percent, so normalization is a field mapping, not a unit change.

use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::SensorTransport;
use tagsight_core::{BlobDetection, DetectionFrame, MarkerDetection, Mode};

/// Connect/read budget for the initial reachability probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Per-request budget for steady-state polling. A sensor that has gone dark
/// costs a polling caller at most this much per cycle.
pub const POLL_TIMEOUT: Duration = Duration::from_millis(800);

/// Where the sensor's results API lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Sensor hostname or IP.
    pub host: String,
    /// Results-API port.
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "targetcam.local".to_string(),
            port: 5807,
        }
    }
}

impl HttpConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Deserialize)]
struct WireResults {
    #[serde(default)]
    v: u8,
    #[serde(default, rename = "pID")]
    pid: i32,
    #[serde(default, rename = "Fiducial")]
    fiducial: Vec<WireFiducial>,
    #[serde(default, rename = "Detector")]
    detector: Vec<WireBlob>,
}

#[derive(Deserialize)]
struct WireFiducial {
    #[serde(default = "missing_id", rename = "fID")]
    id: i32,
    #[serde(default)]
    tx: f64,
    #[serde(default)]
    ty: f64,
    #[serde(default)]
    ta: f64,
}

#[derive(Deserialize)]
struct WireBlob {
    #[serde(default)]
    tx: f64,
    #[serde(default)]
    ty: f64,
    #[serde(default)]
    ta: f64,
}

fn missing_id() -> i32 {
    -1
}

/// Parse a `/results` payload into the shared frame shape.
///
/// Anything that does not parse comes back as the invalid frame. A consumer
/// cannot usefully tell a broken sensor from a garbled one, so both look the
/// same downstream.
pub fn parse_results(body: &str) -> DetectionFrame {
    let wire: WireResults = match serde_json::from_str(body) {
        Ok(wire) => wire,
        Err(err) => {
            warn!("unparseable results payload: {err}");
            return DetectionFrame::invalid();
        }
    };

    DetectionFrame {
        valid: wire.v != 0,
        markers: wire
            .fiducial
            .iter()
            .filter(|f| f.id >= 0)
            .map(|f| MarkerDetection {
                id: f.id,
                angle_x: f.tx,
                angle_y: f.ty,
                area: f.ta,
            })
            .collect(),
        blobs: wire
            .detector
            .iter()
            .map(|d| BlobDetection {
                angle_x: d.tx,
                angle_y: d.ty,
                area: d.ta,
            })
            .collect(),
        reported_mode: wire.pid,
    }
}

/// [`SensorTransport`] over the HTTP results API.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base: String,
}

impl HttpTransport {
    /// Build a client against the given address. Does not touch the network;
    /// use [`SensorTransport::probe`] for that.
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(PROBE_TIMEOUT)
            .timeout(POLL_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base: config.base_url(),
        })
    }
}

impl SensorTransport for HttpTransport {
    fn fetch_frame(&mut self) -> DetectionFrame {
        let response = match self.client.get(format!("{}/results", self.base)).send() {
            Ok(response) => response,
            Err(err) => {
                debug!("results fetch failed: {err}");
                return DetectionFrame::invalid();
            }
        };
        if !response.status().is_success() {
            debug!("results fetch answered {}", response.status());
            return DetectionFrame::invalid();
        }
        match response.text() {
            Ok(body) => parse_results(&body),
            Err(err) => {
                debug!("results body unreadable: {err}");
                DetectionFrame::invalid()
            }
        }
    }

    fn switch_mode(&mut self, mode: Mode) -> bool {
        let payload = serde_json::json!({ "pipeline": mode.wire_index() });
        match self
            .client
            .post(format!("{}/settings", self.base))
            .json(&payload)
            .send()
        {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                warn!("pipeline switch request failed: {err}");
                false
            }
        }
    }

    fn probe(&mut self) -> bool {
        match self
            .client
            .get(format!("{}/results", self.base))
            .timeout(PROBE_TIMEOUT)
            .send()
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn stop(&mut self) {
        // Nothing to release: the results API is stateless per request.
    }
}
