//! Backend selection and the adapter facade.

use std::time::Duration;

use log::info;

use crate::bus::{BusRegistry, BusTransport};
use crate::http::{HttpConfig, HttpTransport};
use crate::SensorTransport;
use tagsight_core::{DetectionFrame, Mode};

/// How long a pipeline switch needs before frames reflect the new mode.
///
/// Switches are fire-and-forget: the sensor acknowledges the request
/// immediately and re-tunes in the background. Callers that act on a frame
/// right after switching should wait this long first, or re-check
/// `reported_mode` on the frames they fetch.
pub const MODE_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Which backend a [`TransportAdapter`] selected at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connection {
    /// Sensor opened directly on the robot's device bus.
    Bus,
    /// Sensor reached over the HTTP results API.
    Http,
}

/// Construction failure: no usable backend.
#[derive(thiserror::Error, Debug)]
pub enum ConnectError {
    #[error("http client setup failed: {0}")]
    Client(#[from] reqwest::Error),
    #[error("sensor '{device}' absent from the bus configuration and {url} did not answer")]
    NoBackend { device: String, url: String },
}

/// One sensor connection behind one uniform surface.
///
/// The backend is chosen once, in [`TransportAdapter::connect`]: the device
/// bus wins when the named device exists in the robot configuration, and the
/// HTTP API is probed otherwise. There is no mid-session failover: a backend
/// that starts failing keeps being polled and keeps yielding invalid frames,
/// and it is the caller's decision whether to retry next cycle or bail.
pub struct TransportAdapter {
    backend: Box<dyn SensorTransport>,
    connection: Connection,
}

impl TransportAdapter {
    /// Probe the device bus, then the HTTP API, and wire up whichever answers
    /// first. Fails loudly when neither does: a robot with no usable sensor
    /// must not drive around believing it has one.
    pub fn connect(
        registry: &mut dyn BusRegistry,
        device_name: &str,
        http: &HttpConfig,
    ) -> Result<Self, ConnectError> {
        if let Some(device) = registry.open(device_name) {
            info!("sensor '{device_name}' opened on the device bus");
            return Ok(Self {
                backend: Box::new(BusTransport::new(device)),
                connection: Connection::Bus,
            });
        }

        let mut fallback = HttpTransport::new(http)?;
        if fallback.probe() {
            info!("sensor answering at {}", http.base_url());
            return Ok(Self {
                backend: Box::new(fallback),
                connection: Connection::Http,
            });
        }

        Err(ConnectError::NoBackend {
            device: device_name.to_string(),
            url: http.base_url(),
        })
    }

    /// Backend selected at construction. Fixed for the adapter's lifetime.
    pub fn connection(&self) -> Connection {
        self.connection
    }
}

impl SensorTransport for TransportAdapter {
    fn fetch_frame(&mut self) -> DetectionFrame {
        self.backend.fetch_frame()
    }

    fn switch_mode(&mut self, mode: Mode) -> bool {
        self.backend.switch_mode(mode)
    }

    fn probe(&mut self) -> bool {
        self.backend.probe()
    }

    fn stop(&mut self) {
        self.backend.stop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{BusDevice, NoBusRegistry, RawBusFrame};
    use std::net::TcpListener;

    struct IdleDevice;

    impl BusDevice for IdleDevice {
        fn set_mode(&mut self, _index: i32) {}
        fn start(&mut self) {}
        fn latest_frame(&mut self) -> Option<RawBusFrame> {
            None
        }
        fn stop(&mut self) {}
    }

    struct OneDeviceRegistry {
        name: &'static str,
    }

    impl BusRegistry for OneDeviceRegistry {
        fn open(&mut self, name: &str) -> Option<Box<dyn BusDevice>> {
            (name == self.name).then(|| Box::new(IdleDevice) as Box<dyn BusDevice>)
        }
    }

    /// An address that refuses connections: bind, record, drop.
    fn dead_endpoint() -> HttpConfig {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);
        HttpConfig {
            host: "127.0.0.1".to_string(),
            port,
        }
    }

    #[test]
    fn bus_device_wins_when_present() {
        let mut registry = OneDeviceRegistry { name: "targetcam" };
        let adapter = TransportAdapter::connect(&mut registry, "targetcam", &dead_endpoint())
            .expect("bus backend");
        assert_eq!(adapter.connection(), Connection::Bus);
    }

    #[test]
    fn wrong_device_name_is_absence() {
        let mut registry = OneDeviceRegistry { name: "targetcam" };
        let err = TransportAdapter::connect(&mut registry, "other-cam", &dead_endpoint());
        assert!(matches!(err, Err(ConnectError::NoBackend { .. })));
    }

    #[test]
    fn no_backend_at_all_is_a_loud_failure() {
        let err = TransportAdapter::connect(&mut NoBusRegistry, "targetcam", &dead_endpoint());
        match err {
            Err(ConnectError::NoBackend { device, url }) => {
                assert_eq!(device, "targetcam");
                assert!(url.starts_with("http://127.0.0.1:"));
            }
            Err(other) => panic!("expected NoBackend, got {other:?}"),
            Ok(_) => panic!("connected with no backend available"),
        }
    }
}
