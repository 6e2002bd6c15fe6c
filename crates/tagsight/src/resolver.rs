//! Mode control and the targeting queries.

use log::{debug, info};

use crate::sequence::sequence_for_marker;
use tagsight_core::{
    Alliance, DetectionFrame, GamePieceColor, Mode, SensorCalibration, TargetDescriptor,
};
use tagsight_transport::SensorTransport;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Tracks which detection pipeline the sensor was last asked to run.
///
/// Pipeline switches cost the sensor hundreds of milliseconds of settling, so
/// the controller forwards a switch only when the requested mode differs from
/// the current one: exactly one transport call per real transition, zero for
/// a repeat. The switch itself stays fire-and-forget: `current` reflects what
/// was *requested*, and the sensor's own view lives in
/// `DetectionFrame::reported_mode`.
#[derive(Clone, Debug)]
pub struct ModeController {
    current: Mode,
}

impl ModeController {
    pub fn new() -> Self {
        Self {
            current: Mode::AllianceMarkers,
        }
    }

    /// Mode most recently requested. Initially alliance markers.
    pub fn current(&self) -> Mode {
        self.current
    }

    /// Switch the sensor to `mode` unless it is already there.
    ///
    /// Returns whether the transport accepted the request; a redundant
    /// request is a no-op and reports `true`. `current` advances whenever a
    /// switch is actually issued, acknowledged or not; an unacknowledged
    /// switch may or may not have landed, and only `reported_mode` on a later
    /// frame can say.
    pub fn switch_to<T>(&mut self, mode: Mode, transport: &mut T) -> bool
    where
        T: SensorTransport + ?Sized,
    {
        if mode == self.current {
            return true;
        }
        let accepted = transport.switch_mode(mode);
        self.current = mode;
        if accepted {
            debug!("pipeline now {mode:?}");
        } else {
            debug!("pipeline switch to {mode:?} not acknowledged");
        }
        accepted
    }
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new()
    }
}

/// Answers the robot's two targeting questions over one sensor connection:
/// where the alliance goal marker is, and which collection sequence the
/// sequence marker encodes.
///
/// Generic over the transport so scenario tests can script frames; robot code
/// uses `TargetResolver<TransportAdapter>`. One resolver owns one transport
/// and one mode controller and is driven from one logical thread; the
/// calibration is read-only and freely shared between resolvers.
pub struct TargetResolver<T: SensorTransport> {
    transport: T,
    modes: ModeController,
    calibration: SensorCalibration,
}

impl<T: SensorTransport> TargetResolver<T> {
    /// Build a resolver and align the sensor with the controller's initial
    /// mode. Whatever pipeline the sensor was left running, it is asked for
    /// alliance markers now.
    pub fn new(mut transport: T, calibration: SensorCalibration) -> Self {
        let modes = ModeController::new();
        transport.switch_mode(modes.current());
        Self {
            transport,
            modes,
            calibration,
        }
    }

    /// Find this alliance's goal marker.
    ///
    /// Switches to the alliance-marker pipeline, fetches one frame and scans
    /// it in reported order for the alliance's fixed id. First match wins; a
    /// malformed frame carrying duplicate ids keeps its head entry. An
    /// invalid frame (sensor unreachable or simply nothing in view) yields
    /// the no-target descriptor.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self)))]
    pub fn alliance_target(&mut self, alliance: Alliance) -> TargetDescriptor {
        self.modes
            .switch_to(Mode::AllianceMarkers, &mut self.transport);
        let frame = self.transport.fetch_frame();
        if !frame.valid {
            return TargetDescriptor::none();
        }

        let wanted = alliance.marker_id();
        match frame.markers.iter().find(|m| m.id == wanted) {
            Some(marker) => {
                debug!(
                    "marker {wanted} at tx {:.2} ty {:.2}",
                    marker.angle_x, marker.angle_y
                );
                TargetDescriptor::marker(marker, &self.calibration)
            }
            None => TargetDescriptor::none(),
        }
    }

    /// Read the posted collection sequence.
    ///
    /// Switches to the sequence-marker pipeline and decodes the first visible
    /// marker whose id falls in the sequence range. Empty when the frame is
    /// invalid or no sequence marker is in view.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self)))]
    pub fn read_sequence_marker(&mut self) -> Vec<GamePieceColor> {
        self.modes
            .switch_to(Mode::SequenceMarkers, &mut self.transport);
        let frame = self.transport.fetch_frame();
        if !frame.valid {
            return Vec::new();
        }

        let decoded = frame
            .markers
            .iter()
            .find_map(|m| sequence_for_marker(m.id).map(|sequence| (m.id, sequence)));
        match decoded {
            Some((id, sequence)) => {
                info!("sequence marker {id}: {sequence:?}");
                sequence.to_vec()
            }
            None => Vec::new(),
        }
    }

    /// Whether the sensor currently sees anything at all, in whatever mode it
    /// is running. Cheap liveness check; does not touch the mode.
    pub fn has_target(&mut self) -> bool {
        self.transport.fetch_frame().valid
    }

    /// Mode most recently requested.
    pub fn current_mode(&self) -> Mode {
        self.modes.current()
    }

    /// Explicit mode switch, for callers that drive pipelines directly.
    pub fn switch_to(&mut self, mode: Mode) -> bool {
        self.modes.switch_to(mode, &mut self.transport)
    }

    /// Switch to the detection pipeline for one game-piece color.
    pub fn switch_to_color(&mut self, color: GamePieceColor) -> bool {
        self.switch_to(Mode::for_color(color))
    }

    /// Latest raw frame, unfiltered. The harness uses this for telemetry and
    /// for confirming pipeline switches via `reported_mode`.
    pub fn fetch_frame(&mut self) -> DetectionFrame {
        self.transport.fetch_frame()
    }

    /// Mount geometry this resolver computes against.
    pub fn calibration(&self) -> &SensorCalibration {
        &self.calibration
    }

    /// Which backend the transport is on, for transports that expose it.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Release the sensor.
    pub fn stop(&mut self) {
        self.transport.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagsight_core::{MarkerDetection, TargetKind};

    /// Transport double that replays one frame and records switch requests.
    struct ScriptedTransport {
        frame: DetectionFrame,
        switch_calls: Vec<Mode>,
    }

    impl ScriptedTransport {
        fn valid_with(markers: Vec<MarkerDetection>) -> Self {
            Self {
                frame: DetectionFrame {
                    valid: true,
                    markers,
                    blobs: Vec::new(),
                    reported_mode: 2,
                },
                switch_calls: Vec::new(),
            }
        }

        fn invalid() -> Self {
            Self {
                frame: DetectionFrame::invalid(),
                switch_calls: Vec::new(),
            }
        }
    }

    impl SensorTransport for ScriptedTransport {
        fn fetch_frame(&mut self) -> DetectionFrame {
            self.frame.clone()
        }
        fn switch_mode(&mut self, mode: Mode) -> bool {
            self.switch_calls.push(mode);
            true
        }
        fn probe(&mut self) -> bool {
            true
        }
        fn stop(&mut self) {}
    }

    fn marker(id: i32, angle_x: f64, angle_y: f64, area: f64) -> MarkerDetection {
        MarkerDetection {
            id,
            angle_x,
            angle_y,
            area,
        }
    }

    #[test]
    fn controller_elides_redundant_switches() {
        let mut transport = ScriptedTransport::invalid();
        let mut modes = ModeController::new();
        assert_eq!(modes.current(), Mode::AllianceMarkers);

        // Repeat of the current mode: zero transport calls.
        assert!(modes.switch_to(Mode::AllianceMarkers, &mut transport));
        assert!(transport.switch_calls.is_empty());

        // Real transition: exactly one call.
        assert!(modes.switch_to(Mode::SequenceMarkers, &mut transport));
        assert_eq!(transport.switch_calls, vec![Mode::SequenceMarkers]);

        // And repeating it adds nothing.
        assert!(modes.switch_to(Mode::SequenceMarkers, &mut transport));
        assert_eq!(transport.switch_calls.len(), 1);
        assert_eq!(modes.current(), Mode::SequenceMarkers);
    }

    #[test]
    fn every_mode_is_reachable_from_every_other() {
        const ALL: [Mode; 4] = [
            Mode::ColorPurple,
            Mode::ColorGreen,
            Mode::AllianceMarkers,
            Mode::SequenceMarkers,
        ];
        for from in ALL {
            for to in ALL {
                let mut transport = ScriptedTransport::invalid();
                let mut modes = ModeController::new();
                modes.switch_to(from, &mut transport);
                transport.switch_calls.clear();
                modes.switch_to(to, &mut transport);
                assert_eq!(modes.current(), to);
                let expected = usize::from(from != to);
                assert_eq!(transport.switch_calls.len(), expected, "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn construction_aligns_the_sensor_to_alliance_markers() {
        let transport = ScriptedTransport::invalid();
        let resolver = TargetResolver::new(transport, SensorCalibration::default());
        assert_eq!(resolver.current_mode(), Mode::AllianceMarkers);
        assert_eq!(
            resolver.transport().switch_calls,
            vec![Mode::AllianceMarkers]
        );
    }

    #[test]
    fn alliance_query_reuses_the_aligned_mode() {
        let transport = ScriptedTransport::valid_with(vec![marker(20, 5.0, -3.0, 1.2)]);
        let mut resolver = TargetResolver::new(transport, SensorCalibration::default());
        resolver.alliance_target(Alliance::Blue);
        // Construction issued the only switch; the query itself was a no-op.
        assert_eq!(
            resolver.transport().switch_calls,
            vec![Mode::AllianceMarkers]
        );
    }

    #[test]
    fn blue_alliance_finds_marker_20() {
        let transport = ScriptedTransport::valid_with(vec![marker(20, 5.0, -3.0, 1.2)]);
        let mut resolver = TargetResolver::new(transport, SensorCalibration::default());

        let target = resolver.alliance_target(Alliance::Blue);
        assert!(target.found);
        assert_eq!(target.kind, TargetKind::Marker);
        assert_eq!(target.marker_id, 20);
        assert_eq!(target.heading, 5.0_f64.to_radians());
        assert_eq!(target.angle_y, -3.0);
    }

    #[test]
    fn red_alliance_ignores_the_blue_marker() {
        let transport = ScriptedTransport::valid_with(vec![marker(20, 5.0, -3.0, 1.2)]);
        let mut resolver = TargetResolver::new(transport, SensorCalibration::default());

        let target = resolver.alliance_target(Alliance::Red);
        assert!(!target.found);
        assert_eq!(target.kind, TargetKind::None);
        assert_eq!(target.marker_id, -1);
    }

    #[test]
    fn invalid_frame_yields_no_target_for_either_alliance() {
        for alliance in [Alliance::Blue, Alliance::Red] {
            let transport = ScriptedTransport::invalid();
            let mut resolver = TargetResolver::new(transport, SensorCalibration::default());
            let target = resolver.alliance_target(alliance);
            assert!(!target.found);
            assert_eq!(target.kind, TargetKind::None);
            assert_eq!(target.marker_id, -1);
            assert_eq!(target.distance, 0.0);
        }
    }

    #[test]
    fn duplicate_ids_keep_the_first_entry() {
        let transport = ScriptedTransport::valid_with(vec![
            marker(24, 1.0, 1.0, 0.5),
            marker(24, -9.0, 4.0, 2.0),
        ]);
        let mut resolver = TargetResolver::new(transport, SensorCalibration::default());

        let target = resolver.alliance_target(Alliance::Red);
        assert!(target.found);
        assert_eq!(target.angle_x, 1.0);
    }

    #[test]
    fn unrelated_markers_are_skipped_not_matched() {
        let transport = ScriptedTransport::valid_with(vec![
            marker(21, 0.0, 0.0, 1.0),
            marker(24, 2.5, -1.0, 0.7),
        ]);
        let mut resolver = TargetResolver::new(transport, SensorCalibration::default());

        let target = resolver.alliance_target(Alliance::Red);
        assert!(target.found);
        assert_eq!(target.marker_id, 24);
    }

    #[test]
    fn sequence_marker_22_decodes_in_order() {
        let transport = ScriptedTransport::valid_with(vec![marker(22, 0.0, 0.0, 1.0)]);
        let mut resolver = TargetResolver::new(transport, SensorCalibration::default());

        let sequence = resolver.read_sequence_marker();
        assert_eq!(
            sequence,
            vec![
                GamePieceColor::Purple,
                GamePieceColor::Green,
                GamePieceColor::Purple
            ]
        );
        assert_eq!(resolver.current_mode(), Mode::SequenceMarkers);
    }

    #[test]
    fn out_of_range_markers_decode_to_nothing() {
        let transport = ScriptedTransport::valid_with(vec![
            marker(20, 0.0, 0.0, 1.0),
            marker(24, 1.0, 1.0, 1.0),
        ]);
        let mut resolver = TargetResolver::new(transport, SensorCalibration::default());
        assert!(resolver.read_sequence_marker().is_empty());
    }

    #[test]
    fn invalid_frame_decodes_to_nothing() {
        let transport = ScriptedTransport::invalid();
        let mut resolver = TargetResolver::new(transport, SensorCalibration::default());
        assert!(resolver.read_sequence_marker().is_empty());
    }

    #[test]
    fn has_target_reports_frame_validity_only() {
        let transport = ScriptedTransport::valid_with(Vec::new());
        let mut resolver = TargetResolver::new(transport, SensorCalibration::default());
        assert!(resolver.has_target());

        let transport = ScriptedTransport::invalid();
        let mut resolver = TargetResolver::new(transport, SensorCalibration::default());
        assert!(!resolver.has_target());
    }

    #[test]
    fn color_switches_map_through_the_mode_table() {
        let transport = ScriptedTransport::invalid();
        let mut resolver = TargetResolver::new(transport, SensorCalibration::default());

        assert!(resolver.switch_to_color(GamePieceColor::Green));
        assert_eq!(resolver.current_mode(), Mode::ColorGreen);
        assert!(resolver.switch_to_color(GamePieceColor::Purple));
        assert_eq!(resolver.current_mode(), Mode::ColorPurple);
        assert_eq!(
            resolver.transport().switch_calls,
            vec![Mode::AllianceMarkers, Mode::ColorGreen, Mode::ColorPurple]
        );
    }
}
