//=========================================================================
// Test Doubles
//=========================================================================
//
// Recording engine, factory and location source shared by unit tests.
//
//=========================================================================

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle, WebDisplayHandle, WebWindowHandle};

use crate::core::engine_bridge::{EngineError, EngineFactory, MapEngine};
use crate::core::gesture::RouteCostingMode;
use crate::core::location::{LocationError, LocationFix, LocationSource, SubscriptionId, UpdateRequest};
use crate::core::surface::SurfaceDescriptor;

//=== EngineCall ==========================================================

/// One observed call into a recording engine.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EngineCall {
    Created { width: u32, height: u32 },
    Resize(u32, u32),
    Render,
    Pan(f32, f32),
    Zoom(f32, f32, f32),
    Pitch(f32),
    LatLonBearing(f64, f64, Option<f32>),
    Route(f32, f32, RouteCostingMode),
    FollowMode(bool),
    ExternalInput(bool),
    Dropped,
}

//=== CallLog =============================================================

/// Shared, ordered record of engine calls.
#[derive(Debug, Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<EngineCall>>>);

impl CallLog {
    pub(crate) fn push(&self, call: EngineCall) {
        self.0.lock().unwrap().push(call);
    }

    pub(crate) fn calls(&self) -> Vec<EngineCall> {
        self.0.lock().unwrap().clone()
    }

    pub(crate) fn last(&self) -> Option<EngineCall> {
        self.0.lock().unwrap().last().cloned()
    }

    pub(crate) fn count(&self, matches: impl Fn(&EngineCall) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    pub(crate) fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

//=== RecordingEngine =====================================================

/// Engine double that records every call, including its own drop.
pub(crate) struct RecordingEngine {
    log: CallLog,
    fail_render: bool,
    position_gate: Option<PositionGate>,
}

/// Holds `set_lat_lon_bearing` until the test releases it.
struct PositionGate {
    entered: Sender<()>,
    release: Receiver<()>,
}

/// Test side of a gated engine.
pub(crate) struct GateControl {
    pub(crate) entered: Receiver<()>,
    pub(crate) release: Sender<()>,
}

impl RecordingEngine {
    pub(crate) fn new() -> (Self, CallLog) {
        Self::with_log(CallLog::default())
    }

    pub(crate) fn with_log(log: CallLog) -> (Self, CallLog) {
        (
            Self {
                log: log.clone(),
                fail_render: false,
                position_gate: None,
            },
            log,
        )
    }

    /// Engine whose every frame fails (still recorded).
    pub(crate) fn failing_render() -> (Self, CallLog) {
        let (mut engine, log) = Self::new();
        engine.fail_render = true;
        (engine, log)
    }

    /// Engine whose position calls block until released, one per release.
    pub(crate) fn gated_positions() -> (Self, CallLog, GateControl) {
        let (mut engine, log) = Self::new();
        let (entered_tx, entered_rx) = bounded(1);
        let (release_tx, release_rx) = bounded(1);
        engine.position_gate = Some(PositionGate {
            entered: entered_tx,
            release: release_rx,
        });
        let control = GateControl {
            entered: entered_rx,
            release: release_tx,
        };
        (engine, log, control)
    }
}

impl MapEngine for RecordingEngine {
    fn resize(&self, width: u32, height: u32) {
        self.log.push(EngineCall::Resize(width, height));
    }

    fn render(&self) -> Result<(), EngineError> {
        self.log.push(EngineCall::Render);
        if self.fail_render {
            Err(EngineError::Frame("surface timeout".into()))
        } else {
            Ok(())
        }
    }

    fn pan_delta(&self, dx: f32, dy: f32) {
        self.log.push(EngineCall::Pan(dx, dy));
    }

    fn zoom_delta(&self, delta: f32, focus_x: f32, focus_y: f32) {
        self.log.push(EngineCall::Zoom(delta, focus_x, focus_y));
    }

    fn pitch_delta(&self, delta: f32) {
        self.log.push(EngineCall::Pitch(delta));
    }

    fn set_lat_lon_bearing(&self, lat: f64, lon: f64, bearing: Option<f32>) {
        if let Some(gate) = &self.position_gate {
            let _ = gate.entered.try_send(());
            let _ = gate.release.recv_timeout(Duration::from_secs(2));
        }
        self.log.push(EngineCall::LatLonBearing(lat, lon, bearing));
    }

    fn calculate_route(&self, x: f32, y: f32, costing: RouteCostingMode) {
        self.log.push(EngineCall::Route(x, y, costing));
    }

    fn set_cam_follow_mode(&self, enabled: bool) {
        self.log.push(EngineCall::FollowMode(enabled));
    }

    fn temp_external_input(&self, pressed: bool) {
        self.log.push(EngineCall::ExternalInput(pressed));
    }
}

impl Drop for RecordingEngine {
    fn drop(&mut self) {
        self.log.push(EngineCall::Dropped);
    }
}

//=== RecordingFactory ====================================================

/// Factory producing recording engines that share one call log.
pub(crate) struct RecordingFactory {
    log: CallLog,
}

impl RecordingFactory {
    pub(crate) fn new() -> (Self, CallLog) {
        let log = CallLog::default();
        (Self { log: log.clone() }, log)
    }
}

impl EngineFactory for RecordingFactory {
    fn create(&self, descriptor: SurfaceDescriptor) -> Result<Box<dyn MapEngine>, EngineError> {
        let (width, height) = descriptor.size();
        self.log.push(EngineCall::Created { width, height });
        Ok(Box::new(RecordingEngine::with_log(self.log.clone()).0))
    }
}

//=== Descriptors =========================================================

pub(crate) fn test_descriptor(width: u32, height: u32) -> SurfaceDescriptor {
    SurfaceDescriptor::builder(
        RawWindowHandle::Web(WebWindowHandle::new(1)),
        RawDisplayHandle::Web(WebDisplayHandle::new()),
    )
    .size(width, height)
    .build()
    .unwrap()
}

//=== ManualLocationSource ================================================

#[derive(Default)]
struct ManualSourceState {
    sinks: Vec<(SubscriptionId, Sender<LocationFix>)>,
    next_id: u64,
    last_known: Option<LocationFix>,
    removed: Vec<SubscriptionId>,
    reject: Option<LocationError>,
}

/// Location source driven by the test: `emit` pushes a fix to every
/// active subscriber.
#[derive(Clone, Default)]
pub(crate) struct ManualLocationSource {
    state: Arc<Mutex<ManualSourceState>>,
}

impl ManualLocationSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_last_known(&self, fix: Option<LocationFix>) {
        self.state.lock().unwrap().last_known = fix;
    }

    pub(crate) fn reject_with(&self, error: LocationError) {
        self.state.lock().unwrap().reject = Some(error);
    }

    /// Delivers a fix to active subscribers; returns how many took it.
    pub(crate) fn emit(&self, fix: LocationFix) -> usize {
        let state = self.state.lock().unwrap();
        state
            .sinks
            .iter()
            .filter(|(_, sink)| sink.send(fix.clone()).is_ok())
            .count()
    }

    pub(crate) fn active_subscriptions(&self) -> usize {
        self.state.lock().unwrap().sinks.len()
    }

    pub(crate) fn removed(&self) -> Vec<SubscriptionId> {
        self.state.lock().unwrap().removed.clone()
    }

    /// Drops every sink without a `remove_updates` call, as a provider
    /// that shuts down on its own would.
    pub(crate) fn close_sinks(&self) {
        self.state.lock().unwrap().sinks.clear();
    }

    /// Takes a sink out without removing it from the source's view of
    /// the world, to simulate delivery racing with `remove_updates`.
    pub(crate) fn leak_sink(&self) -> Option<Sender<LocationFix>> {
        self.state.lock().unwrap().sinks.first().map(|(_, s)| s.clone())
    }
}

impl LocationSource for ManualLocationSource {
    fn request_updates(
        &self,
        _request: &UpdateRequest,
        sink: Sender<LocationFix>,
    ) -> Result<SubscriptionId, LocationError> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.reject.clone() {
            return Err(error);
        }
        state.next_id += 1;
        let id = SubscriptionId::new(state.next_id);
        state.sinks.push((id, sink));
        Ok(id)
    }

    fn remove_updates(&self, subscription: SubscriptionId) {
        let mut state = self.state.lock().unwrap();
        state.sinks.retain(|(id, _)| *id != subscription);
        state.removed.push(subscription);
    }

    fn last_known_location(&self) -> Option<LocationFix> {
        self.state.lock().unwrap().last_known.clone()
    }
}
