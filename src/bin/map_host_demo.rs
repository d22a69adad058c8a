//=========================================================================
// MapView Host Demo
//
// Opens a desktop window driven by a stand-in engine that logs every
// call, fed by a simulated location source circling a fixed point.
//
// Run with `RUST_LOG=debug` to see gestures and fixes reach the engine.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, select, Sender};
use log::{debug, error, info};

//=== Internal Dependencies ===============================================

use mapview_host::prelude::*;

//=== LoggingEngine =======================================================

struct LoggingEngine {
    frames: AtomicU64,
}

impl LoggingEngine {
    fn create(descriptor: SurfaceDescriptor) -> Result<Box<dyn MapEngine>, EngineError> {
        let (width, height) = descriptor.size();
        info!(
            target: "engine",
            "Engine created for {}x{} surface (tiles: {})",
            width,
            height,
            descriptor.tiles_db().display()
        );
        Ok(Box::new(LoggingEngine {
            frames: AtomicU64::new(0),
        }))
    }
}

impl MapEngine for LoggingEngine {
    fn resize(&self, width: u32, height: u32) {
        info!(target: "engine", "resize {}x{}", width, height);
    }

    fn render(&self) -> Result<(), EngineError> {
        let frame = self.frames.fetch_add(1, Ordering::Relaxed) + 1;
        if frame % 600 == 0 {
            info!(target: "engine", "{} frames rendered", frame);
        }
        Ok(())
    }

    fn pan_delta(&self, dx: f32, dy: f32) {
        debug!(target: "engine", "pan ({:.2}, {:.2})", dx, dy);
    }

    fn zoom_delta(&self, delta: f32, focus_x: f32, focus_y: f32) {
        debug!(target: "engine", "zoom {:.2} at ({}, {})", delta, focus_x, focus_y);
    }

    fn pitch_delta(&self, delta: f32) {
        debug!(target: "engine", "pitch {:.2}", delta);
    }

    fn set_lat_lon_bearing(&self, lat: f64, lon: f64, bearing: Option<f32>) {
        debug!(target: "engine", "position {:.6}, {:.6} bearing {:?}", lat, lon, bearing);
    }

    fn calculate_route(&self, x: f32, y: f32, costing: RouteCostingMode) {
        info!(target: "engine", "route to ({}, {}) by {}", x, y, costing);
    }

    fn set_cam_follow_mode(&self, enabled: bool) {
        info!(target: "engine", "follow mode {}", enabled);
    }

    fn temp_external_input(&self, pressed: bool) {
        debug!(target: "engine", "external input {}", pressed);
    }
}

impl Drop for LoggingEngine {
    fn drop(&mut self) {
        info!(target: "engine", "Engine released");
    }
}

//=== SimulatedLocation ===================================================

const CENTER: (f64, f64) = (35.724_816_4, 139.776_929_8);
const RADIUS_DEG: f64 = 0.002;
const DEGREES_PER_FIX: f64 = 6.0;

/// Walks a circle around `CENTER`, one fix per requested interval.
struct SimulatedLocation {
    walkers: Mutex<HashMap<SubscriptionId, Sender<()>>>,
    next_id: AtomicU64,
}

impl SimulatedLocation {
    fn new() -> Self {
        Self {
            walkers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn fix_at(angle_deg: f64) -> LocationFix {
        let angle = angle_deg.to_radians();
        let heading = (angle_deg + 90.0).rem_euclid(360.0) as f32;
        LocationFix::new(
            CENTER.0 + RADIUS_DEG * angle.sin(),
            CENTER.1 + RADIUS_DEG * angle.cos(),
        )
        .with_bearing(heading)
        .with_bearing_accuracy(5.0)
    }
}

impl LocationSource for SimulatedLocation {
    fn request_updates(
        &self,
        request: &UpdateRequest,
        sink: Sender<LocationFix>,
    ) -> Result<SubscriptionId, LocationError> {
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let interval = request.min_interval.max(Duration::from_millis(100));

        thread::Builder::new()
            .name("simulated-location".into())
            .spawn(move || {
                let mut angle = 0.0;
                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        default(interval) => {
                            angle += DEGREES_PER_FIX;
                            if sink.send(Self::fix_at(angle)).is_err() {
                                break;
                            }
                        }
                    }
                }
            })
            .map_err(|e| LocationError::ProviderUnavailable(e.to_string()))?;

        self.walkers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, stop_tx);
        Ok(id)
    }

    fn remove_updates(&self, subscription: SubscriptionId) {
        self.walkers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&subscription);
    }

    fn last_known_location(&self) -> Option<LocationFix> {
        Some(Self::fix_at(0.0))
    }
}

//=== Entry Point =========================================================

fn main() {
    init_logging(LoggingConfig::default());

    let view = MapViewBuilder::new(LoggingEngine::create)
        .with_location_source(Arc::new(SimulatedLocation::new()))
        .with_bearing_accuracy_limit(30.0)
        .build();

    info!("N: follow mode  C: costing  Space: external input  Esc: quit");

    if let Err(e) = run_desktop(view, "MapView Host Demo") {
        error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}
