//=========================================================================
// MapView
//
// Facade composing surface lifecycle, gesture translation, location feed
// and render loop around one engine slot.
//
// Architecture:
// ```text
//     MapViewBuilder  ──build()──>  MapView
//         │                           │
//         ├─ with_frame_schedule()    ├─ on_surface_available/resized/destroyed
//         ├─ with_location_source()   ├─ on_visible / on_hidden
//         ├─ with_location_request()  ├─ on_gesture / on_frame
//         ├─ with_replay_delay()      └─ follow mode, external input, costing
//         ├─ with_bearing_accuracy_limit()
//         └─ with_costing_mode()
// ```
//
// Teardown order: render loop halted → location stopped → handle
// invalidated. The location feed runs only while the view is visible
// and a surface is live.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use crate::core::engine_bridge::{EngineFactory, EngineSlot, HandleId};
use crate::core::gesture::{CameraIntent, CostingSelection, GestureEvent, GestureTranslator, RouteCostingMode};
use crate::core::location::{LocationConfig, LocationError, LocationFeedCoordinator, LocationSource, UpdateRequest};
use crate::core::render_loop::{FrameOutcome, FrameSchedule, RenderLoopDriver};
use crate::core::surface::{SurfaceDescriptor, SurfaceError, SurfaceLifecycleManager};

//=== MapViewBuilder ======================================================

/// Builder for configuring and constructing a [`MapView`].
///
/// # Default Values
///
/// - **Frame schedule**: host driven, 30-60 Hz (preferred 60)
/// - **Location source**: none (no location feed)
/// - **Location request**: 1000 ms / 2 m
/// - **Replay delay**: 500 ms
/// - **Bearing accuracy limit**: none
/// - **Costing mode**: vehicle
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use mapview_host::core::engine_bridge::{EngineError, MapEngine};
/// use mapview_host::core::render_loop::FrameSchedule;
/// use mapview_host::core::surface::SurfaceDescriptor;
/// use mapview_host::MapViewBuilder;
///
/// # fn create(_: SurfaceDescriptor) -> Result<Box<dyn MapEngine>, EngineError> { unimplemented!() }
/// let view = MapViewBuilder::new(create)
///     .with_frame_schedule(FrameSchedule::Dedicated {
///         min_frame_interval: Duration::from_millis(16),
///     })
///     .with_replay_delay(Duration::from_millis(250))
///     .build();
/// ```
pub struct MapViewBuilder<F: EngineFactory> {
    factory: F,
    schedule: FrameSchedule,
    location_source: Option<Arc<dyn LocationSource>>,
    location: LocationConfig,
    costing: RouteCostingMode,
}

impl<F: EngineFactory> MapViewBuilder<F> {
    /// Creates a builder around the engine factory, with default settings.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            schedule: FrameSchedule::default(),
            location_source: None,
            location: LocationConfig::default(),
            costing: RouteCostingMode::default(),
        }
    }

    /// Sets who drives frames: a dedicated thread or the host's display
    /// refresh.
    pub fn with_frame_schedule(mut self, schedule: FrameSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Sets the provider of location fixes. Without one, the view never
    /// subscribes.
    pub fn with_location_source(mut self, source: Arc<dyn LocationSource>) -> Self {
        self.location_source = Some(source);
        self
    }

    /// Sets the update cadence requested from the location source.
    ///
    /// # Panics
    ///
    /// Panics if `min_distance_m` is negative or not finite.
    pub fn with_location_request(mut self, request: UpdateRequest) -> Self {
        assert!(
            request.min_distance_m.is_finite() && request.min_distance_m >= 0.0,
            "Minimum distance must be non-negative, got {}",
            request.min_distance_m
        );
        self.location.request = request;
        self
    }

    /// Sets the delay before the last known fix is replayed after the
    /// feed starts.
    pub fn with_replay_delay(mut self, delay: Duration) -> Self {
        self.location.replay_delay = delay;
        self
    }

    /// Drops bearings reported with an error above `degrees`.
    ///
    /// # Panics
    ///
    /// Panics if `degrees <= 0.0`.
    pub fn with_bearing_accuracy_limit(mut self, degrees: f32) -> Self {
        assert!(
            degrees > 0.0,
            "Bearing accuracy limit must be positive, got {}",
            degrees
        );
        self.location.bearing_accuracy_limit = Some(degrees);
        self
    }

    /// Sets the initial route costing mode.
    pub fn with_costing_mode(mut self, mode: RouteCostingMode) -> Self {
        self.costing = mode;
        self
    }

    /// Builds the view. No engine exists until a surface is available.
    pub fn build(self) -> MapView<F> {
        info!(
            "Building map view (schedule: {:?}, location: {}, costing: {})",
            self.schedule,
            if self.location_source.is_some() { "on" } else { "off" },
            self.costing
        );

        let slot = EngineSlot::new();
        let costing = CostingSelection::new(self.costing);
        let location = self
            .location_source
            .map(|source| LocationFeedCoordinator::new(slot.clone(), source, self.location));

        MapView {
            surface: SurfaceLifecycleManager::new(slot.clone(), self.factory),
            translator: GestureTranslator::new(slot.clone(), costing.clone()),
            render_loop: RenderLoopDriver::new(slot.clone(), self.schedule),
            location,
            costing,
            slot,
            follow_mode: false,
            external_input: false,
            visible: false,
        }
    }
}

//=== MapView =============================================================

/// Map view runtime.
///
/// Hosts forward their surface, lifecycle, input and frame callbacks
/// here; every engine call is routed through one shared slot and is
/// dropped while no surface is live.
pub struct MapView<F: EngineFactory> {
    slot: EngineSlot,
    surface: SurfaceLifecycleManager<F>,
    translator: GestureTranslator,
    location: Option<LocationFeedCoordinator>,
    render_loop: RenderLoopDriver,
    costing: CostingSelection,
    follow_mode: bool,
    external_input: bool,
    visible: bool,
}

impl<F: EngineFactory> MapView<F> {
    //--- Surface Callbacks ------------------------------------------------

    /// Creates (or recreates) the engine for a new surface, then starts
    /// the render loop and, when visible, the location feed.
    pub fn on_surface_available(
        &mut self,
        descriptor: SurfaceDescriptor,
    ) -> Result<HandleId, SurfaceError> {
        self.render_loop.halt();
        self.stop_location();

        let id = self.surface.on_surface_available(descriptor)?;

        // A new engine starts from its own defaults; carry the user's
        // follow mode over.
        let follow_mode = self.follow_mode;
        self.slot
            .with_live(|handle| handle.engine().set_cam_follow_mode(follow_mode));

        self.render_loop.begin();
        if self.visible {
            self.start_location();
        }

        Ok(id)
    }

    pub fn on_surface_resized(&mut self, width: u32, height: u32) -> bool {
        self.surface.on_surface_resized(width, height)
    }

    /// Tears the engine down: render loop, then location, then handle.
    pub fn on_surface_destroyed(&mut self) -> Option<HandleId> {
        self.render_loop.halt();
        self.stop_location();
        self.surface.on_surface_destroyed()
    }

    //--- Visibility -------------------------------------------------------

    /// Host became visible/resumed. Starts the location feed if a
    /// surface is live.
    pub fn on_visible(&mut self) -> Result<(), LocationError> {
        self.visible = true;
        if !self.surface.is_live() {
            debug!(target: "location", "Visible without surface, feed deferred");
            return Ok(());
        }
        match self.location.as_mut() {
            Some(feed) => feed.start(),
            None => Ok(()),
        }
    }

    /// Host hidden/paused. Stops the location feed.
    pub fn on_hidden(&mut self) {
        self.visible = false;
        self.stop_location();
    }

    fn start_location(&mut self) {
        if let Some(feed) = self.location.as_mut() {
            if let Err(e) = feed.start() {
                warn!(target: "location", "Location feed not started: {}", e);
            }
        }
    }

    fn stop_location(&mut self) {
        if let Some(feed) = self.location.as_mut() {
            feed.stop();
        }
    }

    //--- Input & Frames ---------------------------------------------------

    pub fn on_gesture(&self, event: &GestureEvent) -> Option<CameraIntent> {
        self.translator.handle(event)
    }

    /// Display-refresh callback for host-driven schedules.
    pub fn on_frame(&mut self) -> FrameOutcome {
        self.render_loop.on_frame()
    }

    //--- Camera Controls --------------------------------------------------

    /// Sets follow mode; remembered and reapplied to future engines.
    pub fn set_cam_follow_mode(&mut self, enabled: bool) {
        self.follow_mode = enabled;
        let delivered = self
            .slot
            .with_live(|handle| handle.engine().set_cam_follow_mode(enabled));
        info!("Camera follow mode {}", if enabled { "on" } else { "off" });
        if delivered.is_none() {
            debug!("Follow mode stored, engine not ready");
        }
    }

    pub fn toggle_cam_follow_mode(&mut self) -> bool {
        let enabled = !self.follow_mode;
        self.set_cam_follow_mode(enabled);
        enabled
    }

    pub fn cam_follow_mode(&self) -> bool {
        self.follow_mode
    }

    /// Flips the "external input active" flag, for hosts exposing it as
    /// a button. Returns the new state.
    pub fn toggle_external_input(&mut self) -> bool {
        self.external_input = !self.external_input;
        let pressed = self.external_input;
        self.slot
            .with_live(|handle| handle.engine().temp_external_input(pressed));
        pressed
    }

    //--- Costing ----------------------------------------------------------

    pub fn costing_mode(&self) -> RouteCostingMode {
        self.costing.get()
    }

    pub fn set_costing_mode(&self, mode: RouteCostingMode) {
        self.costing.set(mode);
        info!("Route costing: {}", mode);
    }

    pub fn toggle_costing_mode(&self) -> RouteCostingMode {
        let mode = self.costing.toggle();
        info!("Route costing: {}", mode);
        mode
    }

    /// Shared costing cell, for UI controls living on another thread.
    pub fn costing_selection(&self) -> CostingSelection {
        self.costing.clone()
    }

    //--- Queries ----------------------------------------------------------

    pub fn handle_id(&self) -> Option<HandleId> {
        self.surface.handle_id()
    }

    pub fn is_live(&self) -> bool {
        self.surface.is_live()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.surface.surface_size()
    }

    pub fn is_rendering(&self) -> bool {
        self.render_loop.is_running()
    }

    pub fn is_location_running(&self) -> bool {
        self.location.as_ref().is_some_and(|feed| feed.is_running())
    }

    pub fn frame_schedule(&self) -> FrameSchedule {
        self.render_loop.schedule()
    }
}

impl<F: EngineFactory> Drop for MapView<F> {
    fn drop(&mut self) {
        self.on_surface_destroyed();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
