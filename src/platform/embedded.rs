//=========================================================================
// Embedded Host
//=========================================================================
//
// Callback-driven host for embedding the map view behind an FFI
// boundary (mobile views, native UI toolkits).
//
// The embedding side forwards its view callbacks one to one:
//
//   surface created / changed / destroyed → surface_*()
//   start / stop (resume / pause)          → on_start() / on_stop()
//   raw touches                            → on_pointer()
//   native recognizer callbacks            → on_gesture()
//   draw callback                          → render(), rescheduling while
//                                            it returns true
//
// Engine creation waits until the surface reports a non-zero size.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info, trace, warn};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

//=== Internal Dependencies ===============================================

use super::{wants_host_frames, SurfaceHost};
use crate::core::engine_bridge::{EngineFactory, HandleId};
use crate::core::gesture::{CameraIntent, GestureEvent, GestureRecognizer, PointerEvent};
use crate::core::location::LocationError;
use crate::core::surface::{is_emulator_fingerprint, tiles_db_path, SurfaceDescriptor, SurfaceError};
use crate::map_view::MapView;

//=== NativeSurface =======================================================

#[derive(Debug, Clone, Copy)]
struct NativeSurface {
    window: RawWindowHandle,
    display: RawDisplayHandle,
    width: u32,
    height: u32,
    scale_factor: f64,
}

//=== EmbeddedHost ========================================================

pub struct EmbeddedHost<F: EngineFactory> {
    view: MapView<F>,
    recognizer: GestureRecognizer,
    surface: Option<NativeSurface>,
    tiles_db: PathBuf,
    software_renderer: bool,
}

impl<F: EngineFactory> EmbeddedHost<F> {
    //--- Construction -----------------------------------------------------

    /// Creates a host storing tiles in `<files_dir>/tiles.db`.
    ///
    /// `build_fingerprint` identifies the device image; emulator images
    /// get a software-renderer surface.
    pub fn new(view: MapView<F>, files_dir: impl AsRef<Path>, build_fingerprint: &str) -> Self {
        let software_renderer = is_emulator_fingerprint(build_fingerprint);
        let tiles_db = tiles_db_path(files_dir);

        info!(
            target: "platform",
            "Embedded host ready (tiles: {}, emulator: {})",
            tiles_db.display(),
            software_renderer
        );

        Self {
            view,
            recognizer: GestureRecognizer::new(),
            surface: None,
            tiles_db,
            software_renderer,
        }
    }

    //--- Surface Callbacks ------------------------------------------------

    /// Native surface became available. Creates the engine right away if
    /// the surface already has a size.
    pub fn surface_created(
        &mut self,
        window: RawWindowHandle,
        display: RawDisplayHandle,
        width: u32,
        height: u32,
        scale_factor: f64,
    ) -> Result<Option<HandleId>, SurfaceError> {
        let scale_factor = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            warn!(target: "platform", "Invalid scale factor {}, using 1.0", scale_factor);
            1.0
        };

        self.surface = Some(NativeSurface {
            window,
            display,
            width,
            height,
            scale_factor,
        });
        self.create()
    }

    /// Surface size changed. Resizes a live engine, or creates it if it
    /// was waiting for a size.
    pub fn surface_changed(&mut self, width: u32, height: u32) -> Result<Option<HandleId>, SurfaceError> {
        let Some(surface) = self.surface.as_mut() else {
            debug!(target: "platform", "Size change without surface ignored");
            return Ok(None);
        };
        if width == 0 || height == 0 {
            trace!(target: "platform", "Ignoring zero-size change");
            return Ok(self.view.handle_id());
        }
        surface.width = width;
        surface.height = height;

        if self.view.is_live() {
            self.resize(width, height);
            return Ok(self.view.handle_id());
        }
        self.create()
    }

    /// Native surface is going away; the engine is released first.
    pub fn surface_destroyed(&mut self) -> Option<HandleId> {
        let released = self.teardown();
        self.surface = None;
        released
    }

    //--- Lifecycle Callbacks ----------------------------------------------

    pub fn on_start(&mut self) -> Result<(), LocationError> {
        self.view.on_visible()
    }

    pub fn on_stop(&mut self) {
        self.view.on_hidden();
    }

    //--- Input Callbacks --------------------------------------------------

    /// Raw touch sample; returns the intents that reached the engine.
    pub fn on_pointer(&mut self, event: PointerEvent, now: Instant) -> Vec<CameraIntent> {
        self.recognizer
            .feed(event, now)
            .iter()
            .filter_map(|gesture| self.view.on_gesture(gesture))
            .collect()
    }

    /// Gesture already recognized by the platform.
    pub fn on_gesture(&self, event: &GestureEvent) -> Option<CameraIntent> {
        self.view.on_gesture(event)
    }

    /// Fires a due long press. Hosts without frames call this from a
    /// timer armed at `long_press_deadline()`.
    pub fn poll_gestures(&mut self, now: Instant) -> Option<CameraIntent> {
        let gesture = self.recognizer.poll(now)?;
        self.view.on_gesture(&gesture)
    }

    pub fn long_press_deadline(&self) -> Option<Instant> {
        self.recognizer.next_deadline()
    }

    //--- Accessors --------------------------------------------------------

    pub fn view(&self) -> &MapView<F> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut MapView<F> {
        &mut self.view
    }

    pub fn tiles_db(&self) -> &Path {
        &self.tiles_db
    }

    pub fn is_software_renderer(&self) -> bool {
        self.software_renderer
    }
}

//=== SurfaceHost =========================================================

impl<F: EngineFactory> SurfaceHost for EmbeddedHost<F> {
    fn create(&mut self) -> Result<Option<HandleId>, SurfaceError> {
        let Some(surface) = self.surface else {
            return Ok(None);
        };

        if surface.width == 0 || surface.height == 0 {
            debug!(target: "platform", "Surface has no size yet, engine creation deferred");
            return Ok(None);
        }

        let descriptor = SurfaceDescriptor::builder(surface.window, surface.display)
            .size(surface.width, surface.height)
            .scale_factor(surface.scale_factor)
            .software_renderer(self.software_renderer)
            .tiles_db(self.tiles_db.clone())
            .build()?;

        self.view.on_surface_available(descriptor).map(Some)
    }

    fn resize(&mut self, width: u32, height: u32) -> bool {
        self.view.on_surface_resized(width, height)
    }

    fn render(&mut self) -> bool {
        self.poll_gestures(Instant::now());
        self.view.on_frame();
        wants_host_frames(&self.view)
    }

    fn teardown(&mut self) -> Option<HandleId> {
        self.view.on_surface_destroyed()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
