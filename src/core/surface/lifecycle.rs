//=========================================================================
// Surface Lifecycle Manager
//=========================================================================
//
// Owns creation, resize and teardown of the engine bound to a surface.
//
// Lifecycle:
// ```text
//   on_surface_available ──create()──→ slot: Live(handle)
//          │                                  │
//   on_surface_resized ──────────────→ resize (only while Live)
//          │                                  │
//   on_surface_destroyed ──invalidate()──→ slot: Absent
// ```
//
// A surface may be created, destroyed and recreated many times over the
// host view's life. A second `on_surface_available` while a handle is
// live tears the old one down first.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use super::{SurfaceDescriptor, SurfaceError};
use crate::core::engine_bridge::{EngineFactory, EngineSlot, HandleId};

//=== SurfaceLifecycleManager =============================================

/// Binds the engine handle to the drawable surface lifetime.
pub struct SurfaceLifecycleManager<F: EngineFactory> {
    slot: EngineSlot,
    factory: F,
    size: Option<(u32, u32)>,
}

impl<F: EngineFactory> SurfaceLifecycleManager<F> {
    //--- Construction -----------------------------------------------------

    pub fn new(slot: EngineSlot, factory: F) -> Self {
        Self {
            slot,
            factory,
            size: None,
        }
    }

    //--- Surface Callbacks ------------------------------------------------

    /// Creates the engine for a newly available surface.
    ///
    /// Tears down a still-live handle first. On failure the slot stays
    /// absent; there is no retry.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Initialization`] if the engine cannot
    /// allocate a renderer for the surface.
    pub fn on_surface_available(
        &mut self,
        descriptor: SurfaceDescriptor,
    ) -> Result<HandleId, SurfaceError> {
        if let Some(stale) = self.slot.invalidate() {
            warn!(
                target: "surface",
                "Surface available while {} still live, tearing it down",
                stale.id()
            );
            drop(stale);
            self.size = None;
        }

        let (width, height) = descriptor.size();
        info!(
            target: "surface",
            "Surface available: {}x{} @ {}x (software: {}, tiles: {})",
            width,
            height,
            descriptor.scale_factor(),
            descriptor.is_software_renderer(),
            descriptor.tiles_db().display()
        );

        let engine = self.factory.create(descriptor).map_err(|e| {
            error!(target: "surface", "Engine creation failed: {}", e);
            SurfaceError::Initialization(e)
        })?;

        let (id, displaced) = self.slot.install(engine);
        if let Some(displaced) = displaced {
            // Another owner installed concurrently; ours wins.
            warn!(target: "surface", "Displaced {} during creation", displaced.id());
        }

        self.size = Some((width, height));
        info!(target: "surface", "Engine ready: {}", id);
        Ok(id)
    }

    /// Forwards a resize to the live engine.
    ///
    /// Resizes arriving before creation completes are dropped, not
    /// queued: the surface is redrawn at its final size once ready.
    /// Returns `true` if the engine received the resize.
    pub fn on_surface_resized(&mut self, width: u32, height: u32) -> bool {
        let forwarded = self
            .slot
            .with_live(|handle| handle.engine().resize(width, height))
            .is_some();

        if forwarded {
            debug!(target: "surface", "Resized to {}x{}", width, height);
            self.size = Some((width, height));
        } else {
            debug!(
                target: "surface",
                "Resize to {}x{} dropped, engine not ready",
                width,
                height
            );
        }

        forwarded
    }

    /// Invalidates the handle after the surface is gone.
    ///
    /// Returns the id of the handle that was torn down, `None` if there
    /// was none. The engine instance is dropped here.
    pub fn on_surface_destroyed(&mut self) -> Option<HandleId> {
        let handle = self.slot.invalidate()?;
        let id = handle.id();
        drop(handle);

        self.size = None;
        info!(target: "surface", "Surface destroyed, {} released", id);
        Some(id)
    }

    //--- Queries ----------------------------------------------------------

    pub fn handle_id(&self) -> Option<HandleId> {
        self.slot.live_id()
    }

    pub fn is_live(&self) -> bool {
        self.slot.is_live()
    }

    /// Last size the engine knows about, `None` while absent.
    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.size
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
