//=========================================================================
// Platform Subsystem
//
// Host adapters binding a `MapView` to a concrete windowing environment.
//
// Architecture:
// ```text
//  DesktopHost (Winit, main thread)     EmbeddedHost (FFI callbacks)
//  ┌──────────────────────────────┐     ┌──────────────────────────────┐
//  │ resumed / Resized            │     │ surface_created / _changed   │
//  │   ↓ create()                 │     │   ↓ create()                 │
//  │ RedrawRequested              │     │ draw callback                │
//  │   ↓ render() → request_redraw│     │   ↓ render() → reschedule?   │
//  │ Mouse/Touch/Pinch            │     │ Touch / native gestures      │
//  │   ↓ PointerMapper            │     │   ↓                          │
//  │ GestureRecognizer            │     │ GestureRecognizer            │
//  │   ↓                          │     │   ↓                          │
//  │ CloseRequested → teardown()  │     │ surface_destroyed → teardown │
//  └──────────────┬───────────────┘     └──────────────┬───────────────┘
//                 └──────────────→ MapView ←───────────┘
// ```
//
// Key Design Decisions:
// - **Deferred creation**: the engine is created only once the surface
//   has a non-zero size
// - **Host-paced frames**: in host-driven mode `render()` reports
//   whether another frame should be scheduled
// - **Window outlives engine**: teardown always runs before the native
//   surface is released
//
//=========================================================================

//=== Submodules ==========================================================

mod desktop;
mod embedded;
mod event_mapper;

//=== Public API ==========================================================

pub use desktop::{run_desktop, DesktopHost};
pub use embedded::EmbeddedHost;

//=== Internal Imports ====================================================

use crate::core::engine_bridge::{EngineFactory, HandleId};
use crate::core::render_loop::FrameSchedule;
use crate::core::surface::SurfaceError;
use crate::map_view::MapView;

//=== SurfaceHost =========================================================

/// Capability set every host variant provides around its surface.
pub trait SurfaceHost {
    /// Creates the engine for the current native surface.
    ///
    /// Returns `Ok(None)` when creation is deferred because no surface
    /// exists yet or it has no size.
    fn create(&mut self) -> Result<Option<HandleId>, SurfaceError>;

    /// Forwards a size change; `false` if no engine received it.
    fn resize(&mut self, width: u32, height: u32) -> bool;

    /// Draws one frame; `true` if the host should schedule another.
    fn render(&mut self) -> bool;

    /// Releases the engine before the native surface goes away.
    fn teardown(&mut self) -> Option<HandleId>;
}

/// True while the view expects the host to keep delivering frames.
pub(crate) fn wants_host_frames<F: EngineFactory>(view: &MapView<F>) -> bool {
    view.is_rendering() && matches!(view.frame_schedule(), FrameSchedule::HostDriven(_))
}

//=== PlatformError =======================================================

/// Desktop event loop errors.
///
/// These are fatal: without an event loop there is no window to draw in.
#[derive(Debug)]
pub enum PlatformError {
    /// Failed to create event loop (rare, indicates OS-level issue).
    EventLoopCreation(winit::error::EventLoopError),

    /// Event loop execution error.
    EventLoopExecution(winit::error::EventLoopError),
}

//--- Trait Implementations -----------------------------------------------

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventLoopCreation(e) => write!(f, "Event loop creation failed: {}", e),
            Self::EventLoopExecution(e) => write!(f, "Event loop error: {}", e),
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EventLoopCreation(e) | Self::EventLoopExecution(e) => Some(e),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{test_descriptor, RecordingFactory};
    use crate::map_view::MapViewBuilder;
    use std::time::Duration;

    #[test]
    fn platform_error_is_error_trait() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<PlatformError>();
    }

    #[test]
    fn host_frames_wanted_only_while_host_driven_and_live() {
        let (factory, _) = RecordingFactory::new();
        let mut view = MapViewBuilder::new(factory).build();
        assert!(!wants_host_frames(&view));

        view.on_surface_available(test_descriptor(100, 100)).unwrap();
        assert!(wants_host_frames(&view));

        view.on_surface_destroyed();
        assert!(!wants_host_frames(&view));
    }

    #[test]
    fn dedicated_schedule_needs_no_host_frames() {
        let (factory, _) = RecordingFactory::new();
        let mut view = MapViewBuilder::new(factory)
            .with_frame_schedule(FrameSchedule::Dedicated {
                min_frame_interval: Duration::from_millis(5),
            })
            .build();

        view.on_surface_available(test_descriptor(100, 100)).unwrap();
        assert!(!wants_host_frames(&view));
    }
}
