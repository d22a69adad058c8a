//=========================================================================
// MapView Host — Library Root
//
// Coordination layer between a platform drawing surface and an opaque
// map engine.
//
// Responsibilities:
// - Create, resize and release the engine with the native surface
// - Translate pointer and gesture input into camera controls
// - Feed device location into the engine while visible
// - Drive continuous redraw without outliving the surface
//
// Typical usage:
// ```no_run
// use mapview_host::prelude::*;
//
// # fn create(_: SurfaceDescriptor) -> Result<Box<dyn MapEngine>, EngineError> { unimplemented!() }
// fn main() -> Result<(), PlatformError> {
//     init_logging(LoggingConfig::default());
//     let view = MapViewBuilder::new(create).build();
//     run_desktop(view, "Map")
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the platform-neutral subsystems. It is public so hosts
// with their own windowing can drive them directly.
//
pub mod core;

// `platform` holds the Winit desktop host and the callback-driven
// embedded host.
pub mod platform;

pub mod logging;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------

mod map_view;

//--- Public Exports ------------------------------------------------------

pub use map_view::{MapView, MapViewBuilder};
