//=========================================================================
// Core Coordination Systems
//
// Platform-neutral coordination between a host surface and the map
// engine. Every subsystem reaches the engine only through the shared
// `EngineSlot`; none of them depends on another.
//
// Subsystems:
// - `engine_bridge`: engine contract and the {Absent, Live} handle slot
// - `surface`: surface descriptor and engine creation/teardown
// - `gesture`: pointer recognition and camera-control mapping
// - `location`: location subscription and fix forwarding
// - `render_loop`: continuous redraw scheduling
//
// Notes:
// Ordering between subsystems (start, stop, teardown) is decided by the
// `MapView` facade, not here.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod engine_bridge;
pub mod gesture;
pub mod location;
pub mod render_loop;
pub mod surface;

#[cfg(test)]
pub(crate) mod testing;
