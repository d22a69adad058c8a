//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use mapview_host::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Facade
pub use crate::map_view::{MapView, MapViewBuilder};

// Engine contract
pub use crate::core::engine_bridge::{EngineError, EngineFactory, HandleId, MapEngine};

// Surface
pub use crate::core::surface::{SurfaceDescriptor, SurfaceError};

// Input
pub use crate::core::gesture::{CameraIntent, GestureEvent, PointerEvent, RouteCostingMode};

// Location
pub use crate::core::location::{LocationError, LocationFix, LocationSource, SubscriptionId, UpdateRequest};

// Frames
pub use crate::core::render_loop::{FrameOutcome, FrameRateRange, FrameSchedule};

// Hosts
pub use crate::platform::{run_desktop, DesktopHost, EmbeddedHost, PlatformError, SurfaceHost};

// Logging
pub use crate::logging::{init_logging, LoggingConfig};
