//=========================================================================
// Engine Bridge Interface
//=========================================================================
//
// Contract between the coordination layer and the map engine.
//
// The engine is an external collaborator: it owns tile storage, camera
// math, routing and drawing. This layer only creates it from a surface
// descriptor and forwards normalized calls.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::gesture::RouteCostingMode;
use crate::core::surface::SurfaceDescriptor;

//=== MapEngine ===========================================================

/// Operations consumed from a live map engine instance.
///
/// Calls are expected to be cheap, non-blocking and individually atomic.
/// Render, gesture and location calls may interleave in any order from
/// different threads; the engine resolves them last-writer-wins.
pub trait MapEngine: Send + Sync {
    /// Surface dimensions changed (physical pixels).
    fn resize(&self, width: u32, height: u32);

    /// Draws one frame.
    fn render(&self) -> Result<(), EngineError>;

    /// Pans the camera by a screen-space delta.
    fn pan_delta(&self, dx: f32, dy: f32);

    /// Zooms the camera by `delta` about a screen-space focal point.
    fn zoom_delta(&self, delta: f32, focus_x: f32, focus_y: f32);

    /// Tilts the camera by `delta` degrees.
    fn pitch_delta(&self, delta: f32);

    /// Moves the position puck. `bearing` is `None` when unknown.
    fn set_lat_lon_bearing(&self, lat: f64, lon: f64, bearing: Option<f32>);

    /// Requests a route to the screen point using the given profile.
    fn calculate_route(&self, x: f32, y: f32, costing: RouteCostingMode);

    /// Enables or disables camera follow mode.
    fn set_cam_follow_mode(&self, enabled: bool);

    /// Signals that the user is (or stopped) touching the map.
    fn temp_external_input(&self, pressed: bool);
}

//=== EngineFactory =======================================================

/// Creates an engine bound to a freshly available surface.
///
/// Creation is fatal on failure: there is no partial state to recover
/// and the caller must wait for the next surface-available event.
pub trait EngineFactory {
    fn create(&self, descriptor: SurfaceDescriptor) -> Result<Box<dyn MapEngine>, EngineError>;
}

impl<F> EngineFactory for F
where
    F: Fn(SurfaceDescriptor) -> Result<Box<dyn MapEngine>, EngineError>,
{
    fn create(&self, descriptor: SurfaceDescriptor) -> Result<Box<dyn MapEngine>, EngineError> {
        self(descriptor)
    }
}

//=== EngineError =========================================================

/// Errors reported by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// No GPU adapter/device could be allocated for the surface.
    RendererUnavailable(String),

    /// The drawable handle is of a kind the engine cannot render into.
    UnsupportedSurface(String),

    /// Tile storage could not be opened.
    Storage { path: String, reason: String },

    /// A single frame failed (lost swapchain image, timeout...).
    Frame(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RendererUnavailable(e) => write!(f, "Renderer unavailable: {}", e),
            Self::UnsupportedSurface(e) => write!(f, "Unsupported surface: {}", e),
            Self::Storage { path, reason } => {
                write!(f, "Tile storage '{}' unavailable: {}", path, reason)
            }
            Self::Frame(e) => write!(f, "Frame failed: {}", e),
        }
    }
}

impl std::error::Error for EngineError {}

//=========================================================================
// Unit Tests
//=========================================================================
