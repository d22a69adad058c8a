//=========================================================================
// Gesture Event Types
//
// Three layers of input representation:
//
// ```text
// Platform Layer (winit, embedding host)
//         ↓
//    PointerEvent      raw pointer/wheel/pinch samples
//         ↓  GestureRecognizer
//    GestureEvent      recognizer callbacks (scale, scroll, long press)
//         ↓  GestureTranslator
//    CameraIntent      normalized engine call with final parameters
// ```
//
// Hosts with a native recognizer (mobile gesture detectors) skip the
// first layer and deliver `GestureEvent`s directly.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::RouteCostingMode;

//=== PointerId ===========================================================

/// Identifies one pointer (finger or mouse) for the duration of a press.
pub type PointerId = u64;

/// Pointer id used for the mouse cursor.
pub const MOUSE_POINTER: PointerId = u64::MAX;

//=== PointerEvent ========================================================

/// Raw pointer sample in screen space (physical pixels, top-left origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer touched down / primary button pressed.
    Down { id: PointerId, x: f32, y: f32 },

    /// Pointer moved. Moves of pointers that are not down are ignored.
    Moved { id: PointerId, x: f32, y: f32 },

    /// Pointer lifted / primary button released.
    Up { id: PointerId },

    /// The platform aborted the touch sequence for this pointer.
    Cancel { id: PointerId },

    /// Mouse wheel scrolled by a pixel delta at the cursor position.
    Wheel { delta_y: f32, x: f32, y: f32 },

    /// Trackpad pinch; positive `delta` magnifies.
    Pinch { delta: f32, x: f32, y: f32 },
}

//=== GestureEvent ========================================================

/// Recognized gesture, shaped after standard platform recognizer
/// callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Two-pointer scale change. `scale_factor` is relative to the
    /// previous callback (1.0 = unchanged).
    Scale {
        scale_factor: f32,
        focus_x: f32,
        focus_y: f32,
    },

    /// Drag. Distances are previous position minus current position.
    Scroll {
        pointer_count: usize,
        distance_x: f32,
        distance_y: f32,
    },

    /// Press held past the long-press threshold without moving.
    LongPress { x: f32, y: f32 },

    /// First pointer down.
    Down,

    /// Last pointer up.
    Up,

    /// Touch sequence aborted by the platform.
    Cancel,
}

//=== CameraIntent ========================================================

/// Normalized engine call produced by the translator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraIntent {
    Zoom { delta: f32, focus_x: f32, focus_y: f32 },
    Pan { dx: f32, dy: f32 },
    Pitch { delta: f32 },
    Route { x: f32, y: f32, costing: RouteCostingMode },
    ExternalInput { pressed: bool },
}
