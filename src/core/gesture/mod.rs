//=========================================================================
// Gesture Subsystem
//=========================================================================
//
// Converts pointer/touch input into camera-control calls.
//
// Components:
// - `event`: pointer samples, recognizer callbacks, camera intents
// - `recognizer`: pointer-stream recognizer for hosts without one
// - `translator`: gesture → engine call mapping
// - `costing`: user-selected route profile
//
//=========================================================================

//=== Module Declarations =================================================

mod costing;
mod event;
mod recognizer;
mod translator;

//=== Public API ==========================================================

pub use costing::{CostingSelection, RouteCostingMode};
pub use event::{CameraIntent, GestureEvent, PointerEvent, PointerId, MOUSE_POINTER};
pub use recognizer::{GestureRecognizer, GestureState, LONG_PRESS_TIMEOUT, TOUCH_SLOP};
pub use translator::{GestureTranslator, PAN_GAIN, PITCH_GAIN, ZOOM_GAIN};
