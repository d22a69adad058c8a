//=========================================================================
// Location Subsystem
//=========================================================================
//
// Keeps the engine's camera position fed from the device location while
// the view is visible.
//
// Components:
// - `fix`: position sample and bearing normalization
// - `source`: host-provided provider contract
// - `coordinator`: subscription lifecycle and forwarding worker
//
//=========================================================================

//=== Module Declarations =================================================

mod coordinator;
mod fix;
mod source;

//=== Public API ==========================================================

pub use coordinator::{LocationConfig, LocationFeedCoordinator, DEFAULT_REPLAY_DELAY};
pub use fix::LocationFix;
pub use source::{LocationError, LocationSource, SubscriptionId, UpdateRequest};
