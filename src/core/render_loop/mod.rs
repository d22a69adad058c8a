//=========================================================================
// Render Loop
//=========================================================================
//
// Continuous redraw of the engine while a surface is live, either on a
// dedicated thread or paced by the host's display refresh.
//
//=========================================================================

//=== Module Declarations =================================================

mod driver;
mod schedule;

//=== Public API ==========================================================

pub use driver::RenderLoopDriver;
pub use schedule::{FrameOutcome, FrameRateRange, FrameSchedule, FrameStats};
