//=========================================================================
// Engine Bridge
//=========================================================================
//
// Bridges the coordination layer with the external map engine.
//
// Components:
// - `interface`: engine operations, factory and error (the contract)
// - `slot`: shared `Absent | Live(handle)` holder used by every caller
//
//=========================================================================

//=== Module Declarations =================================================

mod interface;
mod slot;

//=== Public API ==========================================================

pub use interface::{EngineError, EngineFactory, MapEngine};
pub use slot::{EngineHandle, EngineSlot, HandleId, SlotState};
