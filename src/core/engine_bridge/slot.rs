//=========================================================================
// Engine Slot
//=========================================================================
//
// Shared holder of the single live engine handle.
//
// Architecture:
//   SurfaceLifecycleManager ──install()──→ ┌──────────────────────┐
//                                          │ SlotState            │
//   GestureTranslator  ──with_live()──→    │  Absent              │
//   LocationFeed       ──with_live()──→    │  Live(EngineHandle)  │
//   RenderLoopDriver   ──with_live()──→    └──────────────────────┘
//   SurfaceLifecycleManager ──invalidate()──┘
//
// Every engine call runs under a read guard. Teardown takes the write
// guard, so it waits for in-flight calls and nothing can start through
// the old handle once it returns.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, trace};

//=== Internal Dependencies ===============================================

use super::MapEngine;

//=== HandleId ============================================================

/// Identifies one engine instance across its surface lifetime.
///
/// Ids increase monotonically per slot, so a recreated surface always
/// gets a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine#{}", self.0)
    }
}

//=== EngineHandle ========================================================

/// Owned reference to a live engine instance.
///
/// Not `Clone`: the slot is the only owner. Other components borrow it
/// for the duration of one call through [`EngineSlot::with_live`].
pub struct EngineHandle {
    id: HandleId,
    engine: Box<dyn MapEngine>,
}

impl EngineHandle {
    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn engine(&self) -> &dyn MapEngine {
        self.engine.as_ref()
    }
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHandle").field("id", &self.id).finish()
    }
}

//=== SlotState ===========================================================

/// Presence of the engine handle.
#[derive(Debug)]
pub enum SlotState {
    /// Before surface creation completes, or after teardown.
    Absent,

    /// Surface ready, engine callable.
    Live(EngineHandle),
}

//=== EngineSlot ==========================================================

/// Cloneable shared context holding the engine handle.
///
/// Passed by clone into every component at construction instead of a
/// process-wide holder.
#[derive(Clone)]
pub struct EngineSlot {
    state: Arc<RwLock<SlotState>>,
    next_id: Arc<AtomicU64>,
}

impl EngineSlot {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(SlotState::Absent)),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    //--- Lifecycle --------------------------------------------------------

    /// Installs a freshly created engine.
    ///
    /// Returns the new id and the previously live handle, if any. The
    /// caller decides how to log or drop a displaced handle.
    pub fn install(&self, engine: Box<dyn MapEngine>) -> (HandleId, Option<EngineHandle>) {
        let id = HandleId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = EngineHandle { id, engine };

        let previous = std::mem::replace(&mut *self.write(), SlotState::Live(handle));
        debug!(target: "surface", "Installed {}", id);

        match previous {
            SlotState::Live(old) => (id, Some(old)),
            SlotState::Absent => (id, None),
        }
    }

    /// Takes the handle out of the slot.
    ///
    /// Blocks until calls already running through the handle finish.
    /// Returns `None` if the slot was already absent.
    pub fn invalidate(&self) -> Option<EngineHandle> {
        match std::mem::replace(&mut *self.write(), SlotState::Absent) {
            SlotState::Live(handle) => {
                debug!(target: "surface", "Invalidated {}", handle.id);
                Some(handle)
            }
            SlotState::Absent => None,
        }
    }

    //--- Access -----------------------------------------------------------

    /// Runs `call` against the live handle, or drops it when absent.
    ///
    /// Returns `None` when the call was dropped.
    pub fn with_live<R>(&self, call: impl FnOnce(&EngineHandle) -> R) -> Option<R> {
        match &*self.read() {
            SlotState::Live(handle) => Some(call(handle)),
            SlotState::Absent => {
                trace!(target: "surface", "Engine absent, call dropped");
                None
            }
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(&*self.read(), SlotState::Live(_))
    }

    pub fn live_id(&self) -> Option<HandleId> {
        match &*self.read() {
            SlotState::Live(handle) => Some(handle.id),
            SlotState::Absent => None,
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn read(&self) -> RwLockReadGuard<'_, SlotState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SlotState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EngineSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EngineSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineSlot").field("live", &self.live_id()).finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{EngineCall, RecordingEngine};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn new_slot_is_absent() {
        let slot = EngineSlot::new();
        assert!(!slot.is_live());
        assert_eq!(slot.live_id(), None);
    }

    #[test]
    fn calls_are_dropped_while_absent() {
        let slot = EngineSlot::new();
        let result = slot.with_live(|_| 42);
        assert_eq!(result, None);
    }

    #[test]
    fn install_makes_slot_live() {
        let slot = EngineSlot::new();
        let (engine, log) = RecordingEngine::new();

        let (id, previous) = slot.install(Box::new(engine));

        assert!(previous.is_none());
        assert_eq!(slot.live_id(), Some(id));

        slot.with_live(|h| h.engine().pan_delta(1.0, 2.0));
        assert_eq!(log.calls(), vec![EngineCall::Pan(1.0, 2.0)]);
    }

    #[test]
    fn install_returns_displaced_handle() {
        let slot = EngineSlot::new();
        let (first, _) = slot.install(Box::new(RecordingEngine::new().0));
        let (second, previous) = slot.install(Box::new(RecordingEngine::new().0));

        assert_eq!(previous.map(|h| h.id()), Some(first));
        assert!(second > first);
    }

    #[test]
    fn invalidate_clears_slot() {
        let slot = EngineSlot::new();
        let (id, _) = slot.install(Box::new(RecordingEngine::new().0));

        let taken = slot.invalidate();

        assert_eq!(taken.map(|h| h.id()), Some(id));
        assert!(!slot.is_live());
        assert!(slot.invalidate().is_none(), "Second invalidate is a no-op");
    }

    #[test]
    fn clones_share_state() {
        let slot = EngineSlot::new();
        let clone = slot.clone();

        slot.install(Box::new(RecordingEngine::new().0));
        assert!(clone.is_live());

        clone.invalidate();
        assert!(!slot.is_live());
    }

    #[test]
    fn invalidate_waits_for_in_flight_call() {
        let slot = EngineSlot::new();
        let (engine, log) = RecordingEngine::new();
        slot.install(Box::new(engine));

        let (entered_tx, entered_rx) = mpsc::channel();
        let worker_slot = slot.clone();
        let worker = thread::spawn(move || {
            worker_slot.with_live(|h| {
                entered_tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(50));
                h.engine().pitch_delta(1.0);
            });
        });

        entered_rx.recv().unwrap();
        let taken = slot.invalidate();

        // The in-flight call completed before invalidate returned.
        assert_eq!(log.calls(), vec![EngineCall::Pitch(1.0)]);
        assert!(taken.is_some());
        drop(taken);
        assert_eq!(log.calls(), vec![EngineCall::Pitch(1.0), EngineCall::Dropped]);
        worker.join().unwrap();
    }
}
