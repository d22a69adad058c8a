//=========================================================================
// Route Costing
//=========================================================================
//
// Route profile selected by the user, read when a long press requests a
// route. The selection is shared between the UI toggle and the gesture
// translator through an atomic cell.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

//=== RouteCostingMode ====================================================

/// Route-computation profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RouteCostingMode {
    #[default]
    Vehicle,
    Pedestrian,
}

impl RouteCostingMode {
    /// The other profile.
    pub fn toggled(self) -> Self {
        match self {
            Self::Vehicle => Self::Pedestrian,
            Self::Pedestrian => Self::Vehicle,
        }
    }

    fn to_bits(self) -> u8 {
        match self {
            Self::Vehicle => 0,
            Self::Pedestrian => 1,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Self::Pedestrian,
            _ => Self::Vehicle,
        }
    }
}

impl fmt::Display for RouteCostingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vehicle => f.write_str("vehicle"),
            Self::Pedestrian => f.write_str("pedestrian"),
        }
    }
}

//=== CostingSelection ====================================================

/// Shared current costing mode.
///
/// Clones observe the same selection. Mutated only by explicit user
/// action (`set`/`toggle`).
#[derive(Debug, Clone)]
pub struct CostingSelection {
    bits: Arc<AtomicU8>,
}

impl CostingSelection {
    pub fn new(mode: RouteCostingMode) -> Self {
        Self {
            bits: Arc::new(AtomicU8::new(mode.to_bits())),
        }
    }

    pub fn get(&self) -> RouteCostingMode {
        RouteCostingMode::from_bits(self.bits.load(Ordering::Acquire))
    }

    pub fn set(&self, mode: RouteCostingMode) {
        self.bits.store(mode.to_bits(), Ordering::Release);
    }

    /// Flips the selection and returns the new mode.
    pub fn toggle(&self) -> RouteCostingMode {
        let previous = self.bits.fetch_xor(1, Ordering::AcqRel);
        RouteCostingMode::from_bits(previous).toggled()
    }
}

impl Default for CostingSelection {
    fn default() -> Self {
        Self::new(RouteCostingMode::default())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
