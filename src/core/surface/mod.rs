//=========================================================================
// Surface Subsystem
//=========================================================================
//
// Binds the engine's lifetime to the host drawable surface's lifetime.
//
// Components:
// - `descriptor`: immutable description of an available surface
// - `lifecycle`: create / resize / destroy handling over the engine slot
//
//=========================================================================

//=== Module Declarations =================================================

mod descriptor;
mod lifecycle;

//=== Public API ==========================================================

pub use descriptor::{
    is_emulator_fingerprint, tiles_db_path, SurfaceDescriptor, SurfaceDescriptorBuilder,
    DEFAULT_TILES_DB,
};
pub use lifecycle::SurfaceLifecycleManager;

//=== Internal Dependencies ===============================================

use crate::core::engine_bridge::EngineError;

//=== SurfaceError ========================================================

/// Surface creation errors.
///
/// Both variants are fatal for the surface instance. The only recovery
/// path is a new surface-available event (e.g. view recreation).
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceError {
    /// The surface has no area yet.
    EmptySurface { width: u32, height: u32 },

    /// The engine could not be created for this surface.
    Initialization(EngineError),
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySurface { width, height } => {
                write!(f, "Surface has no area ({}x{})", width, height)
            }
            Self::Initialization(e) => write!(f, "Engine initialization failed: {}", e),
        }
    }
}

impl std::error::Error for SurfaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Initialization(e) => Some(e),
            Self::EmptySurface { .. } => None,
        }
    }
}

impl From<EngineError> for SurfaceError {
    fn from(e: EngineError) -> Self {
        Self::Initialization(e)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
