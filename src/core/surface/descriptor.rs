//=========================================================================
// Surface Descriptor
//=========================================================================
//
// Everything the engine needs to bind to a native drawable: the raw
// window/display handles, pixel size, density, renderer hints and the
// tile storage path.
//
// Built once per surface-created event and consumed by value by
// `EngineFactory::create`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::{Path, PathBuf};

use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

//=== Internal Dependencies ===============================================

use super::SurfaceError;

//=== SurfaceDescriptor ===================================================

/// Immutable description of a freshly available drawable surface.
#[derive(Debug)]
pub struct SurfaceDescriptor {
    window: RawWindowHandle,
    display: RawDisplayHandle,
    width: u32,
    height: u32,
    scale_factor: f64,
    software_renderer: bool,
    tiles_db: PathBuf,
}

impl SurfaceDescriptor {
    /// Starts a descriptor for the given drawable.
    pub fn builder(window: RawWindowHandle, display: RawDisplayHandle) -> SurfaceDescriptorBuilder {
        SurfaceDescriptorBuilder {
            window,
            display,
            width: 0,
            height: 0,
            scale_factor: 1.0,
            software_renderer: false,
            tiles_db: PathBuf::from(DEFAULT_TILES_DB),
        }
    }

    //--- Accessors --------------------------------------------------------

    pub fn window_handle(&self) -> RawWindowHandle {
        self.window
    }

    pub fn display_handle(&self) -> RawDisplayHandle {
        self.display
    }

    /// Physical size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Device pixels per logical pixel.
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// True on emulators or other software-rendered targets.
    pub fn is_software_renderer(&self) -> bool {
        self.software_renderer
    }

    pub fn tiles_db(&self) -> &Path {
        &self.tiles_db
    }
}

//=== Tile Storage ========================================================

/// File name of the tile database inside the host's data directory.
pub const DEFAULT_TILES_DB: &str = "tiles.db";

/// Resolves the tile database path inside `data_dir`.
pub fn tiles_db_path(data_dir: impl AsRef<Path>) -> PathBuf {
    data_dir.as_ref().join(DEFAULT_TILES_DB)
}

/// Returns true when a build fingerprint identifies an emulator image.
///
/// Emulators lack a hardware GPU path, so the engine is told to pick a
/// software-friendly configuration.
pub fn is_emulator_fingerprint(fingerprint: &str) -> bool {
    fingerprint.contains("generic") || fingerprint.contains("sdk_gphone")
}

//=== SurfaceDescriptorBuilder ============================================

/// Builder for [`SurfaceDescriptor`].
///
/// # Default Values
///
/// - **Scale factor**: 1.0
/// - **Software renderer**: false
/// - **Tiles DB**: `tiles.db` (relative)
#[derive(Debug, Clone)]
pub struct SurfaceDescriptorBuilder {
    window: RawWindowHandle,
    display: RawDisplayHandle,
    width: u32,
    height: u32,
    scale_factor: f64,
    software_renderer: bool,
    tiles_db: PathBuf,
}

impl SurfaceDescriptorBuilder {
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the device pixel density.
    ///
    /// # Panics
    ///
    /// Panics if `scale_factor` is not a positive finite number.
    pub fn scale_factor(mut self, scale_factor: f64) -> Self {
        assert!(
            scale_factor.is_finite() && scale_factor > 0.0,
            "Scale factor must be positive, got {}",
            scale_factor
        );
        self.scale_factor = scale_factor;
        self
    }

    pub fn software_renderer(mut self, software_renderer: bool) -> Self {
        self.software_renderer = software_renderer;
        self
    }

    pub fn tiles_db(mut self, path: impl Into<PathBuf>) -> Self {
        self.tiles_db = path.into();
        self
    }

    /// Finalizes the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::EmptySurface`] when either dimension is zero.
    /// Hosts are expected to wait for a concrete size before creating.
    pub fn build(self) -> Result<SurfaceDescriptor, SurfaceError> {
        if self.width == 0 || self.height == 0 {
            return Err(SurfaceError::EmptySurface {
                width: self.width,
                height: self.height,
            });
        }

        Ok(SurfaceDescriptor {
            window: self.window,
            display: self.display,
            width: self.width,
            height: self.height,
            scale_factor: self.scale_factor,
            software_renderer: self.software_renderer,
            tiles_db: self.tiles_db,
        })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
