//=========================================================================
// Desktop Host
//=========================================================================
//
// Winit application driving a `MapView` in a desktop window.
//
// Lifecycle:
// ```text
//   resumed ──> window created ──> create() (once size is non-zero)
//   Resized ──> resize() or deferred create()
//   RedrawRequested ──> render() ──> request_redraw (host-driven)
//   Occluded(true/false) ──> hidden / visible
//   suspended, CloseRequested ──> teardown()
// ```
//
// Keys: N follow mode, C costing mode, Space external input, Escape exit.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::PathBuf;
use std::time::Instant;

use log::*;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Dependencies ===============================================

use super::event_mapper::{key_command, HostCommand, PointerMapper};
use super::{wants_host_frames, PlatformError, SurfaceHost};
use crate::core::engine_bridge::{EngineError, EngineFactory, HandleId};
use crate::core::gesture::{GestureRecognizer, PointerEvent};
use crate::core::surface::{SurfaceDescriptor, SurfaceError, DEFAULT_TILES_DB};
use crate::map_view::MapView;

//=== DesktopHost =========================================================

/// Desktop window host.
///
/// Field order matters: the view (and its engine) drops before the
/// window it draws into.
pub struct DesktopHost<F: EngineFactory> {
    view: MapView<F>,
    window: Option<Window>,
    title: String,
    tiles_db: PathBuf,
    mapper: PointerMapper,
    recognizer: GestureRecognizer,
    exit_requested: bool,
}

impl<F: EngineFactory> DesktopHost<F> {
    //--- Construction -----------------------------------------------------

    /// Wraps a view. The window is created lazily in `resumed()`.
    pub fn new(view: MapView<F>, title: impl Into<String>) -> Self {
        Self {
            view,
            window: None,
            title: title.into(),
            tiles_db: PathBuf::from(DEFAULT_TILES_DB),
            mapper: PointerMapper::new(),
            recognizer: GestureRecognizer::new(),
            exit_requested: false,
        }
    }

    /// Sets the tile database handed to the engine at creation.
    pub fn with_tiles_db(mut self, path: impl Into<PathBuf>) -> Self {
        self.tiles_db = path.into();
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn view(&self) -> &MapView<F> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut MapView<F> {
        &mut self.view
    }

    //--- Input ------------------------------------------------------------

    fn dispatch_pointer(&mut self, event: PointerEvent) {
        for gesture in self.recognizer.feed(event, Instant::now()) {
            self.view.on_gesture(&gesture);
        }
    }

    fn poll_gestures(&mut self) {
        if let Some(gesture) = self.recognizer.poll(Instant::now()) {
            self.view.on_gesture(&gesture);
        }
    }

    fn apply_command(&mut self, command: HostCommand) {
        match command {
            HostCommand::ToggleFollowMode => {
                self.view.toggle_cam_follow_mode();
            }
            HostCommand::ToggleCosting => {
                self.view.toggle_costing_mode();
            }
            HostCommand::ToggleExternalInput => {
                let active = self.view.toggle_external_input();
                debug!(target: "platform", "External input {}", if active { "on" } else { "off" });
            }
            HostCommand::Exit => {
                info!(target: "platform", "Exit requested");
                self.exit_requested = true;
            }
        }
    }

    //--- Shutdown ---------------------------------------------------------

    fn shut_down(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = false;
        self.teardown();
        self.view.on_hidden();
        self.window = None;
        event_loop.exit();
    }
}

//=== SurfaceHost =========================================================

impl<F: EngineFactory> SurfaceHost for DesktopHost<F> {
    fn create(&mut self) -> Result<Option<HandleId>, SurfaceError> {
        let Some(window) = self.window.as_ref() else {
            return Ok(None);
        };

        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            debug!(target: "platform", "Window has no size yet, engine creation deferred");
            return Ok(None);
        }

        let unsupported = |e: raw_window_handle::HandleError| {
            SurfaceError::Initialization(EngineError::UnsupportedSurface(e.to_string()))
        };
        let raw_window = window.window_handle().map_err(unsupported)?.as_raw();
        let raw_display = window.display_handle().map_err(unsupported)?.as_raw();

        let descriptor = SurfaceDescriptor::builder(raw_window, raw_display)
            .size(size.width, size.height)
            .scale_factor(window.scale_factor())
            .tiles_db(self.tiles_db.clone())
            .build()?;

        let id = self.view.on_surface_available(descriptor)?;
        window.request_redraw();
        Ok(Some(id))
    }

    fn resize(&mut self, width: u32, height: u32) -> bool {
        self.view.on_surface_resized(width, height)
    }

    fn render(&mut self) -> bool {
        self.poll_gestures();
        self.view.on_frame();

        let again = wants_host_frames(&self.view);
        if again {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
        again
    }

    fn teardown(&mut self) -> Option<HandleId> {
        self.view.on_surface_destroyed()
    }
}

//=== Winit Integration ===================================================

impl<F: EngineFactory> ApplicationHandler for DesktopHost<F> {
    /// Creates the window on first resume; (re)creates the engine.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let attrs = WindowAttributes::default()
                .with_title(self.title.clone())
                .with_inner_size(LogicalSize::new(800, 600));

            match event_loop.create_window(attrs) {
                Ok(window) => {
                    info!(
                        target: "platform",
                        "Window created: {}x{} @ {}x DPI",
                        window.inner_size().width,
                        window.inner_size().height,
                        window.scale_factor()
                    );
                    self.window = Some(window);
                }
                Err(e) => {
                    error!(target: "platform", "Window creation failed: {}", e);
                    event_loop.exit();
                    return;
                }
            }
        }

        if let Err(e) = self.view.on_visible() {
            warn!(target: "platform", "Location unavailable: {}", e);
        }

        if !self.view.is_live() {
            if let Err(e) = self.create() {
                error!(target: "platform", "Map engine unavailable: {}", e);
            }
        }
    }

    /// Native surfaces may be destroyed while suspended (mobile).
    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        info!(target: "platform", "Suspended, releasing engine");
        self.teardown();
        self.view.on_hidden();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.shut_down(event_loop);
                return;
            }

            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    trace!(target: "platform", "Ignoring zero-size resize");
                } else if self.view.is_live() {
                    self.resize(size.width, size.height);
                } else if let Err(e) = self.create() {
                    error!(target: "platform", "Map engine unavailable: {}", e);
                }
            }

            WindowEvent::Occluded(occluded) => {
                if occluded {
                    self.view.on_hidden();
                } else if let Err(e) = self.view.on_visible() {
                    warn!(target: "platform", "Location unavailable: {}", e);
                }
            }

            WindowEvent::RedrawRequested => {
                self.render();
            }

            WindowEvent::CursorMoved { position, .. } => {
                if let Some(event) = self.mapper.cursor_moved(position.x as f32, position.y as f32) {
                    self.dispatch_pointer(event);
                }
            }

            WindowEvent::CursorLeft { .. } => {
                if let Some(event) = self.mapper.cursor_left() {
                    self.dispatch_pointer(event);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(event) = self.mapper.mouse_button(button, state) {
                    self.dispatch_pointer(event);
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(event) = self.mapper.mouse_wheel(delta) {
                    self.dispatch_pointer(event);
                }
            }

            WindowEvent::PinchGesture { delta, .. } => {
                let event = self.mapper.pinch(delta);
                self.dispatch_pointer(event);
            }

            WindowEvent::Touch(touch) => {
                let event = self.mapper.touch(
                    touch.phase,
                    touch.id,
                    touch.location.x as f32,
                    touch.location.y as f32,
                );
                self.dispatch_pointer(event);
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                if let Some(command) = key_command(code, state, repeat) {
                    self.apply_command(command);
                }
            }

            _ => {}
        }

        if self.exit_requested {
            self.shut_down(event_loop);
        }
    }

    /// Wakes up for a pending long press even when no frames are drawn.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.poll_gestures();
        match self.recognizer.next_deadline() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}

//=== Entry Point =========================================================

/// Opens a window titled `title` and runs the view until it closes.
///
/// Blocks on the Winit event loop; must be called on the main thread.
///
/// # Errors
///
/// Returns [`PlatformError`] if the event loop cannot be created or
/// fails while running.
pub fn run_desktop<F: EngineFactory>(view: MapView<F>, title: &str) -> Result<(), PlatformError> {
    debug!(target: "platform", "Starting Winit event loop");

    let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;
    let mut host = DesktopHost::new(view, title);

    event_loop
        .run_app(&mut host)
        .map_err(PlatformError::EventLoopExecution)?;

    info!(target: "platform", "Event loop exited");
    Ok(())
}

//=========================================================================
// Unit Tests
//=========================================================================
