//=========================================================================
// Platform Event Mapper
//
// Converts Winit input into engine-neutral `PointerEvent`s and host
// commands.
//
// Architecture:
//   WindowEvent → PointerMapper → PointerEvent → GestureRecognizer
//   KeyboardInput → key_command() → HostCommand
//
// Stateful cursor tracking: mouse buttons, wheel and trackpad pinch
// carry no position in Winit, so the last cursor position is cached and
// applied to them. Only the left button drags.
//
//=========================================================================

//=== External Dependencies ===============================================

use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase};
use winit::keyboard::KeyCode;

//=== Internal Dependencies ===============================================

use crate::core::gesture::{PointerEvent, PointerId, MOUSE_POINTER};

//=== Constants ===========================================================

/// Pixels per wheel line for devices that report line deltas.
pub(crate) const LINE_HEIGHT_PX: f32 = 40.0;

//=== HostCommand =========================================================

/// Keyboard shortcut actions of the desktop host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HostCommand {
    ToggleFollowMode,
    ToggleCosting,
    ToggleExternalInput,
    Exit,
}

/// Maps a key press to its command. Releases and auto-repeats map to
/// nothing.
pub(crate) fn key_command(code: KeyCode, state: ElementState, repeat: bool) -> Option<HostCommand> {
    if state != ElementState::Pressed || repeat {
        return None;
    }

    match code {
        KeyCode::KeyN => Some(HostCommand::ToggleFollowMode),
        KeyCode::KeyC => Some(HostCommand::ToggleCosting),
        KeyCode::Space => Some(HostCommand::ToggleExternalInput),
        KeyCode::Escape => Some(HostCommand::Exit),
        _ => None,
    }
}

//=== PointerMapper =======================================================

pub(crate) struct PointerMapper {
    cursor: (f32, f32),
    button_down: bool,
}

impl PointerMapper {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new() -> Self {
        Self {
            cursor: (0.0, 0.0),
            button_down: false,
        }
    }

    //--- Mouse ------------------------------------------------------------

    /// Tracks the cursor; reports a move only while dragging.
    pub(crate) fn cursor_moved(&mut self, x: f32, y: f32) -> Option<PointerEvent> {
        self.cursor = (x, y);
        self.button_down.then_some(PointerEvent::Moved {
            id: MOUSE_POINTER,
            x,
            y,
        })
    }

    /// Left button press/release at the cached cursor position.
    pub(crate) fn mouse_button(
        &mut self,
        button: MouseButton,
        state: ElementState,
    ) -> Option<PointerEvent> {
        if button != MouseButton::Left {
            return None;
        }

        match state {
            ElementState::Pressed if !self.button_down => {
                self.button_down = true;
                let (x, y) = self.cursor;
                Some(PointerEvent::Down {
                    id: MOUSE_POINTER,
                    x,
                    y,
                })
            }
            ElementState::Released if self.button_down => {
                self.button_down = false;
                Some(PointerEvent::Up { id: MOUSE_POINTER })
            }
            _ => None,
        }
    }

    /// Cursor left the window mid-drag: abort the press.
    pub(crate) fn cursor_left(&mut self) -> Option<PointerEvent> {
        if !self.button_down {
            return None;
        }
        self.button_down = false;
        Some(PointerEvent::Cancel { id: MOUSE_POINTER })
    }

    pub(crate) fn mouse_wheel(&self, delta: MouseScrollDelta) -> Option<PointerEvent> {
        let delta_y = match delta {
            MouseScrollDelta::LineDelta(_, lines) => lines * LINE_HEIGHT_PX,
            MouseScrollDelta::PixelDelta(pixels) => pixels.y as f32,
        };

        if delta_y == 0.0 {
            return None;
        }

        let (x, y) = self.cursor;
        Some(PointerEvent::Wheel { delta_y, x, y })
    }

    pub(crate) fn pinch(&self, delta: f64) -> PointerEvent {
        let (x, y) = self.cursor;
        PointerEvent::Pinch {
            delta: delta as f32,
            x,
            y,
        }
    }

    //--- Touch ------------------------------------------------------------

    pub(crate) fn touch(&self, phase: TouchPhase, id: PointerId, x: f32, y: f32) -> PointerEvent {
        match phase {
            TouchPhase::Started => PointerEvent::Down { id, x, y },
            TouchPhase::Moved => PointerEvent::Moved { id, x, y },
            TouchPhase::Ended => PointerEvent::Up { id },
            TouchPhase::Cancelled => PointerEvent::Cancel { id },
        }
    }

    #[cfg(test)]
    pub(crate) fn cursor(&self) -> (f32, f32) {
        self.cursor
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
