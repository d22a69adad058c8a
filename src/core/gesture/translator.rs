//=========================================================================
// Gesture Translator
//=========================================================================
//
// Maps recognizer callbacks to camera-control calls on the engine.
//
// Architecture:
//   GestureEvent → translate() → CameraIntent → dispatch() → EngineSlot
//
// Mapping:
//   Scale            → zoom_delta((factor - 1) * ZOOM_GAIN, focus)
//   Scroll (1 ptr)   → pan_delta(dx / PAN_GAIN, dy / PAN_GAIN)
//   Scroll (2 ptrs)  → pitch_delta(-dy / PITCH_GAIN)
//   LongPress        → calculate_route(x, y, current costing)
//   Down / Up,Cancel → temp_external_input(true / false)
//
// Two-pointer drags always pitch; they never pan.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;

//=== Internal Dependencies ===============================================

use super::{CameraIntent, CostingSelection, GestureEvent};
use crate::core::engine_bridge::{EngineSlot, MapEngine};

//=== Gains ===============================================================

/// Amplifies a pinch scale delta into an engine zoom delta.
pub const ZOOM_GAIN: f32 = 150.0;

/// Divides a drag pixel delta into an engine pan delta.
pub const PAN_GAIN: f32 = 15.0;

/// Divides a two-pointer vertical drag into an engine pitch delta.
pub const PITCH_GAIN: f32 = 10.0;

//=== GestureTranslator ===================================================

/// Converts gesture events into engine camera calls.
///
/// Every dispatch is guarded by handle presence: input arriving before
/// the surface is ready (or after teardown) is silently dropped.
pub struct GestureTranslator {
    slot: EngineSlot,
    costing: CostingSelection,
}

impl GestureTranslator {
    pub fn new(slot: EngineSlot, costing: CostingSelection) -> Self {
        Self { slot, costing }
    }

    //--- Translation ------------------------------------------------------

    /// Maps a gesture to its camera intent.
    ///
    /// Long presses read the costing selection at this moment.
    pub fn translate(&self, event: &GestureEvent) -> CameraIntent {
        match *event {
            GestureEvent::Scale {
                scale_factor,
                focus_x,
                focus_y,
            } => CameraIntent::Zoom {
                delta: (scale_factor - 1.0) * ZOOM_GAIN,
                focus_x,
                focus_y,
            },

            GestureEvent::Scroll {
                pointer_count: 2,
                distance_y,
                ..
            } => CameraIntent::Pitch {
                delta: -distance_y / PITCH_GAIN,
            },

            GestureEvent::Scroll {
                distance_x,
                distance_y,
                ..
            } => CameraIntent::Pan {
                dx: distance_x / PAN_GAIN,
                dy: distance_y / PAN_GAIN,
            },

            GestureEvent::LongPress { x, y } => CameraIntent::Route {
                x,
                y,
                costing: self.costing.get(),
            },

            GestureEvent::Down => CameraIntent::ExternalInput { pressed: true },

            GestureEvent::Up | GestureEvent::Cancel => {
                CameraIntent::ExternalInput { pressed: false }
            }
        }
    }

    //--- Dispatch ---------------------------------------------------------

    /// Translates and forwards a gesture to the engine.
    ///
    /// Returns the delivered intent, or `None` if it was dropped because
    /// no engine is live.
    pub fn handle(&self, event: &GestureEvent) -> Option<CameraIntent> {
        let intent = self.translate(event);

        let delivered = self
            .slot
            .with_live(|handle| Self::dispatch(handle.engine(), intent));

        if delivered.is_none() {
            trace!(target: "gesture", "Dropped {:?}, engine not ready", intent);
            return None;
        }

        trace!(target: "gesture", "{:?} → {:?}", event, intent);
        Some(intent)
    }

    fn dispatch(engine: &dyn MapEngine, intent: CameraIntent) {
        match intent {
            CameraIntent::Zoom {
                delta,
                focus_x,
                focus_y,
            } => engine.zoom_delta(delta, focus_x, focus_y),
            CameraIntent::Pan { dx, dy } => engine.pan_delta(dx, dy),
            CameraIntent::Pitch { delta } => engine.pitch_delta(delta),
            CameraIntent::Route { x, y, costing } => engine.calculate_route(x, y, costing),
            CameraIntent::ExternalInput { pressed } => engine.temp_external_input(pressed),
        }
    }

    //--- Accessors --------------------------------------------------------

    pub fn costing(&self) -> &CostingSelection {
        &self.costing
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gesture::RouteCostingMode;
    use crate::core::testing::{CallLog, EngineCall, RecordingEngine};

    fn live_translator() -> (GestureTranslator, CallLog, EngineSlot) {
        let slot = EngineSlot::new();
        let (engine, log) = RecordingEngine::new();
        slot.install(Box::new(engine));
        let translator = GestureTranslator::new(slot.clone(), CostingSelection::default());
        (translator, log, slot)
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn pinch_zooms_about_focus() {
        let (translator, log, _) = live_translator();

        translator.handle(&GestureEvent::Scale {
            scale_factor: 1.2,
            focus_x: 100.0,
            focus_y: 200.0,
        });

        match log.last() {
            Some(EngineCall::Zoom(delta, x, y)) => {
                assert_close(delta, 30.0);
                assert_eq!((x, y), (100.0, 200.0));
            }
            other => panic!("Expected Zoom, got {:?}", other),
        }
    }

    #[test]
    fn pinch_in_zooms_out() {
        let (translator, _, _) = live_translator();
        match translator.translate(&GestureEvent::Scale {
            scale_factor: 0.9,
            focus_x: 0.0,
            focus_y: 0.0,
        }) {
            CameraIntent::Zoom { delta, .. } => assert_close(delta, -15.0),
            other => panic!("Expected Zoom, got {:?}", other),
        }
    }

    #[test]
    fn single_pointer_drag_pans() {
        let (translator, log, _) = live_translator();

        translator.handle(&GestureEvent::Scroll {
            pointer_count: 1,
            distance_x: 15.0,
            distance_y: 30.0,
        });

        assert_eq!(log.last(), Some(EngineCall::Pan(1.0, 2.0)));
    }

    #[test]
    fn two_pointer_drag_pitches() {
        let (translator, log, _) = live_translator();

        translator.handle(&GestureEvent::Scroll {
            pointer_count: 2,
            distance_x: 50.0,
            distance_y: 20.0,
        });

        assert_eq!(log.calls(), vec![EngineCall::Pitch(-2.0)]);
    }

    #[test]
    fn three_pointer_drag_pans() {
        let (translator, _, _) = live_translator();
        assert_eq!(
            translator.translate(&GestureEvent::Scroll {
                pointer_count: 3,
                distance_x: 30.0,
                distance_y: 0.0,
            }),
            CameraIntent::Pan { dx: 2.0, dy: 0.0 }
        );
    }

    #[test]
    fn long_press_uses_current_costing() {
        let (translator, log, _) = live_translator();
        translator.costing().set(RouteCostingMode::Pedestrian);

        translator.handle(&GestureEvent::LongPress { x: 50.0, y: 60.0 });

        assert_eq!(
            log.last(),
            Some(EngineCall::Route(50.0, 60.0, RouteCostingMode::Pedestrian))
        );
    }

    #[test]
    fn costing_is_read_at_press_time() {
        let (translator, log, _) = live_translator();
        let toggle = translator.costing().clone();

        translator.handle(&GestureEvent::LongPress { x: 1.0, y: 1.0 });
        toggle.toggle();
        translator.handle(&GestureEvent::LongPress { x: 2.0, y: 2.0 });

        assert_eq!(
            log.calls(),
            vec![
                EngineCall::Route(1.0, 1.0, RouteCostingMode::Vehicle),
                EngineCall::Route(2.0, 2.0, RouteCostingMode::Pedestrian),
            ]
        );
    }

    #[test]
    fn press_and_release_toggle_external_input() {
        let (translator, log, _) = live_translator();

        translator.handle(&GestureEvent::Down);
        translator.handle(&GestureEvent::Up);
        translator.handle(&GestureEvent::Down);
        translator.handle(&GestureEvent::Cancel);

        assert_eq!(
            log.calls(),
            vec![
                EngineCall::ExternalInput(true),
                EngineCall::ExternalInput(false),
                EngineCall::ExternalInput(true),
                EngineCall::ExternalInput(false),
            ]
        );
    }

    #[test]
    fn input_before_surface_is_dropped() {
        let slot = EngineSlot::new();
        let translator = GestureTranslator::new(slot, CostingSelection::default());

        let result = translator.handle(&GestureEvent::Scroll {
            pointer_count: 1,
            distance_x: 15.0,
            distance_y: 15.0,
        });

        assert_eq!(result, None);
    }

    #[test]
    fn input_after_teardown_is_dropped() {
        let (translator, log, slot) = live_translator();
        slot.invalidate();
        log.clear();

        assert_eq!(translator.handle(&GestureEvent::Down), None);
        assert!(log.calls().is_empty());
    }

    #[test]
    fn handle_returns_delivered_intent() {
        let (translator, _, _) = live_translator();
        assert_eq!(
            translator.handle(&GestureEvent::Down),
            Some(CameraIntent::ExternalInput { pressed: true })
        );
    }
}
