//=========================================================================
// Gesture Recognizer
//=========================================================================
//
// Turns raw pointer samples into recognizer callbacks for hosts that do
// not provide a native gesture detector (desktop windows, raw touch
// embedding).
//
// Architecture:
//   PointerEvent → feed(now) → Vec<GestureEvent>
//   poll(now)    → Option<GestureEvent>      (long-press timer)
//
// Behavior mirrors standard mobile detectors: scrolling starts after
// the touch slop is exceeded, long press fires once after a timeout
// when the pointer stayed put and swallows further single-pointer
// moves until lift, two-pointer moves report both a scale change and a
// focus drag.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use log::trace;

//=== Internal Dependencies ===============================================

use super::{GestureEvent, PointerEvent, PointerId};

//=== Thresholds ==========================================================

/// Distance a single pointer must travel before it counts as a drag.
pub const TOUCH_SLOP: f32 = 8.0;

/// Hold time before a stationary press becomes a long press.
pub const LONG_PRESS_TIMEOUT: Duration = Duration::from_millis(500);

/// Wheel pixels per unit of scale factor (120 px ≈ 8% zoom step).
const WHEEL_PIXELS_PER_SCALE: f32 = 1500.0;

/// Span changes below this ratio are not reported as scale.
const SCALE_EPSILON: f32 = 1e-4;

//=== GestureState ========================================================

/// Transient per-touch-sequence state.
///
/// Lives from the first pointer down until the last pointer lifts or
/// is cancelled, then resets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureState {
    /// Midpoint of active pointers.
    pub focus: (f32, f32),

    /// Scale factor reported by the last scale callback.
    pub scale_factor: f32,

    /// Previous position of the tracked pointer (single) or focus (multi).
    pub last_position: Option<(f32, f32)>,

    /// Number of pointers currently down.
    pub pointer_count: usize,
}

impl GestureState {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

//=== LongPressCandidate ==================================================

#[derive(Debug, Clone, Copy)]
struct LongPressCandidate {
    origin: (f32, f32),
    pressed_at: Instant,
}

//=== GestureRecognizer ===================================================

/// Pointer-stream gesture recognizer.
pub struct GestureRecognizer {
    pointers: BTreeMap<PointerId, (f32, f32)>,
    state: GestureState,
    span: Option<f32>,
    scrolling: bool,
    long_press: Option<LongPressCandidate>,
    long_press_fired: bool,
    long_press_timeout: Duration,
}

impl GestureRecognizer {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self::with_long_press_timeout(LONG_PRESS_TIMEOUT)
    }

    pub fn with_long_press_timeout(timeout: Duration) -> Self {
        Self {
            pointers: BTreeMap::new(),
            state: GestureState::default(),
            span: None,
            scrolling: false,
            long_press: None,
            long_press_fired: false,
            long_press_timeout: timeout,
        }
    }

    //--- Event Processing -------------------------------------------------

    /// Feeds one pointer sample; returns the gestures it completes.
    pub fn feed(&mut self, event: PointerEvent, now: Instant) -> Vec<GestureEvent> {
        match event {
            PointerEvent::Down { id, x, y } => self.pointer_down(id, x, y, now),
            PointerEvent::Moved { id, x, y } => self.pointer_moved(id, x, y),
            PointerEvent::Up { id } => self.pointer_up(id, GestureEvent::Up),
            PointerEvent::Cancel { id } => self.pointer_up(id, GestureEvent::Cancel),
            PointerEvent::Wheel { delta_y, x, y } => vec![GestureEvent::Scale {
                scale_factor: 1.0 + delta_y / WHEEL_PIXELS_PER_SCALE,
                focus_x: x,
                focus_y: y,
            }],
            PointerEvent::Pinch { delta, x, y } => vec![GestureEvent::Scale {
                scale_factor: 1.0 + delta,
                focus_x: x,
                focus_y: y,
            }],
        }
    }

    /// Fires a pending long press once its timeout elapsed.
    ///
    /// Hosts call this from their idle/frame callback.
    pub fn poll(&mut self, now: Instant) -> Option<GestureEvent> {
        let candidate = self.long_press?;
        if now.saturating_duration_since(candidate.pressed_at) < self.long_press_timeout {
            return None;
        }

        self.long_press = None;
        self.long_press_fired = true;
        let (x, y) = candidate.origin;
        trace!(target: "gesture", "Long press at ({}, {})", x, y);
        Some(GestureEvent::LongPress { x, y })
    }

    /// Deadline of the pending long press, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.long_press
            .map(|candidate| candidate.pressed_at + self.long_press_timeout)
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    //--- Pointer Handlers -------------------------------------------------

    fn pointer_down(&mut self, id: PointerId, x: f32, y: f32, now: Instant) -> Vec<GestureEvent> {
        let first = self.pointers.is_empty();
        self.pointers.insert(id, (x, y));
        self.sync_pointer_count();

        if first {
            self.state.last_position = Some((x, y));
            self.state.focus = (x, y);
            self.long_press = Some(LongPressCandidate {
                origin: (x, y),
                pressed_at: now,
            });
            return vec![GestureEvent::Down];
        }

        // Additional pointer: no long press, restart multi-pointer tracking.
        self.long_press = None;
        self.long_press_fired = false;
        self.restart_tracking();
        Vec::new()
    }

    fn pointer_moved(&mut self, id: PointerId, x: f32, y: f32) -> Vec<GestureEvent> {
        match self.pointers.get_mut(&id) {
            Some(position) => *position = (x, y),
            None => return Vec::new(),
        }

        if self.pointers.len() == 1 {
            self.single_pointer_moved(x, y)
        } else {
            self.multi_pointer_moved()
        }
    }

    fn pointer_up(&mut self, id: PointerId, terminal: GestureEvent) -> Vec<GestureEvent> {
        if self.pointers.remove(&id).is_none() {
            return Vec::new();
        }
        self.sync_pointer_count();

        if self.pointers.is_empty() {
            self.state.reset();
            self.span = None;
            self.scrolling = false;
            self.long_press = None;
            self.long_press_fired = false;
            return vec![terminal];
        }

        self.restart_tracking();
        Vec::new()
    }

    //--- Movement ---------------------------------------------------------

    fn single_pointer_moved(&mut self, x: f32, y: f32) -> Vec<GestureEvent> {
        if self.long_press_fired {
            return Vec::new();
        }
        if !self.scrolling {
            let Some(candidate) = self.long_press else {
                // A second pointer was involved.
                return self.begin_scroll_from_last(x, y);
            };
            let (ox, oy) = candidate.origin;
            if distance((ox, oy), (x, y)) <= TOUCH_SLOP {
                return Vec::new();
            }
            self.long_press = None;
            self.scrolling = true;
        }

        self.scroll_to(x, y, 1)
    }

    fn begin_scroll_from_last(&mut self, x: f32, y: f32) -> Vec<GestureEvent> {
        let Some(last) = self.state.last_position else {
            self.state.last_position = Some((x, y));
            return Vec::new();
        };
        if distance(last, (x, y)) <= TOUCH_SLOP {
            return Vec::new();
        }
        self.scrolling = true;
        self.scroll_to(x, y, 1)
    }

    fn scroll_to(&mut self, x: f32, y: f32, pointer_count: usize) -> Vec<GestureEvent> {
        let (lx, ly) = self.state.last_position.unwrap_or((x, y));
        self.state.last_position = Some((x, y));
        vec![GestureEvent::Scroll {
            pointer_count,
            distance_x: lx - x,
            distance_y: ly - y,
        }]
    }

    fn multi_pointer_moved(&mut self) -> Vec<GestureEvent> {
        let focus = self.focus();
        let span = self.current_span();
        let mut events = Vec::with_capacity(2);

        if let Some(previous) = self.span.filter(|s| *s > 0.0) {
            let scale_factor = span / previous;
            if (scale_factor - 1.0).abs() > SCALE_EPSILON {
                self.state.scale_factor = scale_factor;
                events.push(GestureEvent::Scale {
                    scale_factor,
                    focus_x: focus.0,
                    focus_y: focus.1,
                });
            }
        }
        self.span = Some(span);
        self.state.focus = focus;

        let pointer_count = self.pointers.len();
        events.extend(self.scroll_to(focus.0, focus.1, pointer_count));
        events
    }

    //--- Internal Helpers -------------------------------------------------

    /// Re-baselines focus and span after the pointer set changed, so the
    /// change itself is not reported as a jump.
    fn restart_tracking(&mut self) {
        let focus = self.focus();
        self.state.focus = focus;
        self.state.last_position = Some(focus);
        self.span = if self.pointers.len() >= 2 {
            Some(self.current_span())
        } else {
            None
        };
        self.scrolling = self.pointers.len() == 1;
    }

    fn sync_pointer_count(&mut self) {
        self.state.pointer_count = self.pointers.len();
    }

    fn focus(&self) -> (f32, f32) {
        let count = self.pointers.len().max(1) as f32;
        let (sx, sy) = self
            .pointers
            .values()
            .fold((0.0, 0.0), |(ax, ay), (x, y)| (ax + x, ay + y));
        (sx / count, sy / count)
    }

    /// Average distance of pointers from the focus.
    fn current_span(&self) -> f32 {
        let focus = self.focus();
        let count = self.pointers.len().max(1) as f32;
        self.pointers
            .values()
            .map(|p| distance(*p, focus))
            .sum::<f32>()
            / count
    }
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

//=========================================================================
// Unit Tests
//=========================================================================
