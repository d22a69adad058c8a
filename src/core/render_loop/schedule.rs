//=========================================================================
// Frame Scheduling Types
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

//=== FrameRateRange ======================================================

/// Refresh-rate window advertised to a display-refresh driven host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRateRange {
    min_hz: u32,
    max_hz: u32,
    preferred_hz: u32,
}

impl FrameRateRange {
    /// # Panics
    ///
    /// Panics unless `0 < min_hz <= preferred_hz <= max_hz`.
    pub fn new(min_hz: u32, max_hz: u32, preferred_hz: u32) -> Self {
        assert!(min_hz > 0, "Frame rate must be positive");
        assert!(
            min_hz <= preferred_hz && preferred_hz <= max_hz,
            "Preferred frame rate {} outside {}..={}",
            preferred_hz,
            min_hz,
            max_hz
        );
        Self {
            min_hz,
            max_hz,
            preferred_hz,
        }
    }

    pub fn min_hz(&self) -> u32 {
        self.min_hz
    }

    pub fn max_hz(&self) -> u32 {
        self.max_hz
    }

    pub fn preferred_hz(&self) -> u32 {
        self.preferred_hz
    }

    /// Frame period at the preferred rate.
    pub fn preferred_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.preferred_hz as f64)
    }
}

impl Default for FrameRateRange {
    fn default() -> Self {
        Self::new(30, 60, 60)
    }
}

//=== FrameSchedule =======================================================

/// Who decides when the next frame is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameSchedule {
    /// A worker thread renders, then immediately requests the next frame,
    /// waiting at least `min_frame_interval` between frame starts.
    Dedicated { min_frame_interval: Duration },

    /// The host calls `on_frame()` from its display-refresh callback.
    HostDriven(FrameRateRange),
}

impl Default for FrameSchedule {
    fn default() -> Self {
        FrameSchedule::HostDriven(FrameRateRange::default())
    }
}

//=== FrameOutcome ========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered,

    /// The engine reported a frame error; the loop keeps going.
    Failed,

    /// No frame was attempted (loop not running or no engine).
    Skipped,
}

//=== FrameStats ==========================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub rendered: u64,
    pub failed: u64,
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_range_is_30_to_60() {
        let range = FrameRateRange::default();
        assert_eq!(range.min_hz(), 30);
        assert_eq!(range.max_hz(), 60);
        assert_eq!(range.preferred_hz(), 60);
    }

    #[test]
    fn preferred_interval() {
        let range = FrameRateRange::new(10, 50, 50);
        assert_eq!(range.preferred_interval(), Duration::from_millis(20));
    }

    #[test]
    #[should_panic(expected = "Frame rate must be positive")]
    fn zero_rate_panics() {
        FrameRateRange::new(0, 60, 60);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn preferred_outside_range_panics() {
        FrameRateRange::new(30, 60, 120);
    }

    #[test]
    fn default_schedule_is_host_driven() {
        assert_eq!(
            FrameSchedule::default(),
            FrameSchedule::HostDriven(FrameRateRange::default())
        );
    }
}
