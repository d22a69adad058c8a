//=========================================================================
// Render Loop Driver
//=========================================================================
//
// Keeps the engine redrawing while a surface is live.
//
// Architecture:
// ```text
// Dedicated:   begin() ──spawn──> [render-loop thread]
//                                   loop: render → pace → render ...
//                                   exits on halt() or absent slot
//
// HostDriven:  display refresh ──> on_frame() ──> render
// ```
//
// Frame failures are counted and logged; they never stop the loop.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use log::{debug, info, trace, warn};

//=== Internal Dependencies ===============================================

use super::{FrameOutcome, FrameRateRange, FrameSchedule, FrameStats};
use crate::core::engine_bridge::EngineSlot;

//=== FrameCounters =======================================================

#[derive(Default)]
struct FrameCounters {
    rendered: AtomicU64,
    failed: AtomicU64,
}

impl FrameCounters {
    fn snapshot(&self) -> FrameStats {
        FrameStats {
            rendered: self.rendered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

//=== RenderLoopDriver ====================================================

pub struct RenderLoopDriver {
    slot: EngineSlot,
    schedule: FrameSchedule,
    running: Arc<AtomicBool>,
    counters: Arc<FrameCounters>,
    worker: Option<(Sender<()>, JoinHandle<()>)>,
}

impl RenderLoopDriver {
    pub fn new(slot: EngineSlot, schedule: FrameSchedule) -> Self {
        Self {
            slot,
            schedule,
            running: Arc::new(AtomicBool::new(false)),
            counters: Arc::new(FrameCounters::default()),
            worker: None,
        }
    }

    //--- Lifecycle --------------------------------------------------------

    /// Starts the loop. Requires a live engine; returns whether the loop
    /// is running afterwards.
    pub fn begin(&mut self) -> bool {
        if self.is_running() {
            return true;
        }

        // A worker that ended on its own (engine went away) is reaped here.
        self.join_worker();

        if !self.slot.is_live() {
            debug!(target: "render", "Not starting render loop, engine not ready");
            return false;
        }

        self.running.store(true, Ordering::SeqCst);

        match self.schedule {
            FrameSchedule::Dedicated { min_frame_interval } => {
                let (stop_tx, stop_rx) = bounded(0);
                let slot = self.slot.clone();
                let counters = Arc::clone(&self.counters);
                let running = Arc::clone(&self.running);

                let spawned = thread::Builder::new()
                    .name("render-loop".into())
                    .spawn(move || {
                        run_dedicated(&slot, &counters, &stop_rx, min_frame_interval);
                        running.store(false, Ordering::SeqCst);
                    });

                match spawned {
                    Ok(handle) => self.worker = Some((stop_tx, handle)),
                    Err(e) => {
                        warn!(target: "render", "Failed to spawn render thread: {}", e);
                        self.running.store(false, Ordering::SeqCst);
                        return false;
                    }
                }

                info!(
                    target: "render",
                    "Render loop started (dedicated, min interval {:?})",
                    min_frame_interval
                );
            }
            FrameSchedule::HostDriven(range) => {
                info!(
                    target: "render",
                    "Render loop started (host driven, {}-{} Hz, preferred {})",
                    range.min_hz(),
                    range.max_hz(),
                    range.preferred_hz()
                );
            }
        }

        true
    }

    /// Stops the loop. Once this returns no further render call is made.
    pub fn halt(&mut self) {
        let was_running = self.running.swap(false, Ordering::SeqCst);
        let had_worker = self.worker.is_some();
        self.join_worker();

        if was_running || had_worker {
            let stats = self.stats();
            info!(
                target: "render",
                "Render loop halted ({} rendered, {} failed)",
                stats.rendered,
                stats.failed
            );
        }
    }

    fn join_worker(&mut self) {
        if let Some((stop, handle)) = self.worker.take() {
            drop(stop);
            if handle.join().is_err() {
                warn!(target: "render", "Render thread panicked");
            }
        }
    }

    //--- Frames -----------------------------------------------------------

    /// Host display-refresh callback. Renders one frame in host-driven
    /// mode; a dedicated loop renders on its own thread, so this skips.
    pub fn on_frame(&mut self) -> FrameOutcome {
        if !self.is_running() {
            return FrameOutcome::Skipped;
        }

        if let FrameSchedule::Dedicated { .. } = self.schedule {
            trace!(target: "render", "Host frame ignored, dedicated loop running");
            return FrameOutcome::Skipped;
        }

        let outcome = render_frame(&self.slot, &self.counters);
        if outcome == FrameOutcome::Skipped {
            debug!(target: "render", "Engine gone, render loop ends");
            self.running.store(false, Ordering::SeqCst);
        }
        outcome
    }

    //--- Accessors --------------------------------------------------------

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> FrameStats {
        self.counters.snapshot()
    }

    pub fn schedule(&self) -> FrameSchedule {
        self.schedule
    }

    /// Rate window to request from the display link, if host driven.
    pub fn frame_rate_range(&self) -> Option<FrameRateRange> {
        match self.schedule {
            FrameSchedule::HostDriven(range) => Some(range),
            FrameSchedule::Dedicated { .. } => None,
        }
    }
}

impl Drop for RenderLoopDriver {
    fn drop(&mut self) {
        self.halt();
    }
}

//=== Frame Execution =====================================================

fn render_frame(slot: &EngineSlot, counters: &FrameCounters) -> FrameOutcome {
    match slot.with_live(|handle| handle.engine().render()) {
        None => FrameOutcome::Skipped,
        Some(Ok(())) => {
            counters.rendered.fetch_add(1, Ordering::Relaxed);
            trace!(target: "render", "Frame rendered");
            FrameOutcome::Rendered
        }
        Some(Err(e)) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            warn!(target: "render", "Frame failed: {}", e);
            FrameOutcome::Failed
        }
    }
}

fn run_dedicated(
    slot: &EngineSlot,
    counters: &FrameCounters,
    stop: &Receiver<()>,
    min_frame_interval: Duration,
) {
    loop {
        if let Err(TryRecvError::Disconnected) = stop.try_recv() {
            break;
        }

        let frame_start = Instant::now();

        if render_frame(slot, counters) == FrameOutcome::Skipped {
            debug!(target: "render", "Engine gone, render thread exiting");
            break;
        }

        let elapsed = frame_start.elapsed();
        if elapsed < min_frame_interval {
            match stop.recv_timeout(min_frame_interval - elapsed) {
                Err(RecvTimeoutError::Timeout) => {}
                _ => break,
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
