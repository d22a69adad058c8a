//=========================================================================
// Location Feed Coordinator
//=========================================================================
//
// Subscribes to a location source while the view is visible and forwards
// every fix to the engine as a camera position.
//
// Architecture:
// ```text
// LocationSource ──fix──> [unbounded channel] ──> feed worker ──> EngineSlot
//                                                   ↑     ↑
//                                      cancel (drop)   replay timer
// ```
//
// One worker per session. `stop()` removes the subscription, drops the
// cancel sender and joins the worker, so nothing is forwarded once it
// returns.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{after, bounded, never, select, unbounded, Receiver, Sender, TryRecvError};
use log::{debug, info, trace, warn};

//=== Internal Dependencies ===============================================

use super::{LocationError, LocationFix, LocationSource, SubscriptionId, UpdateRequest};
use crate::core::engine_bridge::EngineSlot;

//=== Defaults ============================================================

/// Delay before the cached last-known fix is replayed after `start()`.
pub const DEFAULT_REPLAY_DELAY: Duration = Duration::from_millis(500);

//=== LocationConfig ======================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationConfig {
    pub request: UpdateRequest,
    pub replay_delay: Duration,

    /// Bearings reported with a larger error (degrees) are dropped.
    /// `None` keeps every finite bearing.
    pub bearing_accuracy_limit: Option<f32>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            request: UpdateRequest::default(),
            replay_delay: DEFAULT_REPLAY_DELAY,
            bearing_accuracy_limit: None,
        }
    }
}

//=== FeedSession =========================================================

struct FeedSession {
    subscription: SubscriptionId,
    cancel: Sender<()>,
    worker: JoinHandle<()>,
}

//=== LocationFeedCoordinator =============================================

pub struct LocationFeedCoordinator {
    slot: EngineSlot,
    source: Arc<dyn LocationSource>,
    config: LocationConfig,
    session: Option<FeedSession>,
}

impl LocationFeedCoordinator {
    pub fn new(slot: EngineSlot, source: Arc<dyn LocationSource>, config: LocationConfig) -> Self {
        Self {
            slot,
            source,
            config,
            session: None,
        }
    }

    //--- Lifecycle --------------------------------------------------------

    /// Subscribes to the source and starts forwarding fixes.
    ///
    /// No-op while already running.
    pub fn start(&mut self) -> Result<(), LocationError> {
        if self.session.is_some() {
            debug!(target: "location", "Feed already running");
            return Ok(());
        }

        let (fix_tx, fix_rx) = unbounded();
        let subscription = self.source.request_updates(&self.config.request, fix_tx)?;
        let (cancel_tx, cancel_rx) = bounded(0);

        let worker = FeedWorker {
            slot: self.slot.clone(),
            source: Arc::clone(&self.source),
            fixes: fix_rx,
            cancel: cancel_rx,
            replay_delay: self.config.replay_delay,
            bearing_accuracy_limit: self.config.bearing_accuracy_limit,
        };

        let handle = match thread::Builder::new()
            .name("location-feed".into())
            .spawn(move || worker.run())
        {
            Ok(handle) => handle,
            Err(e) => {
                self.source.remove_updates(subscription);
                return Err(LocationError::Subscription(format!(
                    "failed to spawn feed worker: {}",
                    e
                )));
            }
        };

        info!(
            target: "location",
            "Location feed started ({}, every {:?} / {} m)",
            subscription,
            self.config.request.min_interval,
            self.config.request.min_distance_m
        );

        self.session = Some(FeedSession {
            subscription,
            cancel: cancel_tx,
            worker: handle,
        });
        Ok(())
    }

    /// Removes the subscription and joins the worker, cancelling any
    /// pending replay. No-op without a prior `start()`.
    pub fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            trace!(target: "location", "Feed not running, nothing to stop");
            return;
        };

        self.source.remove_updates(session.subscription);
        drop(session.cancel);

        if session.worker.join().is_err() {
            warn!(target: "location", "Feed worker panicked");
        }

        info!(target: "location", "Location feed stopped ({})", session.subscription);
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn config(&self) -> &LocationConfig {
        &self.config
    }
}

impl Drop for LocationFeedCoordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

//=== FeedWorker ==========================================================

enum FeedEvent {
    Replay,
    /// `None` once the source dropped its sender.
    Fix(Option<LocationFix>),
}

struct FeedWorker {
    slot: EngineSlot,
    source: Arc<dyn LocationSource>,
    fixes: Receiver<LocationFix>,
    cancel: Receiver<()>,
    replay_delay: Duration,
    bearing_accuracy_limit: Option<f32>,
}

impl FeedWorker {
    fn run(self) {
        // Delivers exactly one tick, then stays silent.
        let replay = after(self.replay_delay);
        let mut fixes = self.fixes.clone();

        loop {
            let event = select! {
                recv(self.cancel) -> _ => break,
                recv(replay) -> _ => FeedEvent::Replay,
                recv(fixes) -> msg => FeedEvent::Fix(msg.ok()),
            };

            match event {
                FeedEvent::Replay => match self.source.last_known_location() {
                    Some(fix) => {
                        debug!(target: "location", "Replaying last known fix");
                        self.forward(fix);
                    }
                    None => trace!(target: "location", "No last known fix to replay"),
                },
                FeedEvent::Fix(Some(fix)) => self.forward(fix),
                FeedEvent::Fix(None) => {
                    // Keep serving the replay until stop() cancels.
                    debug!(target: "location", "Source closed its sender");
                    fixes = never();
                }
            }
        }
    }

    fn forward(&self, fix: LocationFix) {
        // A fix already queued when stop() began must not be delivered.
        if let Err(TryRecvError::Disconnected) = self.cancel.try_recv() {
            return;
        }

        if !fix.has_valid_position() {
            warn!(
                target: "location",
                "Discarding fix with invalid position ({}, {})",
                fix.latitude,
                fix.longitude
            );
            return;
        }

        let fix = fix.normalized(self.bearing_accuracy_limit);
        debug!(
            target: "location",
            "Fix lat={:.6} lon={:.6} bearing={:?}",
            fix.latitude,
            fix.longitude,
            fix.bearing
        );

        let delivered = self.slot.with_live(|handle| {
            handle
                .engine()
                .set_lat_lon_bearing(fix.latitude, fix.longitude, fix.bearing)
        });

        if delivered.is_none() {
            debug!(target: "location", "Dropped fix, engine not ready");
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{CallLog, EngineCall, ManualLocationSource, RecordingEngine};
    use std::time::Instant;

    fn is_fix(call: &EngineCall) -> bool {
        matches!(call, EngineCall::LatLonBearing(..))
    }

    fn wait_until(condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        condition()
    }

    fn setup(config: LocationConfig) -> (LocationFeedCoordinator, ManualLocationSource, CallLog) {
        let slot = EngineSlot::new();
        let (engine, log) = RecordingEngine::new();
        slot.install(Box::new(engine));
        let source = ManualLocationSource::new();
        let coordinator = LocationFeedCoordinator::new(slot, Arc::new(source.clone()), config);
        (coordinator, source, log)
    }

    fn long_replay() -> LocationConfig {
        LocationConfig {
            replay_delay: Duration::from_secs(60),
            ..LocationConfig::default()
        }
    }

    #[test]
    fn forwards_fix_with_bearing() {
        let (mut feed, source, log) = setup(long_replay());
        feed.start().unwrap();

        source.emit(LocationFix::new(35.72, 139.77).with_bearing(90.0));

        assert!(wait_until(|| log.count(is_fix) == 1));
        assert_eq!(
            log.last(),
            Some(EngineCall::LatLonBearing(35.72, 139.77, Some(90.0)))
        );
    }

    #[test]
    fn forwards_fix_without_bearing() {
        let (mut feed, source, log) = setup(long_replay());
        feed.start().unwrap();

        source.emit(LocationFix::new(35.72, 139.77));

        assert!(wait_until(|| log.count(is_fix) == 1));
        assert_eq!(log.last(), Some(EngineCall::LatLonBearing(35.72, 139.77, None)));
    }

    #[test]
    fn replays_last_known_after_delay() {
        let config = LocationConfig {
            replay_delay: Duration::from_millis(50),
            ..LocationConfig::default()
        };
        let (mut feed, source, log) = setup(config);
        source.set_last_known(Some(LocationFix::new(1.0, 2.0)));

        feed.start().unwrap();
        assert_eq!(log.count(is_fix), 0);

        assert!(wait_until(|| log.count(is_fix) == 1));
        assert_eq!(log.last(), Some(EngineCall::LatLonBearing(1.0, 2.0, None)));
    }

    #[test]
    fn stop_cancels_pending_replay() {
        let config = LocationConfig {
            replay_delay: Duration::from_millis(50),
            ..LocationConfig::default()
        };
        let (mut feed, source, log) = setup(config);
        source.set_last_known(Some(LocationFix::new(1.0, 2.0)));

        feed.start().unwrap();
        feed.stop();
        thread::sleep(Duration::from_millis(120));

        assert_eq!(log.count(is_fix), 0);
    }

    #[test]
    fn stop_without_start_is_noop() {
        let (mut feed, source, log) = setup(LocationConfig::default());

        feed.stop();

        assert!(!feed.is_running());
        assert!(source.removed().is_empty());
        assert!(log.calls().is_empty());
    }

    #[test]
    fn no_fix_reaches_engine_after_stop() {
        let (mut feed, source, log) = setup(long_replay());
        feed.start().unwrap();
        let late_sink = source.leak_sink().unwrap();

        feed.stop();
        let _ = late_sink.send(LocationFix::new(10.0, 20.0));
        source.emit(LocationFix::new(10.0, 20.0));
        thread::sleep(Duration::from_millis(50));

        assert_eq!(log.count(is_fix), 0);
        assert_eq!(source.active_subscriptions(), 0);
        assert_eq!(source.removed(), vec![SubscriptionId::new(1)]);
    }

    #[test]
    fn queued_fix_is_dropped_once_stop_begins() {
        let slot = EngineSlot::new();
        let (engine, log, gate) = RecordingEngine::gated_positions();
        slot.install(Box::new(engine));
        let source = ManualLocationSource::new();
        let mut feed =
            LocationFeedCoordinator::new(slot, Arc::new(source.clone()), long_replay());
        feed.start().unwrap();

        source.emit(LocationFix::new(1.0, 1.0));
        source.emit(LocationFix::new(2.0, 2.0));
        gate.entered.recv_timeout(Duration::from_secs(2)).unwrap();

        // First fix is inside the engine, second one is queued behind it.
        let stopper = thread::spawn(move || {
            feed.stop();
            feed
        });
        assert!(wait_until(|| !source.removed().is_empty()));
        thread::sleep(Duration::from_millis(50));
        gate.release.send(()).unwrap();

        let feed = stopper.join().unwrap();
        assert!(!feed.is_running());
        assert_eq!(log.count(is_fix), 1);
        assert_eq!(log.last(), Some(EngineCall::LatLonBearing(1.0, 1.0, None)));
    }

    #[test]
    fn replay_survives_source_closing_its_sender() {
        let config = LocationConfig {
            replay_delay: Duration::from_millis(20),
            ..LocationConfig::default()
        };
        let (mut feed, source, log) = setup(config);
        source.set_last_known(Some(LocationFix::new(1.0, 2.0)));

        feed.start().unwrap();
        source.close_sinks();

        assert!(wait_until(|| log.count(is_fix) == 1));
        assert_eq!(log.last(), Some(EngineCall::LatLonBearing(1.0, 2.0, None)));
        assert!(feed.is_running());

        feed.stop();
        assert!(!feed.is_running());
    }

    #[test]
    fn start_twice_subscribes_once() {
        let (mut feed, source, _) = setup(long_replay());

        feed.start().unwrap();
        feed.start().unwrap();

        assert_eq!(source.active_subscriptions(), 1);
    }

    #[test]
    fn restart_after_stop_resubscribes() {
        let (mut feed, source, log) = setup(long_replay());

        feed.start().unwrap();
        feed.stop();
        feed.start().unwrap();
        source.emit(LocationFix::new(3.0, 4.0));

        assert!(wait_until(|| log.count(is_fix) == 1));
        assert_eq!(source.active_subscriptions(), 1);
    }

    #[test]
    fn rejected_subscription_surfaces_error() {
        let (mut feed, source, _) = setup(LocationConfig::default());
        source.reject_with(LocationError::PermissionDenied);

        assert_eq!(feed.start(), Err(LocationError::PermissionDenied));
        assert!(!feed.is_running());
    }

    #[test]
    fn fix_dropped_while_engine_absent() {
        let slot = EngineSlot::new();
        let source = ManualLocationSource::new();
        let mut feed =
            LocationFeedCoordinator::new(slot.clone(), Arc::new(source.clone()), long_replay());
        feed.start().unwrap();

        source.emit(LocationFix::new(5.0, 6.0));
        thread::sleep(Duration::from_millis(30));

        // Installing later must not flush anything queued earlier.
        let (engine, log) = RecordingEngine::new();
        slot.install(Box::new(engine));
        thread::sleep(Duration::from_millis(30));

        assert_eq!(log.count(is_fix), 0);
    }

    #[test]
    fn low_confidence_bearing_is_not_forwarded() {
        let config = LocationConfig {
            bearing_accuracy_limit: Some(20.0),
            ..long_replay()
        };
        let (mut feed, source, log) = setup(config);
        feed.start().unwrap();

        source.emit(
            LocationFix::new(1.0, 1.0)
                .with_bearing(180.0)
                .with_bearing_accuracy(45.0),
        );

        assert!(wait_until(|| log.count(is_fix) == 1));
        assert_eq!(log.last(), Some(EngineCall::LatLonBearing(1.0, 1.0, None)));
    }

    #[test]
    fn invalid_position_is_discarded() {
        let (mut feed, source, log) = setup(long_replay());
        feed.start().unwrap();

        source.emit(LocationFix::new(f64::NAN, 0.0));
        source.emit(LocationFix::new(7.0, 8.0));

        assert!(wait_until(|| log.count(is_fix) == 1));
        assert_eq!(log.last(), Some(EngineCall::LatLonBearing(7.0, 8.0, None)));
    }
}
