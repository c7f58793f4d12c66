//! Async tick loop around the scheduler.
//!
//! The driver borrows the store and pool for the length of one playback run
//! and interleaves three inputs on a single task: the pause signal, element
//! events, and the tick timer, in that priority. A pause is therefore always
//! observed before the next tick.

use std::time::Duration;

use montage_common::{PlaybackConfig, SyncPolicy};
use montage_timeline_store::TimelineStore;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};

use crate::element::ElementEvent;
use crate::pool::MediaPool;
use crate::scheduler::{PlaybackScheduler, TickOutcome};

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The playhead reached the end of the timeline.
    Ended,
    /// The pause signal was raised (or its sender dropped).
    Paused,
    /// Playback was stopped through the store.
    Stopped,
    /// Playback could not start (empty timeline or paused at start).
    NotStarted,
}

/// Inputs a run listens to.
#[derive(Debug)]
pub struct DriverIo {
    pub pause: watch::Receiver<bool>,
    pub events: Option<mpsc::UnboundedReceiver<ElementEvent>>,
}

impl DriverIo {
    pub fn new(pause: watch::Receiver<bool>) -> Self {
        Self {
            pause,
            events: None,
        }
    }

    pub fn with_events(mut self, events: mpsc::UnboundedReceiver<ElementEvent>) -> Self {
        self.events = Some(events);
        self
    }
}

#[derive(Debug)]
pub struct PlaybackDriver {
    scheduler: PlaybackScheduler,
    tick_interval: Duration,
}

impl PlaybackDriver {
    pub fn new(policy: SyncPolicy, config: &PlaybackConfig) -> Self {
        Self {
            scheduler: PlaybackScheduler::new(policy),
            tick_interval: Duration::from_millis(config.tick_interval_ms.max(1)),
        }
    }

    pub fn scheduler(&self) -> &PlaybackScheduler {
        &self.scheduler
    }

    /// Play until the end, a pause signal, or an external stop.
    pub async fn run(
        &mut self,
        store: &mut TimelineStore,
        mut pool: Option<&mut MediaPool>,
        io: &mut DriverIo,
    ) -> StopReason {
        if *io.pause.borrow_and_update() {
            return StopReason::NotStarted;
        }
        if !self.scheduler.play(store, Instant::now().into_std()) {
            return StopReason::NotStarted;
        }
        if let Some(pool) = pool.as_deref_mut() {
            pool.reconcile(store.state());
        }

        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            tokio::select! {
                biased;

                changed = io.pause.changed() => {
                    let paused = changed.is_err() || *io.pause.borrow_and_update();
                    if paused {
                        self.scheduler.pause(store);
                        if let Some(pool) = pool.as_deref_mut() {
                            pool.reconcile(store.state());
                        }
                        return StopReason::Paused;
                    }
                }

                Some(event) = next_event(&mut io.events) => {
                    if let Some(pool) = pool.as_deref_mut() {
                        pool.handle_event(event);
                    }
                }

                _ = interval.tick() => {
                    let hint = pool.as_deref_mut().and_then(|p| p.take_time_hint());
                    let outcome = self.scheduler.tick(store, Instant::now().into_std(), hint);
                    if let Some(pool) = pool.as_deref_mut() {
                        pool.reconcile(store.state());
                    }
                    match outcome {
                        TickOutcome::Ended { .. } => return StopReason::Ended,
                        TickOutcome::Idle => return StopReason::Stopped,
                        TickOutcome::Advanced { .. } | TickOutcome::Snapped { .. } => {}
                    }
                }
            }
        }
    }
}

async fn next_event(
    events: &mut Option<mpsc::UnboundedReceiver<ElementEvent>>,
) -> Option<ElementEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
