//! Playback scheduler.
//!
//! Advances the playhead by measured wall time on every tick. Near a clip's
//! end the playhead snaps into a contiguous next clip instead of stalling on
//! the boundary; at the end of the timeline playback stops.

use std::time::Instant;

use montage_common::{DriftMeasurement, ElapsedClock, SyncPolicy};
use montage_timeline_store::{TimeSource, TimelineStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    Stopped,
    Running,
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Not running; nothing was written.
    Idle,
    Advanced { time: f64 },
    /// Jumped across a clip boundary.
    Snapped { from: f64, to: f64 },
    /// Reached the end of the timeline and stopped.
    Ended { time: f64 },
}

impl TickOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TickOutcome::Idle | TickOutcome::Ended { .. })
    }
}

#[derive(Debug)]
pub struct PlaybackScheduler {
    policy: SyncPolicy,
    clock: ElapsedClock,
    state: SchedulerState,
    /// Elapsed time not yet committed because it was below the store's
    /// jitter guard.
    carry: f64,
}

impl PlaybackScheduler {
    pub fn new(policy: SyncPolicy) -> Self {
        Self {
            policy,
            clock: ElapsedClock::new(),
            state: SchedulerState::Stopped,
            carry: 0.0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// Start playing from the current playhead.
    ///
    /// Requires at least one clip. A playhead at (or within `time_epsilon`
    /// of) the end rewinds to 0 first. The elapsed-time baseline is reset to `now`, so time spent
    /// paused is never counted.
    pub fn play(&mut self, store: &mut TimelineStore, now: Instant) -> bool {
        if self.is_running() && store.is_playing() {
            return true;
        }
        if store.project().clips.is_empty() {
            tracing::debug!("Nothing to play");
            return false;
        }
        let end = store.project().duration - self.policy.time_epsilon;
        if !store.is_playing() && store.current_time() >= end {
            store.set_current_time(0.0, TimeSource::Scrub);
        }
        if !store.is_playing() && !store.set_playing(true) {
            return false;
        }

        self.clock.reset(now);
        self.state = SchedulerState::Running;
        tracing::info!(time = store.current_time(), "Playback started");
        true
    }

    /// Stop synchronously. Safe to call when already stopped.
    pub fn pause(&mut self, store: &mut TimelineStore) {
        let was_running = self.is_running();
        self.halt();
        store.set_playing(false);
        if was_running {
            tracing::info!(time = store.current_time(), "Playback paused");
        }
    }

    /// Advance the playhead by the wall time since the previous tick.
    ///
    /// `media_hint` is the global time reported by the active element; it
    /// replaces the store's time only when the two differ by more than
    /// `playback_resync`.
    pub fn tick(
        &mut self,
        store: &mut TimelineStore,
        now: Instant,
        media_hint: Option<f64>,
    ) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Idle;
        }
        if !store.is_playing() {
            // Stopped from elsewhere (last clip removed, external pause).
            self.halt();
            return TickOutcome::Idle;
        }

        let elapsed = self.clock.lap(now) + self.carry;
        self.carry = 0.0;
        let mut base = store.current_time();
        if let Some(hint) = media_hint {
            let drift = DriftMeasurement::new(base, hint);
            if drift.exceeds(self.policy.playback_resync) {
                tracing::debug!(
                    scheduler = base,
                    media = hint,
                    drift = drift.drift(),
                    "Adopting media position"
                );
                base = hint;
            }
        }

        let new_time = base + elapsed;
        let duration = store.project().duration;
        if new_time >= duration {
            store.set_current_time(duration, TimeSource::Playback);
            self.halt();
            store.set_playing(false);
            tracing::info!(time = duration, "Playback reached end");
            return TickOutcome::Ended { time: duration };
        }

        if let Some(to) = self.boundary_snap(store, new_time) {
            store.set_current_time(to, TimeSource::Playback);
            tracing::debug!(from = new_time, to, "Snapped into next clip");
            return TickOutcome::Snapped { from: new_time, to };
        }

        if !store.set_current_time(new_time, TimeSource::Playback) {
            self.carry = elapsed;
        }
        TickOutcome::Advanced { time: new_time }
    }

    /// Target time when `t` sits within `boundary_snap` of its clip's end
    /// and a contiguous next clip follows.
    fn boundary_snap(&self, store: &TimelineStore, t: f64) -> Option<f64> {
        let clips = &store.project().clips;
        let idx = clips.iter().position(|c| c.contains(t))?;
        let clip = &clips[idx];
        if clip.end_time - t > self.policy.boundary_snap {
            return None;
        }
        let next = clips.get(idx + 1)?;
        self.policy
            .is_contiguous(next.start_time, clip.end_time)
            .then_some(next.start_time + self.policy.time_epsilon)
    }

    fn halt(&mut self) {
        self.carry = 0.0;
        self.clock.clear();
        self.state = SchedulerState::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use montage_project_model::{ClipDraft, MediaSource};
    use std::time::Duration;

    fn store_with(durations: &[f64]) -> TimelineStore {
        let mut store = TimelineStore::empty("sched");
        for (i, d) in durations.iter().enumerate() {
            store.add_clip(ClipDraft::new(
                format!("clip-{i}"),
                MediaSource::Url {
                    url: format!("https://cdn.example/{i}.mp4"),
                },
                *d,
            ));
        }
        let first = store.project().clips[0].id.clone();
        store.select_clip(&first);
        store
    }

    #[test]
    fn test_play_requires_clips() {
        let mut store = TimelineStore::empty("empty");
        let mut scheduler = PlaybackScheduler::new(SyncPolicy::default());
        assert!(!scheduler.play(&mut store, Instant::now()));
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert!(!store.is_playing());
    }

    #[test]
    fn test_tick_advances_by_elapsed_time() {
        let mut store = store_with(&[10.0]);
        let mut scheduler = PlaybackScheduler::new(SyncPolicy::default());
        let t0 = Instant::now();
        assert!(scheduler.play(&mut store, t0));

        let outcome = scheduler.tick(&mut store, t0 + Duration::from_millis(40), None);
        assert!(matches!(outcome, TickOutcome::Advanced { .. }));
        assert!((store.current_time() - 0.04).abs() < 1e-9);

        // A late timer still advances by the real gap.
        scheduler.tick(&mut store, t0 + Duration::from_millis(140), None);
        assert!((store.current_time() - 0.14).abs() < 1e-9);
    }

    #[test]
    fn test_short_ticks_accumulate() {
        let mut store = store_with(&[10.0]);
        let mut scheduler = PlaybackScheduler::new(SyncPolicy::default());
        let t0 = Instant::now();
        scheduler.play(&mut store, t0);

        scheduler.tick(&mut store, t0 + Duration::from_millis(4), None);
        assert_eq!(store.current_time(), 0.0);
        scheduler.tick(&mut store, t0 + Duration::from_millis(8), None);
        assert_eq!(store.current_time(), 0.0);
        scheduler.tick(&mut store, t0 + Duration::from_millis(12), None);
        assert!((store.current_time() - 0.012).abs() < 1e-9);
    }

    #[test]
    fn test_snaps_into_contiguous_next_clip() {
        let mut store = store_with(&[10.0, 8.0]);
        store.set_current_time(9.97, TimeSource::Scrub);
        let second = store.project().clips[1].id.clone();

        let mut scheduler = PlaybackScheduler::new(SyncPolicy::default());
        let t0 = Instant::now();
        scheduler.play(&mut store, t0);
        let outcome = scheduler.tick(&mut store, t0, None);

        match outcome {
            TickOutcome::Snapped { to, .. } => assert!((to - 10.01).abs() < 1e-9),
            other => panic!("expected snap, got {other:?}"),
        }
        assert!((store.current_time() - 10.01).abs() < 1e-9);
        assert_eq!(store.project().active_clip_id.as_ref(), Some(&second));
    }

    #[test]
    fn test_no_snap_on_last_clip() {
        let mut store = store_with(&[10.0]);
        store.set_current_time(9.97, TimeSource::Scrub);
        let mut scheduler = PlaybackScheduler::new(SyncPolicy::default());
        let t0 = Instant::now();
        scheduler.play(&mut store, t0);
        let outcome = scheduler.tick(&mut store, t0 + Duration::from_millis(10), None);
        assert!(matches!(outcome, TickOutcome::Advanced { .. }));
    }

    #[test]
    fn test_reaching_end_clamps_and_stops() {
        let mut store = store_with(&[2.0]);
        let mut scheduler = PlaybackScheduler::new(SyncPolicy::default());
        let t0 = Instant::now();
        scheduler.play(&mut store, t0);

        let outcome = scheduler.tick(&mut store, t0 + Duration::from_secs(5), None);
        assert_eq!(outcome, TickOutcome::Ended { time: 2.0 });
        assert!((store.current_time() - 2.0).abs() < 1e-9);
        assert!(!store.is_playing());
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert_eq!(
            scheduler.tick(&mut store, t0 + Duration::from_secs(6), None),
            TickOutcome::Idle
        );
    }

    #[test]
    fn test_ending_just_short_of_duration_lands_on_end() {
        let mut store = store_with(&[10.0]);
        store.set_current_time(9.995, TimeSource::Scrub);
        let mut scheduler = PlaybackScheduler::new(SyncPolicy::default());
        let t0 = Instant::now();
        scheduler.play(&mut store, t0);

        let outcome = scheduler.tick(&mut store, t0 + Duration::from_millis(16), None);
        assert_eq!(outcome, TickOutcome::Ended { time: 10.0 });
        assert_eq!(store.current_time(), 10.0);
        assert!(!store.is_playing());
    }

    #[test]
    fn test_play_after_natural_end_rewinds() {
        let mut store = store_with(&[0.5]);
        let mut scheduler = PlaybackScheduler::new(SyncPolicy::default());
        let mut now = Instant::now();
        scheduler.play(&mut store, now);
        loop {
            now += Duration::from_millis(16);
            if scheduler.tick(&mut store, now, None).is_terminal() {
                break;
            }
        }
        assert_eq!(store.current_time(), 0.5);

        assert!(scheduler.play(&mut store, now));
        assert_eq!(store.current_time(), 0.0);
        assert!(store.is_playing());
    }

    #[test]
    fn test_play_at_end_rewinds() {
        let mut store = store_with(&[2.0]);
        store.set_current_time(2.0, TimeSource::Scrub);
        let mut scheduler = PlaybackScheduler::new(SyncPolicy::default());
        assert!(scheduler.play(&mut store, Instant::now()));
        assert_eq!(store.current_time(), 0.0);
    }

    #[test]
    fn test_resume_does_not_count_pause() {
        let mut store = store_with(&[60.0]);
        let mut scheduler = PlaybackScheduler::new(SyncPolicy::default());
        let t0 = Instant::now();
        scheduler.play(&mut store, t0);
        scheduler.tick(&mut store, t0 + Duration::from_secs(1), None);
        scheduler.pause(&mut store);
        assert!(!store.is_playing());

        let resume = t0 + Duration::from_secs(30);
        scheduler.play(&mut store, resume);
        scheduler.tick(&mut store, resume + Duration::from_millis(500), None);
        assert!((store.current_time() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_media_hint_adopted_only_beyond_resync() {
        let mut store = store_with(&[60.0]);
        let mut scheduler = PlaybackScheduler::new(SyncPolicy::default());
        let t0 = Instant::now();
        scheduler.play(&mut store, t0);
        scheduler.tick(&mut store, t0 + Duration::from_secs(1), None);

        scheduler.tick(&mut store, t0 + Duration::from_secs(2), Some(1.2));
        assert!((store.current_time() - 2.0).abs() < 1e-9);

        scheduler.tick(&mut store, t0 + Duration::from_secs(3), Some(5.0));
        assert!((store.current_time() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_external_stop_is_observed() {
        let mut store = store_with(&[10.0]);
        let mut scheduler = PlaybackScheduler::new(SyncPolicy::default());
        let t0 = Instant::now();
        scheduler.play(&mut store, t0);
        store.set_playing(false);
        assert_eq!(
            scheduler.tick(&mut store, t0 + Duration::from_millis(16), None),
            TickOutcome::Idle
        );
        assert!(!scheduler.is_running());
    }
}
