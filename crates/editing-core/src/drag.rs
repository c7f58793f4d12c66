//! Drag and resize gestures for clips and animation spans.
//!
//! Every candidate edit is computed from the anchor captured at
//! pointer-down plus the total pointer displacement, never from the
//! previous intermediate value, so rate-limited emission cannot accumulate
//! drift. Updates are emitted at most once per debounce interval; the last
//! pending update is flushed on pointer-up.

use std::time::Instant;

use montage_common::{EditingConfig, RateController};
use montage_project_model::{AnimationId, AnimationUpdate, ClipId, ClipUpdate};
use montage_timeline_store::TimelineStore;

/// Which edge (or body) of the element is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragMode {
    Move,
    ResizeLeft,
    ResizeRight,
}

/// The element under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragTarget {
    Clip(ClipId),
    Animation {
        clip_id: ClipId,
        animation_id: AnimationId,
    },
}

/// A candidate edit produced by a gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum DragUpdate {
    Clip { id: ClipId, update: ClipUpdate },
    Animation { id: AnimationId, update: AnimationUpdate },
}

impl DragUpdate {
    /// Commit this edit through the store.
    pub fn apply(self, store: &mut TimelineStore) {
        match self {
            DragUpdate::Clip { id, update } => store.update_clip(&id, update),
            DragUpdate::Animation { id, update } => store.update_animation(&id, update),
        }
    }
}

/// Element geometry captured at pointer-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragAnchor {
    pub pointer_x: f64,
    pub start_time: f64,
    pub end_time: f64,
    /// Clips only.
    pub trim_start: f64,
    /// Clips: source length (0 when unknown). Animations: owning clip's
    /// duration.
    pub bound: f64,
}

impl DragAnchor {
    fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Compute a clip edit for a displacement of `delta` seconds.
pub fn clip_update(mode: DragMode, anchor: &DragAnchor, delta: f64, min_duration: f64) -> ClipUpdate {
    // Without a known source length a clip can grow without bound.
    let max_duration = if anchor.bound > 0.0 { anchor.bound } else { f64::INFINITY };
    let min_duration = min_duration.min(max_duration);

    match mode {
        DragMode::Move => ClipUpdate {
            start_time: Some((anchor.start_time + delta).max(0.0)),
            ..ClipUpdate::default()
        },
        DragMode::ResizeRight => {
            let duration = (anchor.duration() + delta).clamp(min_duration, max_duration);
            ClipUpdate {
                duration: Some(duration),
                trim_end: max_duration
                    .is_finite()
                    .then(|| (max_duration - duration).max(0.0)),
                ..ClipUpdate::default()
            }
        }
        DragMode::ResizeLeft => {
            let start = (anchor.start_time + delta)
                .min(anchor.end_time - min_duration)
                .max(0.0)
                .max(anchor.end_time - max_duration);
            let duration = anchor.end_time - start;
            ClipUpdate {
                start_time: Some(start),
                duration: Some(duration),
                trim_start: Some((anchor.trim_start + (start - anchor.start_time)).max(0.0)),
                ..ClipUpdate::default()
            }
        }
    }
}

/// Compute an animation edit for a displacement of `delta` seconds. The span
/// stays inside `[0, anchor.bound]`.
pub fn animation_update(
    mode: DragMode,
    anchor: &DragAnchor,
    delta: f64,
    min_duration: f64,
) -> AnimationUpdate {
    let bound = anchor.bound.max(0.0);
    let min_duration = min_duration.min(bound);

    let (start, end) = match mode {
        DragMode::Move => {
            let length = anchor.duration().min(bound);
            let start = (anchor.start_time + delta).clamp(0.0, bound - length);
            (start, start + length)
        }
        DragMode::ResizeRight => {
            let floor = (anchor.start_time + min_duration).min(bound);
            (anchor.start_time, (anchor.end_time + delta).clamp(floor, bound))
        }
        DragMode::ResizeLeft => {
            let ceiling = (anchor.end_time - min_duration).max(0.0);
            ((anchor.start_time + delta).clamp(0.0, ceiling), anchor.end_time)
        }
    };
    AnimationUpdate::timing(start, end)
}

#[derive(Debug)]
struct DragSession {
    target: DragTarget,
    mode: DragMode,
    anchor: DragAnchor,
    pixels_per_second: f64,
    throttle: RateController,
    pending: Option<DragUpdate>,
}

impl DragSession {
    fn candidate(&self, pointer_x: f64, config: &EditingConfig) -> DragUpdate {
        let delta = (pointer_x - self.anchor.pointer_x) / self.pixels_per_second;
        match &self.target {
            DragTarget::Clip(id) => DragUpdate::Clip {
                id: id.clone(),
                update: clip_update(self.mode, &self.anchor, delta, config.min_clip_duration),
            },
            DragTarget::Animation { animation_id, .. } => DragUpdate::Animation {
                id: animation_id.clone(),
                update: animation_update(
                    self.mode,
                    &self.anchor,
                    delta,
                    config.min_animation_duration,
                ),
            },
        }
    }
}

/// Routes pointer events into rate-limited drag updates.
#[derive(Debug)]
pub struct DragController {
    config: EditingConfig,
    session: Option<DragSession>,
}

impl DragController {
    pub fn new(config: EditingConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Start a gesture on `target`, selecting it in the store.
    ///
    /// Returns false (and starts nothing) when the target does not exist or
    /// `pixels_per_second` is not positive.
    pub fn pointer_down(
        &mut self,
        store: &mut TimelineStore,
        target: DragTarget,
        mode: DragMode,
        pointer_x: f64,
        pixels_per_second: f64,
    ) -> bool {
        if !(pixels_per_second > 0.0 && pixels_per_second.is_finite()) {
            tracing::debug!(pixels_per_second, "Ignoring drag with invalid scale");
            return false;
        }

        let anchor = match &target {
            DragTarget::Clip(id) => {
                let Some(clip) = store.project().clip(id) else {
                    return false;
                };
                let anchor = DragAnchor {
                    pointer_x,
                    start_time: clip.start_time,
                    end_time: clip.end_time,
                    trim_start: clip.trim_start,
                    bound: clip.original_duration,
                };
                store.select_clip(id);
                anchor
            }
            DragTarget::Animation {
                clip_id,
                animation_id,
            } => {
                let Some(clip) = store.project().clip(clip_id) else {
                    return false;
                };
                let Some(animation) = clip.animation(animation_id) else {
                    return false;
                };
                let anchor = DragAnchor {
                    pointer_x,
                    start_time: animation.start_time,
                    end_time: animation.end_time,
                    trim_start: 0.0,
                    bound: clip.duration,
                };
                store.select_animation(animation_id);
                anchor
            }
        };

        tracing::debug!(drag_target = ?target, ?mode, "Drag started");
        self.session = Some(DragSession {
            target,
            mode,
            anchor,
            pixels_per_second,
            throttle: RateController::from_millis(self.config.debounce_ms),
            pending: None,
        });
        true
    }

    /// Compute the edit for the current pointer position.
    ///
    /// Returns it when the debounce interval has elapsed; otherwise it is
    /// held as pending and replaced by later moves.
    pub fn pointer_move(&mut self, pointer_x: f64, now: Instant) -> Option<DragUpdate> {
        let session = self.session.as_mut()?;
        let update = session.candidate(pointer_x, &self.config);
        if session.throttle.should_tick(now) {
            session.pending = None;
            Some(update)
        } else {
            session.pending = Some(update);
            None
        }
    }

    /// Emit the pending edit if the debounce interval has since elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<DragUpdate> {
        let session = self.session.as_mut()?;
        if session.pending.is_some() && session.throttle.should_tick(now) {
            session.pending.take()
        } else {
            None
        }
    }

    /// End the gesture, returning any edit not yet emitted. A pointer-up
    /// without an active gesture is ignored.
    pub fn pointer_up(&mut self) -> Option<DragUpdate> {
        let session = self.session.take()?;
        tracing::debug!(drag_target = ?session.target, "Drag finished");
        session.pending
    }

    /// Abandon the gesture without emitting anything.
    pub fn cancel(&mut self) {
        self.session = None;
    }
}
