//! The timeline state container.

use std::sync::Arc;

use montage_common::SyncPolicy;
use montage_project_model::{
    AnimationDraft, AnimationId, AnimationUpdate, BackgroundSettings, CameraSettings, Clip,
    ClipDraft, ClipId, ClipUpdate, DeviceSettings, MusicSettings, Project,
};

use crate::layout;
use crate::observer::{ObserverRegistry, SubscriptionId};
use crate::state::{SelectedAnimation, StoreEvent, TimeSource, TimelineState};

/// Sole owner of the edit state.
///
/// Every accepted command builds a new [`TimelineState`] and swaps it in
/// whole; snapshots handed out earlier are never modified.
#[derive(Debug)]
pub struct TimelineStore {
    state: Arc<TimelineState>,
    policy: SyncPolicy,
    observers: ObserverRegistry,
}

impl TimelineStore {
    /// Create a store for `project`, normalizing its layout and duration.
    pub fn new(project: Project, policy: SyncPolicy) -> Self {
        Self {
            state: Arc::new(normalized(project, &policy)),
            policy,
            observers: ObserverRegistry::default(),
        }
    }

    /// Create a store with an empty project.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(Project::new(name), SyncPolicy::default())
    }

    pub fn policy(&self) -> &SyncPolicy {
        &self.policy
    }

    // ── queries ──────────────────────────────────────────────────────

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<TimelineState> {
        Arc::clone(&self.state)
    }

    pub fn state(&self) -> &TimelineState {
        &self.state
    }

    pub fn project(&self) -> &Project {
        &self.state.project
    }

    pub fn current_time(&self) -> f64 {
        self.state.current_time
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn active_clip(&self) -> Option<&Clip> {
        self.state.active_clip()
    }

    /// The clip with `start_time <= t < end_time`, if any.
    pub fn clip_at_time(&self, t: f64) -> Option<&Clip> {
        self.state.project.clip_at_time(t)
    }

    /// `max(0, current_time - active_clip.start_time)`.
    pub fn current_clip_time(&self) -> f64 {
        self.state.current_clip_time()
    }

    pub fn selected_animation(&self) -> Option<&SelectedAnimation> {
        self.state.selected_animation.as_ref()
    }

    // ── observers ────────────────────────────────────────────────────

    /// Register an observer called after every commit.
    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&TimelineState, &StoreEvent) + 'static,
    ) -> SubscriptionId {
        self.observers.add(Box::new(observer))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // ── playhead ─────────────────────────────────────────────────────

    /// Move the playhead. Returns whether the change was accepted.
    ///
    /// Rejected when the writer does not hold the playhead (scrub while
    /// playing, playback while stopped) or when the change is below
    /// `time_epsilon`, unless it lands the playhead on the end of the
    /// timeline. On acceptance the clip containing `t` becomes active.
    pub fn set_current_time(&mut self, t: f64, source: TimeSource) -> bool {
        let playing = self.state.is_playing;
        match source {
            TimeSource::Scrub if playing => {
                tracing::debug!(time = t, "Ignoring scrub while playing");
                return false;
            }
            TimeSource::Playback if !playing => {
                tracing::debug!(time = t, "Ignoring playback write while stopped");
                return false;
            }
            _ => {}
        }

        let t = if t.is_finite() { t.max(0.0) } else { 0.0 };
        let duration = self.state.project.duration;
        let reaches_end = t >= duration && self.state.current_time < duration;
        if !reaches_end && (t - self.state.current_time).abs() < self.policy.time_epsilon {
            return false;
        }

        let mut next = (*self.state).clone();
        next.current_time = t;
        let mut events = vec![StoreEvent::TimeChanged { time: t }];

        let containing = next.project.clip_at_time(t).map(|c| c.id.clone());
        if let Some(id) = containing {
            if next.project.active_clip_id.as_ref() != Some(&id) {
                tracing::debug!(clip_id = %id, time = t, "Active clip switched");
                next.project.active_clip_id = Some(id.clone());
                events.push(StoreEvent::ActiveClipChanged { clip_id: Some(id) });
            }
        }

        self.commit(next, events);
        true
    }

    /// Enter or leave the playing state. Playing requires at least one clip.
    pub fn set_playing(&mut self, playing: bool) -> bool {
        if playing == self.state.is_playing {
            return false;
        }
        if playing && self.state.project.clips.is_empty() {
            tracing::debug!("Cannot play an empty timeline");
            return false;
        }
        let mut next = (*self.state).clone();
        next.is_playing = playing;
        self.commit(next, vec![StoreEvent::PlaybackChanged { playing }]);
        true
    }

    // ── clips ────────────────────────────────────────────────────────

    /// Append a clip after the current last clip and make it active.
    pub fn add_clip(&mut self, draft: ClipDraft) -> ClipId {
        let mut next = (*self.state).clone();
        let start = next.project.clips.last().map(|c| c.end_time).unwrap_or(0.0);

        let original_duration = draft.original_duration.max(0.0);
        let mut duration = draft.duration.max(0.0);
        if original_duration > 0.0 {
            duration = duration.min(original_duration);
        }

        let id = ClipId::generate();
        let mut clip = Clip {
            id: id.clone(),
            name: draft.name,
            start_time: start,
            end_time: start + duration,
            duration,
            original_duration,
            trim_start: draft.trim_start.max(0.0),
            trim_end: draft.trim_end.max(0.0),
            source: draft.source,
            video_size: draft.video_size,
            animations: draft.animations,
        };
        for anim in clip.animations.iter_mut() {
            layout::clamp_animation(anim, duration);
        }

        tracing::info!(clip_id = %id, start, duration, "Clip added");
        next.project.clips.push(clip);
        next.project.duration = next.project.computed_duration();
        next.project.active_clip_id = Some(id.clone());

        self.commit(
            next,
            vec![
                StoreEvent::ClipsChanged,
                StoreEvent::ActiveClipChanged {
                    clip_id: Some(id.clone()),
                },
            ],
        );
        id
    }

    /// Merge `update` into a clip, then restore contiguous layout.
    ///
    /// Setting `duration` recomputes `end_time`; setting only `start_time`
    /// moves the clip keeping its duration. Any timing edit re-lays out the
    /// clips exactly, however small the move; updates that leave timing
    /// alone only repair mismatches beyond the contiguity tolerance.
    pub fn update_clip(&mut self, id: &ClipId, update: ClipUpdate) {
        let Some(idx) = self.state.project.clip_index(id) else {
            tracing::debug!(clip_id = %id, "update_clip: no such clip");
            return;
        };
        if update.is_empty() {
            return;
        }
        let timing_changed = update.changes_timing();

        let mut next = (*self.state).clone();
        let old_duration = next.project.clips[idx].duration;
        let clip = &mut next.project.clips[idx];

        if let Some(name) = update.name {
            clip.name = name;
        }
        if let Some(source) = update.source {
            clip.source = source;
        }
        if let Some(size) = update.video_size {
            clip.video_size = Some(size);
        }
        if let Some(original) = update.original_duration {
            clip.original_duration = original.max(0.0);
        }
        if let Some(trim_start) = update.trim_start {
            clip.trim_start = trim_start.max(0.0);
        }
        if let Some(trim_end) = update.trim_end {
            clip.trim_end = trim_end.max(0.0);
        }
        if clip.is_trimmable() {
            clip.trim_start = clip.trim_start.min(clip.original_duration);
            clip.trim_end = clip.trim_end.min(clip.original_duration);
        }

        let start = update.start_time.unwrap_or(clip.start_time).max(0.0);
        let mut duration = match (update.duration, update.end_time) {
            (Some(d), _) => d,
            (None, Some(end)) => end - start,
            (None, None) => clip.duration,
        }
        .max(0.0);
        if clip.is_trimmable() {
            duration = duration.min(clip.original_duration);
        }
        clip.start_time = start;
        clip.duration = duration;
        clip.end_time = start + duration;
        for anim in clip.animations.iter_mut() {
            layout::clamp_animation(anim, duration);
        }

        let duration_changed = (duration - old_duration).abs() > f64::EPSILON;
        if duration_changed {
            layout::relayout_from(&mut next.project.clips, idx + 1);
        }
        let tolerance = if timing_changed {
            0.0
        } else {
            self.policy.contiguity_tolerance
        };
        if layout::enforce_contiguity(&mut next.project.clips, tolerance) {
            tracing::debug!(clip_id = %id, "Clips repositioned after update");
        }
        next.project.duration = next.project.computed_duration();
        let selection_refreshed = refresh_selection(&mut next);

        let mut events = vec![StoreEvent::ClipsChanged];
        if selection_refreshed {
            events.push(StoreEvent::SelectionChanged);
        }
        self.commit(next, events);
    }

    /// Delete a clip and re-lay out the survivors from 0.
    ///
    /// If the removed clip was active, the first remaining clip (or none)
    /// becomes active.
    pub fn remove_clip(&mut self, id: &ClipId) -> Option<Clip> {
        let idx = self.state.project.clip_index(id)?;
        let mut next = (*self.state).clone();
        let removed = next.project.clips.remove(idx);
        layout::relayout_all(&mut next.project.clips);
        next.project.duration = next.project.computed_duration();

        let mut events = vec![StoreEvent::ClipsChanged];
        if next.project.active_clip_id.as_ref() == Some(id) {
            next.project.active_clip_id = next.project.clips.first().map(|c| c.id.clone());
            events.push(StoreEvent::ActiveClipChanged {
                clip_id: next.project.active_clip_id.clone(),
            });
        }
        if next
            .selected_animation
            .as_ref()
            .is_some_and(|s| &s.clip_id == id)
        {
            next.selected_animation = None;
            events.push(StoreEvent::SelectionChanged);
        }
        if next.project.clips.is_empty() && next.is_playing {
            next.is_playing = false;
            events.push(StoreEvent::PlaybackChanged { playing: false });
        }

        tracing::info!(clip_id = %id, remaining = next.project.clips.len(), "Clip removed");
        self.commit(next, events);
        Some(removed)
    }

    /// Make a clip active (pointer-down on a clip).
    pub fn select_clip(&mut self, id: &ClipId) {
        if self.state.project.clip(id).is_none() {
            tracing::debug!(clip_id = %id, "select_clip: no such clip");
            return;
        }
        if self.state.project.active_clip_id.as_ref() == Some(id) {
            return;
        }
        let mut next = (*self.state).clone();
        next.project.active_clip_id = Some(id.clone());
        self.commit(
            next,
            vec![StoreEvent::ActiveClipChanged {
                clip_id: Some(id.clone()),
            }],
        );
    }

    // ── animations ───────────────────────────────────────────────────

    /// Add an animation to the active clip. No-op without an active clip.
    pub fn add_animation(&mut self, draft: AnimationDraft) -> Option<AnimationId> {
        let Some(idx) = self.active_clip_index() else {
            tracing::debug!("add_animation: no active clip");
            return None;
        };
        let mut next = (*self.state).clone();
        let clip = &mut next.project.clips[idx];

        let id = AnimationId::generate();
        let mut animation = montage_project_model::Animation::new(
            id.clone(),
            draft.start_time,
            draft.end_time,
            draft.properties,
        );
        layout::clamp_animation(&mut animation, clip.duration);
        tracing::debug!(
            clip_id = %clip.id,
            animation_id = %id,
            kind = ?animation.kind(),
            "Animation added"
        );
        clip.animations.push(animation);
        clip.animations
            .sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        let clip_id = clip.id.clone();

        self.commit(next, vec![StoreEvent::AnimationsChanged { clip_id }]);
        Some(id)
    }

    /// Update an animation on the active clip, refreshing the cached
    /// selection when it is the selected one.
    pub fn update_animation(&mut self, id: &AnimationId, update: AnimationUpdate) {
        let Some(clip_idx) = self.active_clip_index() else {
            tracing::debug!(animation_id = %id, "update_animation: no active clip");
            return;
        };
        let Some(anim_idx) = self.state.project.clips[clip_idx]
            .animations
            .iter()
            .position(|a| &a.id == id)
        else {
            tracing::debug!(animation_id = %id, "update_animation: not on active clip");
            return;
        };
        if update.is_empty() {
            return;
        }

        let mut next = (*self.state).clone();
        let clip = &mut next.project.clips[clip_idx];
        let clip_duration = clip.duration;
        let anim = &mut clip.animations[anim_idx];
        if let Some(start) = update.start_time {
            anim.start_time = start;
        }
        if let Some(end) = update.end_time {
            anim.end_time = end;
        }
        if let Some(props) = update.properties {
            anim.properties = props;
        }
        layout::clamp_animation(anim, clip_duration);
        let clip_id = clip.id.clone();

        let mut events = vec![StoreEvent::AnimationsChanged { clip_id }];
        if refresh_selection(&mut next) {
            events.push(StoreEvent::SelectionChanged);
        }
        self.commit(next, events);
    }

    /// Remove an animation from the active clip.
    pub fn remove_animation(&mut self, id: &AnimationId) {
        let Some(clip_idx) = self.active_clip_index() else {
            tracing::debug!(animation_id = %id, "remove_animation: no active clip");
            return;
        };
        if self.state.project.clips[clip_idx].animation(id).is_none() {
            return;
        }

        let mut next = (*self.state).clone();
        let clip = &mut next.project.clips[clip_idx];
        clip.animations.retain(|a| &a.id != id);
        let clip_id = clip.id.clone();

        let mut events = vec![StoreEvent::AnimationsChanged { clip_id }];
        if next
            .selected_animation
            .as_ref()
            .is_some_and(|s| &s.animation.id == id)
        {
            next.selected_animation = None;
            events.push(StoreEvent::SelectionChanged);
        }
        self.commit(next, events);
    }

    /// Select an animation on any clip; its clip becomes active.
    pub fn select_animation(&mut self, id: &AnimationId) {
        let found = self.state.project.clips.iter().find_map(|clip| {
            clip.animation(id).map(|anim| SelectedAnimation {
                clip_id: clip.id.clone(),
                animation: anim.clone(),
            })
        });
        let Some(selected) = found else {
            tracing::debug!(animation_id = %id, "select_animation: no such animation");
            return;
        };
        if self.state.selected_animation.as_ref() == Some(&selected) {
            return;
        }

        let mut next = (*self.state).clone();
        let mut events = vec![StoreEvent::SelectionChanged];
        if next.project.active_clip_id.as_ref() != Some(&selected.clip_id) {
            next.project.active_clip_id = Some(selected.clip_id.clone());
            events.push(StoreEvent::ActiveClipChanged {
                clip_id: Some(selected.clip_id.clone()),
            });
        }
        next.selected_animation = Some(selected);
        self.commit(next, events);
    }

    pub fn clear_selection(&mut self) {
        if self.state.selected_animation.is_none() {
            return;
        }
        let mut next = (*self.state).clone();
        next.selected_animation = None;
        self.commit(next, vec![StoreEvent::SelectionChanged]);
    }

    // ── project settings ─────────────────────────────────────────────

    pub fn set_name(&mut self, name: impl Into<String>) {
        let mut next = (*self.state).clone();
        next.project.name = name.into();
        self.commit(next, vec![StoreEvent::SettingsChanged]);
    }

    pub fn update_background(&mut self, edit: impl FnOnce(&mut BackgroundSettings)) {
        self.update_settings(|p| edit(&mut p.background_settings));
    }

    pub fn update_music(&mut self, edit: impl FnOnce(&mut MusicSettings)) {
        self.update_settings(|p| {
            edit(&mut p.music_settings);
            p.music_settings.volume = p.music_settings.volume.clamp(0.0, 1.0);
        });
    }

    pub fn update_device(&mut self, edit: impl FnOnce(&mut DeviceSettings)) {
        self.update_settings(|p| edit(&mut p.device_settings));
    }

    pub fn update_camera(&mut self, edit: impl FnOnce(&mut CameraSettings)) {
        self.update_settings(|p| {
            edit(&mut p.camera_settings);
            p.camera_settings.size_ratio = p.camera_settings.size_ratio.clamp(0.05, 1.0);
        });
    }

    /// Replace the whole project (open or discard). Playback stops and the
    /// playhead returns to 0.
    pub fn reset(&mut self, project: Project) {
        tracing::info!(name = %project.name, clips = project.clips.len(), "Project reset");
        let next = normalized(project, &self.policy);
        self.commit(next, vec![StoreEvent::Reset]);
    }

    // ── internals ────────────────────────────────────────────────────

    fn update_settings(&mut self, edit: impl FnOnce(&mut Project)) {
        let mut next = (*self.state).clone();
        edit(&mut next.project);
        if next.project == self.state.project {
            return;
        }
        self.commit(next, vec![StoreEvent::SettingsChanged]);
    }

    fn active_clip_index(&self) -> Option<usize> {
        let id = self.state.project.active_clip_id.as_ref()?;
        self.state.project.clip_index(id)
    }

    fn commit(&mut self, next: TimelineState, events: Vec<StoreEvent>) {
        self.state = Arc::new(next);
        let state = Arc::clone(&self.state);
        self.observers.notify(&state, &events);
    }
}

/// Re-read the selected animation from its clip. Returns whether the cached
/// copy changed (including being dropped because it no longer exists).
fn refresh_selection(state: &mut TimelineState) -> bool {
    let Some(selected) = state.selected_animation.as_ref() else {
        return false;
    };
    let fresh = state
        .project
        .clip(&selected.clip_id)
        .and_then(|clip| clip.animation(&selected.animation.id))
        .cloned();
    match fresh {
        Some(anim) if anim == selected.animation => false,
        Some(anim) => {
            if let Some(sel) = state.selected_animation.as_mut() {
                sel.animation = anim;
            }
            true
        }
        None => {
            state.selected_animation = None;
            true
        }
    }
}

fn normalized(mut project: Project, policy: &SyncPolicy) -> TimelineState {
    for clip in project.clips.iter_mut() {
        clip.duration = clip.duration.max(0.0);
        clip.end_time = clip.start_time + clip.duration;
        let duration = clip.duration;
        for anim in clip.animations.iter_mut() {
            layout::clamp_animation(anim, duration);
        }
    }
    layout::enforce_contiguity(&mut project.clips, policy.contiguity_tolerance);
    project.duration = project.computed_duration();
    let active_valid = project
        .active_clip_id
        .as_ref()
        .is_some_and(|id| project.clip(id).is_some());
    if !active_valid {
        project.active_clip_id = project.clips.first().map(|c| c.id.clone());
    }
    TimelineState::new(project)
}
