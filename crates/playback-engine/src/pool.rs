//! Media synchronization pool.
//!
//! Keeps a small resident set of elements around the playhead: the active
//! clip, the next clip, and the previous clip while the playhead is near
//! the active clip's start. Only the active element is visible and audible.
//! While paused the active element is seeked when it drifts; while playing
//! it runs freely and its progress is offered back to the scheduler as a
//! time hint.

use std::collections::HashMap;

use montage_common::{DriftMeasurement, SyncPolicy};
use montage_project_model::{ClipId, MediaSource};
use montage_timeline_store::TimelineState;

use crate::element::{ElementEvent, MediaBackend, MediaElement, MediaEvent, MediaState, Preload};
use crate::error::MediaError;
use crate::handles::{HandleId, MediaHandleTable};

type ErrorCallback = Box<dyn FnMut(&MediaError)>;

struct PoolEntry {
    element: Box<dyn MediaElement>,
    state: MediaState,
    source: MediaSource,
    handle: Option<HandleId>,
    clip_start: f64,
    trim_start: f64,
    duration: f64,
    visible: bool,
    preload: Preload,
    /// Generation of the outstanding play request.
    play_request: Option<u64>,
    /// Play was wanted before the element was ready.
    deferred_play: bool,
}

impl PoolEntry {
    /// Source position for a global time: `trim_start + (t - clip_start)`.
    fn source_position(&self, global_time: f64) -> f64 {
        self.trim_start + (global_time - self.clip_start).clamp(0.0, self.duration.max(0.0))
    }

    fn global_time(&self, source_position: f64) -> f64 {
        self.clip_start + (source_position - self.trim_start)
    }

    fn halt(&mut self) {
        if self.state == MediaState::Playing || self.play_request.is_some() {
            self.element.pause();
            if self.state.is_loaded() {
                self.state = MediaState::Paused;
            }
        }
        self.play_request = None;
        self.deferred_play = false;
    }
}

/// Resident set of media elements.
pub struct MediaPool {
    backend: Box<dyn MediaBackend>,
    policy: SyncPolicy,
    entries: HashMap<ClipId, PoolEntry>,
    handles: MediaHandleTable,
    on_error: Option<ErrorCallback>,
    active: Option<ClipId>,
    playing: bool,
    current_time: f64,
    next_generation: u64,
    time_hint: Option<f64>,
}

impl MediaPool {
    pub fn new(backend: impl MediaBackend + 'static, policy: SyncPolicy) -> Self {
        Self {
            backend: Box::new(backend),
            policy,
            entries: HashMap::new(),
            handles: MediaHandleTable::new(),
            on_error: None,
            active: None,
            playing: false,
            current_time: 0.0,
            next_generation: 0,
            time_hint: None,
        }
    }

    /// Register the per-clip error callback.
    pub fn on_error(&mut self, callback: impl FnMut(&MediaError) + 'static) {
        self.on_error = Some(Box::new(callback));
    }

    /// Clips that should be resident for `state`, active clip first.
    pub fn desired_clips(state: &TimelineState, policy: &SyncPolicy) -> Vec<ClipId> {
        let clips = &state.project.clips;
        let Some(idx) = state
            .project
            .active_clip_id
            .as_ref()
            .and_then(|id| state.project.clip_index(id))
        else {
            return Vec::new();
        };

        let mut desired = vec![clips[idx].id.clone()];
        if let Some(next) = clips.get(idx + 1) {
            desired.push(next.id.clone());
        }
        if idx > 0 && (state.current_time - clips[idx].start_time).abs() <= policy.previous_clip_window
        {
            desired.push(clips[idx - 1].id.clone());
        }
        desired
    }

    /// Bring the resident set, visibility, and positions in line with a
    /// store snapshot. Call on every tick and selection change.
    pub fn reconcile(&mut self, state: &TimelineState) {
        let desired = Self::desired_clips(state, &self.policy);

        let stale: Vec<ClipId> = self
            .entries
            .iter()
            .filter(|(id, entry)| {
                !desired.contains(*id)
                    || state
                        .project
                        .clip(*id)
                        .map_or(true, |clip| clip.source != entry.source)
            })
            .map(|(id, _)| id.clone())
            .collect();
        for id in stale {
            self.evict(&id);
        }

        for id in &desired {
            let Some(clip) = state.project.clip(id) else {
                continue;
            };
            if !self.entries.contains_key(id) {
                self.instantiate(id, &clip.source);
            }
            if let Some(entry) = self.entries.get_mut(id) {
                entry.clip_start = clip.start_time;
                entry.trim_start = clip.trim_start;
                entry.duration = clip.duration;
            }
        }

        self.active = desired.first().cloned();
        self.playing = state.is_playing;
        self.current_time = state.current_time;
        if !self.playing {
            self.time_hint = None;
        }

        let active = self.active.clone();
        for (id, entry) in self.entries.iter_mut() {
            let is_active = active.as_ref() == Some(id);
            if entry.visible != is_active {
                entry.element.set_visible(is_active);
                entry.element.set_muted(!is_active);
                entry.visible = is_active;
            }
            if !is_active {
                entry.halt();
            }
        }

        if let Some(id) = active {
            self.sync_active(&id);
        }
    }

    /// Apply an element event.
    pub fn handle_event(&mut self, event: ElementEvent) {
        let ElementEvent { clip_id, event } = event;
        let is_active = self.active.as_ref() == Some(&clip_id);
        let playing = self.playing;
        let Some(entry) = self.entries.get_mut(&clip_id) else {
            tracing::trace!(clip_id = %clip_id, ?event, "Event for evicted element ignored");
            return;
        };

        match event {
            MediaEvent::MetadataLoaded { .. } | MediaEvent::CanPlay => {
                if matches!(entry.state, MediaState::Idle | MediaState::LoadingMetadata) {
                    entry.state = MediaState::Ready;
                }
                if entry.deferred_play {
                    entry.deferred_play = false;
                    if is_active && playing {
                        tracing::debug!(clip_id = %clip_id, "Retrying deferred play");
                        self.issue_play(&clip_id);
                    }
                } else if is_active && !playing {
                    self.sync_active(&clip_id);
                }
            }
            MediaEvent::Seeked { position } => {
                tracing::trace!(clip_id = %clip_id, position, "Seek completed");
            }
            MediaEvent::PlayStarted { generation } => {
                if entry.play_request == Some(generation) && is_active && playing {
                    entry.state = MediaState::Playing;
                } else {
                    tracing::debug!(
                        clip_id = %clip_id,
                        generation,
                        "Stale play request resolved; pausing"
                    );
                    entry.element.pause();
                    if entry.state.is_loaded() {
                        entry.state = MediaState::Paused;
                    }
                }
            }
            MediaEvent::TimeUpdate { position } => {
                if is_active && playing && entry.state == MediaState::Playing {
                    self.time_hint = Some(entry.global_time(position));
                }
            }
            MediaEvent::Error { message } => {
                entry.state = MediaState::Error;
                entry.play_request = None;
                entry.deferred_play = false;
                self.report(MediaError::Decode { clip_id, message });
            }
        }
    }

    /// Global time derived from the active element's latest progress event.
    pub fn take_time_hint(&mut self) -> Option<f64> {
        self.time_hint.take()
    }

    /// Release every element and local handle.
    pub fn clear(&mut self) -> usize {
        let ids: Vec<ClipId> = self.entries.keys().cloned().collect();
        let count = ids.len();
        for id in ids {
            self.evict(&id);
        }
        let leaked = self.handles.release_all();
        if leaked > 0 {
            tracing::warn!(leaked, "Released handles not owned by any element");
        }
        self.active = None;
        self.time_hint = None;
        count
    }

    pub fn resident_ids(&self) -> Vec<ClipId> {
        let mut ids: Vec<ClipId> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn state_of(&self, clip_id: &ClipId) -> Option<MediaState> {
        self.entries.get(clip_id).map(|e| e.state)
    }

    pub fn active_id(&self) -> Option<&ClipId> {
        self.active.as_ref()
    }

    pub fn live_handles(&self) -> usize {
        self.handles.live_count()
    }

    fn instantiate(&mut self, id: &ClipId, source: &MediaSource) {
        let mut element = match self.backend.create_element(id) {
            Ok(element) => element,
            Err(e) => {
                self.report(e);
                return;
            }
        };

        let (url, handle) = match source {
            MediaSource::Url { url } => (url.clone(), None),
            MediaSource::LocalFile { path } => {
                let (handle, url) = self.handles.acquire(path);
                (url, Some(handle))
            }
        };

        element.set_visible(false);
        element.set_muted(true);
        let state = match element.load(&url, Preload::Metadata) {
            Ok(()) => MediaState::LoadingMetadata,
            Err(e) => {
                self.report(e);
                MediaState::Error
            }
        };
        tracing::debug!(clip_id = %id, url = %url, ?state, "Media element created");

        self.entries.insert(
            id.clone(),
            PoolEntry {
                element,
                state,
                source: source.clone(),
                handle,
                clip_start: 0.0,
                trim_start: 0.0,
                duration: 0.0,
                visible: false,
                preload: Preload::Metadata,
                play_request: None,
                deferred_play: false,
            },
        );
    }

    fn evict(&mut self, id: &ClipId) {
        let Some(mut entry) = self.entries.remove(id) else {
            return;
        };
        entry.halt();
        entry.element.release();
        if let Some(handle) = entry.handle {
            self.handles.release(handle);
        }
        tracing::debug!(clip_id = %id, "Media element evicted");
    }

    fn sync_active(&mut self, id: &ClipId) {
        let time = self.current_time;
        let playing = self.playing;
        let threshold = self.policy.seek_threshold;
        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };

        if !playing {
            entry.halt();
            if entry.state.is_loaded() {
                let target = entry.source_position(time);
                if DriftMeasurement::new(target, entry.element.position()).exceeds(threshold) {
                    entry.element.seek(target);
                }
            }
            return;
        }

        if entry.state == MediaState::Error
            || entry.state == MediaState::Playing
            || entry.play_request.is_some()
            || entry.deferred_play
        {
            return;
        }
        self.issue_play(id);
    }

    fn issue_play(&mut self, id: &ClipId) {
        let time = self.current_time;
        let threshold = self.policy.seek_threshold;
        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };
        if entry.state == MediaState::Error {
            return;
        }
        if !entry.state.is_loaded() {
            entry.deferred_play = true;
            tracing::debug!(clip_id = %id, "Play deferred until media is ready");
            return;
        }

        if entry.preload != Preload::Auto {
            entry.element.set_preload(Preload::Auto);
            entry.preload = Preload::Auto;
        }
        // Align once when playback starts on this element.
        let target = entry.source_position(time);
        if DriftMeasurement::new(target, entry.element.position()).exceeds(threshold) {
            entry.element.seek(target);
        }
        self.next_generation += 1;
        let generation = self.next_generation;
        entry.play_request = Some(generation);
        entry.element.play(generation);
    }

    fn report(&mut self, error: MediaError) {
        tracing::warn!(clip_id = %error.clip_id(), error = %error, "Media error");
        if let Some(callback) = self.on_error.as_mut() {
            callback(&error);
        }
    }
}

impl Drop for MediaPool {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for MediaPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaPool")
            .field("resident", &self.resident_ids())
            .field("active", &self.active)
            .field("playing", &self.playing)
            .field("live_handles", &self.handles.live_count())
            .finish()
    }
}
