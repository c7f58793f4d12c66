//! Snapshot and notification types.

use montage_project_model::{Animation, ClipId, Project};

/// Who is writing the playhead.
///
/// Exactly one writer is accepted at a time: the scheduler while playing,
/// scrub and drag handlers while stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeSource {
    /// The playback scheduler.
    Playback,
    /// Direct user positioning (scrubbing, seeking, drag handlers).
    Scrub,
}

/// The animation currently open in an editor, with the clip that owns it.
///
/// Refreshed whenever the underlying animation changes, so observers never
/// hold a stale copy.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedAnimation {
    pub clip_id: ClipId,
    pub animation: Animation,
}

/// One immutable view of the whole edit.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineState {
    pub project: Project,

    /// Global playhead (seconds). Clamped below at 0, not above.
    pub current_time: f64,

    pub is_playing: bool,

    pub selected_animation: Option<SelectedAnimation>,
}

impl TimelineState {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            current_time: 0.0,
            is_playing: false,
            selected_animation: None,
        }
    }

    pub fn active_clip(&self) -> Option<&montage_project_model::Clip> {
        self.project.active_clip()
    }

    /// `max(0, current_time - active_clip.start_time)`, or 0 without an
    /// active clip.
    pub fn current_clip_time(&self) -> f64 {
        self.active_clip()
            .map(|clip| (self.current_time - clip.start_time).max(0.0))
            .unwrap_or(0.0)
    }
}

/// What a commit changed.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    TimeChanged { time: f64 },
    ActiveClipChanged { clip_id: Option<ClipId> },
    ClipsChanged,
    AnimationsChanged { clip_id: ClipId },
    SelectionChanged,
    PlaybackChanged { playing: bool },
    SettingsChanged,
    /// The whole project was replaced.
    Reset,
}
