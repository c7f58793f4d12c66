//! Timeline clips and their media references.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::animation::Animation;
use crate::ids::ClipId;

/// Where a clip's media comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaSource {
    /// A user-selected or freshly recorded local file. Playback needs a
    /// locally materialized handle for it.
    LocalFile { path: PathBuf },
    /// An already resolved, directly playable URL.
    Url { url: String },
}

impl MediaSource {
    /// Short human-readable label.
    pub fn label(&self) -> String {
        match self {
            MediaSource::LocalFile { path } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            MediaSource::Url { url } => url.clone(),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, MediaSource::LocalFile { .. })
    }
}

/// Native pixel size of a clip's video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSize {
    pub width: u32,
    pub height: u32,
}

/// A timeline-positioned reference to media with trim bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: ClipId,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Global start time (seconds).
    pub start_time: f64,

    /// Global end time (seconds).
    pub end_time: f64,

    /// Visible length on the timeline (seconds).
    pub duration: f64,

    /// Untrimmed length of the source media (seconds, 0 = unknown).
    #[serde(default)]
    pub original_duration: f64,

    /// Seconds cut from the head of the source.
    #[serde(default)]
    pub trim_start: f64,

    /// Seconds cut from the tail of the source.
    #[serde(default)]
    pub trim_end: f64,

    pub source: MediaSource,

    /// Native video resolution, once known.
    #[serde(default)]
    pub video_size: Option<VideoSize>,

    /// Overlays, relative-timed within this clip.
    #[serde(default)]
    pub animations: Vec<Animation>,
}

impl Clip {
    /// Half-open interval membership: `start_time <= t < end_time`.
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start_time && t < self.end_time
    }

    /// Whether resizing is bounded by a known source length.
    pub fn is_trimmable(&self) -> bool {
        self.original_duration > 0.0
    }

    /// Clip-relative time for a global time, clamped to `[0, duration]`.
    pub fn local_time(&self, global_time: f64) -> f64 {
        (global_time - self.start_time).clamp(0.0, self.duration.max(0.0))
    }

    /// Position inside the source media for a global time.
    ///
    /// `trim_start + (global_time - start_time)`; trimming only changes this
    /// mapping and never the source itself.
    pub fn source_position(&self, global_time: f64) -> f64 {
        self.trim_start + self.local_time(global_time)
    }

    pub fn animation(&self, id: &crate::ids::AnimationId) -> Option<&Animation> {
        self.animations.iter().find(|a| &a.id == id)
    }
}

/// Fields for creating a clip; the store assigns id and position.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipDraft {
    pub name: String,
    pub duration: f64,
    pub original_duration: f64,
    pub trim_start: f64,
    pub trim_end: f64,
    pub source: MediaSource,
    pub video_size: Option<VideoSize>,
    pub animations: Vec<Animation>,
}

impl ClipDraft {
    /// An untrimmed clip spanning the whole source.
    pub fn new(name: impl Into<String>, source: MediaSource, duration: f64) -> Self {
        Self {
            name: name.into(),
            duration,
            original_duration: duration,
            trim_start: 0.0,
            trim_end: 0.0,
            source,
            video_size: None,
            animations: Vec::new(),
        }
    }

    pub fn with_video_size(mut self, width: u32, height: u32) -> Self {
        self.video_size = Some(VideoSize { width, height });
        self
    }
}

/// Partial update to a clip. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipUpdate {
    pub name: Option<String>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub duration: Option<f64>,
    pub original_duration: Option<f64>,
    pub trim_start: Option<f64>,
    pub trim_end: Option<f64>,
    pub source: Option<MediaSource>,
    pub video_size: Option<VideoSize>,
}

impl ClipUpdate {
    pub fn duration(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether this update touches any timing field.
    pub fn changes_timing(&self) -> bool {
        self.start_time.is_some() || self.end_time.is_some() || self.duration.is_some()
    }
}
