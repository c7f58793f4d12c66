//! Playable media element abstraction.
//!
//! An element is driven by commands and reports back through events; no
//! command waits for the media to become ready. Implementations wrap
//! whatever the host offers (a browser video element, a decoder session).

use montage_project_model::ClipId;

use crate::error::MediaError;

/// How much of the source to fetch ahead of playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preload {
    /// Dimensions and duration only.
    Metadata,
    /// Buffer ahead for imminent playback.
    Auto,
}

/// Lifecycle of a resident element as tracked by the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaState {
    Idle,
    LoadingMetadata,
    Ready,
    Playing,
    Paused,
    Error,
}

impl MediaState {
    /// Whether the element accepts seek and play commands.
    pub fn is_loaded(self) -> bool {
        matches!(self, MediaState::Ready | MediaState::Playing | MediaState::Paused)
    }
}

/// Notification from an element.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    MetadataLoaded { duration: f64 },
    CanPlay,
    Seeked { position: f64 },
    /// A play request with this generation has started.
    PlayStarted { generation: u64 },
    /// Playback progress, as a position inside the source.
    TimeUpdate { position: f64 },
    Error { message: String },
}

/// An event tagged with the clip whose element produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementEvent {
    pub clip_id: ClipId,
    pub event: MediaEvent,
}

impl ElementEvent {
    pub fn new(clip_id: ClipId, event: MediaEvent) -> Self {
        Self { clip_id, event }
    }
}

/// One playable element bound to a clip.
pub trait MediaElement {
    /// Start loading `url`. Completion arrives as `MetadataLoaded` or `Error`.
    fn load(&mut self, url: &str, preload: Preload) -> Result<(), MediaError>;

    fn set_preload(&mut self, preload: Preload);

    fn set_visible(&mut self, visible: bool);

    fn set_muted(&mut self, muted: bool);

    /// Move to a position inside the source (seconds).
    fn seek(&mut self, position: f64);

    /// Request playback. The request is confirmed by `PlayStarted` carrying
    /// the same generation.
    fn play(&mut self, generation: u64);

    fn pause(&mut self);

    /// Last known position inside the source (seconds).
    fn position(&self) -> f64;

    /// Drop the source and free decoder resources.
    fn release(&mut self);
}

/// Creates elements for clips.
pub trait MediaBackend {
    fn create_element(&mut self, clip_id: &ClipId) -> Result<Box<dyn MediaElement>, MediaError>;
}
