//! Headless media backend.
//!
//! Records every command the pool issues and, when given an event sender,
//! answers loads, seeks and play requests with the events a real element
//! would eventually emit. Used for tests and for the CLI's simulated
//! playback.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use montage_project_model::ClipId;
use tokio::sync::mpsc;

use crate::element::{ElementEvent, MediaBackend, MediaElement, MediaEvent, Preload};
use crate::error::MediaError;

/// A command received by a recorded element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementCommand {
    Load { url: String, preload: Preload },
    SetPreload(Preload),
    SetVisible(bool),
    SetMuted(bool),
    Seek(f64),
    Play { generation: u64 },
    Pause,
    Release,
}

#[derive(Debug, Default)]
struct Shared {
    log: Vec<(ClipId, ElementCommand)>,
    positions: HashMap<ClipId, f64>,
    failing: HashSet<ClipId>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Backend whose elements only record what they are told.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    shared: Arc<Mutex<Shared>>,
    events: Option<mpsc::UnboundedSender<ElementEvent>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands with synthetic events on `events`.
    pub fn with_events(events: mpsc::UnboundedSender<ElementEvent>) -> Self {
        Self {
            shared: Arc::default(),
            events: Some(events),
        }
    }

    /// Make loads for `clip_id` fail.
    pub fn fail_loads_for(&self, clip_id: &ClipId) {
        lock(&self.shared).failing.insert(clip_id.clone());
    }

    /// Override the position an element reports.
    pub fn set_position(&self, clip_id: &ClipId, position: f64) {
        lock(&self.shared).positions.insert(clip_id.clone(), position);
    }

    /// Every command issued so far, in order.
    pub fn commands(&self) -> Vec<(ClipId, ElementCommand)> {
        lock(&self.shared).log.clone()
    }

    /// Commands issued to one clip's elements.
    pub fn commands_for(&self, clip_id: &ClipId) -> Vec<ElementCommand> {
        lock(&self.shared)
            .log
            .iter()
            .filter(|(id, _)| id == clip_id)
            .map(|(_, cmd)| cmd.clone())
            .collect()
    }

    pub fn clear_log(&self) {
        lock(&self.shared).log.clear();
    }
}

impl MediaBackend for RecordingBackend {
    fn create_element(&mut self, clip_id: &ClipId) -> Result<Box<dyn MediaElement>, MediaError> {
        Ok(Box::new(RecordingElement {
            clip_id: clip_id.clone(),
            shared: Arc::clone(&self.shared),
            events: self.events.clone(),
        }))
    }
}

struct RecordingElement {
    clip_id: ClipId,
    shared: Arc<Mutex<Shared>>,
    events: Option<mpsc::UnboundedSender<ElementEvent>>,
}

impl RecordingElement {
    fn record(&self, command: ElementCommand) {
        lock(&self.shared).log.push((self.clip_id.clone(), command));
    }

    fn emit(&self, event: MediaEvent) {
        if let Some(tx) = &self.events {
            // A closed receiver means nobody is listening any more.
            let _ = tx.send(ElementEvent::new(self.clip_id.clone(), event));
        }
    }
}

impl MediaElement for RecordingElement {
    fn load(&mut self, url: &str, preload: Preload) -> Result<(), MediaError> {
        self.record(ElementCommand::Load {
            url: url.to_string(),
            preload,
        });
        if lock(&self.shared).failing.contains(&self.clip_id) {
            return Err(MediaError::LoadFailed {
                clip_id: self.clip_id.clone(),
                message: format!("cannot open {url}"),
            });
        }
        self.emit(MediaEvent::MetadataLoaded { duration: 0.0 });
        self.emit(MediaEvent::CanPlay);
        Ok(())
    }

    fn set_preload(&mut self, preload: Preload) {
        self.record(ElementCommand::SetPreload(preload));
    }

    fn set_visible(&mut self, visible: bool) {
        self.record(ElementCommand::SetVisible(visible));
    }

    fn set_muted(&mut self, muted: bool) {
        self.record(ElementCommand::SetMuted(muted));
    }

    fn seek(&mut self, position: f64) {
        self.record(ElementCommand::Seek(position));
        lock(&self.shared)
            .positions
            .insert(self.clip_id.clone(), position);
        self.emit(MediaEvent::Seeked { position });
    }

    fn play(&mut self, generation: u64) {
        self.record(ElementCommand::Play { generation });
        self.emit(MediaEvent::PlayStarted { generation });
    }

    fn pause(&mut self) {
        self.record(ElementCommand::Pause);
    }

    fn position(&self) -> f64 {
        lock(&self.shared)
            .positions
            .get(&self.clip_id)
            .copied()
            .unwrap_or(0.0)
    }

    fn release(&mut self) {
        self.record(ElementCommand::Release);
        lock(&self.shared).positions.remove(&self.clip_id);
    }
}
