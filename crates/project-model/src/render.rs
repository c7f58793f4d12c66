//! Render request handed to the external rendering service.
//!
//! Animations are flattened out of their clips and carry absolute timeline
//! timing (`clip.start_time + animation.start_time`).

use serde::{Deserialize, Serialize};

use crate::animation::AnimationKind;
use crate::clip::Clip;
use crate::ids::{AnimationId, ClipId};
use crate::project::{BackgroundSettings, CameraSettings, DeviceSettings, MusicSettings, Project};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub name: String,
    pub duration: f64,
    pub clips: Vec<RenderClip>,
    pub animations: Vec<RenderAnimation>,
    pub background_settings: BackgroundSettings,
    pub music_settings: MusicSettings,
    pub device_settings: DeviceSettings,
    pub camera_settings: CameraSettings,
}

/// A clip's placement and trim window as seen by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderClip {
    pub id: ClipId,
    /// Resolved URL, or the local file name when the source has not been
    /// uploaded.
    pub source: String,
    pub start_time: f64,
    pub end_time: f64,
    pub trim_start: f64,
    pub trim_end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderAnimation {
    pub id: AnimationId,
    pub clip_id: ClipId,
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    /// Absolute start time on the timeline.
    pub start_time: f64,
    /// Absolute end time on the timeline.
    pub end_time: f64,
    pub properties: serde_json::Value,
}

impl RenderRequest {
    /// Build a request describing the whole project.
    pub fn from_project(project: &Project) -> serde_json::Result<Self> {
        let clips = project.clips.iter().map(RenderClip::from).collect();

        let mut animations = Vec::with_capacity(project.animation_count());
        for clip in &project.clips {
            for anim in &clip.animations {
                animations.push(RenderAnimation {
                    id: anim.id.clone(),
                    clip_id: clip.id.clone(),
                    kind: anim.kind(),
                    start_time: clip.start_time + anim.start_time,
                    end_time: clip.start_time + anim.end_time,
                    properties: anim.properties.payload_json()?,
                });
            }
        }
        animations.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        Ok(Self {
            name: project.name.clone(),
            duration: project.duration,
            clips,
            animations,
            background_settings: project.background_settings.clone(),
            music_settings: project.music_settings.clone(),
            device_settings: project.device_settings.clone(),
            camera_settings: project.camera_settings.clone(),
        })
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl From<&Clip> for RenderClip {
    fn from(clip: &Clip) -> Self {
        Self {
            id: clip.id.clone(),
            source: clip.source.label(),
            start_time: clip.start_time,
            end_time: clip.end_time,
            trim_start: clip.trim_start,
            trim_end: clip.trim_end,
        }
    }
}

/// Render job state reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

/// Job descriptor returned for a render request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJob {
    pub id: String,
    pub status: RenderStatus,
    /// Completion fraction `[0, 1]`.
    pub progress: f64,
    /// True when this job was produced locally because the service was
    /// unreachable.
    #[serde(default)]
    pub simulated: bool,
    #[serde(default)]
    pub output_url: Option<String>,
}

impl RenderJob {
    /// A locally fabricated, clearly labeled job used when the rendering
    /// service cannot be reached.
    pub fn simulated() -> Self {
        Self {
            id: format!("simulated-{}", uuid::Uuid::new_v4().simple()),
            status: RenderStatus::Queued,
            progress: 0.0,
            simulated: true,
            output_url: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, RenderStatus::Completed | RenderStatus::Failed)
    }
}
