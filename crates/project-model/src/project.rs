//! Project and edit-wide settings.
//!
//! A project is the top-level container: ordered clips, the active clip,
//! the derived total duration, and settings that apply to the whole edit.

use std::path::Path;

use montage_common::{MontageError, MontageResult};
use serde::{Deserialize, Serialize};

use crate::clip::Clip;
use crate::ids::ClipId;

/// The in-memory project contract consumed by the editor components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Human-readable project name.
    pub name: String,

    /// Clips sorted by `start_time`, contiguous from the first clip.
    #[serde(default)]
    pub clips: Vec<Clip>,

    /// The clip whose range contains the playhead, or the last selected one.
    #[serde(default)]
    pub active_clip_id: Option<ClipId>,

    /// `max(clip.end_time)`, or 0 when empty.
    #[serde(default)]
    pub duration: f64,

    #[serde(default)]
    pub background_settings: BackgroundSettings,

    #[serde(default)]
    pub device_settings: DeviceSettings,

    #[serde(default)]
    pub music_settings: MusicSettings,

    #[serde(default)]
    pub camera_settings: CameraSettings,
}

/// Canvas behind the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackgroundSettings {
    /// Background color as hex string (for example `#1a1a1a`).
    pub color: String,
    /// Optional image or gradient asset URL; overrides `color`.
    pub image_url: Option<String>,
    /// Padding around the video in output pixels.
    pub padding: u32,
    /// Rounded corner radius in output pixels.
    pub corner_radius: u32,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            color: "#1a1a1a".to_string(),
            image_url: None,
            padding: 56,
            corner_radius: 20,
        }
    }
}

/// Device mockup frame drawn around the video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeviceFrame {
    #[default]
    None,
    Phone,
    Tablet,
    Laptop,
    Browser,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceSettings {
    pub frame: DeviceFrame,
    /// Optional frame color override.
    pub color: Option<String>,
}

/// Background music. The core only stores the reference returned by the
/// external picker or generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MusicSettings {
    pub enabled: bool,
    pub track_url: Option<String>,
    pub file_name: Option<String>,
    /// Mix volume `[0, 1]`.
    pub volume: f64,
}

impl Default for MusicSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            track_url: None,
            file_name: None,
            volume: 0.5,
        }
    }
}

/// Corner placement for the camera overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CameraCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CameraShape {
    #[default]
    Circle,
    RoundedRect,
}

/// Webcam overlay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraSettings {
    pub enabled: bool,
    pub corner: CameraCorner,
    pub shape: CameraShape,
    /// Overlay size relative to output dimensions. Typical range: 0.10 - 0.40.
    pub size_ratio: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            corner: CameraCorner::BottomRight,
            shape: CameraShape::Circle,
            size_ratio: 0.24,
        }
    }
}

impl Project {
    /// Create an empty project with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clips: Vec::new(),
            active_clip_id: None,
            duration: 0.0,
            background_settings: BackgroundSettings::default(),
            device_settings: DeviceSettings::default(),
            music_settings: MusicSettings::default(),
            camera_settings: CameraSettings::default(),
        }
    }

    /// Read a project description from a JSON file.
    pub fn load(path: &Path) -> MontageResult<Self> {
        if !path.exists() {
            return Err(MontageError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// `max(clip.end_time)` over all clips, 0 when empty.
    pub fn computed_duration(&self) -> f64 {
        self.clips
            .iter()
            .map(|c| c.end_time)
            .fold(0.0_f64, f64::max)
    }

    pub fn clip(&self, id: &ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| &c.id == id)
    }

    pub fn clip_index(&self, id: &ClipId) -> Option<usize> {
        self.clips.iter().position(|c| &c.id == id)
    }

    pub fn active_clip(&self) -> Option<&Clip> {
        self.active_clip_id.as_ref().and_then(|id| self.clip(id))
    }

    /// The clip with `start_time <= t < end_time`, if any.
    pub fn clip_at_time(&self, t: f64) -> Option<&Clip> {
        self.clips.iter().find(|c| c.contains(t))
    }

    /// Total number of animations across clips.
    pub fn animation_count(&self) -> usize {
        self.clips.iter().map(|c| c.animations.len()).sum()
    }

    /// Whether neighbouring clips abut within `tolerance`.
    pub fn is_contiguous(&self, tolerance: f64) -> bool {
        self.clips
            .windows(2)
            .all(|w| (w[1].start_time - w[0].end_time).abs() <= tolerance)
    }
}
