//! Time-bound overlays attached to a single clip.
//!
//! Each animation carries a payload typed by its kind. The kind is derived
//! from the payload, so a zoom animation always has zoom properties.

use serde::{Deserialize, Serialize};

use crate::ids::AnimationId;

/// Animation kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationKind {
    Zoom,
    Pan,
    Text,
    Voiceover,
    Background,
    Logo,
    ClipMarker,
}

/// A time-bound overlay within one clip.
///
/// `start_time`/`end_time` are relative to the owning clip and lie in
/// `[0, clip.duration]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    pub id: AnimationId,
    pub start_time: f64,
    pub end_time: f64,
    pub properties: AnimationProps,
}

/// Kind-specific animation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AnimationProps {
    Zoom(ZoomProps),
    Pan(PanProps),
    Text(TextProps),
    Voiceover(VoiceoverProps),
    Background(BackgroundProps),
    Logo(LogoProps),
    ClipMarker(ClipMarkerProps),
}

/// Zoom level and source-space offset at one end of a zoom span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomState {
    /// Scale factor (1.0 = no zoom).
    pub level: f64,
    /// Horizontal offset in source pixels.
    pub x: f64,
    /// Vertical offset in source pixels.
    pub y: f64,
}

impl ZoomState {
    pub const IDENTITY: ZoomState = ZoomState {
        level: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub fn new(level: f64, x: f64, y: f64) -> Self {
        Self { level, x, y }
    }
}

impl Default for ZoomState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ZoomProps {
    pub start: ZoomState,
    pub end: ZoomState,
}

/// Pan offset in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PanPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PanProps {
    pub start: PanPoint,
    pub end: PanPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextProps {
    pub text: String,
    pub font_size: f64,
    pub font_family: String,
    /// Hex color, e.g. `#ffffff`.
    pub color: String,
    /// Normalized horizontal position `[0, 1]`.
    pub x: f64,
    /// Normalized vertical position `[0, 1]`.
    pub y: f64,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 48.0,
            font_family: "Inter".to_string(),
            color: "#ffffff".to_string(),
            x: 0.5,
            y: 0.85,
        }
    }
}

/// Generated narration. The audio reference is filled in once the external
/// generation service responds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoiceoverProps {
    pub text: String,
    pub speaker_id: String,
    pub audio_url: Option<String>,
    pub file_name: Option<String>,
    pub volume: f64,
}

impl Default for VoiceoverProps {
    fn default() -> Self {
        Self {
            text: String::new(),
            speaker_id: String::new(),
            audio_url: None,
            file_name: None,
            volume: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackgroundProps {
    pub color: Option<String>,
    pub image_url: Option<String>,
    pub blur: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogoProps {
    pub url: String,
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub opacity: f64,
}

impl Default for LogoProps {
    fn default() -> Self {
        Self {
            url: String::new(),
            x: 0.95,
            y: 0.05,
            scale: 1.0,
            opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClipMarkerProps {
    pub label: String,
    pub color: Option<String>,
}

impl AnimationProps {
    /// The kind tag for this payload.
    pub fn kind(&self) -> AnimationKind {
        match self {
            AnimationProps::Zoom(_) => AnimationKind::Zoom,
            AnimationProps::Pan(_) => AnimationKind::Pan,
            AnimationProps::Text(_) => AnimationKind::Text,
            AnimationProps::Voiceover(_) => AnimationKind::Voiceover,
            AnimationProps::Background(_) => AnimationKind::Background,
            AnimationProps::Logo(_) => AnimationKind::Logo,
            AnimationProps::ClipMarker(_) => AnimationKind::ClipMarker,
        }
    }

    /// Payload as JSON without the kind tag.
    pub fn payload_json(&self) -> serde_json::Result<serde_json::Value> {
        let mut value = serde_json::to_value(self)?;
        if let Some(map) = value.as_object_mut() {
            map.remove("kind");
        }
        Ok(value)
    }
}

impl Animation {
    /// Create an animation with the given id and clip-relative span.
    pub fn new(id: AnimationId, start_time: f64, end_time: f64, properties: AnimationProps) -> Self {
        Self {
            id,
            start_time,
            end_time,
            properties,
        }
    }

    pub fn kind(&self) -> AnimationKind {
        self.properties.kind()
    }

    pub fn duration(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }

    /// Whether a clip-relative time falls inside this span (inclusive).
    pub fn is_active_at(&self, clip_time: f64) -> bool {
        clip_time >= self.start_time && clip_time <= self.end_time
    }

    pub fn zoom(&self) -> Option<&ZoomProps> {
        match &self.properties {
            AnimationProps::Zoom(z) => Some(z),
            _ => None,
        }
    }

    pub fn zoom_mut(&mut self) -> Option<&mut ZoomProps> {
        match &mut self.properties {
            AnimationProps::Zoom(z) => Some(z),
            _ => None,
        }
    }
}

/// Fields for creating an animation; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationDraft {
    pub start_time: f64,
    pub end_time: f64,
    pub properties: AnimationProps,
}

impl AnimationDraft {
    pub fn new(start_time: f64, end_time: f64, properties: AnimationProps) -> Self {
        Self {
            start_time,
            end_time,
            properties,
        }
    }
}

/// Partial update to an animation. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationUpdate {
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub properties: Option<AnimationProps>,
}

impl AnimationUpdate {
    pub fn timing(start_time: f64, end_time: f64) -> Self {
        Self {
            start_time: Some(start_time),
            end_time: Some(end_time),
            properties: None,
        }
    }

    pub fn properties(properties: AnimationProps) -> Self {
        Self {
            properties: Some(properties),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_time.is_none() && self.end_time.is_none() && self.properties.is_none()
    }
}
