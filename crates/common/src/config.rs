//! Editor configuration.
//!
//! Every "is this drift significant" decision in the editor reads from one
//! [`SyncPolicy`], so the store, scheduler, and media pool agree on what
//! counts as the same instant.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global editor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Time tolerances shared by the store, scheduler, and media pool.
    pub sync: SyncPolicy,

    /// Playback scheduler settings.
    pub playback: PlaybackConfig,

    /// Drag/resize and interactive zoom settings.
    pub editing: EditingConfig,

    /// Client-side upload validation limits.
    pub upload: UploadLimits,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Centralized time-drift tolerances, all in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncPolicy {
    /// Playhead changes smaller than this are ignored; also the forward
    /// nudge applied when snapping across a clip boundary.
    pub time_epsilon: f64,

    /// Distance from a clip's end at which playback snaps into the next clip.
    pub boundary_snap: f64,

    /// Start/end mismatch between neighbours that triggers re-layout.
    pub contiguity_tolerance: f64,

    /// Drift between element and playhead that forces a seek while paused.
    pub seek_threshold: f64,

    /// Drift between element progress and scheduler time that is adopted
    /// while playing.
    pub playback_resync: f64,

    /// How close to the active clip's start the playhead must be for the
    /// previous clip to stay resident.
    pub previous_clip_window: f64,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            time_epsilon: 0.01,
            boundary_snap: 0.05,
            contiguity_tolerance: 0.1,
            seek_threshold: 0.2,
            playback_resync: 0.5,
            previous_clip_window: 2.0,
        }
    }
}

impl SyncPolicy {
    /// Whether two timeline positions are the same instant for layout purposes.
    pub fn is_contiguous(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.contiguity_tolerance
    }
}

/// Playback scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Target tick cadence in milliseconds.
    pub tick_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 16,
        }
    }
}

/// Interactive editing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditingConfig {
    /// Smallest duration a clip can be resized to (seconds).
    pub min_clip_duration: f64,

    /// Smallest duration an animation span can be resized to (seconds).
    pub min_animation_duration: f64,

    /// Minimum interval between emitted drag updates (milliseconds).
    pub debounce_ms: u64,

    /// Zoom level change per wheel notch.
    pub zoom_step: f64,

    /// Lowest zoom level reachable interactively.
    pub zoom_min: f64,

    /// Highest zoom level reachable interactively.
    pub zoom_max: f64,
}

impl Default for EditingConfig {
    fn default() -> Self {
        Self {
            min_clip_duration: 1.0,
            min_animation_duration: 0.1,
            debounce_ms: 16,
            zoom_step: 0.1,
            zoom_min: 0.5,
            zoom_max: 10.0,
        }
    }
}

/// Upload acceptance rules, checked before any network round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadLimits {
    /// Hard size limit in bytes.
    pub max_bytes: u64,

    /// Accepted file extensions (lowercase, without the dot).
    pub extensions: Vec<String>,

    /// Accepted MIME types.
    pub mime_types: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: 500 * 1024 * 1024,
            extensions: ["mp4", "mov", "avi", "webm"]
                .into_iter()
                .map(String::from)
                .collect(),
            mime_types: [
                "video/mp4",
                "video/quicktime",
                "video/x-msvideo",
                "video/avi",
                "video/webm",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "montage=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl EditorConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &std::path::Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, config_path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("montage").join("config.json")
}
