//! Media-level failures, reported per clip.

use montage_common::MontageError;
use montage_project_model::ClipId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    #[error("failed to load media for clip {clip_id}: {message}")]
    LoadFailed { clip_id: ClipId, message: String },

    #[error("decode error in clip {clip_id}: {message}")]
    Decode { clip_id: ClipId, message: String },
}

impl MediaError {
    pub fn clip_id(&self) -> &ClipId {
        match self {
            MediaError::LoadFailed { clip_id, .. } | MediaError::Decode { clip_id, .. } => clip_id,
        }
    }
}

impl From<MediaError> for MontageError {
    fn from(e: MediaError) -> Self {
        MontageError::media(e.to_string())
    }
}
