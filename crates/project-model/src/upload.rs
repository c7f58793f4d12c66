//! Client-side upload validation.
//!
//! Oversized or unsupported files are rejected here, before any network
//! round trip. Rejections are surfaced to the user and never retried.

use montage_common::{MontageError, UploadLimits};

/// A file the user wants to upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadCandidate {
    pub file_name: String,
    /// MIME type reported by the picker, if any.
    pub mime_type: Option<String>,
    pub size_bytes: u64,
}

impl UploadCandidate {
    pub fn new(file_name: impl Into<String>, mime_type: Option<&str>, size_bytes: u64) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.map(str::to_string),
            size_bytes,
        }
    }

    /// Lowercased extension without the dot.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("{file_name} is {size_bytes} bytes; the limit is {max_bytes} bytes")]
    TooLarge {
        file_name: String,
        size_bytes: u64,
        max_bytes: u64,
    },

    #[error("{file_name} is not a supported video type (accepted: {accepted})")]
    UnsupportedType { file_name: String, accepted: String },

    #[error("{file_name} is empty")]
    Empty { file_name: String },
}

impl From<UploadError> for MontageError {
    fn from(e: UploadError) -> Self {
        MontageError::upload(e.to_string())
    }
}

/// Check a candidate against the limits. Pure; performs no I/O.
///
/// A file is accepted by type when either its MIME type or its extension is
/// on the accepted list.
pub fn validate_upload(candidate: &UploadCandidate, limits: &UploadLimits) -> Result<(), UploadError> {
    if candidate.size_bytes == 0 {
        return Err(UploadError::Empty {
            file_name: candidate.file_name.clone(),
        });
    }

    if candidate.size_bytes > limits.max_bytes {
        return Err(UploadError::TooLarge {
            file_name: candidate.file_name.clone(),
            size_bytes: candidate.size_bytes,
            max_bytes: limits.max_bytes,
        });
    }

    let mime_ok = candidate
        .mime_type
        .as_deref()
        .map(|m| limits.mime_types.iter().any(|a| a.eq_ignore_ascii_case(m)))
        .unwrap_or(false);
    let ext_ok = candidate
        .extension()
        .map(|e| limits.extensions.iter().any(|a| a == &e))
        .unwrap_or(false);

    if !mime_ok && !ext_ok {
        return Err(UploadError::UnsupportedType {
            file_name: candidate.file_name.clone(),
            accepted: limits.extensions.join(", "),
        });
    }

    Ok(())
}
