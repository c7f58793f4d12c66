//! Check a local file against the upload limits before sending it anywhere.

use std::path::{Path, PathBuf};

use anyhow::Context;
use montage_common::EditorConfig;
use montage_project_model::{validate_upload, UploadCandidate};

pub fn run(file: PathBuf, config: &EditorConfig) -> anyhow::Result<()> {
    let metadata = std::fs::metadata(&file)
        .with_context(|| format!("Failed to stat {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let candidate = UploadCandidate::new(file_name, guess_mime(&file), metadata.len());
    validate_upload(&candidate, &config.upload)?;

    println!(
        "{} is acceptable ({} bytes)",
        candidate.file_name, candidate.size_bytes
    );
    Ok(())
}

fn guess_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "mp4" => Some("video/mp4"),
        "mov" => Some("video/quicktime"),
        "avi" => Some("video/x-msvideo"),
        "webm" => Some("video/webm"),
        _ => None,
    }
}
