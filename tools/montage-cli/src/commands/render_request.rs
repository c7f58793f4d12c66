//! Print the render request for a project.

use std::path::PathBuf;

use anyhow::Context;
use montage_common::EditorConfig;
use montage_project_model::RenderRequest;

pub fn run(path: PathBuf, config: &EditorConfig) -> anyhow::Result<()> {
    let store = super::load_store(&path, config)?;
    let request =
        RenderRequest::from_project(store.project()).context("Failed to build render request")?;
    tracing::debug!(
        clips = request.clips.len(),
        animations = request.animations.len(),
        "Built render request"
    );
    println!("{}", request.to_json_pretty()?);
    Ok(())
}
