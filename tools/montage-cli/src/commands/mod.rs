pub mod check_upload;
pub mod info;
pub mod play;
pub mod render_request;

use std::path::Path;

use montage_common::EditorConfig;
use montage_project_model::Project;
use montage_timeline_store::TimelineStore;

/// Read a project description and lay it out the way the editor would.
pub fn load_store(path: &Path, config: &EditorConfig) -> anyhow::Result<TimelineStore> {
    let project =
        Project::load(path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;
    Ok(TimelineStore::new(project, config.sync))
}
