//! Show project information.

use std::path::PathBuf;

use montage_common::EditorConfig;

pub fn run(path: PathBuf, config: &EditorConfig) -> anyhow::Result<()> {
    let store = super::load_store(&path, config)?;
    let p = store.project();

    println!("Project: {}", p.name);
    println!("  Duration: {:.2}s", p.duration);
    println!(
        "  Active clip: {}",
        p.active_clip_id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    println!();

    println!("Clips ({}):", p.clips.len());
    for clip in &p.clips {
        println!(
            "  {} {:>8.2}s - {:>8.2}s  trim {:.2}/{:.2}  {}",
            clip.id,
            clip.start_time,
            clip.end_time,
            clip.trim_start,
            clip.trim_end,
            clip.source.label()
        );
        for anim in &clip.animations {
            println!(
                "    {:?} {} {:.2}s - {:.2}s",
                anim.kind(),
                anim.id,
                anim.start_time,
                anim.end_time
            );
        }
    }
    println!();

    println!("Settings:");
    println!("  Background: {}", p.background_settings.color);
    println!(
        "  Contiguous: {}",
        p.is_contiguous(config.sync.contiguity_tolerance)
    );

    Ok(())
}
