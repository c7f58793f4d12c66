//! Contiguous clip layout.
//!
//! Clips are sorted by start time and abut with no gap or overlap. The
//! first clip starts at 0.

use montage_project_model::{Animation, Clip};

/// Place `clips[from..]` left to right, each keeping its own duration. The
/// first placed clip starts at its predecessor's end (or 0).
pub fn relayout_from(clips: &mut [Clip], from: usize) {
    let mut cursor = if from == 0 || from > clips.len() {
        0.0
    } else {
        clips[from - 1].end_time
    };
    for clip in clips.iter_mut().skip(from) {
        clip.start_time = cursor;
        clip.end_time = cursor + clip.duration;
        cursor = clip.end_time;
    }
}

/// Reposition every clip from 0.
pub fn relayout_all(clips: &mut [Clip]) {
    relayout_from(clips, 0);
}

/// Index of the first clip whose start differs from its expected position
/// (predecessor's end, or 0 for the first clip) by more than `tolerance`.
pub fn first_discontinuity(clips: &[Clip], tolerance: f64) -> Option<usize> {
    let mut expected = 0.0;
    for (i, clip) in clips.iter().enumerate() {
        if (clip.start_time - expected).abs() > tolerance {
            return Some(i);
        }
        expected = clip.end_time;
    }
    None
}

/// Stable-sort by start time, then re-lay out from the first
/// discontinuity. Returns whether any clip moved.
pub fn enforce_contiguity(clips: &mut [Clip], tolerance: f64) -> bool {
    let was_sorted = clips
        .windows(2)
        .all(|w| w[0].start_time <= w[1].start_time);
    if !was_sorted {
        clips.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    }
    match first_discontinuity(clips, tolerance) {
        Some(from) => {
            relayout_from(clips, from);
            true
        }
        None => !was_sorted,
    }
}

/// Clamp an animation span into `[0, clip_duration]` with `end >= start`.
pub fn clamp_animation(animation: &mut Animation, clip_duration: f64) {
    let limit = clip_duration.max(0.0);
    animation.start_time = animation.start_time.clamp(0.0, limit);
    animation.end_time = animation.end_time.clamp(animation.start_time, limit);
}
