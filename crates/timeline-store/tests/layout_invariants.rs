use montage_project_model::{ClipDraft, ClipId, ClipUpdate, MediaSource};
use montage_timeline_store::{TimeSource, TimelineStore};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add { duration: f64 },
    SetDuration { index: usize, duration: f64 },
    Move { index: usize, start: f64 },
    Nudge { index: usize, delta: f64 },
    ResizeHead { index: usize, delta: f64 },
    Trim { index: usize, trim_start: f64 },
    Remove { index: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0.5f64..30.0).prop_map(|duration| Op::Add { duration }),
        2 => (0usize..8, 0.0f64..40.0).prop_map(|(index, duration)| Op::SetDuration { index, duration }),
        1 => (0usize..8, -5.0f64..80.0).prop_map(|(index, start)| Op::Move { index, start }),
        2 => (0usize..8, -0.09f64..0.09).prop_map(|(index, delta)| Op::Nudge { index, delta }),
        2 => (0usize..8, -0.09f64..0.09).prop_map(|(index, delta)| Op::ResizeHead { index, delta }),
        1 => (0usize..8, 0.0f64..5.0).prop_map(|(index, trim_start)| Op::Trim { index, trim_start }),
        1 => (0usize..8).prop_map(|index| Op::Remove { index }),
    ]
}

fn draft(duration: f64) -> ClipDraft {
    let mut draft = ClipDraft::new(
        "clip",
        MediaSource::Url {
            url: "https://cdn.example/clip.mp4".to_string(),
        },
        duration,
    );
    // Leave headroom so duration edits can grow the clip.
    draft.original_duration = duration * 2.0;
    draft
}

fn nth_id(store: &TimelineStore, index: usize) -> Option<ClipId> {
    let clips = &store.project().clips;
    if clips.is_empty() {
        None
    } else {
        Some(clips[index % clips.len()].id.clone())
    }
}

fn apply(store: &mut TimelineStore, op: &Op) {
    match *op {
        Op::Add { duration } => {
            store.add_clip(draft(duration));
        }
        Op::SetDuration { index, duration } => {
            if let Some(id) = nth_id(store, index) {
                store.update_clip(&id, ClipUpdate::duration(duration));
            }
        }
        Op::Move { index, start } => {
            if let Some(id) = nth_id(store, index) {
                store.update_clip(
                    &id,
                    ClipUpdate {
                        start_time: Some(start),
                        ..ClipUpdate::default()
                    },
                );
            }
        }
        Op::Nudge { index, delta } => {
            if let Some(id) = nth_id(store, index) {
                let start = store.project().clip(&id).map_or(0.0, |c| c.start_time);
                store.update_clip(
                    &id,
                    ClipUpdate {
                        start_time: Some(start + delta),
                        ..ClipUpdate::default()
                    },
                );
            }
        }
        Op::ResizeHead { index, delta } => {
            if let Some(id) = nth_id(store, index) {
                let (start, end) = store
                    .project()
                    .clip(&id)
                    .map_or((0.0, 0.0), |c| (c.start_time, c.end_time));
                let start = (start + delta).max(0.0);
                store.update_clip(
                    &id,
                    ClipUpdate {
                        start_time: Some(start),
                        duration: Some(end - start),
                        ..ClipUpdate::default()
                    },
                );
            }
        }
        Op::Trim { index, trim_start } => {
            if let Some(id) = nth_id(store, index) {
                store.update_clip(
                    &id,
                    ClipUpdate {
                        trim_start: Some(trim_start),
                        ..ClipUpdate::default()
                    },
                );
            }
        }
        Op::Remove { index } => {
            if let Some(id) = nth_id(store, index) {
                store.remove_clip(&id);
            }
        }
    }
}

proptest! {
    #[test]
    fn clips_stay_sorted_and_contiguous(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut store = TimelineStore::empty("prop");
        for op in &ops {
            apply(&mut store, op);

            let clips = &store.project().clips;
            if let Some(first) = clips.first() {
                prop_assert!(first.start_time.abs() < 1e-9);
            }
            for pair in clips.windows(2) {
                prop_assert!(pair[0].start_time <= pair[1].start_time);
                prop_assert!(
                    (pair[1].start_time - pair[0].end_time).abs() < 1e-9,
                    "gap between {} and {}", pair[0].end_time, pair[1].start_time
                );
            }
            for clip in clips {
                prop_assert!((clip.end_time - clip.start_time - clip.duration).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn duration_edits_keep_exact_contiguity(
        durations in prop::collection::vec(0.5f64..30.0, 1..8),
        edits in prop::collection::vec((0usize..8, 0.0f64..40.0), 0..20),
        removals in prop::collection::vec(0usize..8, 0..4),
    ) {
        let mut store = TimelineStore::empty("prop");
        for d in &durations {
            store.add_clip(draft(*d));
        }
        for (index, duration) in &edits {
            apply(&mut store, &Op::SetDuration { index: *index, duration: *duration });
        }
        for index in &removals {
            apply(&mut store, &Op::Remove { index: *index });
        }

        let clips = &store.project().clips;
        for pair in clips.windows(2) {
            prop_assert!((pair[1].start_time - pair[0].end_time).abs() < 1e-9);
        }
    }

    #[test]
    fn duration_is_max_end_time(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut store = TimelineStore::empty("prop");
        for op in &ops {
            apply(&mut store, op);
            let expected = store
                .project()
                .clips
                .iter()
                .map(|c| c.end_time)
                .fold(0.0_f64, f64::max);
            prop_assert_eq!(store.project().duration, expected);
        }
    }

    #[test]
    fn clip_at_time_matches_half_open_membership(
        durations in prop::collection::vec(0.5f64..20.0, 0..6),
        t in -5.0f64..120.0,
    ) {
        let mut store = TimelineStore::empty("prop");
        for d in &durations {
            store.add_clip(draft(*d));
        }
        let expected = store
            .project()
            .clips
            .iter()
            .find(|c| c.start_time <= t && t < c.end_time)
            .map(|c| c.id.clone());
        prop_assert_eq!(store.clip_at_time(t).map(|c| c.id.clone()), expected);
    }
}

#[test]
fn scrubbing_into_second_clip_switches_active() {
    let mut store = TimelineStore::empty("scenario");
    store.add_clip(draft(10.0));
    let second = store.add_clip(draft(8.0));
    store.set_current_time(2.0, TimeSource::Scrub);
    assert_ne!(store.project().active_clip_id.as_ref(), Some(&second));

    store.set_current_time(10.05, TimeSource::Scrub);
    assert_eq!(store.project().active_clip_id.as_ref(), Some(&second));
}

#[test]
fn removing_every_clip_clears_active() {
    let mut store = TimelineStore::empty("scenario");
    let a = store.add_clip(draft(3.0));
    let b = store.add_clip(draft(4.0));
    store.remove_clip(&b);
    assert_eq!(store.project().active_clip_id.as_ref(), Some(&a));
    store.remove_clip(&a);
    assert_eq!(store.project().active_clip_id, None);
    assert_eq!(store.project().duration, 0.0);
}
