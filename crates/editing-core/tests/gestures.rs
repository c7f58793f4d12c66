use std::time::{Duration, Instant};

use montage_common::EditingConfig;
use montage_editing_core::drag::clip_update;
use montage_editing_core::{DragController, DragMode, DragTarget, DragUpdate};
use montage_project_model::{ClipDraft, MediaSource};
use montage_timeline_store::TimelineStore;
use proptest::prelude::*;

fn draft(duration: f64, original: f64) -> ClipDraft {
    let mut draft = ClipDraft::new(
        "clip",
        MediaSource::Url {
            url: "https://cdn.example/clip.mp4".to_string(),
        },
        duration,
    );
    draft.original_duration = original;
    draft
}

fn mode_strategy() -> impl Strategy<Value = DragMode> {
    prop_oneof![
        Just(DragMode::Move),
        Just(DragMode::ResizeLeft),
        Just(DragMode::ResizeRight),
    ]
}

proptest! {
    /// Whatever the move cadence, the last edit of a gesture depends only on
    /// the anchor and the final pointer position.
    #[test]
    fn final_edit_depends_only_on_final_pointer(
        mode in mode_strategy(),
        moves in prop::collection::vec((-400.0f64..400.0, 0u64..40), 1..30),
    ) {
        let mut store = TimelineStore::empty("gesture");
        store.add_clip(draft(6.0, 12.0));
        let id = store.add_clip(draft(10.0, 20.0));
        let anchor_clip = store.project().clip(&id).unwrap().clone();

        let mut controller = DragController::new(EditingConfig::default());
        prop_assert!(controller.pointer_down(&mut store, DragTarget::Clip(id.clone()), mode, 0.0, 40.0));

        let mut now = Instant::now();
        let mut last_emitted = None;
        for (x, gap_ms) in &moves {
            now += Duration::from_millis(*gap_ms);
            if let Some(update) = controller.pointer_move(*x, now) {
                last_emitted = Some(update);
            }
        }
        let last = controller.pointer_up().or(last_emitted).unwrap();

        let final_x = moves.last().unwrap().0;
        let anchor = montage_editing_core::drag::DragAnchor {
            pointer_x: 0.0,
            start_time: anchor_clip.start_time,
            end_time: anchor_clip.end_time,
            trim_start: anchor_clip.trim_start,
            bound: anchor_clip.original_duration,
        };
        let expected = clip_update(mode, &anchor, final_x / 40.0, 1.0);
        prop_assert_eq!(last, DragUpdate::Clip { id, update: expected });
    }
}

#[test]
fn resize_left_on_follower_trims_head_and_stays_attached() {
    let mut store = TimelineStore::empty("gesture");
    let first = store.add_clip(draft(10.0, 10.0));
    let second = store.add_clip(draft(10.0, 20.0));

    let mut controller = DragController::new(EditingConfig::default());
    controller.pointer_down(&mut store, DragTarget::Clip(second.clone()), DragMode::ResizeLeft, 0.0, 10.0);
    controller
        .pointer_move(30.0, Instant::now())
        .unwrap()
        .apply(&mut store);
    controller.pointer_up();

    let clips = &store.project().clips;
    assert_eq!(clips[0].id, first);
    assert_eq!(clips[1].id, second);
    assert!((clips[1].trim_start - 3.0).abs() < 1e-9);
    assert!((clips[1].duration - 7.0).abs() < 1e-9);
    // The gap left by the trimmed head is closed.
    assert!((clips[1].start_time - clips[0].end_time).abs() < 1e-9);
    assert!((store.project().duration - 17.0).abs() < 1e-9);
}

fn assert_contiguous(store: &TimelineStore) {
    let clips = &store.project().clips;
    assert_eq!(clips[0].start_time, 0.0);
    for pair in clips.windows(2) {
        assert_eq!(pair[1].start_time, pair[0].end_time);
    }
}

#[test]
fn tiny_resize_left_on_follower_leaves_no_hole() {
    let mut store = TimelineStore::empty("gesture");
    store.add_clip(draft(10.0, 10.0));
    let second = store.add_clip(draft(8.0, 8.0));

    let mut controller = DragController::new(EditingConfig::default());
    controller.pointer_down(&mut store, DragTarget::Clip(second.clone()), DragMode::ResizeLeft, 0.0, 50.0);
    controller
        .pointer_move(2.5, Instant::now())
        .unwrap()
        .apply(&mut store);
    if let Some(update) = controller.pointer_up() {
        update.apply(&mut store);
    }

    assert_contiguous(&store);
    let clip = store.project().clip(&second).unwrap();
    assert!((clip.duration - 7.95).abs() < 1e-9);
    assert!((clip.trim_start - 0.05).abs() < 1e-9);
    assert_eq!(store.clip_at_time(10.02).map(|c| c.id.clone()), Some(second));
}

#[test]
fn tiny_move_of_first_clip_keeps_layout_exact() {
    let mut store = TimelineStore::empty("gesture");
    let first = store.add_clip(draft(10.0, 10.0));
    store.add_clip(draft(8.0, 8.0));

    let mut controller = DragController::new(EditingConfig::default());
    controller.pointer_down(&mut store, DragTarget::Clip(first.clone()), DragMode::Move, 0.0, 50.0);
    controller
        .pointer_move(3.0, Instant::now())
        .unwrap()
        .apply(&mut store);
    controller.pointer_up();

    assert_contiguous(&store);
    assert_eq!(store.project().clips[0].id, first);
    assert_eq!(store.project().duration, 18.0);
}

proptest! {
    #[test]
    fn small_drags_never_open_gaps(
        mode in mode_strategy(),
        target in 0usize..3,
        px in -5.0f64..5.0,
    ) {
        let mut store = TimelineStore::empty("gesture");
        let ids = [
            store.add_clip(draft(6.0, 12.0)),
            store.add_clip(draft(10.0, 20.0)),
            store.add_clip(draft(4.0, 8.0)),
        ];

        let mut controller = DragController::new(EditingConfig::default());
        controller.pointer_down(&mut store, DragTarget::Clip(ids[target].clone()), mode, 0.0, 50.0);
        if let Some(update) = controller.pointer_move(px, Instant::now()) {
            update.apply(&mut store);
        }
        if let Some(update) = controller.pointer_up() {
            update.apply(&mut store);
        }

        let clips = &store.project().clips;
        prop_assert_eq!(clips[0].start_time, 0.0);
        for pair in clips.windows(2) {
            prop_assert_eq!(pair[1].start_time, pair[0].end_time);
        }
    }
}
