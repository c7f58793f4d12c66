use std::collections::HashMap;
use std::time::{Duration, Instant};

use montage_common::SyncPolicy;
use montage_playback_engine::{
    ElementCommand, ElementEvent, MediaEvent, MediaPool, PlaybackScheduler, RecordingBackend,
    TickOutcome,
};
use montage_project_model::{ClipDraft, ClipId, MediaSource};
use montage_timeline_store::{TimeSource, TimelineStore};

fn store_with(durations: &[f64]) -> (TimelineStore, Vec<ClipId>) {
    let mut store = TimelineStore::empty("scenario");
    let ids: Vec<ClipId> = durations
        .iter()
        .enumerate()
        .map(|(i, d)| {
            store.add_clip(ClipDraft::new(
                format!("clip-{i}"),
                MediaSource::Url {
                    url: format!("https://cdn.example/{i}.mp4"),
                },
                *d,
            ))
        })
        .collect();
    store.select_clip(&ids[0]);
    (store, ids)
}

/// Replay the command log and return which elements end up visible.
fn visible_elements(backend: &RecordingBackend) -> Vec<ClipId> {
    let mut visible: HashMap<ClipId, bool> = HashMap::new();
    for (id, cmd) in backend.commands() {
        match cmd {
            ElementCommand::SetVisible(v) => {
                visible.insert(id, v);
            }
            ElementCommand::Release => {
                visible.remove(&id);
            }
            _ => {}
        }
    }
    visible
        .into_iter()
        .filter_map(|(id, v)| v.then_some(id))
        .collect()
}

fn ready_all(pool: &mut MediaPool) {
    for id in pool.resident_ids() {
        pool.handle_event(ElementEvent::new(id, MediaEvent::CanPlay));
    }
}

#[test]
fn playback_snaps_across_boundary_without_stalling() {
    let (mut store, ids) = store_with(&[10.0, 8.0]);
    store.set_current_time(9.97, TimeSource::Scrub);

    let mut scheduler = PlaybackScheduler::new(SyncPolicy::default());
    let t0 = Instant::now();
    assert!(scheduler.play(&mut store, t0));

    let outcome = scheduler.tick(&mut store, t0, None);
    assert!(matches!(outcome, TickOutcome::Snapped { .. }));
    assert!((store.current_time() - 10.01).abs() < 1e-9);
    assert_eq!(store.project().active_clip_id.as_ref(), Some(&ids[1]));
}

#[test]
fn exactly_one_element_visible_through_a_full_run() {
    let (mut store, ids) = store_with(&[1.0, 1.0, 1.0]);
    let backend = RecordingBackend::new();
    let mut pool = MediaPool::new(backend.clone(), SyncPolicy::default());
    let mut scheduler = PlaybackScheduler::new(SyncPolicy::default());

    pool.reconcile(store.state());
    ready_all(&mut pool);

    let t0 = Instant::now();
    scheduler.play(&mut store, t0);
    pool.reconcile(store.state());

    let mut now = t0;
    let mut seen_active = Vec::new();
    loop {
        now += Duration::from_millis(16);
        let outcome = scheduler.tick(&mut store, now, pool.take_time_hint());
        pool.reconcile(store.state());
        ready_all(&mut pool);

        let visible = visible_elements(&backend);
        assert_eq!(visible.len(), 1, "visible: {visible:?}");
        assert_eq!(Some(&visible[0]), pool.active_id());
        if seen_active.last() != pool.active_id() {
            seen_active.push(pool.active_id().cloned().unwrap());
        }
        if outcome.is_terminal() {
            break;
        }
    }

    assert_eq!(seen_active, ids);
    assert!((store.current_time() - 3.0).abs() < 1e-9);
    assert!(!store.is_playing());
}

#[test]
fn scrubbing_while_playing_is_ignored() {
    let (mut store, _ids) = store_with(&[10.0]);
    let mut scheduler = PlaybackScheduler::new(SyncPolicy::default());
    let t0 = Instant::now();
    scheduler.play(&mut store, t0);
    scheduler.tick(&mut store, t0 + Duration::from_millis(500), None);

    assert!(!store.set_current_time(7.0, TimeSource::Scrub));
    assert!((store.current_time() - 0.5).abs() < 1e-9);

    scheduler.pause(&mut store);
    assert!(store.set_current_time(7.0, TimeSource::Scrub));
}
