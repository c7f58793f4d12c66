//! Simulated playback.
//!
//! Runs the real scheduler and media pool against the recording backend, so
//! clip transitions and boundary snapping can be watched from a terminal.
//! Ctrl-C pauses.

use std::path::PathBuf;

use montage_common::EditorConfig;
use montage_playback_engine::{DriverIo, MediaPool, PlaybackDriver, RecordingBackend, StopReason};
use montage_timeline_store::{StoreEvent, TimeSource};
use tokio::sync::{mpsc, watch};

pub async fn run(path: PathBuf, from: f64, config: &EditorConfig) -> anyhow::Result<()> {
    let mut store = super::load_store(&path, config)?;
    if store.project().clips.is_empty() {
        anyhow::bail!("Project has no clips to play");
    }
    store.set_current_time(from, TimeSource::Scrub);

    store.subscribe(|state, event| {
        if let StoreEvent::ActiveClipChanged {
            clip_id: Some(clip_id),
        } = event
        {
            println!("  {:>8.2}s  -> {}", state.current_time, clip_id);
        }
    });

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let mut pool = MediaPool::new(RecordingBackend::with_events(event_tx), config.sync);
    pool.on_error(|e| eprintln!("media error: {e}"));

    let (pause_tx, pause_rx) = watch::channel(false);
    let mut io = DriverIo::new(pause_rx).with_events(event_rx);
    let mut driver = PlaybackDriver::new(config.sync, &config.playback);

    println!(
        "Playing {} ({:.2}s) from {:.2}s",
        store.project().name,
        store.project().duration,
        store.current_time()
    );

    let reason = {
        let run = driver.run(&mut store, Some(&mut pool), &mut io);
        tokio::pin!(run);
        let mut armed = true;
        loop {
            tokio::select! {
                reason = &mut run => break reason,
                signal = tokio::signal::ctrl_c(), if armed => {
                    armed = false;
                    match signal {
                        Ok(()) => {
                            pause_tx.send_replace(true);
                        }
                        Err(e) => tracing::warn!("Cannot listen for Ctrl-C: {e}"),
                    }
                }
            }
        }
    };

    let released = pool.clear();
    tracing::debug!(released, "Media pool cleared");

    match reason {
        StopReason::Ended => println!("Reached end at {:.2}s", store.current_time()),
        StopReason::Paused => println!("Paused at {:.2}s", store.current_time()),
        StopReason::Stopped => println!("Stopped at {:.2}s", store.current_time()),
        StopReason::NotStarted => anyhow::bail!("Playback did not start"),
    }
    Ok(())
}
