//! Montage Playback Engine
//!
//! Advances the timeline while playing and keeps concrete media elements in
//! step with it:
//! - [`PlaybackScheduler`]: wall-clock driven playhead with boundary snapping
//! - [`PlaybackDriver`]: async tick loop with a pause signal
//! - [`MediaPool`]: resident element set, visibility, seeking, and readiness
//! - [`MediaHandleTable`]: explicit acquire/release of local media handles

pub mod driver;
pub mod element;
pub mod error;
pub mod handles;
pub mod pool;
pub mod recording;
pub mod scheduler;

pub use driver::{DriverIo, PlaybackDriver, StopReason};
pub use element::{ElementEvent, MediaBackend, MediaElement, MediaEvent, MediaState, Preload};
pub use error::MediaError;
pub use handles::{HandleId, MediaHandleTable};
pub use pool::MediaPool;
pub use recording::{ElementCommand, RecordingBackend};
pub use scheduler::{PlaybackScheduler, SchedulerState, TickOutcome};
