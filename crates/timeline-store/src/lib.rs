//! Montage Timeline Store
//!
//! The single source of truth for an edit session:
//! - **State:** immutable [`TimelineState`] snapshots, replaced wholesale on
//!   every accepted mutation
//! - **Commands:** clip, animation, selection, playhead, and settings edits
//! - **Queries:** active clip, clip at time, clip-relative playhead
//! - **Observers:** explicit subscriptions notified after each commit
//!
//! Commands never fail. Edits that reference missing clips or animations
//! are no-ops; out-of-range values are clamped.

pub mod layout;
pub mod observer;
pub mod state;
pub mod store;

pub use observer::SubscriptionId;
pub use state::*;
pub use store::TimelineStore;
