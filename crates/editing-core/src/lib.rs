//! Montage Editing Core
//!
//! Turns pointer input and playhead position into timeline edits:
//! - **Zoom:** interpolate a zoom span at a clip-relative time, and edit the
//!   selected span's end state live from wheel and drag input
//! - **Drag:** move / resize-left / resize-right gestures for clips and
//!   animation spans, with rate-limited emission anchored at pointer-down
//!
//! Everything here is pure computation over store snapshots. Edits are
//! applied through the store's command API.

pub mod drag;
pub mod zoom;

pub use drag::{DragController, DragMode, DragTarget, DragUpdate};
pub use zoom::{ZoomEditor, ZoomPreview};
