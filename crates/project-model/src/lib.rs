//! Montage Project Model
//!
//! Defines the core data contracts for Montage projects:
//! - **Clips:** timeline-positioned references to media with trim bounds
//! - **Animations:** clip-relative overlays with typed, per-kind payloads
//! - **Project:** ordered clips plus edit-wide settings
//! - **Render/Upload:** the JSON handed to the rendering service and the
//!   client-side upload acceptance rules
//!
//! All times are seconds. Clip times are global timeline coordinates;
//! animation times are relative to the owning clip.

pub mod animation;
pub mod clip;
pub mod ids;
pub mod project;
pub mod render;
pub mod upload;

pub use animation::*;
pub use clip::*;
pub use ids::*;
pub use project::*;
pub use render::*;
pub use upload::*;
