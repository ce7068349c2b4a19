//! Thumbnail imaging: external tools driven from Rust.
//!
//! | Operation | Program |
//! |---|---|
//! | **Dimensions** | `identify`, `heif-info`, `ffprobe`, `ffmpeg -i` (first success wins) |
//! | **Photo thumbnail** | ImageMagick `convert` |
//! | **Video thumbnail** | `ffmpeg`, one frame |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for the size policy (unit testable)
//! - **Parameters**: Data structures describing encode operations
//! - **Backend**: [`ThumbnailBackend`] trait + [`CliBackend`]
//! - **Probe**: the [`DimensionResolver`] fallback chain
//! - **Command**: timeout-bounded child process runner
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod cli_backend;
pub mod command;
pub mod operations;
mod params;
pub mod probe;

pub use backend::{BackendError, Dimensions, ThumbnailBackend};
pub use calculations::{Edge, SizeRule, constrain_edge, size_rule, target_size};
pub use cli_backend::CliBackend;
pub use operations::{
    EncodeParams, EncodeSettings, ThumbnailPlan, create_thumbnail, get_dimensions, plan_thumbnail,
};
pub use params::{PhotoQuality, PhotoThumbParams, VideoQuality, VideoThumbParams};
pub use probe::{DimensionResolver, ProbeStrategy};
