//! High-level thumbnail operations.
//!
//! These functions combine calculations with backend execution: they take a
//! source's dimensions and the encode settings, compute parameters, and call
//! the backend.

use super::backend::{BackendError, Dimensions, ThumbnailBackend};
use super::calculations::{long_edge, target_size};
use super::params::{PhotoQuality, PhotoThumbParams, VideoQuality, VideoThumbParams};
use crate::config::ThumbsConfig;
use crate::types::{MediaKind, SizeClass};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get media dimensions using the backend.
pub fn get_dimensions(backend: &impl ThumbnailBackend, path: &Path) -> Result<Dimensions> {
    backend.dimensions(path)
}

/// Encoder knobs shared by every thumbnail of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeSettings {
    pub video_seek: f64,
    pub video_quality: VideoQuality,
    pub photo_quality: PhotoQuality,
}

impl EncodeSettings {
    pub fn from_config(config: &ThumbsConfig) -> Self {
        Self {
            video_seek: config.video.seek,
            video_quality: VideoQuality::new(config.video.quality),
            photo_quality: PhotoQuality::new(config.photo.quality),
        }
    }
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self::from_config(&ThumbsConfig::default())
    }
}

/// What the backend is asked to run.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeParams {
    Photo(PhotoThumbParams),
    Video(VideoThumbParams),
}

/// One planned size-class thumbnail.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailPlan {
    pub class: SizeClass,
    /// Target `(width, height)` from the size policy.
    pub target: (u32, u32),
    pub encode: EncodeParams,
}

/// Plan a thumbnail operation without executing it.
pub fn plan_thumbnail(
    source: &Path,
    output: &Path,
    dims: Dimensions,
    class: SizeClass,
    kind: MediaKind,
    settings: &EncodeSettings,
) -> ThumbnailPlan {
    let target = target_size(dims.width, dims.height, class, kind);
    let encode = match kind {
        MediaKind::Photo => EncodeParams::Photo(PhotoThumbParams {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            long_edge: long_edge(target),
            quality: settings.photo_quality,
        }),
        MediaKind::Video => EncodeParams::Video(VideoThumbParams {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            width: target.0,
            height: target.1,
            seek_seconds: settings.video_seek,
            quality: settings.video_quality,
        }),
    };
    ThumbnailPlan {
        class,
        target,
        encode,
    }
}

/// Run a planned thumbnail through the backend.
pub fn create_thumbnail(backend: &impl ThumbnailBackend, plan: &ThumbnailPlan) -> Result<()> {
    match &plan.encode {
        EncodeParams::Photo(params) => backend.encode_photo(params),
        EncodeParams::Video(params) => backend.encode_video(params),
    }
}
