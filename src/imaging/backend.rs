//! Thumbnail backend trait and shared types.
//!
//! The [`ThumbnailBackend`] trait defines the three operations the pipeline
//! needs: resolve dimensions, encode a photo thumbnail, and encode a video
//! thumbnail.
//!
//! The production implementation is
//! [`CliBackend`](super::cli_backend::CliBackend), which shells out to
//! ImageMagick, libheif and ffmpeg. Tests use a recording mock.

use super::params::{PhotoThumbParams, VideoThumbParams};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Failure taxonomy for probing and encoding.
///
/// During probing the first four variants all mean "this strategy failed,
/// try the next one"; only [`BackendError::DimensionsNotFound`] reaches the
/// pipeline.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("{program} is not available: {reason}")]
    ToolUnavailable { program: String, reason: String },
    #[error("{program} timed out after {}s", .timeout.as_secs())]
    ToolTimeout { program: String, timeout: Duration },
    #[error("could not parse {program} output: {detail}")]
    UnparseableOutput { program: String, detail: String },
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },
    #[error("could not get dimensions for {}", .0.display())]
    DimensionsNotFound(PathBuf),
    #[error("encode failed for {}: {detail}", .output.display())]
    EncodeFailed { output: PathBuf, detail: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pixel dimensions of a media file. Both edges are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Accept only strictly positive edges that fit in `u32`.
    pub fn new(width: i64, height: i64) -> Result<Self, BackendError> {
        match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok(Self {
                width: w,
                height: h,
            }),
            _ => Err(BackendError::InvalidDimensions { width, height }),
        }
    }
}

/// Everything the pipeline asks of the outside world.
///
/// `Sync` so one backend can be shared by the per-file worker pool.
pub trait ThumbnailBackend: Sync {
    /// Resolve pixel dimensions, trying every available probe.
    fn dimensions(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Produce a JPEG photo thumbnail at `params.output`.
    fn encode_photo(&self, params: &PhotoThumbParams) -> Result<(), BackendError>;

    /// Produce a JPEG video frame thumbnail at `params.output`.
    fn encode_video(&self, params: &VideoThumbParams) -> Result<(), BackendError>;
}
