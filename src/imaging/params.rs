//! Parameter types for encode operations.
//!
//! These structs describe *what* to produce, not *how*. They are the interface
//! between [`operations`](super::operations), which decides target sizes and
//! output paths, and the [`backend`](super::backend), which runs the external
//! encoder. Swapping the backend (e.g. a mock in tests) leaves the planning
//! logic untouched.

use std::path::PathBuf;

/// ffmpeg `-q:v` for MJPEG output (2 = best, 31 = worst).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoQuality(u32);

impl VideoQuality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(2, 31))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for VideoQuality {
    fn default() -> Self {
        Self(3)
    }
}

/// ImageMagick `-quality` for JPEG output (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoQuality(u32);

impl PhotoQuality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for PhotoQuality {
    fn default() -> Self {
        Self(85)
    }
}

/// A photo thumbnail: auto-orient, then fit inside a `long_edge` square.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoThumbParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub long_edge: u32,
    pub quality: PhotoQuality,
}

/// A video thumbnail: one frame at `seek_seconds`, scaled down into `width`×`height`.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoThumbParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub seek_seconds: f64,
    pub quality: VideoQuality,
}
