//! Shared types used across the scan, process, and state stages.

use serde::Serialize;
use std::fmt;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Photo extensions (lowercase, no dot).
pub const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "gif", "bmp", "tiff", "tif"];

/// Video extensions (lowercase, no dot).
pub const VIDEO_EXTENSIONS: &[&str] = &["mov", "mp4", "avi", "mkv", "m4v", "webm", "wmv"];

/// Whether a source file is scaled with the photo or the video rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// Classify a path by its extension. `None` means "not media, ignore it".
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else if PHOTO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Photo)
        } else {
            None
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Photo => f.write_str("photo"),
            MediaKind::Video => f.write_str("video"),
        }
    }
}

/// The three thumbnail tiers, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SizeClass {
    #[serde(rename = "SM")]
    Sm,
    #[serde(rename = "M")]
    M,
    #[serde(rename = "XL")]
    Xl,
}

impl SizeClass {
    /// Fixed processing order: SM, M, XL.
    pub const ALL: [SizeClass; 3] = [SizeClass::Sm, SizeClass::M, SizeClass::Xl];

    /// Suffix used in sidecar file names (`SYNOPHOTO_THUMB_<suffix>`).
    pub fn suffix(self) -> &'static str {
        match self {
            SizeClass::Sm => "SM",
            SizeClass::M => "M",
            SizeClass::Xl => "XL",
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A media file discovered in the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    /// Full file name including extension, byte for byte; also the name of its
    /// sidecar subdirectory.
    pub file_name: OsString,
    /// `file_name` for display; lossy when the name isn't UTF-8.
    pub name: String,
    pub kind: MediaKind,
}

impl MediaFile {
    /// Build from a path, or `None` when the extension is not on either allow-list.
    pub fn from_path(path: &Path) -> Option<Self> {
        let kind = MediaKind::from_path(path)?;
        let file_name = path.file_name()?.to_os_string();
        Some(Self {
            path: path.to_path_buf(),
            name: file_name.to_string_lossy().into_owned(),
            file_name,
            kind,
        })
    }
}
