//! Shared test utilities for the syno-thumbs test suite.
//!
//! Provides fixture builders for media directories and sidecar trees, plus
//! fake executables for exercising the external-tool layer.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_library(&["a.jpg", "clip.mov"]);
//! let ea_dir = tmp.path().join("@eaDir");
//! seed_thumbnails(&ea_dir, "a.jpg", &SizeClass::ALL);
//! assert_eq!(thumbnail_state(&ea_dir, "a.jpg", SizeClass::Sm), ThumbnailState::Ready);
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::naming::subdir_for;
use crate::state::{ThumbnailDir, ThumbnailState};
use crate::types::{MediaFile, SizeClass};

// =========================================================================
// Fixture setup
// =========================================================================

/// Create an empty file, including any missing parent directories.
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"").unwrap();
}

/// A temp directory holding one empty file per name.
pub fn setup_library(names: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for name in names {
        touch(&tmp.path().join(name));
    }
    tmp
}

/// Media files for `names` inside `dir`, in the given order. Panics on
/// unsupported extensions.
pub fn media_files(dir: &Path, names: &[&str]) -> Vec<MediaFile> {
    names
        .iter()
        .map(|name| {
            MediaFile::from_path(&dir.join(name))
                .unwrap_or_else(|| panic!("'{name}' is not a supported media file"))
        })
        .collect()
}

/// Write placeholder artifacts for `classes` under `<ea_dir>/<file_name>/`.
pub fn seed_thumbnails(ea_dir: &Path, file_name: &str, classes: &[SizeClass]) {
    let dir = ThumbnailDir::new(subdir_for(ea_dir, file_name));
    for &class in classes {
        touch(&dir.artifact_path(class));
    }
}

/// Write failure markers for `classes` under `<ea_dir>/<file_name>/`.
pub fn seed_markers(ea_dir: &Path, file_name: &str, classes: &[SizeClass]) {
    let dir = ThumbnailDir::new(subdir_for(ea_dir, file_name));
    for &class in classes {
        touch(&dir.marker_path(class));
    }
}

// =========================================================================
// Sidecar lookups
// =========================================================================

pub fn thumbnail_state(
    ea_dir: &Path,
    file_name: impl AsRef<OsStr>,
    class: SizeClass,
) -> ThumbnailState {
    ThumbnailDir::new(subdir_for(ea_dir, file_name)).state(class)
}

/// All three states for one file, in SM, M, XL order.
pub fn thumbnail_states(ea_dir: &Path, file_name: impl AsRef<OsStr>) -> [ThumbnailState; 3] {
    let file_name = file_name.as_ref();
    SizeClass::ALL.map(|class| thumbnail_state(ea_dir, file_name, class))
}

// =========================================================================
// Fake executables
// =========================================================================

/// Write an executable `/bin/sh` script named `name` into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
