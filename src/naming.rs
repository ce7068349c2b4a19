//! Centralized naming for the Synology sidecar convention.
//!
//! Thumbnails for `<input>/name.ext` live in a per-file subdirectory of the
//! sidecar root, which is itself named after the source file (extension
//! included):
//!
//! ```text
//! <input>/@eaDir/IMG_0001.HEIC/SYNOPHOTO_THUMB_SM.jpg
//! <input>/@eaDir/IMG_0001.HEIC/SYNOPHOTO_THUMB_M.jpg
//! <input>/@eaDir/IMG_0001.HEIC/SYNOPHOTO_THUMB_XL.jpg
//! <input>/@eaDir/IMG_0001.HEIC/SYNOPHOTO_THUMB_XL.fail   ← last XL attempt failed
//! ```
//!
//! Synology Photos reads these files as-is, so the names here are fixed.

use crate::types::SizeClass;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Default sidecar root directory name, created under the input directory.
pub const EA_DIR_NAME: &str = "@eaDir";

/// Prefix shared by every artifact and marker file.
pub const THUMB_PREFIX: &str = "SYNOPHOTO_THUMB_";

/// Per-directory config file picked up from the input directory.
pub const LOCAL_CONFIG_NAME: &str = ".syno-thumbs.toml";

/// `SYNOPHOTO_THUMB_<CLASS>.jpg`
pub fn artifact_name(class: SizeClass) -> String {
    format!("{}{}.jpg", THUMB_PREFIX, class.suffix())
}

/// `SYNOPHOTO_THUMB_<CLASS>.fail`
pub fn marker_name(class: SizeClass) -> String {
    format!("{}{}.fail", THUMB_PREFIX, class.suffix())
}

/// Sidecar root for an input directory: the override when given, else `<input>/@eaDir`.
pub fn ea_dir_for(input: &Path, ea_dir_override: Option<&Path>) -> PathBuf {
    match ea_dir_override {
        Some(dir) => dir.to_path_buf(),
        None => input.join(EA_DIR_NAME),
    }
}

/// Per-file subdirectory inside the sidecar root, named with the source's
/// exact file name.
pub fn subdir_for(ea_dir: &Path, file_name: impl AsRef<OsStr>) -> PathBuf {
    ea_dir.join(file_name.as_ref())
}
