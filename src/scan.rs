//! Input directory enumeration.
//!
//! Only the top level of the input directory is considered. Regular files (or
//! symlinks to them) whose extension is on the photo or video allow-list are
//! returned, sorted by file name so every run visits files in the same order.
//! Subdirectories, including the sidecar root itself, are never descended into.

use crate::types::MediaFile;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// Absolute, symlink-free form of the input directory. Reports and the
/// default sidecar root are derived from this.
pub fn canonical_input(input: &Path) -> Result<PathBuf, ScanError> {
    if !input.is_dir() {
        return Err(ScanError::NotADirectory(input.to_path_buf()));
    }
    Ok(fs::canonicalize(input)?)
}

/// List media files directly inside `input`, sorted by name.
pub fn scan(input: &Path) -> Result<Vec<MediaFile>, ScanError> {
    if !input.is_dir() {
        return Err(ScanError::NotADirectory(input.to_path_buf()));
    }

    let mut files: Vec<MediaFile> = fs::read_dir(input)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter_map(|p| MediaFile::from_path(&p))
        .collect();

    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::touch;
    use crate::types::MediaKind;
    use tempfile::TempDir;

    fn names(files: &[MediaFile]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn lists_media_sorted_by_name() {
        let tmp = TempDir::new().unwrap();
        for name in ["b.mov", "a.JPG", "C.heic", "notes.txt", "a.jpeg"] {
            touch(&tmp.path().join(name));
        }

        let files = scan(tmp.path()).unwrap();
        // Byte order: uppercase sorts before lowercase
        assert_eq!(names(&files), vec!["C.heic", "a.JPG", "a.jpeg", "b.mov"]);
        assert_eq!(files[3].kind, MediaKind::Video);
    }

    #[test]
    fn skips_directories_and_sidecar_root() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("@eaDir/a.jpg/SYNOPHOTO_THUMB_SM.jpg"));
        fs::create_dir_all(tmp.path().join("folder.jpg")).unwrap();
        touch(&tmp.path().join("a.jpg"));

        let files = scan(tmp.path()).unwrap();
        assert_eq!(names(&files), vec!["a.jpg"]);
    }

    #[test]
    fn empty_directory() {
        let tmp = TempDir::new().unwrap();
        assert!(scan(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn canonical_input_is_absolute() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("sub")).unwrap();

        let resolved = canonical_input(&tmp.path().join("sub/..")).unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, fs::canonicalize(tmp.path()).unwrap());
        assert_eq!(
            crate::naming::ea_dir_for(&resolved, None),
            fs::canonicalize(tmp.path()).unwrap().join("@eaDir")
        );
    }

    #[test]
    fn canonical_input_rejects_files() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.jpg");
        touch(&file);
        assert!(matches!(canonical_input(&file), Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn not_a_directory_is_error() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.jpg");
        touch(&file);
        assert!(matches!(scan(&file), Err(ScanError::NotADirectory(_))));
        assert!(matches!(
            scan(&tmp.path().join("missing")),
            Err(ScanError::NotADirectory(_))
        ));
    }
}
