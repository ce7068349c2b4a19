//! Per-file thumbnail state, persisted only as files in the sidecar directory.
//!
//! Each source file owns one subdirectory of the sidecar root. For every size
//! class that directory may hold the artifact (`SYNOPHOTO_THUMB_SM.jpg`) and a
//! zero-byte failure marker (`SYNOPHOTO_THUMB_SM.fail`). The marker is the
//! only bookkeeping there is:
//!
//! - a successful encode removes the marker, so *absence* of `.fail` means
//!   "ready" to anything watching the directory;
//! - a failed encode (re)creates it, so the next run retries that size.
//!
//! Every mutation is a single create or unlink, so a crash between two of them
//! leaves each size class in a state the next run handles correctly. Nothing
//! is cached in memory: every query reads the filesystem.

use crate::naming::{artifact_name, marker_name, subdir_for};
use crate::types::{MediaFile, MediaKind, SizeClass};
use serde::Serialize;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Observable state of one (file, size class) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThumbnailState {
    /// Artifact present, no marker.
    Ready,
    /// Marker present, artifact absent.
    Failed,
    /// Artifact and marker both present; corrected on the next run.
    StaleMarker,
    /// Neither present: never attempted.
    Missing,
}

impl ThumbnailState {
    fn from_flags(artifact: bool, marker: bool) -> Self {
        match (artifact, marker) {
            (true, false) => ThumbnailState::Ready,
            (false, true) => ThumbnailState::Failed,
            (true, true) => ThumbnailState::StaleMarker,
            (false, false) => ThumbnailState::Missing,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThumbnailState::Ready => "ready",
            ThumbnailState::Failed => "failed",
            ThumbnailState::StaleMarker => "stale-marker",
            ThumbnailState::Missing => "missing",
        }
    }
}

/// The per-file sidecar subdirectory (`<ea_dir>/<name.ext>/`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailDir {
    path: PathBuf,
}

impl ThumbnailDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn artifact_path(&self, class: SizeClass) -> PathBuf {
        self.path.join(artifact_name(class))
    }

    pub fn marker_path(&self, class: SizeClass) -> PathBuf {
        self.path.join(marker_name(class))
    }

    /// Create the subdirectory (and the sidecar root) if absent.
    pub fn ensure(&self) -> io::Result<()> {
        fs::create_dir_all(&self.path)
    }

    pub fn has_artifact(&self, class: SizeClass) -> bool {
        self.artifact_path(class).is_file()
    }

    pub fn has_marker(&self, class: SizeClass) -> bool {
        self.marker_path(class).exists()
    }

    /// True iff all three artifacts exist. Markers are not consulted.
    pub fn is_complete(&self) -> bool {
        SizeClass::ALL.iter().all(|&class| self.has_artifact(class))
    }

    pub fn state(&self, class: SizeClass) -> ThumbnailState {
        ThumbnailState::from_flags(self.has_artifact(class), self.has_marker(class))
    }

    /// Remove the failure marker. Absent marker is fine.
    pub fn record_success(&self, class: SizeClass) -> io::Result<()> {
        match fs::remove_file(self.marker_path(class)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Touch the failure marker. An existing marker is left as is.
    pub fn record_failure(&self, class: SizeClass) -> io::Result<()> {
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.marker_path(class))
            .map(drop)
    }
}

/// Counters for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Size classes encoded successfully this run.
    pub encoded: u32,
    /// Size classes whose artifact already existed.
    pub existing: u32,
    /// Size classes whose encode failed (marker written).
    pub failed: u32,
    /// Files skipped because all three artifacts existed.
    pub skipped: u32,
    /// Files whose dimensions could not be resolved.
    pub unprobeable: u32,
    /// Files whose sidecar subdirectory could not be created.
    pub unwritable: u32,
}

impl RunStats {
    pub fn merge(&mut self, other: RunStats) {
        self.encoded += other.encoded;
        self.existing += other.existing;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.unprobeable += other.unprobeable;
        self.unwritable += other.unwritable;
    }

    /// Whether anything needs attention on a later run.
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.unprobeable > 0 || self.unwritable > 0
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} encoded, {} existing, {} failed",
            self.encoded, self.existing, self.failed
        )?;
        if self.skipped > 0 {
            write!(f, ", {} files complete", self.skipped)?;
        }
        if self.unprobeable > 0 {
            write!(f, ", {} files unreadable", self.unprobeable)?;
        }
        if self.unwritable > 0 {
            write!(f, ", {} files unwritable", self.unwritable)?;
        }
        Ok(())
    }
}

/// Read-only snapshot of one file's sidecar, for `status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileStatus {
    pub name: String,
    pub kind: MediaKind,
    pub sizes: Vec<ClassState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassState {
    pub class: SizeClass,
    pub state: ThumbnailState,
}

impl FileStatus {
    pub fn is_ready(&self) -> bool {
        self.sizes.iter().all(|s| s.state == ThumbnailState::Ready)
    }

    pub fn has_failures(&self) -> bool {
        self.sizes.iter().any(|s| s.state == ThumbnailState::Failed)
    }
}

/// Inspect the sidecar of every file. Never writes.
pub fn collect_status(files: &[MediaFile], ea_dir: &Path) -> Vec<FileStatus> {
    files
        .iter()
        .map(|file| {
            let dir = ThumbnailDir::new(subdir_for(ea_dir, &file.file_name));
            FileStatus {
                name: file.name.clone(),
                kind: file.kind,
                sizes: SizeClass::ALL
                    .iter()
                    .map(|&class| ClassState {
                        class,
                        state: dir.state(class),
                    })
                    .collect(),
            }
        })
        .collect()
}
