//! Thumbnail generation for a directory of media files.
//!
//! For every source file the pipeline:
//!
//! 1. ensures its sidecar subdirectory exists,
//! 2. skips the file outright when all three artifacts are already there
//!    (unless forced), with no probe and no encode,
//! 3. resolves dimensions once through the backend,
//! 4. walks SM, M, XL in order: an existing artifact only clears a stale
//!    marker, anything else is encoded and its marker set or cleared.
//!
//! A size-class failure never stops the remaining classes, and a file-level
//! failure never stops the remaining files. The per-file result only says
//! whether dimensions could be resolved; per-size outcomes live in the
//! sidecar markers.
//!
//! ## Output Structure
//!
//! ```text
//! @eaDir/
//! ├── IMG_0001.JPG/
//! │   ├── SYNOPHOTO_THUMB_SM.jpg
//! │   ├── SYNOPHOTO_THUMB_M.jpg
//! │   └── SYNOPHOTO_THUMB_XL.jpg
//! └── clip.mov/
//!     ├── SYNOPHOTO_THUMB_SM.jpg
//!     ├── SYNOPHOTO_THUMB_M.jpg
//!     └── SYNOPHOTO_THUMB_XL.fail    # last XL attempt failed
//! ```
//!
//! ## Parallel Processing
//!
//! Files are visited one at a time in name order by default. With more than
//! one worker, files are spread over a dedicated [rayon](https://docs.rs/rayon)
//! pool; the size classes of one file always stay on one worker. Reports come
//! back in input order either way.

use crate::config::{ThumbsConfig, effective_threads};
use crate::imaging::{
    Dimensions, EncodeSettings, ThumbnailBackend, create_thumbnail, get_dimensions, plan_thumbnail,
};
use crate::naming::subdir_for;
use crate::state::{RunStats, ThumbnailDir};
use crate::types::{MediaFile, MediaKind, SizeClass};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("could not start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Settings for one run.
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    /// Sidecar root holding one subdirectory per source file.
    pub ea_dir: PathBuf,
    /// Re-encode every size class even when artifacts exist.
    pub force: bool,
    /// Report intended actions only: no directories, markers, probes or encodes.
    pub dry_run: bool,
    /// Set all missing sizes failed when dimensions can't be resolved.
    pub mark_unprobeable: bool,
    /// Files processed concurrently; 1 is the sequential walk.
    pub workers: usize,
    pub encode: EncodeSettings,
}

impl ProcessConfig {
    /// Build from the resolved config. CLI flags are applied by the caller.
    pub fn from_thumbs_config(config: &ThumbsConfig, ea_dir: PathBuf) -> Self {
        Self {
            ea_dir,
            force: false,
            dry_run: false,
            mark_unprobeable: config.processing.mark_unprobeable,
            workers: effective_threads(&config.processing),
            encode: EncodeSettings::from_config(config),
        }
    }
}

// ============================================================================
// Reports and progress events
// ============================================================================

/// What happened to one size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizeStatus {
    /// Artifact already present; left alone.
    Existing,
    /// Encoded this run.
    Encoded,
    /// Encode attempted and failed; marker set.
    Failed,
    /// Dry run: would be encoded.
    WouldEncode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeReport {
    pub class: SizeClass,
    /// Target size from the policy. Unknown in dry runs, which never probe.
    pub target: Option<(u32, u32)>,
    pub status: SizeStatus,
}

/// Result of processing one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum FileOutcome {
    /// Not a supported media type; nothing to do.
    Ignored,
    /// All three artifacts existed; nothing probed or encoded.
    Complete,
    /// Dimensions resolved and every size class visited.
    Processed {
        dimensions: Dimensions,
        sizes: Vec<SizeReport>,
    },
    /// No probe could read the file's dimensions.
    Unprobeable,
    /// Dry run: what a real run would do.
    Planned { sizes: Vec<SizeReport> },
    /// The sidecar subdirectory could not be created.
    Unwritable { reason: String },
}

impl FileOutcome {
    /// File-level success. Per-size encode failures do not count against it.
    pub fn succeeded(&self) -> bool {
        !matches!(
            self,
            FileOutcome::Unprobeable | FileOutcome::Unwritable { .. }
        )
    }

    pub fn stats(&self) -> RunStats {
        let mut stats = RunStats::default();
        match self {
            FileOutcome::Ignored => {}
            FileOutcome::Complete => stats.skipped += 1,
            FileOutcome::Unprobeable => stats.unprobeable += 1,
            FileOutcome::Unwritable { .. } => stats.unwritable += 1,
            FileOutcome::Processed { sizes, .. } | FileOutcome::Planned { sizes } => {
                for size in sizes {
                    match size.status {
                        SizeStatus::Existing => stats.existing += 1,
                        SizeStatus::Encoded => stats.encoded += 1,
                        SizeStatus::Failed => stats.failed += 1,
                        SizeStatus::WouldEncode => {}
                    }
                }
            }
        }
        stats
    }
}

/// One file's report, as sent to the progress printer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    /// 1-based position in the input order.
    pub index: usize,
    pub name: String,
    pub kind: MediaKind,
    pub outcome: FileOutcome,
}

/// Progress events emitted during a run.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    Started {
        file_count: usize,
        ea_dir: PathBuf,
        dry_run: bool,
    },
    FileDone(FileReport),
}

/// Everything a run produced, reports in input order.
#[derive(Debug, Clone, Default)]
pub struct ProcessResult {
    pub reports: Vec<FileReport>,
    pub stats: RunStats,
}

// ============================================================================
// Pipeline
// ============================================================================

/// Process every file, optionally reporting progress over `events`.
pub fn process(
    backend: &impl ThumbnailBackend,
    files: &[MediaFile],
    config: &ProcessConfig,
    events: Option<&Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    emit(
        events,
        ProcessEvent::Started {
            file_count: files.len(),
            ea_dir: config.ea_dir.clone(),
            dry_run: config.dry_run,
        },
    );

    let run_one = |(i, file): (usize, &MediaFile)| {
        let report = FileReport {
            index: i + 1,
            name: file.name.clone(),
            kind: file.kind,
            outcome: process_file(backend, file, config),
        };
        emit(events, ProcessEvent::FileDone(report.clone()));
        report
    };

    let reports: Vec<FileReport> = if config.workers > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .build()?;
        pool.install(|| files.par_iter().enumerate().map(run_one).collect())
    } else {
        files.iter().enumerate().map(run_one).collect()
    };

    let mut stats = RunStats::default();
    for report in &reports {
        stats.merge(report.outcome.stats());
    }
    Ok(ProcessResult { reports, stats })
}

/// Process an arbitrary path. Unsupported extensions are ignored.
pub fn process_path(
    backend: &impl ThumbnailBackend,
    path: &Path,
    config: &ProcessConfig,
) -> FileOutcome {
    match MediaFile::from_path(path) {
        Some(file) => process_file(backend, &file, config),
        None => FileOutcome::Ignored,
    }
}

/// Generate the three thumbnails for one file.
pub fn process_file(
    backend: &impl ThumbnailBackend,
    file: &MediaFile,
    config: &ProcessConfig,
) -> FileOutcome {
    let dir = ThumbnailDir::new(subdir_for(&config.ea_dir, &file.file_name));

    if config.dry_run {
        return plan_file(&dir, config.force);
    }

    if let Err(e) = dir.ensure() {
        warn!(file = %file.name, error = %e, "cannot create thumbnail directory");
        return FileOutcome::Unwritable {
            reason: e.to_string(),
        };
    }

    if !config.force && dir.is_complete() {
        debug!(file = %file.name, "all thumbnails present");
        return FileOutcome::Complete;
    }

    let dimensions = match get_dimensions(backend, &file.path) {
        Ok(dims) => dims,
        Err(e) => {
            warn!(file = %file.name, error = %e, "skipping file");
            if config.mark_unprobeable {
                mark_missing_failed(&dir);
            }
            return FileOutcome::Unprobeable;
        }
    };

    let sizes = SizeClass::ALL
        .iter()
        .map(|&class| process_size(backend, file, &dir, dimensions, class, config))
        .collect();

    FileOutcome::Processed { dimensions, sizes }
}

fn process_size(
    backend: &impl ThumbnailBackend,
    file: &MediaFile,
    dir: &ThumbnailDir,
    dimensions: Dimensions,
    class: SizeClass,
    config: &ProcessConfig,
) -> SizeReport {
    let plan = plan_thumbnail(
        &file.path,
        &dir.artifact_path(class),
        dimensions,
        class,
        file.kind,
        &config.encode,
    );

    let status = if !config.force && dir.has_artifact(class) {
        // Clears a marker left next to a valid artifact
        if let Err(e) = dir.record_success(class) {
            warn!(file = %file.name, %class, error = %e, "cannot clear failure marker");
        }
        SizeStatus::Existing
    } else {
        match create_thumbnail(backend, &plan) {
            Ok(()) => {
                if let Err(e) = dir.record_success(class) {
                    warn!(file = %file.name, %class, error = %e, "cannot clear failure marker");
                }
                SizeStatus::Encoded
            }
            Err(e) => {
                debug!(file = %file.name, %class, error = %e, "encode failed");
                if let Err(e) = dir.record_failure(class) {
                    warn!(file = %file.name, %class, error = %e, "cannot write failure marker");
                }
                SizeStatus::Failed
            }
        }
    };

    SizeReport {
        class,
        target: Some(plan.target),
        status,
    }
}

/// Read-only view of what a real run would do.
fn plan_file(dir: &ThumbnailDir, force: bool) -> FileOutcome {
    if !force && dir.is_complete() {
        return FileOutcome::Complete;
    }
    let sizes = SizeClass::ALL
        .iter()
        .map(|&class| SizeReport {
            class,
            target: None,
            status: if !force && dir.has_artifact(class) {
                SizeStatus::Existing
            } else {
                SizeStatus::WouldEncode
            },
        })
        .collect();
    FileOutcome::Planned { sizes }
}

fn mark_missing_failed(dir: &ThumbnailDir) {
    for class in SizeClass::ALL {
        if dir.has_artifact(class) {
            continue;
        }
        if let Err(e) = dir.record_failure(class) {
            warn!(dir = %dir.path().display(), %class, error = %e, "cannot write failure marker");
        }
    }
}

fn emit(events: Option<&Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is printing
        let _ = tx.send(event);
    }
}
