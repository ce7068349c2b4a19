//! CLI output formatting.
//!
//! Every `format_*` function is pure and returns display lines; the matching
//! `print_*` wrapper writes them to stdout. Diagnostics go through `tracing`
//! on stderr, never through here.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! Generating thumbnails for 2 file(s) in /volume1/photo/@eaDir
//! 001 IMG_0001.JPG (photo)
//!     4032x3024
//!     SM 320x240: encoded
//!     M 427x320: existing
//!     XL 1707x1280: failed
//! 002 clip.mov (video)
//!     all sizes present
//!
//! Processed 2 file(s). Thumbnails in /volume1/photo/@eaDir
//! 1 encoded, 1 existing, 1 failed, 1 files complete
//! ```
//!
//! ## Status
//!
//! ```text
//! 001 IMG_0001.JPG (photo)
//!     SM: ready
//!     M: failed
//!     XL: missing
//!
//! 1 file(s): 0 ready, 1 with failures
//! ```

use crate::process::{FileOutcome, FileReport, ProcessEvent, ProcessResult, SizeReport, SizeStatus};
use crate::state::FileStatus;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// File header: index, name and media kind.
///
/// ```text
/// 001 IMG_0001.JPG (photo)
/// ```
fn file_header(index: usize, name: &str, kind: impl std::fmt::Display) -> String {
    format!("{} {} ({})", format_index(index), name, kind)
}

fn status_label(status: SizeStatus) -> &'static str {
    match status {
        SizeStatus::Existing => "existing",
        SizeStatus::Encoded => "encoded",
        SizeStatus::Failed => "failed",
        SizeStatus::WouldEncode => "would encode",
    }
}

fn size_line(size: &SizeReport) -> String {
    match size.target {
        Some((w, h)) => format!(
            "{}{} {}x{}: {}",
            indent(1),
            size.class,
            w,
            h,
            status_label(size.status)
        ),
        None => format!("{}{}: {}", indent(1), size.class, status_label(size.status)),
    }
}

// ============================================================================
// Generate output
// ============================================================================

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Started {
            file_count,
            ea_dir,
            dry_run,
        } => {
            let verb = if *dry_run {
                "Dry run"
            } else {
                "Generating thumbnails"
            };
            vec![format!(
                "{} for {} file(s) in {}",
                verb,
                file_count,
                ea_dir.display()
            )]
        }
        ProcessEvent::FileDone(report) => format_file_report(report),
    }
}

/// Header plus per-size context lines for one file.
pub fn format_file_report(report: &FileReport) -> Vec<String> {
    let mut lines = vec![file_header(report.index, &report.name, report.kind)];
    match &report.outcome {
        FileOutcome::Ignored => lines.push(format!("{}ignored", indent(1))),
        FileOutcome::Complete => lines.push(format!("{}all sizes present", indent(1))),
        FileOutcome::Unprobeable => {
            lines.push(format!("{}dimensions unreadable, skipped", indent(1)))
        }
        FileOutcome::Unwritable { reason } => {
            lines.push(format!("{}cannot create thumbnail directory: {}", indent(1), reason))
        }
        FileOutcome::Processed { dimensions, sizes } => {
            lines.push(format!(
                "{}{}x{}",
                indent(1),
                dimensions.width,
                dimensions.height
            ));
            lines.extend(sizes.iter().map(size_line));
        }
        FileOutcome::Planned { sizes } => lines.extend(sizes.iter().map(size_line)),
    }
    lines
}

/// Closing summary for a run.
pub fn format_summary(result: &ProcessResult, ea_dir: &Path, dry_run: bool) -> Vec<String> {
    let count = result
        .reports
        .iter()
        .filter(|r| r.outcome != FileOutcome::Ignored)
        .count();
    if dry_run {
        return vec![String::new(), format!("Would process {} file(s).", count)];
    }
    let mut lines = vec![
        String::new(),
        format!(
            "Processed {} file(s). Thumbnails in {}",
            count,
            ea_dir.display()
        ),
        result.stats.to_string(),
    ];
    if result.stats.has_failures() {
        lines.push("Run again to retry what failed.".to_string());
    }
    lines
}

pub fn print_process_event(event: &ProcessEvent) {
    for line in format_process_event(event) {
        println!("{}", line);
    }
}

pub fn print_summary(result: &ProcessResult, ea_dir: &Path, dry_run: bool) {
    for line in format_summary(result, ea_dir, dry_run) {
        println!("{}", line);
    }
}

// ============================================================================
// Status output
// ============================================================================

/// Per-file, per-size sidecar state followed by a one-line tally.
pub fn format_status(statuses: &[FileStatus]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, status) in statuses.iter().enumerate() {
        lines.push(file_header(i + 1, &status.name, status.kind));
        for size in &status.sizes {
            lines.push(format!("{}{}: {}", indent(1), size.class, size.state.label()));
        }
    }

    let ready = statuses.iter().filter(|s| s.is_ready()).count();
    let failing = statuses.iter().filter(|s| s.has_failures()).count();
    lines.push(String::new());
    lines.push(format!(
        "{} file(s): {} ready, {} with failures",
        statuses.len(),
        ready,
        failing
    ));
    lines
}

pub fn print_status(statuses: &[FileStatus]) {
    for line in format_status(statuses) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
