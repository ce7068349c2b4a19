//! End-to-end runs of the real CLI backend against fake tools.
//!
//! Each external program is a small shell script that logs its invocation
//! and behaves like the real tool for the file names used here.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use syno_thumbs::config::ThumbsConfig;
use syno_thumbs::imaging::CliBackend;
use syno_thumbs::process::{FileOutcome, ProcessConfig, SizeStatus, process};
use syno_thumbs::scan::scan;
use syno_thumbs::state::{ThumbnailState, collect_status};
use syno_thumbs::toolchain::Toolchain;
use tempfile::TempDir;

struct Fixture {
    _tmp: TempDir,
    input: PathBuf,
    ea_dir: PathBuf,
    log: PathBuf,
    tools: Toolchain,
}

fn script(dir: &Path, name: &str, log: &Path, body: &str) -> PathBuf {
    let path = dir.join(name);
    let text = format!(
        "#!/bin/sh\necho {name} >> '{log}'\nfor a; do last=\"$a\"; done\n{body}\n",
        log = log.display()
    );
    fs::write(&path, text).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Input directory with a photo, a video, an unreadable HEIC and a video
/// whose frames can't be decoded.
fn fixture() -> Fixture {
    let tmp = TempDir::new().unwrap();
    let bin = tmp.path().join("bin");
    let input = tmp.path().join("photos");
    fs::create_dir_all(&bin).unwrap();
    fs::create_dir_all(&input).unwrap();
    for name in ["IMG_0001.jpg", "clip.mov", "mystery.heic", "broken.mp4", "notes.txt"] {
        fs::write(input.join(name), b"").unwrap();
    }
    let log = tmp.path().join("calls.log");

    let tools = Toolchain {
        identify: script(
            &bin,
            "identify",
            &log,
            r#"case "$last" in *.jpg) echo "4000,3000" ;; *) exit 1 ;; esac"#,
        ),
        heif_info: bin.join("heif-info-not-installed"),
        ffprobe: script(
            &bin,
            "ffprobe",
            &log,
            r#"case "$last" in *.mov|*.mp4) echo "1920,1080" ;; *) exit 1 ;; esac"#,
        ),
        ffmpeg: script(
            &bin,
            "ffmpeg",
            &log,
            r#"case "$*" in
  *-version*) echo "ffmpeg version 7.0" ;;
  *broken.mp4*-vframes*) echo "decode error" >&2; exit 1 ;;
  *-vframes*) : > "$last" ;;
  *) echo "no streams" >&2; exit 1 ;;
esac"#,
        ),
        convert: script(&bin, "convert", &log, r#": > "$last""#),
        from_package: false,
    };

    Fixture {
        ea_dir: input.join("@eaDir"),
        _tmp: tmp,
        input,
        log,
        tools,
    }
}

fn backend(fx: &Fixture) -> CliBackend {
    CliBackend::new(fx.tools.clone(), Duration::from_secs(10), Duration::from_secs(10))
}

fn config(fx: &Fixture) -> ProcessConfig {
    ProcessConfig {
        workers: 1,
        ..ProcessConfig::from_thumbs_config(&ThumbsConfig::default(), fx.ea_dir.clone())
    }
}

fn calls(fx: &Fixture) -> Vec<String> {
    fs::read_to_string(&fx.log)
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}

fn states(fx: &Fixture, name: &str) -> Vec<ThumbnailState> {
    let files = scan(&fx.input).unwrap();
    let status = collect_status(&files, &fx.ea_dir);
    status
        .into_iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("{name} not scanned"))
        .sizes
        .iter()
        .map(|s| s.state)
        .collect()
}

#[test]
fn toolchain_verifies_with_fake_ffmpeg() {
    let fx = fixture();
    fx.tools.verify().unwrap();
}

#[test]
fn full_run_writes_thumbnails_and_markers() {
    let fx = fixture();
    let files = scan(&fx.input).unwrap();
    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["IMG_0001.jpg", "broken.mp4", "clip.mov", "mystery.heic"]);

    let result = process(&backend(&fx), &files, &config(&fx), None).unwrap();

    // Photo: identify answers, convert writes all three
    assert_eq!(states(&fx, "IMG_0001.jpg"), vec![ThumbnailState::Ready; 3]);
    match &result.reports[0].outcome {
        FileOutcome::Processed { dimensions, sizes } => {
            assert_eq!((dimensions.width, dimensions.height), (4000, 3000));
            assert_eq!(sizes[2].target, Some((1707, 1280)));
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    // Video: ffprobe answers after identify fails
    assert_eq!(states(&fx, "clip.mov"), vec![ThumbnailState::Ready; 3]);

    // Encode failures are recorded per size
    assert_eq!(states(&fx, "broken.mp4"), vec![ThumbnailState::Failed; 3]);
    assert!(result.reports[1].outcome.succeeded());

    // No probe succeeds: file fails, no markers written
    assert_eq!(result.reports[3].outcome, FileOutcome::Unprobeable);
    assert_eq!(states(&fx, "mystery.heic"), vec![ThumbnailState::Missing; 3]);

    assert_eq!(result.stats.encoded, 6);
    assert_eq!(result.stats.failed, 3);
    assert_eq!(result.stats.unprobeable, 1);
}

#[test]
fn second_run_only_retries_failures() {
    let fx = fixture();
    let files = scan(&fx.input).unwrap();
    process(&backend(&fx), &files, &config(&fx), None).unwrap();
    fs::remove_file(&fx.log).unwrap();

    let result = process(&backend(&fx), &files, &config(&fx), None).unwrap();

    assert_eq!(result.reports[0].outcome, FileOutcome::Complete);
    assert_eq!(result.reports[2].outcome, FileOutcome::Complete);
    let log = calls(&fx);
    assert!(!log.iter().any(|c| c == "convert"));
    // Three encode retries for broken.mp4, one banner probe for mystery.heic
    assert_eq!(log.iter().filter(|c| *c == "ffmpeg").count(), 3 + 1);
    assert_eq!(result.stats.skipped, 2);
}

#[test]
fn dry_run_invokes_nothing() {
    let fx = fixture();
    let files = scan(&fx.input).unwrap();
    let mut cfg = config(&fx);
    cfg.dry_run = true;

    let result = process(&backend(&fx), &files, &cfg, None).unwrap();

    assert!(calls(&fx).is_empty());
    assert!(!fx.ea_dir.exists());
    for report in &result.reports {
        match &report.outcome {
            FileOutcome::Planned { sizes } => {
                assert!(sizes.iter().all(|s| s.status == SizeStatus::WouldEncode))
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}

#[test]
fn mark_unprobeable_writes_markers() {
    let fx = fixture();
    let files = scan(&fx.input).unwrap();
    let mut cfg = config(&fx);
    cfg.mark_unprobeable = true;

    process(&backend(&fx), &files, &cfg, None).unwrap();

    assert_eq!(states(&fx, "mystery.heic"), vec![ThumbnailState::Failed; 3]);
}
