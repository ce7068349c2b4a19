//! External tool discovery, resolved once at startup.
//!
//! Synology DSM ships a crippled ffmpeg (no ffprobe, few decoders). When the
//! `ffmpeg7` package is installed its binaries are preferred. The result is a
//! plain [`Toolchain`] value handed to the backend; nothing is looked up again
//! later.

use crate::config::ToolsConfig;
use crate::imaging::BackendError;
use crate::imaging::command::ToolCommand;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const VERSION_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum ToolchainError {
    #[error("ffmpeg is required (tried: {}): {source}", .tried.display())]
    FfmpegUnusable {
        tried: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// Program paths for every collaborator.
///
/// Tools that could not be located keep their bare name, so invoking them
/// fails as [`BackendError::ToolUnavailable`] and the caller moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub identify: PathBuf,
    pub heif_info: PathBuf,
    pub ffprobe: PathBuf,
    pub ffmpeg: PathBuf,
    pub convert: PathBuf,
    /// True when ffmpeg came from the package directory.
    pub from_package: bool,
}

impl Toolchain {
    /// Bare program names, no lookups.
    pub fn bare() -> Self {
        Self {
            identify: "identify".into(),
            heif_info: "heif-info".into(),
            ffprobe: "ffprobe".into(),
            ffmpeg: "ffmpeg".into(),
            convert: "convert".into(),
            from_package: false,
        }
    }

    /// Resolve every tool: explicit override, then package directory (ffmpeg
    /// and ffprobe only), then `PATH`.
    pub fn resolve(config: &ToolsConfig) -> Self {
        let package_ffmpeg = config
            .package_dir
            .as_deref()
            .map(|dir| dir.join("ffmpeg"))
            .filter(|p| is_executable(p));

        let (ffmpeg, from_package) = match (&config.ffmpeg, package_ffmpeg) {
            (Some(explicit), _) => (explicit.clone(), false),
            (None, Some(packaged)) => (packaged, true),
            (None, None) => (on_path("ffmpeg"), false),
        };

        let package_ffprobe = if from_package {
            config
                .package_dir
                .as_deref()
                .map(|dir| dir.join("ffprobe"))
                .filter(|p| is_executable(p))
        } else {
            None
        };
        let ffprobe = config
            .ffprobe
            .clone()
            .or(package_ffprobe)
            .unwrap_or_else(|| on_path("ffprobe"));

        Self {
            identify: config.identify.clone().unwrap_or_else(|| on_path("identify")),
            heif_info: config
                .heif_info
                .clone()
                .unwrap_or_else(|| on_path("heif-info")),
            ffprobe,
            ffmpeg,
            convert: config.convert.clone().unwrap_or_else(|| on_path("convert")),
            from_package,
        }
    }

    /// `ffmpeg -version` must succeed; without it no video work is possible.
    pub fn verify(&self) -> Result<(), ToolchainError> {
        let unusable = |source| ToolchainError::FfmpegUnusable {
            tried: self.ffmpeg.clone(),
            source,
        };
        let output = ToolCommand::new(&self.ffmpeg, VERSION_CHECK_TIMEOUT)
            .arg("-version")
            .run()
            .map_err(unusable)?;
        if output.success {
            Ok(())
        } else {
            Err(unusable(BackendError::UnparseableOutput {
                program: "ffmpeg".into(),
                detail: "-version exited with failure".into(),
            }))
        }
    }
}

fn on_path(program: &str) -> PathBuf {
    which::which(program).unwrap_or_else(|_| PathBuf::from(program))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
