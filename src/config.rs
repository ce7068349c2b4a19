//! Configuration module.
//!
//! Handles loading, validating, and merging TOML config files. Configuration
//! is layered: stock defaults are overridden by an explicit `--config` file,
//! which is overridden by a `.syno-thumbs.toml` in the input directory.
//! Command-line flags are applied last, in `main`.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [tools]
//! package_dir = "/var/packages/ffmpeg7/target/bin"  # preferred ffmpeg/ffprobe
//! # ffmpeg = "/usr/bin/ffmpeg"   # explicit overrides: ffmpeg, ffprobe,
//! # convert = "/usr/bin/convert" # identify, heif_info, convert
//!
//! [timeouts]
//! probe_secs = 30           # per dimension probe
//! encode_secs = 60          # per thumbnail encode
//!
//! [video]
//! seek = 0.0                # frame offset in seconds
//! quality = 3               # ffmpeg -q:v (2 = best, 31 = worst)
//!
//! [photo]
//! quality = 85              # JPEG quality for convert (1-100)
//!
//! [processing]
//! max_processes = 1         # >1 processes files on a worker pool
//! mark_unprobeable = false  # write .fail markers when dimensions can't be read
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! [video]
//! seek = 1.5
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::naming::LOCAL_CONFIG_NAME;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Full configuration. Every section has defaults; files only override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbsConfig {
    /// External tool locations.
    pub tools: ToolsConfig,
    /// Bounds on external tool runs.
    pub timeouts: TimeoutsConfig,
    /// Video frame extraction settings.
    pub video: VideoConfig,
    /// Photo encoding settings.
    pub photo: PhotoConfig,
    /// Scheduling and failure-marking policy.
    pub processing: ProcessingConfig,
}

impl ThumbsConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeouts.probe_secs == 0 || self.timeouts.encode_secs == 0 {
            return Err(ConfigError::Validation(
                "timeouts must be at least 1 second".into(),
            ));
        }
        if !self.video.seek.is_finite() || self.video.seek < 0.0 {
            return Err(ConfigError::Validation(
                "video.seek must be a non-negative number of seconds".into(),
            ));
        }
        if !(2..=31).contains(&self.video.quality) {
            return Err(ConfigError::Validation(
                "video.quality must be 2-31".into(),
            ));
        }
        if !(1..=100).contains(&self.photo.quality) {
            return Err(ConfigError::Validation(
                "photo.quality must be 1-100".into(),
            ));
        }
        if self.processing.max_processes == 0 {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Tool locations. Unset tools are looked up on `PATH`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    /// Directory holding a preferred `ffmpeg` (and optionally `ffprobe`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffmpeg: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffprobe: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identify: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heif_info: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convert: Option<PathBuf>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            package_dir: Some(PathBuf::from("/var/packages/ffmpeg7/target/bin")),
            ffmpeg: None,
            ffprobe: None,
            identify: None,
            heif_info: None,
            convert: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutsConfig {
    pub probe_secs: u64,
    pub encode_secs: u64,
}

impl TimeoutsConfig {
    pub fn probe(&self) -> Duration {
        Duration::from_secs(self.probe_secs)
    }

    pub fn encode(&self) -> Duration {
        Duration::from_secs(self.encode_secs)
    }
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            probe_secs: 30,
            encode_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoConfig {
    /// Offset of the extracted frame, in seconds.
    pub seek: f64,
    /// ffmpeg `-q:v`.
    pub quality: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            seek: 0.0,
            quality: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhotoConfig {
    /// JPEG quality passed to `convert`.
    pub quality: u32,
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self { quality: 85 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Files processed concurrently. 1 keeps the sequential, sorted walk.
    pub max_processes: usize,
    /// Mark all three sizes failed when a file's dimensions can't be read.
    pub mark_unprobeable: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_processes: 1,
            mark_unprobeable: false,
        }
    }
}

/// Resolve the effective worker count.
///
/// Capped at the number of available cores.
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.clamp(1, cores)
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer that user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ThumbsConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a TOML file as a raw value.
///
/// Returns `Ok(None)` if the file does not exist, `Err` if it is not valid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge overlays in order onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<ThumbsConfig, ConfigError> {
    let merged = overlays.into_iter().fold(base, merge_toml);
    let config: ThumbsConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the layered config for an input directory.
///
/// An explicit `--config` path must exist; the per-directory file is optional.
pub fn load_config(explicit: Option<&Path>, input_dir: &Path) -> Result<ThumbsConfig, ConfigError> {
    let mut overlays = Vec::new();
    if let Some(path) = explicit {
        let value = load_raw_config(path)?.ok_or_else(|| {
            ConfigError::Validation(format!("config file not found: {}", path.display()))
        })?;
        overlays.push(value);
    }
    if let Some(local) = load_raw_config(&input_dir.join(LOCAL_CONFIG_NAME))? {
        overlays.push(local);
    }
    resolve_config(stock_defaults_value(), overlays)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# syno-thumbs configuration
# ========================
#
# Save as .syno-thumbs.toml in the photo directory, or pass with --config.
# Every key is optional; unknown keys are rejected.

[tools]
# Preferred ffmpeg build (Synology ffmpeg7 package). Its ffprobe is used
# too when present. Ignored if ffmpeg there is missing or not executable.
package_dir = "/var/packages/ffmpeg7/target/bin"
# Explicit program paths. Unset tools are looked up on PATH.
# ffmpeg = "/usr/bin/ffmpeg"
# ffprobe = "/usr/bin/ffprobe"
# identify = "/usr/bin/identify"
# heif_info = "/usr/bin/heif-info"
# convert = "/usr/bin/convert"

[timeouts]
# Seconds before a dimension probe is abandoned and the next one is tried.
probe_secs = 30
# Seconds before a thumbnail encode counts as failed.
encode_secs = 60

[video]
# Offset of the frame used for video thumbnails, in seconds.
seek = 0.0
# ffmpeg -q:v for the JPEG frame (2 = best, 31 = worst).
quality = 3

[photo]
# JPEG quality for photo thumbnails (1-100).
quality = 85

[processing]
# Files processed at once. 1 walks the directory sequentially in name order.
# Larger values are capped at the number of CPU cores.
max_processes = 1
# When no probe can read a file's dimensions, also write .fail markers for
# SM, M and XL. Off by default: such files are only reported.
mark_unprobeable = false
"##
}
