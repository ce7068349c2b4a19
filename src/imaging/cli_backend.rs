//! Production backend: ImageMagick, libheif and ffmpeg as child processes.
//!
//! | Operation | Program |
//! |---|---|
//! | Dimensions | [`DimensionResolver`] chain (identify, heif-info, ffprobe, ffmpeg) |
//! | Photo thumbnail | `convert -auto-orient -thumbnail LxL` |
//! | Video thumbnail | `ffmpeg -ss <seek> -vframes 1 -vf scale=...` |
//!
//! An encode only counts as successful when the tool exits zero *and* the
//! output file exists afterwards. Anything else is
//! [`BackendError::EncodeFailed`].

use super::backend::{BackendError, Dimensions, ThumbnailBackend};
use super::command::{ToolCommand, ToolOutput};
use super::params::{PhotoThumbParams, VideoThumbParams};
use super::probe::DimensionResolver;
use crate::toolchain::Toolchain;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Shells out to the resolved [`Toolchain`].
pub struct CliBackend {
    tools: Toolchain,
    resolver: DimensionResolver,
    encode_timeout: Duration,
}

impl CliBackend {
    pub fn new(tools: Toolchain, probe_timeout: Duration, encode_timeout: Duration) -> Self {
        let resolver = DimensionResolver::from_toolchain(&tools, probe_timeout);
        debug!(chain = ?resolver.strategy_names(), "dimension resolver ready");
        Self {
            tools,
            resolver,
            encode_timeout,
        }
    }
}

/// `scale` filter that fits inside `width`×`height` and never upscales.
pub fn video_scale_filter(width: u32, height: u32) -> String {
    format!(
        "scale='min({width},iw)':'min({height},ih)':force_original_aspect_ratio=decrease"
    )
}

fn check_encode(output: &Path, result: Result<ToolOutput, BackendError>) -> Result<(), BackendError> {
    let failed = |detail: String| BackendError::EncodeFailed {
        output: output.to_path_buf(),
        detail,
    };
    let run = result.map_err(|e| {
        discard_partial(output);
        failed(e.to_string())
    })?;
    if !run.success {
        discard_partial(output);
        return Err(failed(first_line(&run.stderr, "non-zero exit")));
    }
    if !output.is_file() {
        return Err(failed("tool exited cleanly but wrote no output".into()));
    }
    Ok(())
}

/// Killed or failing encoders can leave a truncated JPEG behind.
fn discard_partial(output: &Path) {
    match fs::remove_file(output) {
        Ok(()) => debug!(output = %output.display(), "removed partial output"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(output = %output.display(), error = %e, "cannot remove partial output"),
    }
}

fn first_line(text: &str, fallback: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

impl ThumbnailBackend for CliBackend {
    fn dimensions(&self, path: &Path) -> Result<Dimensions, BackendError> {
        self.resolver.resolve(path)
    }

    fn encode_photo(&self, params: &PhotoThumbParams) -> Result<(), BackendError> {
        let bounds = format!("{0}x{0}", params.long_edge);
        debug!(
            source = %params.source.display(),
            output = %params.output.display(),
            bounds = %bounds,
            "encoding photo thumbnail"
        );
        let result = ToolCommand::new(&self.tools.convert, self.encode_timeout)
            .arg(&params.source)
            .arg("-auto-orient")
            .args(["-thumbnail", bounds.as_str()])
            .args(["-quality".to_string(), params.quality.value().to_string()])
            .arg(&params.output)
            .run();
        check_encode(&params.output, result)
    }

    fn encode_video(&self, params: &VideoThumbParams) -> Result<(), BackendError> {
        debug!(
            source = %params.source.display(),
            output = %params.output.display(),
            width = params.width,
            height = params.height,
            seek = params.seek_seconds,
            "encoding video thumbnail"
        );
        let result = ToolCommand::new(&self.tools.ffmpeg, self.encode_timeout)
            .args(["-y", "-hide_banner", "-loglevel", "error", "-ss"])
            .arg(params.seek_seconds.to_string())
            .arg("-i")
            .arg(&params.source)
            .args(["-vframes", "1", "-vf"])
            .arg(video_scale_filter(params.width, params.height))
            .arg("-q:v")
            .arg(params.quality.value().to_string())
            .arg(&params.output)
            .run();
        check_encode(&params.output, result)
    }
}
