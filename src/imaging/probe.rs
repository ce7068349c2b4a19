//! Dimension probing: an ordered chain of best-effort strategies.
//!
//! | Order | Strategy | Tool | Parsed from |
//! |---|---|---|---|
//! | 1 | [`IdentifyProbe`] | ImageMagick `identify` | `W,H` on stdout |
//! | 2 | [`HeifInfoProbe`] | libheif `heif-info` | `size: W x H` line (any case) |
//! | 3 | [`FfprobeProbe`] | `ffprobe` | `W,H` CSV for stream `v:0` |
//! | 4 | [`FfmpegBannerProbe`] | `ffmpeg -i` | `WxH` on the first `Video:` line |
//!
//! Each strategy yields a tagged [`ProbeOutcome`]. A missing tool, a timeout,
//! unparseable output and non-positive dimensions are all just failed
//! attempts; [`DimensionResolver::resolve`] folds over the chain and returns
//! the first success, or [`BackendError::DimensionsNotFound`] once every
//! strategy has failed.

use super::backend::{BackendError, Dimensions};
use super::command::ToolCommand;
use crate::toolchain::Toolchain;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

/// Result of one probing attempt.
pub type ProbeOutcome = Result<Dimensions, BackendError>;

static HEIF_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)size:\s*(\d+)\s*x\s*(\d+)").unwrap());

static BANNER_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2,})\s*x\s*(\d{2,})").unwrap());

/// One way of extracting pixel dimensions from a media file.
pub trait ProbeStrategy: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    fn probe(&self, path: &Path) -> ProbeOutcome;
}

fn unparseable(program: &str, detail: impl Into<String>) -> BackendError {
    BackendError::UnparseableOutput {
        program: program.to_string(),
        detail: detail.into(),
    }
}

fn parse_edge(program: &str, raw: &str) -> Result<i64, BackendError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| unparseable(program, format!("not an integer: {raw:?}")))
}

/// A non-zero exit is a failed attempt for every strategy except the banner probe.
fn require_success(program: &str, output: &super::command::ToolOutput) -> Result<(), BackendError> {
    if output.success {
        Ok(())
    } else {
        Err(unparseable(
            program,
            format!("exited with failure: {}", output.stderr.trim()),
        ))
    }
}

// ============================================================================
// Output parsers (pure)
// ============================================================================

/// `identify -format "%w,%h\n"`: first line, `W,H`.
pub fn parse_identify_output(stdout: &str) -> ProbeOutcome {
    let line = stdout.lines().map(str::trim).find(|l| !l.is_empty());
    let Some((w, h)) = line.and_then(|l| l.split_once(',')) else {
        return Err(unparseable("identify", "expected W,H"));
    };
    Dimensions::new(parse_edge("identify", w)?, parse_edge("identify", h)?)
}

/// `heif-info`: first line matching `size: W x H`, case-insensitive.
pub fn parse_heif_info_output(stdout: &str) -> ProbeOutcome {
    let caps = stdout
        .lines()
        .find_map(|line| HEIF_SIZE.captures(line))
        .ok_or_else(|| unparseable("heif-info", "no size: line"))?;
    Dimensions::new(
        parse_edge("heif-info", &caps[1])?,
        parse_edge("heif-info", &caps[2])?,
    )
}

/// `ffprobe ... -of csv=p=0`: first non-empty line, `W,H[,...]`.
pub fn parse_ffprobe_output(stdout: &str) -> ProbeOutcome {
    let line = stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| unparseable("ffprobe", "empty output"))?;
    let mut fields = line.split(',');
    match (fields.next(), fields.next()) {
        (Some(w), Some(h)) => {
            Dimensions::new(parse_edge("ffprobe", w)?, parse_edge("ffprobe", h)?)
        }
        _ => Err(unparseable("ffprobe", format!("expected W,H: {line:?}"))),
    }
}

/// `ffmpeg -i`: only the first line mentioning `Video:` is considered.
pub fn parse_ffmpeg_banner(text: &str) -> ProbeOutcome {
    let line = text
        .lines()
        .find(|l| l.contains("Video:") || l.contains("video:"))
        .ok_or_else(|| unparseable("ffmpeg", "no video stream line"))?;
    let caps = BANNER_SIZE
        .captures(line)
        .ok_or_else(|| unparseable("ffmpeg", format!("no WxH in {:?}", line.trim())))?;
    Dimensions::new(parse_edge("ffmpeg", &caps[1])?, parse_edge("ffmpeg", &caps[2])?)
}

// ============================================================================
// Strategies
// ============================================================================

/// Generic image identification (ImageMagick).
pub struct IdentifyProbe {
    pub program: PathBuf,
    pub timeout: Duration,
}

impl ProbeStrategy for IdentifyProbe {
    fn name(&self) -> &'static str {
        "identify"
    }

    fn probe(&self, path: &Path) -> ProbeOutcome {
        let output = ToolCommand::new(&self.program, self.timeout)
            .args(["-format", "%w,%h\n"])
            .arg(path)
            .run()?;
        require_success(self.name(), &output)?;
        parse_identify_output(&output.stdout)
    }
}

/// HEIC metadata reader (libheif).
pub struct HeifInfoProbe {
    pub program: PathBuf,
    pub timeout: Duration,
}

impl ProbeStrategy for HeifInfoProbe {
    fn name(&self) -> &'static str {
        "heif-info"
    }

    fn probe(&self, path: &Path) -> ProbeOutcome {
        let output = ToolCommand::new(&self.program, self.timeout)
            .arg(path)
            .run()?;
        require_success(self.name(), &output)?;
        parse_heif_info_output(&output.stdout)
    }
}

/// Structured media probe, first video stream.
pub struct FfprobeProbe {
    pub program: PathBuf,
    pub timeout: Duration,
}

impl ProbeStrategy for FfprobeProbe {
    fn name(&self) -> &'static str {
        "ffprobe"
    }

    fn probe(&self, path: &Path) -> ProbeOutcome {
        let output = ToolCommand::new(&self.program, self.timeout)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height",
                "-of",
                "csv=p=0",
            ])
            .arg(path)
            .run()?;
        require_success(self.name(), &output)?;
        parse_ffprobe_output(&output.stdout)
    }
}

/// Stream info from ffmpeg's own banner. Works on builds shipped without ffprobe.
pub struct FfmpegBannerProbe {
    pub program: PathBuf,
    pub timeout: Duration,
}

impl ProbeStrategy for FfmpegBannerProbe {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn probe(&self, path: &Path) -> ProbeOutcome {
        // `ffmpeg -i` without an output always exits non-zero; the banner is still printed.
        let output = ToolCommand::new(&self.program, self.timeout)
            .arg("-hide_banner")
            .arg("-i")
            .arg(path)
            .run()?;
        parse_ffmpeg_banner(&output.combined())
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Ordered fallback chain over [`ProbeStrategy`] implementations.
pub struct DimensionResolver {
    strategies: Vec<Box<dyn ProbeStrategy>>,
}

impl DimensionResolver {
    pub fn new(strategies: Vec<Box<dyn ProbeStrategy>>) -> Self {
        Self { strategies }
    }

    /// The standard four-step chain over a resolved toolchain.
    pub fn from_toolchain(tools: &Toolchain, timeout: Duration) -> Self {
        Self::new(vec![
            Box::new(IdentifyProbe {
                program: tools.identify.clone(),
                timeout,
            }),
            Box::new(HeifInfoProbe {
                program: tools.heif_info.clone(),
                timeout,
            }),
            Box::new(FfprobeProbe {
                program: tools.ffprobe.clone(),
                timeout,
            }),
            Box::new(FfmpegBannerProbe {
                program: tools.ffmpeg.clone(),
                timeout,
            }),
        ])
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// First successful strategy wins; later strategies are not run.
    pub fn resolve(&self, path: &Path) -> Result<Dimensions, BackendError> {
        for strategy in &self.strategies {
            match strategy.probe(path) {
                Ok(dims) => {
                    debug!(
                        file = %path.display(),
                        strategy = strategy.name(),
                        width = dims.width,
                        height = dims.height,
                        "dimensions resolved"
                    );
                    return Ok(dims);
                }
                Err(err) => {
                    debug!(
                        file = %path.display(),
                        strategy = strategy.name(),
                        error = %err,
                        "probe failed, trying next"
                    );
                }
            }
        }
        Err(BackendError::DimensionsNotFound(path.to_path_buf()))
    }
}
