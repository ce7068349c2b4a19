use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use syno_thumbs::config::{self, ThumbsConfig};
use syno_thumbs::imaging::CliBackend;
use syno_thumbs::naming::ea_dir_for;
use syno_thumbs::process::{self, ProcessConfig};
use syno_thumbs::toolchain::Toolchain;
use syno_thumbs::types::MediaFile;
use syno_thumbs::{output, scan, state};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("SYNO_THUMBS_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("SYNO_THUMBS_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once; only called at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "syno-thumbs")]
#[command(about = "Generate Synology Photos thumbnails for photos and videos")]
#[command(long_about = "\
Generate Synology Photos thumbnails for photos and videos

Every supported file directly inside DIRECTORY gets three JPEG thumbnails
in a sidecar tree that Synology Photos picks up as-is:

  photos/
  ├── IMG_0001.HEIC
  └── @eaDir/
      └── IMG_0001.HEIC/
          ├── SYNOPHOTO_THUMB_SM.jpg     # longest edge 320 (video: 427)
          ├── SYNOPHOTO_THUMB_M.jpg      # shortest edge 320 (video: longest 640)
          ├── SYNOPHOTO_THUMB_XL.jpg     # shortest edge 1280 (video: original)
          └── SYNOPHOTO_THUMB_XL.fail    # last XL attempt failed; retried next run

Files whose three thumbnails already exist are skipped, so re-running is
cheap and retries only what failed.

Requires ffmpeg. ImageMagick (identify, convert) and libheif (heif-info)
are used when present. The ffmpeg7 package's binaries are preferred.

Run 'syno-thumbs gen-config' to generate a documented .syno-thumbs.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file, applied before DIRECTORY/.syno-thumbs.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose diagnostics on stderr (RUST_LOG overrides)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

/// Shared flags for commands that read a sidecar tree.
#[derive(clap::Args, Clone)]
struct TargetArgs {
    /// Directory holding the photos and videos
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Sidecar root [default: DIRECTORY/@eaDir]
    #[arg(long)]
    ea_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate missing thumbnails
    Generate {
        #[command(flatten)]
        target: TargetArgs,

        /// Video frame offset in seconds
        #[arg(long)]
        video_seek: Option<f64>,

        /// Report what would be done without touching anything
        #[arg(long)]
        dry_run: bool,

        /// Re-encode every size, even when thumbnails exist
        #[arg(long)]
        force: bool,

        /// Files processed in parallel (capped at the number of cores)
        #[arg(long, short = 'j')]
        jobs: Option<usize>,
    },
    /// Show the thumbnail state of every file, without changing anything
    Status {
        #[command(flatten)]
        target: TargetArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print a stock .syno-thumbs.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.command {
        Command::Generate {
            target,
            video_seek,
            dry_run,
            force,
            jobs,
        } => {
            let mut thumbs_config = config::load_config(cli.config.as_deref(), &target.directory)?;
            if let Some(seek) = video_seek {
                thumbs_config.video.seek = seek;
            }
            if let Some(jobs) = jobs {
                thumbs_config.processing.max_processes = jobs;
            }
            thumbs_config.validate()?;

            let (files, ea_dir) = scan_target(&target)?;

            let tools = Toolchain::resolve(&thumbs_config.tools);
            debug!(?tools, "toolchain resolved");
            if tools.from_package {
                debug!(ffmpeg = %tools.ffmpeg.display(), "using packaged ffmpeg");
            }
            // Dry runs never invoke a tool, so they don't need one
            let verified = if dry_run { Ok(()) } else { tools.verify() };
            if let Err(e) = verified {
                error!("{e}");
                return Ok(ExitCode::FAILURE);
            }

            let mut process_config = ProcessConfig::from_thumbs_config(&thumbs_config, ea_dir);
            process_config.force = force;
            process_config.dry_run = dry_run;
            run_generate(tools, &thumbs_config, &files, &process_config)?;
        }
        Command::Status { target, json } => {
            let (files, ea_dir) = scan_target(&target)?;
            let statuses = state::collect_status(&files, &ea_dir);
            if json {
                println!("{}", serde_json::to_string_pretty(&statuses)?);
            } else {
                output::print_status(&statuses);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Media files of the target directory and the absolute sidecar root.
fn scan_target(
    target: &TargetArgs,
) -> Result<(Vec<MediaFile>, PathBuf), Box<dyn std::error::Error>> {
    let directory = scan::canonical_input(&target.directory)?;
    let files = scan::scan(&directory)?;
    let ea_dir_override = target.ea_dir.as_deref().map(std::path::absolute).transpose()?;
    Ok((files, ea_dir_for(&directory, ea_dir_override.as_deref())))
}

fn run_generate(
    tools: Toolchain,
    thumbs_config: &ThumbsConfig,
    files: &[MediaFile],
    process_config: &ProcessConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = CliBackend::new(
        tools,
        thumbs_config.timeouts.probe(),
        thumbs_config.timeouts.encode(),
    );

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_process_event(&event);
        }
    });
    let result = process::process(&backend, files, process_config, Some(&tx));
    drop(tx);
    if printer.join().is_err() {
        error!("progress printer panicked");
    }
    let result = result?;

    output::print_summary(&result, &process_config.ea_dir, process_config.dry_run);
    Ok(())
}

/// Diagnostics go to stderr at `warn`, or `debug` with `--debug`.
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
