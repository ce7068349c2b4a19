//! # syno-thumbs
//!
//! Pre-generates the thumbnails Synology Photos expects, so a NAS never has to
//! grind through a large import itself. Each photo or video in a directory
//! gets three JPEGs in a sidecar tree:
//!
//! ```text
//! photos/
//! ├── IMG_0001.HEIC
//! ├── clip.mov
//! └── @eaDir/
//!     ├── IMG_0001.HEIC/SYNOPHOTO_THUMB_{SM,M,XL}.jpg
//!     └── clip.mov/SYNOPHOTO_THUMB_{SM,M,XL}.jpg
//! ```
//!
//! # Pipeline
//!
//! ```text
//! 1. Scan      input dir   →  sorted media files (top level only)
//! 2. Process   per file    →  probe dimensions once, encode SM, M, XL
//! 3. Report    events      →  progress lines + run summary
//! ```
//!
//! Work is delegated to external tools (ImageMagick, libheif, ffmpeg). They
//! are located once at startup and passed around as a plain
//! [`toolchain::Toolchain`] value.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Lists supported media files in the input directory |
//! | [`process`] | Per-file pipeline: fast-path skip, probe, encode, markers |
//! | [`state`] | Sidecar artifacts and `.fail` markers; the only persisted state |
//! | [`imaging`] | Size policy, dimension probe chain, encode backend |
//! | [`toolchain`] | Locates ffmpeg & co. (package dir, overrides, `PATH`) |
//! | [`config`] | Layered TOML config: stock → `--config` → `.syno-thumbs.toml` |
//! | [`naming`] | `@eaDir` / `SYNOPHOTO_THUMB_*` naming |
//! | [`types`] | Media kinds, size classes, extension allow-lists |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Markers Instead of a Database
//!
//! A failed encode leaves a zero-byte `SYNOPHOTO_THUMB_<SIZE>.fail` next to
//! where the artifact would be; a successful one removes it. Every change is a
//! single create or unlink, so an interrupted run never leaves a size class in
//! a state the next run misreads. Re-running is the retry mechanism.
//!
//! ## Dimensions Decide Everything
//!
//! The target size of every class is computed up front from the source's
//! dimensions ([`imaging::target_size`]). Probing is therefore the one step
//! that can fail a whole file; it tries four tools before giving up.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;
pub mod state;
pub mod toolchain;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
