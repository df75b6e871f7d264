//! # ziptree
//!
//! Stream a directory tree into a ZIP archive and back with bounded memory.
//!
//! Files are never loaded whole: payloads move through one fixed-size
//! buffer (64 KiB by default) on the way in and on the way out. Both
//! directions make a single forward pass over the archive, so no seeking
//! is needed.
//!
//! ## Features
//!
//! - Archive a directory recursively, in deterministic (sorted) order
//! - Extract an archive, refusing entry names that would escape the target
//!   directory
//! - All-or-nothing archive creation via a temporary file and rename
//! - Support for ZIP64 format (files larger than 4GB)
//! - Support for STORED (uncompressed) and DEFLATE compression methods
//! - Cooperative cancellation through [`Options::cancel`]
//!
//! ## Example
//!
//! ```no_run
//! fn main() -> Result<(), ziptree::Error> {
//!     let archive = ziptree::archive_directory("photos", "backup/photos.zip")?;
//!     ziptree::extract_archive(&archive, "restored")?;
//!
//!     for entry in ziptree::list_archive(&archive)? {
//!         println!("{}", entry.file_name);
//!     }
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

pub mod cli;
pub mod error;
mod io;
pub mod options;
pub mod path;
pub mod zip;

pub use cli::Cli;
pub use error::{Error, PathViolation, Result};
pub use options::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE, Options};
pub use zip::{ArchiveStats, EntryInfo, ExtractStats, ZipArchiver, ZipExtractor};

/// Archive the contents of `source_dir` into `archive_path` with default
/// options. Returns the archive path.
///
/// The root directory itself is not an entry; its children are the
/// shallowest entries. Parent directories of `archive_path` are created as
/// needed.
pub fn archive_directory(
    source_dir: impl AsRef<Path>,
    archive_path: impl AsRef<Path>,
) -> Result<PathBuf> {
    archive_directory_with_options(source_dir, archive_path, &Options::default())
}

pub fn archive_directory_with_options(
    source_dir: impl AsRef<Path>,
    archive_path: impl AsRef<Path>,
    options: &Options,
) -> Result<PathBuf> {
    let archive_path = archive_path.as_ref();
    ZipArchiver::new(options).archive(source_dir.as_ref(), archive_path)?;
    Ok(archive_path.to_path_buf())
}

/// Extract `archive_path` below `target_dir` with default options. Returns
/// the target directory.
///
/// The target directory is created if missing. A failed extraction may
/// leave the entries processed so far on disk.
pub fn extract_archive(
    archive_path: impl AsRef<Path>,
    target_dir: impl AsRef<Path>,
) -> Result<PathBuf> {
    extract_archive_with_options(archive_path, target_dir, &Options::default())
}

pub fn extract_archive_with_options(
    archive_path: impl AsRef<Path>,
    target_dir: impl AsRef<Path>,
    options: &Options,
) -> Result<PathBuf> {
    let target_dir = target_dir.as_ref();
    ZipExtractor::new(options).extract_all(archive_path.as_ref(), target_dir)?;
    Ok(target_dir.to_path_buf())
}

/// List the entries of `archive_path` in stored order without writing
/// anything.
pub fn list_archive(archive_path: impl AsRef<Path>) -> Result<Vec<EntryInfo>> {
    ZipExtractor::new(&Options::default()).list_files(archive_path.as_ref())
}
