use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, PathViolation, Result};
use crate::io::copy_chunked;
use crate::options::Options;
use crate::path::{resolve_within, sanitize};

use super::parser::ZipParser;
use super::structures::EntryInfo;

/// Counts reported once an archive has been extracted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractStats {
    pub directories: usize,
    pub files: usize,
    pub bytes: u64,
}

/// ZIP file extractor
pub struct ZipExtractor<'a> {
    options: &'a Options,
}

impl<'a> ZipExtractor<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self { options }
    }

    /// List all entries in the archive, in stored order.
    pub fn list_files(&self, archive_path: &Path) -> Result<Vec<EntryInfo>> {
        let mut parser = self.open(archive_path)?;
        let mut entries = Vec::new();

        loop {
            let last = parser.entries_read().checked_sub(1);
            let Some(entry) = parser
                .next_entry()
                .map_err(|e| archive_error(archive_path, last, e))?
            else {
                break;
            };
            self.options.check_cancelled()?;
            let info = entry
                .finish()
                .map_err(|e| archive_error(archive_path, last, e))?;
            entries.push(info);
        }

        Ok(entries)
    }

    /// Extract every entry of `archive_path` below `target_dir`.
    ///
    /// Each entry name is checked before anything is written for it. On
    /// failure the entries already extracted stay on disk.
    pub fn extract_all(&self, archive_path: &Path, target_dir: &Path) -> Result<ExtractStats> {
        if target_dir.as_os_str().is_empty() {
            return Err(Error::InvalidArgument("target directory path is empty".into()));
        }
        let mut parser = self.open(archive_path)?;

        fs::create_dir_all(target_dir).map_err(|e| Error::io(target_dir, e))?;
        let root = fs::canonicalize(target_dir).map_err(|e| Error::io(target_dir, e))?;

        let mut stats = ExtractStats::default();
        let mut buf = vec![0u8; self.options.chunk_size];

        loop {
            let last = parser.entries_read().checked_sub(1);
            let Some(mut entry) = parser
                .next_entry()
                .map_err(|e| archive_error(archive_path, last, e))?
            else {
                break;
            };
            self.options.check_cancelled()?;

            let name = entry.name().to_string();
            let relative = match sanitize(&name) {
                Ok(relative) => relative,
                Err(PathViolation::Empty) => {
                    return Err(Error::format(last, format!("entry {name:?} has an empty path")));
                }
                Err(violation) => return Err(Error::Security { name, violation }),
            };
            let output_path = resolve_within(&root, &name, &relative)?;

            if entry.is_directory() {
                // Verified first: a directory entry must not carry data
                entry
                    .finish()
                    .map_err(|e| archive_error(archive_path, last, e))?;
                fs::create_dir_all(&output_path).map_err(|e| Error::io(&output_path, e))?;
                stats.directories += 1;
                debug!(entry = %name, "created directory");
                continue;
            }

            // Create parent directories if needed
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }

            let mut file = File::create(&output_path).map_err(|e| Error::io(&output_path, e))?;
            let bytes = copy_chunked(
                &mut entry,
                &mut file,
                &mut buf,
                self.options,
                |e| archive_error(archive_path, last, e),
                |e| Error::io(&output_path, e),
            )?;
            entry
                .finish()
                .map_err(|e| archive_error(archive_path, last, e))?;
            stats.files += 1;
            stats.bytes += bytes;
            debug!(entry = %name, bytes, "extracted file");
        }

        info!(
            archive = %archive_path.display(),
            target = %root.display(),
            directories = stats.directories,
            files = stats.files,
            bytes = stats.bytes,
            "archive extracted"
        );
        Ok(stats)
    }

    fn open(&self, archive_path: &Path) -> Result<ZipParser<File>> {
        if archive_path.as_os_str().is_empty() {
            return Err(Error::InvalidArgument("archive path is empty".into()));
        }
        self.options.validate()?;
        let file = File::open(archive_path).map_err(|e| Error::io(archive_path, e))?;
        Ok(ZipParser::with_capacity(self.options.chunk_size, file))
    }
}

/// Sort a parser error into a format problem or a plain I/O failure on the
/// archive file.
fn archive_error(archive_path: &Path, last_entry: Option<usize>, err: io::Error) -> Error {
    match err.kind() {
        io::ErrorKind::UnexpectedEof => Error::format(last_entry, "archive is truncated"),
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput => {
            Error::format(last_entry, err.to_string())
        }
        _ => Error::io(PathBuf::from(archive_path), err),
    }
}
