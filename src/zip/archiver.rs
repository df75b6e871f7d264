use std::fs::{self, File, Metadata};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::io::copy_chunked;
use crate::options::Options;
use crate::path::entry_name;

use super::structures::{DosDateTime, ZIP64_THRESHOLD};
use super::writer::ZipWriter;

/// Counts reported once an archive has been written.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveStats {
    pub directories: usize,
    pub files: usize,
    pub bytes: u64,
}

/// Packs a directory tree into a ZIP file.
pub struct ZipArchiver<'a> {
    options: &'a Options,
}

impl<'a> ZipArchiver<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self { options }
    }

    /// Archive everything below `source_dir` into `archive_path`.
    ///
    /// The archive is assembled in a temporary file next to `archive_path`
    /// and renamed into place only after every entry was written, so a
    /// failed run leaves `archive_path` untouched.
    pub fn archive(&self, source_dir: &Path, archive_path: &Path) -> Result<ArchiveStats> {
        if source_dir.as_os_str().is_empty() {
            return Err(Error::InvalidArgument("source directory path is empty".into()));
        }
        if archive_path.as_os_str().is_empty() {
            return Err(Error::InvalidArgument("archive path is empty".into()));
        }
        self.options.validate()?;

        match fs::metadata(source_dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(Error::InvalidArgument(format!(
                    "{} is not a directory",
                    source_dir.display()
                )));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::InvalidArgument(format!(
                    "source directory {} does not exist",
                    source_dir.display()
                )));
            }
            Err(e) => return Err(Error::io(source_dir, e)),
        }
        let base = fs::canonicalize(source_dir).map_err(|e| Error::io(source_dir, e))?;

        let parent = match archive_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;

        let staging = tempfile::Builder::new()
            .prefix(".ziptree-")
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(|e| Error::io(parent, e))?;

        // Never archive the output into itself
        let excluded: Vec<PathBuf> = [staging.path(), archive_path]
            .iter()
            .filter_map(|p| fs::canonicalize(p).ok())
            .collect();

        let sink = BufWriter::with_capacity(self.options.chunk_size, staging.as_file());
        let mut zip = ZipWriter::new(sink);
        let stats = self.write_tree(&base, &excluded, &mut zip, archive_path)?;

        let mut sink = zip.finish().map_err(|e| Error::io(archive_path, e))?;
        sink.flush().map_err(|e| Error::io(archive_path, e))?;
        drop(sink);
        // Temporary files are created owner-only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            staging
                .as_file()
                .set_permissions(fs::Permissions::from_mode(0o644))
                .map_err(|e| Error::io(archive_path, e))?;
        }
        staging
            .as_file()
            .sync_all()
            .map_err(|e| Error::io(archive_path, e))?;
        staging
            .persist(archive_path)
            .map_err(|e| Error::io(archive_path, e.error))?;

        info!(
            archive = %archive_path.display(),
            directories = stats.directories,
            files = stats.files,
            bytes = stats.bytes,
            "archive written"
        );
        Ok(stats)
    }

    fn write_tree<W: Write>(
        &self,
        base: &Path,
        excluded: &[PathBuf],
        zip: &mut ZipWriter<W>,
        archive_path: &Path,
    ) -> Result<ArchiveStats> {
        let mut stats = ArchiveStats::default();
        let mut buf = vec![0u8; self.options.chunk_size];

        let walker = WalkDir::new(base)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            self.options.check_cancelled()?;
            let entry = entry.map_err(|e| walk_error(base, e))?;
            let path = entry.path();

            if excluded.iter().any(|p| p == path) {
                debug!(path = %path.display(), "skipping archive output");
                continue;
            }

            let relative = path.strip_prefix(base).map_err(|_| {
                Error::io(path, io::Error::other("path escaped the source directory"))
            })?;
            let name = entry_name(relative).map_err(|e| Error::io(path, e))?;
            if name.is_empty() {
                continue;
            }

            let file_type = entry.file_type();
            if file_type.is_dir() {
                let metadata = entry.metadata().map_err(|e| walk_error(path, e))?;
                zip.add_directory(&format!("{name}/"), modified(&metadata))
                    .map_err(|e| Error::io(archive_path, e))?;
                stats.directories += 1;
                debug!(entry = %name, "added directory");
            } else if file_type.is_file() {
                let metadata = entry.metadata().map_err(|e| walk_error(path, e))?;
                let bytes = self.add_file(zip, path, &name, &metadata, &mut buf, archive_path)?;
                stats.files += 1;
                stats.bytes += bytes;
                debug!(entry = %name, bytes, "added file");
            } else {
                warn!(path = %path.display(), "skipping symlink or special file");
            }
        }

        Ok(stats)
    }

    fn add_file<W: Write>(
        &self,
        zip: &mut ZipWriter<W>,
        path: &Path,
        name: &str,
        metadata: &Metadata,
        buf: &mut [u8],
        archive_path: &Path,
    ) -> Result<u64> {
        let mut source = File::open(path).map_err(|e| Error::io(path, e))?;
        let zip64 = metadata.len() >= ZIP64_THRESHOLD;
        let mut sink = zip
            .start_file(name, modified(metadata), zip64)
            .map_err(|e| Error::io(archive_path, e))?;

        let copied = copy_chunked(
            &mut source,
            &mut sink,
            buf,
            self.options,
            |e| Error::io(path, e),
            |e| Error::io(archive_path, e),
        )?;
        sink.finish().map_err(|e| Error::io(archive_path, e))?;
        Ok(copied)
    }
}

fn modified(metadata: &Metadata) -> DosDateTime {
    metadata
        .modified()
        .map(DosDateTime::from_system_time)
        .unwrap_or(DosDateTime::EPOCH)
}

fn walk_error(fallback: &Path, err: walkdir::Error) -> Error {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| fallback.to_path_buf());
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
    Error::io(path, source)
}
