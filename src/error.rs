use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why an entry name was refused during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathViolation {
    #[error("absolute path")]
    Absolute,
    #[error("drive prefix")]
    DrivePrefix,
    #[error("parent directory segment")]
    ParentDir,
    #[error("NUL byte in name")]
    NulByte,
    #[error("empty name")]
    Empty,
    #[error("resolves outside the extraction root")]
    OutsideRoot,
}

/// Errors returned by archive and extract operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or empty path argument, missing source directory, or a
    /// rejected option.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Filesystem failure, with the path it happened on.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The archive is malformed or truncated. `last_entry` is the index of
    /// the last entry processed successfully, if any.
    #[error("malformed archive ({}): {reason}", position(.last_entry))]
    Format {
        last_entry: Option<usize>,
        reason: String,
    },

    /// An entry name would land outside the extraction root.
    #[error("refusing entry {name:?}: {violation}")]
    Security {
        name: String,
        violation: PathViolation,
    },

    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn format(last_entry: Option<usize>, reason: impl Into<String>) -> Self {
        Error::Format {
            last_entry,
            reason: reason.into(),
        }
    }
}

fn position(last_entry: &Option<usize>) -> String {
    match last_entry {
        Some(index) => format!("after entry {index}"),
        None => "before the first entry".to_string(),
    }
}
