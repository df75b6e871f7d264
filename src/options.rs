use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};

/// Chunk size used by the streaming copy loops unless overridden.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Largest accepted chunk size; the buffer is allocated up front.
pub const MAX_CHUNK_SIZE: usize = 256 * 1024 * 1024;

/// Per-operation settings.
///
/// Passed explicitly to every operation; the crate keeps no global state.
#[derive(Debug, Clone)]
pub struct Options {
    /// Size of the single buffer file payloads are streamed through.
    pub chunk_size: usize,
    /// Checked between chunks; once set, the running operation stops with
    /// [`Error::Cancelled`].
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            cancel: None,
        }
    }
}

impl Options {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidArgument("chunk size must be non-zero".into()));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(Error::InvalidArgument(format!(
                "chunk size {} exceeds the maximum of {MAX_CHUNK_SIZE} bytes",
                self.chunk_size
            )));
        }
        Ok(())
    }

    pub(crate) fn check_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_size_must_be_in_range() {
        assert!(Options::default().validate().is_ok());
        assert!(Options::default().with_chunk_size(1).validate().is_ok());
        assert!(Options::default().with_chunk_size(MAX_CHUNK_SIZE).validate().is_ok());

        for size in [0, MAX_CHUNK_SIZE + 1, usize::MAX] {
            let err = Options::default().with_chunk_size(size).validate().unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "{size}: {err}");
        }
    }
}
