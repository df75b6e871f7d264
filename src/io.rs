//! Bounded-memory copy loop shared by the archiver and the extractor.

use std::io::{self, Read, Write};

use crate::error::{Error, Result};
use crate::options::Options;

/// Stream `reader` into `writer` through `buf`, which is the only buffer
/// the loop uses.
///
/// Read and write failures are mapped separately so the caller can attach
/// the path of whichever side failed. Cancellation is checked before every
/// chunk. Returns the number of bytes copied.
pub(crate) fn copy_chunked<R, W>(
    reader: &mut R,
    writer: &mut W,
    buf: &mut [u8],
    options: &Options,
    read_err: impl Fn(io::Error) -> Error,
    write_err: impl Fn(io::Error) -> Error,
) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut copied = 0u64;
    loop {
        options.check_cancelled()?;
        let n = match reader.read(buf) {
            Ok(0) => return Ok(copied),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_err(e)),
        };
        writer.write_all(&buf[..n]).map_err(&write_err)?;
        copied += n as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    /// Records the largest single write it receives.
    #[derive(Default)]
    struct WidestWrite {
        widest: usize,
        total: usize,
    }

    impl Write for WidestWrite {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.widest = self.widest.max(buf.len());
            self.total += buf.len();
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn unreachable_err(e: io::Error) -> Error {
        panic!("unexpected error: {e}")
    }

    #[test]
    fn never_moves_more_than_one_chunk_at_a_time() {
        let data = vec![7u8; 1_000_000];
        let mut sink = WidestWrite::default();
        let mut buf = vec![0u8; 4096];

        let copied = copy_chunked(
            &mut &data[..],
            &mut sink,
            &mut buf,
            &Options::default(),
            unreachable_err,
            unreachable_err,
        )
        .unwrap();

        assert_eq!(copied, 1_000_000);
        assert_eq!(sink.total, 1_000_000);
        assert!(sink.widest <= 4096);
    }

    #[test]
    fn stops_when_cancelled() {
        let flag = Arc::new(AtomicBool::new(true));
        let options = Options::default().with_cancel_flag(flag);
        let mut buf = vec![0u8; 16];

        let err = copy_chunked(
            &mut &b"payload"[..],
            &mut Vec::new(),
            &mut buf,
            &options,
            unreachable_err,
            unreachable_err,
        )
        .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn read_failures_use_the_read_mapping() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::PermissionDenied))
            }
        }

        let mut buf = vec![0u8; 16];
        let err = copy_chunked(
            &mut Broken,
            &mut Vec::new(),
            &mut buf,
            &Options::default(),
            |e| Error::io("source", e),
            unreachable_err,
        )
        .unwrap_err();

        match err {
            Error::Io { path, .. } => assert_eq!(path, std::path::Path::new("source")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
