//! Forward-only ZIP parser.
//!
//! Entries are read in stored order from any [`Read`] source, without
//! seeking and without consulting the central directory first.
//!
//! ## Parsing Strategy
//!
//! 1. Read a signature. A local file header starts an entry; a central
//!    directory header, ZIP64 end record or end record starts the trailer.
//! 2. For an entry, the payload is delimited either by the sizes in its
//!    local header, or, when those are deferred to a data descriptor, by
//!    the end of its self-terminating DEFLATE stream.
//! 3. The trailer is walked to the end-of-central-directory record and its
//!    entry count must agree with the entries seen.
//!
//! Truncation surfaces as [`io::ErrorKind::UnexpectedEof`]; anything
//! structurally wrong as [`io::ErrorKind::InvalidData`].

use std::io::{self, BufReader, Read, Take};

use flate2::bufread::DeflateDecoder;

use super::structures::*;

fn invalid_data(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

/// Streaming ZIP parser.
///
/// ## Example
///
/// ```
/// use std::io::{Read, Write};
/// use ziptree::zip::{DosDateTime, ZipParser, ZipWriter};
///
/// let mut zip = ZipWriter::new(Vec::new());
/// let mut file = zip.start_file("hello.txt", DosDateTime::EPOCH, false)?;
/// file.write_all(b"hello")?;
/// file.finish()?;
/// let bytes = zip.finish()?;
///
/// let mut parser = ZipParser::new(&bytes[..]);
/// while let Some(mut entry) = parser.next_entry()? {
///     let mut contents = Vec::new();
///     entry.read_to_end(&mut contents)?;
///     let info = entry.finish()?;
///     assert_eq!(info.file_name, "hello.txt");
///     assert_eq!(contents, b"hello");
/// }
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct ZipParser<R: Read> {
    source: BufReader<R>,
    entries_read: usize,
    in_entry: bool,
    done: bool,
}

impl<R: Read> ZipParser<R> {
    pub fn new(inner: R) -> Self {
        Self::with_capacity(8 * 1024, inner)
    }

    /// Create a parser whose read buffer holds `capacity` bytes.
    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        Self {
            source: BufReader::with_capacity(capacity, inner),
            entries_read: 0,
            in_entry: false,
            done: false,
        }
    }

    /// Number of entries fully read and verified so far.
    pub fn entries_read(&self) -> usize {
        self.entries_read
    }

    /// Advance to the next entry.
    ///
    /// Returns `Ok(None)` once the trailer has been read and verified. The
    /// returned [`EntryReader`] must be [finished](EntryReader::finish)
    /// before this is called again.
    pub fn next_entry(&mut self) -> io::Result<Option<EntryReader<'_, R>>> {
        if self.in_entry {
            return Err(io::Error::other("previous entry was not finished"));
        }
        if self.done {
            return Ok(None);
        }

        let signature = read_signature(&mut self.source)?;
        if signature != LFH_SIGNATURE {
            self.read_trailer(signature)?;
            self.done = true;
            return Ok(None);
        }

        let header = LocalFileHeader::read_after_signature(&mut self.source)?;
        if header.is_encrypted() {
            return Err(invalid_data(format!(
                "entry {} is encrypted",
                header.file_name
            )));
        }

        let source = &mut self.source;
        let payload = match (header.compression_method, header.has_data_descriptor()) {
            (CompressionMethod::Stored, false) => {
                Payload::Stored(source.take(header.compressed_size))
            }
            (CompressionMethod::Deflate, false) => {
                Payload::Deflated(DeflateDecoder::new(source.take(header.compressed_size)))
            }
            (CompressionMethod::Deflate, true) => {
                Payload::DeflatedUntilEnd(DeflateDecoder::new(source))
            }
            (CompressionMethod::Stored, true) => {
                return Err(invalid_data(format!(
                    "stored entry {} defers its size to a data descriptor",
                    header.file_name
                )));
            }
            (CompressionMethod::Unknown(method), _) => {
                return Err(invalid_data(format!(
                    "entry {} uses unsupported compression method {method}",
                    header.file_name
                )));
            }
        };

        self.in_entry = true;
        Ok(Some(EntryReader {
            header,
            payload,
            hasher: crc32fast::Hasher::new(),
            uncompressed_size: 0,
            entries_read: &mut self.entries_read,
            in_entry: &mut self.in_entry,
        }))
    }

    /// Walk central directory headers and end records up to the
    /// end-of-central-directory record, checking the entry count.
    fn read_trailer(&mut self, mut signature: [u8; 4]) -> io::Result<()> {
        let mut central_entries = 0u64;
        while signature == CDFH_SIGNATURE {
            CentralDirectoryHeader::read_after_signature(&mut self.source)?;
            central_entries += 1;
            signature = read_signature(&mut self.source)?;
        }

        let mut zip64_entries = None;
        if signature == Zip64EOCD::SIGNATURE {
            let mut buf = [0u8; Zip64EOCD::MIN_SIZE];
            buf[..4].copy_from_slice(&signature);
            self.source.read_exact(&mut buf[4..])?;
            let eocd64 = Zip64EOCD::from_bytes(&buf)?;
            // Skip the extensible data sector
            let extensible = eocd64
                .eocd64_size
                .saturating_sub((Zip64EOCD::MIN_SIZE - 12) as u64);
            skip(&mut self.source, extensible)?;
            zip64_entries = Some(eocd64.total_entries);

            signature = read_signature(&mut self.source)?;
            let mut buf = [0u8; Zip64EOCDLocator::SIZE];
            buf[..4].copy_from_slice(&signature);
            self.source.read_exact(&mut buf[4..])?;
            Zip64EOCDLocator::from_bytes(&buf)?;

            signature = read_signature(&mut self.source)?;
        }

        if signature != EndOfCentralDirectory::SIGNATURE {
            return Err(invalid_data(format!(
                "unexpected signature {signature:02x?}"
            )));
        }
        let mut buf = [0u8; EndOfCentralDirectory::SIZE];
        buf[..4].copy_from_slice(&signature);
        self.source.read_exact(&mut buf[4..])?;
        let eocd = EndOfCentralDirectory::from_bytes(&buf)?;

        let recorded = if eocd.is_zip64() {
            zip64_entries.ok_or_else(|| invalid_data("missing ZIP64 end of central directory"))?
        } else {
            eocd.total_entries as u64
        };
        if recorded != central_entries || recorded != self.entries_read as u64 {
            return Err(invalid_data(format!(
                "central directory lists {recorded} entries, found {central_entries} headers and {} local entries",
                self.entries_read
            )));
        }
        Ok(())
    }
}

fn read_signature<R: Read>(r: &mut R) -> io::Result<[u8; 4]> {
    let mut signature = [0u8; 4];
    r.read_exact(&mut signature)?;
    Ok(signature)
}

fn skip<R: Read>(r: &mut R, len: u64) -> io::Result<()> {
    let skipped = io::copy(&mut r.take(len), &mut io::sink())?;
    if skipped != len {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    Ok(())
}

enum Payload<'a, R: Read> {
    /// STORED with sizes in the local header
    Stored(Take<&'a mut BufReader<R>>),
    /// DEFLATE with sizes in the local header
    Deflated(DeflateDecoder<Take<&'a mut BufReader<R>>>),
    /// DEFLATE followed by a data descriptor
    DeflatedUntilEnd(DeflateDecoder<&'a mut BufReader<R>>),
}

/// Decompressed payload of the current entry.
///
/// Reading yields the entry's uncompressed bytes while tracking CRC-32 and
/// length; [`finish`](EntryReader::finish) verifies both.
pub struct EntryReader<'a, R: Read> {
    header: LocalFileHeader,
    payload: Payload<'a, R>,
    hasher: crc32fast::Hasher,
    uncompressed_size: u64,
    entries_read: &'a mut usize,
    in_entry: &'a mut bool,
}

impl<R: Read> Read for EntryReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = match &mut self.payload {
            Payload::Stored(r) => r.read(buf)?,
            Payload::Deflated(r) => r.read(buf)?,
            Payload::DeflatedUntilEnd(r) => r.read(buf)?,
        };
        self.hasher.update(&buf[..n]);
        self.uncompressed_size += n as u64;
        Ok(n)
    }
}

impl<'a, R: Read> EntryReader<'a, R> {
    pub fn header(&self) -> &LocalFileHeader {
        &self.header
    }

    pub fn name(&self) -> &str {
        &self.header.file_name
    }

    pub fn is_directory(&self) -> bool {
        self.header.is_directory()
    }

    /// Consume whatever payload is left, then check CRC-32 and sizes
    /// against the local header or data descriptor.
    pub fn finish(mut self) -> io::Result<EntryInfo> {
        io::copy(&mut self, &mut io::sink())?;

        let EntryReader {
            header,
            payload,
            hasher,
            uncompressed_size,
            entries_read,
            in_entry,
        } = self;

        let expected = match payload {
            Payload::Stored(take) => {
                if take.limit() != 0 {
                    return Err(io::ErrorKind::UnexpectedEof.into());
                }
                DataDescriptor {
                    crc32: header.crc32,
                    compressed_size: header.compressed_size,
                    uncompressed_size: header.uncompressed_size,
                }
            }
            Payload::Deflated(decoder) => {
                let mut rest = decoder.into_inner();
                io::copy(&mut rest, &mut io::sink())?;
                if rest.limit() != 0 {
                    return Err(io::ErrorKind::UnexpectedEof.into());
                }
                DataDescriptor {
                    crc32: header.crc32,
                    compressed_size: header.compressed_size,
                    uncompressed_size: header.uncompressed_size,
                }
            }
            Payload::DeflatedUntilEnd(decoder) => {
                let consumed = decoder.total_in();
                let source = decoder.into_inner();
                let descriptor = DataDescriptor::read_from(source, header.zip64)?;
                if descriptor.compressed_size != consumed {
                    return Err(invalid_data(format!(
                        "entry {} records {} compressed bytes, stream had {consumed}",
                        header.file_name, descriptor.compressed_size
                    )));
                }
                descriptor
            }
        };

        if uncompressed_size != expected.uncompressed_size {
            return Err(invalid_data(format!(
                "entry {} records {} bytes, payload had {uncompressed_size}",
                header.file_name, expected.uncompressed_size
            )));
        }
        let crc32 = hasher.finalize();
        if crc32 != expected.crc32 {
            return Err(invalid_data(format!(
                "entry {} failed CRC-32 check (expected {:08x}, got {crc32:08x})",
                header.file_name, expected.crc32
            )));
        }

        if header.is_directory() && uncompressed_size != 0 {
            return Err(invalid_data(format!(
                "directory entry {} carries {uncompressed_size} bytes of data",
                header.file_name
            )));
        }

        *entries_read += 1;
        *in_entry = false;

        Ok(EntryInfo {
            is_directory: header.is_directory(),
            file_name: header.file_name,
            compression_method: header.compression_method,
            compressed_size: expected.compressed_size,
            uncompressed_size: expected.uncompressed_size,
            crc32,
            last_mod_time: header.last_mod_time,
            last_mod_date: header.last_mod_date,
        })
    }
}
