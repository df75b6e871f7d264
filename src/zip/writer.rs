//! Forward-only ZIP writer.
//!
//! Entries are written strictly one after another and the output is never
//! seeked: file entries set [`FLAG_DATA_DESCRIPTOR`] and append their CRC
//! and sizes after the compressed data. The central directory is buffered
//! as one small record per entry and written by [`ZipWriter::finish`].

use std::io::{self, Write};

use flate2::Compression;
use flate2::write::DeflateEncoder;

use super::structures::*;

/// Writer wrapper that tracks the current output offset.
struct CountingWriter<W> {
    inner: W,
    bytes_written: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.bytes_written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Streaming ZIP writer over any [`Write`] sink.
///
/// ## Example
///
/// ```
/// use std::io::Write;
/// use ziptree::zip::{DosDateTime, ZipWriter};
///
/// let mut zip = ZipWriter::new(Vec::new());
/// zip.add_directory("docs/", DosDateTime::EPOCH)?;
/// let mut file = zip.start_file("docs/readme.txt", DosDateTime::EPOCH, false)?;
/// file.write_all(b"hello")?;
/// file.finish()?;
/// let bytes = zip.finish()?;
/// assert_eq!(&bytes[0..4], b"PK\x03\x04");
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct ZipWriter<W: Write> {
    out: CountingWriter<W>,
    central: Vec<CentralDirectoryHeader>,
}

impl<W: Write> ZipWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            out: CountingWriter {
                inner,
                bytes_written: 0,
            },
            central: Vec::new(),
        }
    }

    /// Number of entries written so far.
    pub fn entry_count(&self) -> usize {
        self.central.len()
    }

    /// Append a directory entry. `name` should end with `/`.
    pub fn add_directory(&mut self, name: &str, modified: DosDateTime) -> io::Result<()> {
        let lfh_offset = self.out.bytes_written;
        let header = LocalFileHeader {
            version_needed: VERSION_DEFAULT,
            flags: FLAG_UTF8,
            compression_method: CompressionMethod::Stored,
            last_mod_time: modified.time,
            last_mod_date: modified.date,
            crc32: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            file_name: name.to_string(),
            zip64: false,
        };
        header.write_to(&mut self.out)?;

        self.central.push(CentralDirectoryHeader {
            version_needed: VERSION_DEFAULT,
            flags: FLAG_UTF8,
            compression_method: CompressionMethod::Stored,
            last_mod_time: modified.time,
            last_mod_date: modified.date,
            crc32: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            external_attrs: EXTERNAL_ATTRS_DIRECTORY,
            lfh_offset,
            file_name: name.to_string(),
        });
        Ok(())
    }

    /// Open a DEFLATE file entry. Its payload is written through the
    /// returned [`FileWriter`], which must be [finished](FileWriter::finish)
    /// before the next entry is started.
    ///
    /// `zip64` selects 64-bit sizes in the local header and data
    /// descriptor; set it for payloads that may reach 4 GiB.
    pub fn start_file(
        &mut self,
        name: &str,
        modified: DosDateTime,
        zip64: bool,
    ) -> io::Result<FileWriter<'_, W>> {
        let lfh_offset = self.out.bytes_written;
        let version_needed = if zip64 { VERSION_ZIP64 } else { VERSION_DEFAULT };
        let flags = FLAG_UTF8 | FLAG_DATA_DESCRIPTOR;
        let header = LocalFileHeader {
            version_needed,
            flags,
            compression_method: CompressionMethod::Deflate,
            last_mod_time: modified.time,
            last_mod_date: modified.date,
            crc32: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            file_name: name.to_string(),
            zip64,
        };
        header.write_to(&mut self.out)?;

        let data_start = self.out.bytes_written;
        Ok(FileWriter {
            encoder: DeflateEncoder::new(&mut self.out, Compression::default()),
            central: &mut self.central,
            hasher: crc32fast::Hasher::new(),
            uncompressed_size: 0,
            data_start,
            zip64,
            record: CentralDirectoryHeader {
                version_needed,
                flags,
                compression_method: CompressionMethod::Deflate,
                last_mod_time: modified.time,
                last_mod_date: modified.date,
                crc32: 0,
                compressed_size: 0,
                uncompressed_size: 0,
                external_attrs: EXTERNAL_ATTRS_FILE,
                lfh_offset,
                file_name: name.to_string(),
            },
        })
    }

    /// Write the central directory and end records, flush, and hand back
    /// the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        let cd_offset = self.out.bytes_written;
        for record in &self.central {
            record.write_to(&mut self.out)?;
        }
        let cd_size = self.out.bytes_written - cd_offset;
        let total_entries = self.central.len() as u64;

        let eocd = EndOfCentralDirectory::new(total_entries, cd_size, cd_offset);
        if eocd.is_zip64() {
            let eocd64_offset = self.out.bytes_written;
            Zip64EOCD::new(total_entries, cd_size, cd_offset).write_to(&mut self.out)?;
            Zip64EOCDLocator {
                disk_with_eocd64: 0,
                eocd64_offset,
                total_disks: 1,
            }
            .write_to(&mut self.out)?;
        }
        eocd.write_to(&mut self.out)?;

        self.out.flush()?;
        Ok(self.out.inner)
    }
}

/// Payload sink for one file entry; see [`ZipWriter::start_file`].
pub struct FileWriter<'a, W: Write> {
    encoder: DeflateEncoder<&'a mut CountingWriter<W>>,
    central: &'a mut Vec<CentralDirectoryHeader>,
    hasher: crc32fast::Hasher,
    uncompressed_size: u64,
    data_start: u64,
    zip64: bool,
    record: CentralDirectoryHeader,
}

impl<W: Write> Write for FileWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.encoder.write(buf)?;
        self.hasher.update(&buf[..n]);
        self.uncompressed_size += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.encoder.flush()
    }
}

impl<W: Write> FileWriter<'_, W> {
    /// Close the DEFLATE stream, append the data descriptor and record the
    /// entry for the central directory.
    pub fn finish(self) -> io::Result<()> {
        let out = self.encoder.finish()?;
        let descriptor = DataDescriptor {
            crc32: self.hasher.finalize(),
            compressed_size: out.bytes_written - self.data_start,
            uncompressed_size: self.uncompressed_size,
        };
        descriptor.write_to(out, self.zip64)?;

        let mut record = self.record;
        record.crc32 = descriptor.crc32;
        record.compressed_size = descriptor.compressed_size;
        record.uncompressed_size = descriptor.uncompressed_size;
        self.central.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eocd_of(bytes: &[u8]) -> EndOfCentralDirectory {
        EndOfCentralDirectory::from_bytes(&bytes[bytes.len() - EndOfCentralDirectory::SIZE..])
            .unwrap()
    }

    #[test]
    fn empty_archive_is_just_an_end_record() {
        let bytes = ZipWriter::new(Vec::new()).finish().unwrap();
        assert_eq!(bytes.len(), EndOfCentralDirectory::SIZE);
        let eocd = eocd_of(&bytes);
        assert_eq!(eocd.total_entries, 0);
        assert_eq!(eocd.cd_size, 0);
    }

    #[test]
    fn central_directory_points_at_local_headers() {
        let mut zip = ZipWriter::new(Vec::new());
        zip.add_directory("a/", DosDateTime::EPOCH).unwrap();
        let mut file = zip.start_file("a/b.txt", DosDateTime::EPOCH, false).unwrap();
        file.write_all(b"hello hello hello").unwrap();
        file.finish().unwrap();
        assert_eq!(zip.entry_count(), 2);
        let bytes = zip.finish().unwrap();

        let eocd = eocd_of(&bytes);
        assert_eq!(eocd.total_entries, 2);
        assert!(!eocd.is_zip64());

        let mut cd = &bytes[eocd.cd_offset as usize..];
        let mut names = Vec::new();
        for _ in 0..2 {
            assert_eq!(cd[0..4], CDFH_SIGNATURE);
            cd = &cd[4..];
            let record = CentralDirectoryHeader::read_after_signature(&mut cd).unwrap();
            let at = record.lfh_offset as usize;
            assert_eq!(bytes[at..at + 4], LFH_SIGNATURE);
            names.push((record.file_name, record.external_attrs));
        }
        assert_eq!(
            names,
            vec![
                ("a/".to_string(), EXTERNAL_ATTRS_DIRECTORY),
                ("a/b.txt".to_string(), EXTERNAL_ATTRS_FILE),
            ]
        );
    }

    #[test]
    fn file_records_carry_crc_and_sizes() {
        let payload = b"The quick brown fox jumps over the lazy dog";
        let mut zip = ZipWriter::new(Vec::new());
        let mut file = zip.start_file("fox.txt", DosDateTime::EPOCH, false).unwrap();
        file.write_all(payload).unwrap();
        file.finish().unwrap();
        let bytes = zip.finish().unwrap();

        let eocd = eocd_of(&bytes);
        let mut cd = &bytes[eocd.cd_offset as usize + 4..];
        let record = CentralDirectoryHeader::read_after_signature(&mut cd).unwrap();
        assert_eq!(record.crc32, crc32fast::hash(payload));
        assert_eq!(record.uncompressed_size, payload.len() as u64);
        assert_eq!(record.compression_method, CompressionMethod::Deflate);
        assert_ne!(record.flags & FLAG_DATA_DESCRIPTOR, 0);
    }
}
