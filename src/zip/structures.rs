use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::io::{self, Cursor, Read, Write};
use std::time::SystemTime;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// General purpose flag: entry is encrypted
pub const FLAG_ENCRYPTED: u16 = 1 << 0;
/// General purpose flag: CRC and sizes follow the data in a data descriptor
pub const FLAG_DATA_DESCRIPTOR: u16 = 1 << 3;
/// General purpose flag: file name is UTF-8
pub const FLAG_UTF8: u16 = 1 << 11;

/// Version needed to extract for DEFLATE entries and directories (2.0)
pub const VERSION_DEFAULT: u16 = 20;
/// Version needed to extract for ZIP64 entries (4.5)
pub const VERSION_ZIP64: u16 = 45;
/// Version made by: Unix host, APPNOTE 6.3
pub const VERSION_MADE_BY: u16 = (3 << 8) | 63;

/// Header ID of the ZIP64 extended information extra field
pub const ZIP64_EXTRA_ID: u16 = 0x0001;
pub const ZIP64_MARKER_U16: u16 = 0xFFFF;
pub const ZIP64_MARKER_U32: u32 = 0xFFFF_FFFF;

/// Files at least this large are written with ZIP64 local headers and
/// descriptors. The margin below 4 GiB absorbs DEFLATE expansion of
/// incompressible data.
pub const ZIP64_THRESHOLD: u64 = 0xF000_0000;

/// External attributes for directories: Unix `drwxr-xr-x` plus the MS-DOS directory bit
pub const EXTERNAL_ATTRS_DIRECTORY: u32 = (0o040755 << 16) | 0x10;
/// External attributes for regular files: Unix `-rw-r--r--`
pub const EXTERNAL_ATTRS_FILE: u32 = 0o100644 << 16;

fn invalid_data(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

/// End of Central Directory (EOCD) - 22 bytes minimum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: [u8; 4] = *b"PK\x05\x06";
    pub const SIZE: usize = 22;

    /// Build a single-disk record, saturating overflowing fields to the
    /// ZIP64 markers.
    pub fn new(total_entries: u64, cd_size: u64, cd_offset: u64) -> Self {
        let entries = u16::try_from(total_entries)
            .ok()
            .filter(|n| *n != ZIP64_MARKER_U16)
            .unwrap_or(ZIP64_MARKER_U16);
        Self {
            disk_number: 0,
            disk_with_cd: 0,
            disk_entries: entries,
            total_entries: entries,
            cd_size: saturate_u32(cd_size),
            cd_offset: saturate_u32(cd_offset),
            comment_len: 0,
        }
    }

    pub fn from_bytes(data: &[u8]) -> io::Result<Self> {
        if data.len() < Self::SIZE {
            return Err(invalid_data("Invalid End of Central Directory"));
        }

        // Verify signature
        if data[0..4] != Self::SIGNATURE {
            return Err(invalid_data("Invalid End of Central Directory"));
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            disk_number: cursor.read_u16::<LittleEndian>()?,
            disk_with_cd: cursor.read_u16::<LittleEndian>()?,
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&Self::SIGNATURE)?;
        w.write_u16::<LittleEndian>(self.disk_number)?;
        w.write_u16::<LittleEndian>(self.disk_with_cd)?;
        w.write_u16::<LittleEndian>(self.disk_entries)?;
        w.write_u16::<LittleEndian>(self.total_entries)?;
        w.write_u32::<LittleEndian>(self.cd_size)?;
        w.write_u32::<LittleEndian>(self.cd_offset)?;
        w.write_u16::<LittleEndian>(self.comment_len)
    }

    pub fn is_zip64(&self) -> bool {
        self.disk_entries == ZIP64_MARKER_U16
            || self.total_entries == ZIP64_MARKER_U16
            || self.cd_size == ZIP64_MARKER_U32
            || self.cd_offset == ZIP64_MARKER_U32
    }
}

/// ZIP64 End of Central Directory Locator - 20 bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zip64EOCDLocator {
    pub disk_with_eocd64: u32,
    pub eocd64_offset: u64,
    pub total_disks: u32,
}

impl Zip64EOCDLocator {
    pub const SIGNATURE: [u8; 4] = *b"PK\x06\x07";
    pub const SIZE: usize = 20;

    pub fn from_bytes(data: &[u8]) -> io::Result<Self> {
        if data.len() < Self::SIZE || data[0..4] != Self::SIGNATURE {
            return Err(invalid_data("Invalid ZIP64 format"));
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            disk_with_eocd64: cursor.read_u32::<LittleEndian>()?,
            eocd64_offset: cursor.read_u64::<LittleEndian>()?,
            total_disks: cursor.read_u32::<LittleEndian>()?,
        })
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&Self::SIGNATURE)?;
        w.write_u32::<LittleEndian>(self.disk_with_eocd64)?;
        w.write_u64::<LittleEndian>(self.eocd64_offset)?;
        w.write_u32::<LittleEndian>(self.total_disks)
    }
}

/// ZIP64 End of Central Directory - 56 bytes minimum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zip64EOCD {
    pub eocd64_size: u64,
    pub version_made_by: u16,
    pub version_needed: u16,
    pub disk_number: u32,
    pub disk_with_cd: u32,
    pub disk_entries: u64,
    pub total_entries: u64,
    pub cd_size: u64,
    pub cd_offset: u64,
}

impl Zip64EOCD {
    pub const SIGNATURE: [u8; 4] = *b"PK\x06\x06";
    pub const MIN_SIZE: usize = 56;

    pub fn new(total_entries: u64, cd_size: u64, cd_offset: u64) -> Self {
        Self {
            // Size of the remaining record, excluding the leading 12 bytes
            eocd64_size: (Self::MIN_SIZE - 12) as u64,
            version_made_by: VERSION_MADE_BY,
            version_needed: VERSION_ZIP64,
            disk_number: 0,
            disk_with_cd: 0,
            disk_entries: total_entries,
            total_entries,
            cd_size,
            cd_offset,
        }
    }

    pub fn from_bytes(data: &[u8]) -> io::Result<Self> {
        if data.len() < Self::MIN_SIZE || data[0..4] != Self::SIGNATURE {
            return Err(invalid_data("Invalid ZIP64 format"));
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            eocd64_size: cursor.read_u64::<LittleEndian>()?,
            version_made_by: cursor.read_u16::<LittleEndian>()?,
            version_needed: cursor.read_u16::<LittleEndian>()?,
            disk_number: cursor.read_u32::<LittleEndian>()?,
            disk_with_cd: cursor.read_u32::<LittleEndian>()?,
            disk_entries: cursor.read_u64::<LittleEndian>()?,
            total_entries: cursor.read_u64::<LittleEndian>()?,
            cd_size: cursor.read_u64::<LittleEndian>()?,
            cd_offset: cursor.read_u64::<LittleEndian>()?,
        })
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&Self::SIGNATURE)?;
        w.write_u64::<LittleEndian>(self.eocd64_size)?;
        w.write_u16::<LittleEndian>(self.version_made_by)?;
        w.write_u16::<LittleEndian>(self.version_needed)?;
        w.write_u32::<LittleEndian>(self.disk_number)?;
        w.write_u32::<LittleEndian>(self.disk_with_cd)?;
        w.write_u64::<LittleEndian>(self.disk_entries)?;
        w.write_u64::<LittleEndian>(self.total_entries)?;
        w.write_u64::<LittleEndian>(self.cd_size)?;
        w.write_u64::<LittleEndian>(self.cd_offset)
    }
}

/// Data descriptor signature. The signature is optional on read.
pub const DATA_DESCRIPTOR_SIGNATURE: [u8; 4] = *b"PK\x07\x08";

/// Local File Header (LFH) - 30 bytes
pub const LFH_SIGNATURE: [u8; 4] = *b"PK\x03\x04";
pub const LFH_SIZE: usize = 30;

/// Central Directory File Header (CDFH) - 46 bytes minimum
pub const CDFH_SIGNATURE: [u8; 4] = *b"PK\x01\x02";
pub const CDFH_MIN_SIZE: usize = 46;

/// Local File Header, as found in front of each entry's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileHeader {
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: CompressionMethod,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub file_name: String,
    /// A ZIP64 extended information field is present. Decides the width
    /// of the size fields in a trailing data descriptor.
    pub zip64: bool,
}

impl LocalFileHeader {
    pub fn has_data_descriptor(&self) -> bool {
        self.flags & FLAG_DATA_DESCRIPTOR != 0
    }

    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }

    /// Directory entries end with a separator. Local headers carry no
    /// attribute field, so the name is the only marker available.
    pub fn is_directory(&self) -> bool {
        self.file_name.ends_with('/') || self.file_name.ends_with('\\')
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let name = self.file_name.as_bytes();
        let name_len = u16::try_from(name.len())
            .map_err(|_| invalid_data(format!("entry name too long: {}", self.file_name)))?;

        w.write_all(&LFH_SIGNATURE)?;
        w.write_u16::<LittleEndian>(self.version_needed)?;
        w.write_u16::<LittleEndian>(self.flags)?;
        w.write_u16::<LittleEndian>(self.compression_method.as_u16())?;
        w.write_u16::<LittleEndian>(self.last_mod_time)?;
        w.write_u16::<LittleEndian>(self.last_mod_date)?;
        w.write_u32::<LittleEndian>(self.crc32)?;
        if self.zip64 {
            // Both sizes live in the extra field
            w.write_u32::<LittleEndian>(ZIP64_MARKER_U32)?;
            w.write_u32::<LittleEndian>(ZIP64_MARKER_U32)?;
            w.write_u16::<LittleEndian>(name_len)?;
            w.write_u16::<LittleEndian>(20)?;
            w.write_all(name)?;
            w.write_u16::<LittleEndian>(ZIP64_EXTRA_ID)?;
            w.write_u16::<LittleEndian>(16)?;
            w.write_u64::<LittleEndian>(self.uncompressed_size)?;
            w.write_u64::<LittleEndian>(self.compressed_size)
        } else {
            w.write_u32::<LittleEndian>(u32_field(self.compressed_size)?)?;
            w.write_u32::<LittleEndian>(u32_field(self.uncompressed_size)?)?;
            w.write_u16::<LittleEndian>(name_len)?;
            w.write_u16::<LittleEndian>(0)?;
            w.write_all(name)
        }
    }

    /// Parse a Local File Header whose signature has already been consumed.
    pub fn read_after_signature<R: Read>(r: &mut R) -> io::Result<Self> {
        let version_needed = r.read_u16::<LittleEndian>()?;
        let flags = r.read_u16::<LittleEndian>()?;
        let compression_method = r.read_u16::<LittleEndian>()?;
        let last_mod_time = r.read_u16::<LittleEndian>()?;
        let last_mod_date = r.read_u16::<LittleEndian>()?;
        let crc32 = r.read_u32::<LittleEndian>()?;
        let mut compressed_size = r.read_u32::<LittleEndian>()? as u64;
        let mut uncompressed_size = r.read_u32::<LittleEndian>()? as u64;
        let file_name_length = r.read_u16::<LittleEndian>()?;
        let extra_field_length = r.read_u16::<LittleEndian>()?;

        let mut file_name_bytes = vec![0u8; file_name_length as usize];
        r.read_exact(&mut file_name_bytes)?;
        // Use lossy conversion to handle non-UTF8 filenames gracefully
        let file_name = String::from_utf8_lossy(&file_name_bytes).to_string();

        let mut extra = vec![0u8; extra_field_length as usize];
        r.read_exact(&mut extra)?;
        let zip64 = parse_zip64_extra(
            &extra,
            &mut uncompressed_size,
            &mut compressed_size,
            None,
        )?;

        Ok(Self {
            version_needed,
            flags,
            compression_method: CompressionMethod::from_u16(compression_method),
            last_mod_time,
            last_mod_date,
            crc32,
            compressed_size,
            uncompressed_size,
            file_name,
            zip64,
        })
    }
}

/// Central Directory File Header, one per entry at the end of the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralDirectoryHeader {
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: CompressionMethod,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub external_attrs: u32,
    pub lfh_offset: u64,
    pub file_name: String,
}

impl CentralDirectoryHeader {
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let name = self.file_name.as_bytes();
        let name_len = u16::try_from(name.len())
            .map_err(|_| invalid_data(format!("entry name too long: {}", self.file_name)))?;

        // ZIP64 fields appear only for header fields set to the marker,
        // in this fixed order.
        let mut zip64 = Vec::new();
        let uncompressed_size = saturate_u32(self.uncompressed_size);
        if uncompressed_size == ZIP64_MARKER_U32 {
            zip64.write_u64::<LittleEndian>(self.uncompressed_size)?;
        }
        let compressed_size = saturate_u32(self.compressed_size);
        if compressed_size == ZIP64_MARKER_U32 {
            zip64.write_u64::<LittleEndian>(self.compressed_size)?;
        }
        let lfh_offset = saturate_u32(self.lfh_offset);
        if lfh_offset == ZIP64_MARKER_U32 {
            zip64.write_u64::<LittleEndian>(self.lfh_offset)?;
        }
        let extra_len = if zip64.is_empty() { 0 } else { 4 + zip64.len() };
        let version_needed = if zip64.is_empty() {
            self.version_needed
        } else {
            self.version_needed.max(VERSION_ZIP64)
        };

        w.write_all(&CDFH_SIGNATURE)?;
        w.write_u16::<LittleEndian>(VERSION_MADE_BY)?;
        w.write_u16::<LittleEndian>(version_needed)?;
        w.write_u16::<LittleEndian>(self.flags)?;
        w.write_u16::<LittleEndian>(self.compression_method.as_u16())?;
        w.write_u16::<LittleEndian>(self.last_mod_time)?;
        w.write_u16::<LittleEndian>(self.last_mod_date)?;
        w.write_u32::<LittleEndian>(self.crc32)?;
        w.write_u32::<LittleEndian>(compressed_size)?;
        w.write_u32::<LittleEndian>(uncompressed_size)?;
        w.write_u16::<LittleEndian>(name_len)?;
        w.write_u16::<LittleEndian>(extra_len as u16)?;
        w.write_u16::<LittleEndian>(0)?; // file comment length
        w.write_u16::<LittleEndian>(0)?; // disk number start
        w.write_u16::<LittleEndian>(0)?; // internal attributes
        w.write_u32::<LittleEndian>(self.external_attrs)?;
        w.write_u32::<LittleEndian>(lfh_offset)?;
        w.write_all(name)?;
        if !zip64.is_empty() {
            w.write_u16::<LittleEndian>(ZIP64_EXTRA_ID)?;
            w.write_u16::<LittleEndian>(zip64.len() as u16)?;
            w.write_all(&zip64)?;
        }
        Ok(())
    }

    /// Parse a Central Directory File Header whose signature has already
    /// been consumed. The file comment is skipped.
    pub fn read_after_signature<R: Read>(r: &mut R) -> io::Result<Self> {
        let _version_made_by = r.read_u16::<LittleEndian>()?;
        let version_needed = r.read_u16::<LittleEndian>()?;
        let flags = r.read_u16::<LittleEndian>()?;
        let compression_method = r.read_u16::<LittleEndian>()?;
        let last_mod_time = r.read_u16::<LittleEndian>()?;
        let last_mod_date = r.read_u16::<LittleEndian>()?;
        let crc32 = r.read_u32::<LittleEndian>()?;
        let mut compressed_size = r.read_u32::<LittleEndian>()? as u64;
        let mut uncompressed_size = r.read_u32::<LittleEndian>()? as u64;
        let file_name_length = r.read_u16::<LittleEndian>()?;
        let extra_field_length = r.read_u16::<LittleEndian>()?;
        let file_comment_length = r.read_u16::<LittleEndian>()?;
        let _disk_number_start = r.read_u16::<LittleEndian>()?;
        let _internal_attrs = r.read_u16::<LittleEndian>()?;
        let external_attrs = r.read_u32::<LittleEndian>()?;
        let mut lfh_offset = r.read_u32::<LittleEndian>()? as u64;

        let mut file_name_bytes = vec![0u8; file_name_length as usize];
        r.read_exact(&mut file_name_bytes)?;
        let file_name = String::from_utf8_lossy(&file_name_bytes).to_string();

        let mut extra = vec![0u8; extra_field_length as usize];
        r.read_exact(&mut extra)?;
        parse_zip64_extra(
            &extra,
            &mut uncompressed_size,
            &mut compressed_size,
            Some(&mut lfh_offset),
        )?;

        let skipped = io::copy(&mut r.take(file_comment_length as u64), &mut io::sink())?;
        if skipped != file_comment_length as u64 {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }

        Ok(Self {
            version_needed,
            flags,
            compression_method: CompressionMethod::from_u16(compression_method),
            last_mod_time,
            last_mod_date,
            crc32,
            compressed_size,
            uncompressed_size,
            external_attrs,
            lfh_offset,
            file_name,
        })
    }
}

/// Scan an extra field block for the ZIP64 extended information field.
///
/// Fields are present only if the corresponding header field is
/// 0xFFFFFFFF. Returns whether a ZIP64 field was found.
fn parse_zip64_extra(
    extra: &[u8],
    uncompressed_size: &mut u64,
    compressed_size: &mut u64,
    lfh_offset: Option<&mut u64>,
) -> io::Result<bool> {
    let mut cursor = Cursor::new(extra);
    let end = extra.len() as u64;

    while cursor.position() + 4 <= end {
        let header_id = cursor.read_u16::<LittleEndian>()?;
        let field_size = cursor.read_u16::<LittleEndian>()? as u64;
        let field_end = cursor.position() + field_size;
        if field_end > end {
            return Err(invalid_data("extra field overruns its block"));
        }

        if header_id == ZIP64_EXTRA_ID {
            if *uncompressed_size == ZIP64_MARKER_U32 as u64 && cursor.position() + 8 <= field_end {
                *uncompressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if *compressed_size == ZIP64_MARKER_U32 as u64 && cursor.position() + 8 <= field_end {
                *compressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if let Some(offset) = lfh_offset {
                if *offset == ZIP64_MARKER_U32 as u64 && cursor.position() + 8 <= field_end {
                    *offset = cursor.read_u64::<LittleEndian>()?;
                }
            }
            return Ok(true);
        }

        // Skip unknown extra fields
        cursor.set_position(field_end);
    }

    Ok(false)
}

/// Trailing record carrying CRC and sizes for entries written with
/// [`FLAG_DATA_DESCRIPTOR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataDescriptor {
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
}

impl DataDescriptor {
    pub fn write_to<W: Write>(&self, w: &mut W, zip64: bool) -> io::Result<()> {
        w.write_all(&DATA_DESCRIPTOR_SIGNATURE)?;
        w.write_u32::<LittleEndian>(self.crc32)?;
        if zip64 {
            w.write_u64::<LittleEndian>(self.compressed_size)?;
            w.write_u64::<LittleEndian>(self.uncompressed_size)
        } else {
            w.write_u32::<LittleEndian>(u32_field(self.compressed_size)?)?;
            w.write_u32::<LittleEndian>(u32_field(self.uncompressed_size)?)
        }
    }

    /// Read a descriptor, with or without its leading signature.
    pub fn read_from<R: Read>(r: &mut R, zip64: bool) -> io::Result<Self> {
        let mut crc32 = r.read_u32::<LittleEndian>()?;
        if crc32 == u32::from_le_bytes(DATA_DESCRIPTOR_SIGNATURE) {
            crc32 = r.read_u32::<LittleEndian>()?;
        }
        let (compressed_size, uncompressed_size) = if zip64 {
            (r.read_u64::<LittleEndian>()?, r.read_u64::<LittleEndian>()?)
        } else {
            (
                r.read_u32::<LittleEndian>()? as u64,
                r.read_u32::<LittleEndian>()? as u64,
            )
        };
        Ok(Self {
            crc32,
            compressed_size,
            uncompressed_size,
        })
    }
}

fn saturate_u32(value: u64) -> u32 {
    u32::try_from(value)
        .ok()
        .filter(|v| *v != ZIP64_MARKER_U32)
        .unwrap_or(ZIP64_MARKER_U32)
}

fn u32_field(value: u64) -> io::Result<u32> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v != ZIP64_MARKER_U32)
        .ok_or_else(|| invalid_data(format!("size {value} needs ZIP64 but the entry was not written as ZIP64")))
}

/// MS-DOS packed modification time and date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    pub time: u16,
    pub date: u16,
}

impl DosDateTime {
    /// 1980-01-01 00:00:00, the earliest representable instant.
    pub const EPOCH: DosDateTime = DosDateTime {
        time: 0,
        date: (1 << 5) | 1,
    };

    /// 2107-12-31 23:59:58, the latest representable instant.
    pub const MAX: DosDateTime = DosDateTime {
        time: (23 << 11) | (59 << 5) | 29,
        date: (127 << 9) | (12 << 5) | 31,
    };

    /// Convert a timestamp to DOS format in UTC, clamping to the
    /// representable range.
    pub fn from_system_time(t: SystemTime) -> Self {
        let utc: DateTime<Utc> = t.into();
        if utc.year() < 1980 {
            return Self::EPOCH;
        }
        if utc.year() > 2107 {
            return Self::MAX;
        }

        Self {
            time: ((utc.hour() << 11) | (utc.minute() << 5) | (utc.second() / 2)) as u16,
            date: (((utc.year() - 1980) as u16) << 9)
                | ((utc.month() as u16) << 5)
                | utc.day() as u16,
        }
    }
}

/// Entry metadata reported by a forward pass over an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub file_name: String,
    pub compression_method: CompressionMethod,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub crc32: u32,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub is_directory: bool,
}

impl EntryInfo {
    /// Parse modification date to (year, month, day)
    pub fn mod_date(&self) -> (u16, u8, u8) {
        let day = (self.last_mod_date & 0x1F) as u8;
        let month = ((self.last_mod_date >> 5) & 0x0F) as u8;
        let year = ((self.last_mod_date >> 9) & 0x7F) + 1980;
        (year, month, day)
    }

    /// Parse modification time to (hour, minute, second)
    pub fn mod_time(&self) -> (u8, u8, u8) {
        let second = ((self.last_mod_time & 0x1F) * 2) as u8;
        let minute = ((self.last_mod_time >> 5) & 0x3F) as u8;
        let hour = ((self.last_mod_time >> 11) & 0x1F) as u8;
        (hour, minute, second)
    }
}
