//! ZIP archive writing, parsing and directory-tree conversion.
//!
//! Both directions work in a single forward pass, so archives can be
//! produced and consumed as plain byte streams.
//!
//! ## Architecture
//!
//! The module is organized into five components:
//!
//! - [`structures`]: Data structures representing ZIP format elements (headers, EOCD, etc.)
//! - [`writer`]: Forward-only encoder producing entries with data descriptors
//! - [`parser`]: Forward-only decoder reading entries in stored order
//! - [`archiver`]: Walks a directory tree into a [`ZipWriter`]
//! - [`extractor`]: Materializes [`ZipParser`] entries under a target directory
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! This implementation writes file entries with their CRC and sizes in a
//! trailing data descriptor, so the writer never seeks back, and reads
//! entries from the local headers onward, so the reader never seeks ahead.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions for files > 4GB
//! - STORED (no compression) method on read
//! - DEFLATE compression method
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No BZIP2, LZMA, or other compression methods
//! - STORED entries must carry their sizes in the local header

pub mod archiver;
pub mod extractor;
mod parser;
mod structures;
mod writer;

pub use archiver::{ArchiveStats, ZipArchiver};
pub use extractor::{ExtractStats, ZipExtractor};
pub use parser::{EntryReader, ZipParser};
pub use structures::*;
pub use writer::{FileWriter, ZipWriter};
