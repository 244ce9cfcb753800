//! ZIP archive reading and writing.
//!
//! ## Architecture
//!
//! The module is organized into four components:
//!
//! - [`structures`]: Records of the ZIP format (EOCD, central directory entry,
//!   local file header) and MS-DOS date/time packing
//! - [`reader`]: [`ByteReader`], a cursor over the archive buffer
//! - [`writer`]: [`ByteWriter`], an append-only chunk list
//! - [`codec`]: [`ZipCodec`], which drives both to extract and create archives
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and (possibly compressed) data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end, optionally
//!    followed by a comment
//!
//! Extraction reads the EOCD first and trusts the Central Directory over the
//! local headers. Creation writes the local entries first, remembering each
//! one's offset, then the Central Directory and the EOCD.
//!
//! ## Limitations
//!
//! - No ZIP64 (4 GiB sizes and offsets, 65535 entries at most)
//! - No encryption
//! - No multi-disk archives
//! - Only STORED and DEFLATE compression

pub mod codec;
pub mod reader;
pub mod structures;
pub mod writer;

pub use codec::{ExtractedFile, NewFile, ZipCodec};
pub use reader::ByteReader;
pub use structures::*;
pub use writer::ByteWriter;
