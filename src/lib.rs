//! # memzip
//!
//! An in-memory ZIP archive codec.
//!
//! This library extracts the files contained in a ZIP archive held in a byte
//! buffer, and builds new archives from a list of in-memory files. Reading
//! and writing files on disk is left to the caller (the `memzip` binary is
//! one such caller).
//!
//! ## Features
//!
//! - Backward scan for the end of central directory record, so archives with
//!   a trailing comment of any length are found
//! - Every local file header is cross-checked against the central directory
//! - Size and CRC-32 of every extracted file are verified
//! - STORED and raw DEFLATE entries; a file is only stored deflated when
//!   that makes it strictly smaller
//! - Pluggable [`Compressor`], [`DeflateCompressor`] (flate2) by default
//!
//! [`DeflateCompressor`], and so [`extract`] and [`create`], must run inside
//! a Tokio runtime.
//!
//! ## Example
//!
//! ```no_run
//! use memzip::NewFile;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let archive = memzip::create(&[NewFile::new("a.txt", "hello world")]).await?;
//!
//!     for file in memzip::extract(&archive).await? {
//!         println!("{} ({} bytes, {})", file.name, file.data.len(), file.last_modification);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod cli;
pub mod compress;
pub mod error;
pub mod zip;

pub use checksum::crc32;
pub use cli::Cli;
pub use compress::{Compressor, DeflateCompressor};
pub use error::{Error, ErrorKind, Result};
pub use zip::{DirectoryEntry, ExtractedFile, NewFile, ZipCodec};

/// Extract every file of `buffer` with the default codec.
pub async fn extract(buffer: &[u8]) -> Result<Vec<ExtractedFile>> {
    ZipCodec::<DeflateCompressor>::default().extract(buffer).await
}

/// Build an archive from `files` with the default codec.
pub async fn create(files: &[NewFile]) -> Result<Vec<u8>> {
    ZipCodec::<DeflateCompressor>::default().create(files).await
}
