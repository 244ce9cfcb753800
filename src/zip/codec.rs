//! High-level extraction and creation of whole archives.
//!
//! [`ZipCodec`] drives [`ByteReader`] and [`ByteWriter`] and hands payloads
//! to its [`Compressor`].

use std::borrow::Cow;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, instrument};

use crate::checksum::crc32;
use crate::compress::{Compressor, DeflateCompressor};
use crate::error::{Error, Result};

use super::reader::ByteReader;
use super::structures::*;
use super::writer::ByteWriter;

/// A file to be stored by [`ZipCodec::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    pub name: String,
    pub data: Vec<u8>,
    /// Defaults to the current local time when `None`.
    pub last_modification: Option<NaiveDateTime>,
}

impl NewFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            last_modification: None,
        }
    }

    pub fn with_last_modification(mut self, last_modification: NaiveDateTime) -> Self {
        self.last_modification = Some(last_modification);
        self
    }
}

/// A file returned by [`ZipCodec::extract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFile {
    pub name: String,
    pub data: Vec<u8>,
    /// Local wall-clock time, two-second resolution.
    pub last_modification: NaiveDateTime,
}

/// In-memory ZIP codec.
///
/// Extraction and creation run entirely over byte buffers; the only
/// suspension points are the calls into the [`Compressor`].
#[derive(Debug, Clone)]
pub struct ZipCodec<C = DeflateCompressor> {
    compressor: C,
}

impl Default for ZipCodec {
    fn default() -> Self {
        Self::new(DeflateCompressor::default())
    }
}

impl<C: Compressor> ZipCodec<C> {
    pub fn new(compressor: C) -> Self {
        Self { compressor }
    }

    pub fn compressor(&self) -> &C {
        &self.compressor
    }

    /// Read the central directory without touching any payload.
    pub fn list(&self, buffer: &[u8]) -> Result<Vec<DirectoryEntry>> {
        read_central_directory(&mut ByteReader::new(buffer))
    }

    /// Extract every file, in central directory order.
    ///
    /// Each local header is checked against its central directory entry,
    /// and each file's size and CRC-32 are verified after decompression.
    /// The first failure aborts the whole extraction.
    #[instrument(skip_all, fields(archive_len = buffer.len()))]
    pub async fn extract(&self, buffer: &[u8]) -> Result<Vec<ExtractedFile>> {
        let mut reader = ByteReader::new(buffer);
        let entries = read_central_directory(&mut reader)?;

        let mut files = Vec::with_capacity(entries.len());
        for entry in &entries {
            let file = reader.read_file_entry(entry)?;
            let data = match CompressionMethod::from_u16(file.compression_method) {
                CompressionMethod::Stored => file.data.into_owned(),
                CompressionMethod::Deflate => self
                    .compressor
                    .decompress(&file.data)
                    .await
                    .map_err(|source| Error::Compressor {
                        operation: "decompress",
                        name: file.name.clone(),
                        source,
                    })?,
                CompressionMethod::Unknown(method) => {
                    return Err(Error::UnsupportedCompression(method));
                }
            };
            let last_modification = dos_to_datetime(file.last_mod_date, file.last_mod_time);

            if data.len() != file.uncompressed_size as usize {
                return Err(Error::SizeMismatch {
                    name: file.name,
                    expected: file.uncompressed_size,
                    actual: data.len(),
                });
            }
            let actual = crc32(&data);
            if actual != file.crc32 {
                return Err(Error::CrcMismatch {
                    name: file.name,
                    expected: file.crc32,
                    actual,
                });
            }

            debug!(name = %file.name, size = data.len(), "extracted");
            files.push(ExtractedFile {
                name: file.name,
                data,
                last_modification,
            });
        }

        Ok(files)
    }

    /// Build an archive containing `files`, in the given order.
    ///
    /// Each file is deflated and stored compressed only when that is
    /// strictly smaller than the original.
    #[instrument(skip_all, fields(files = files.len()))]
    pub async fn create(&self, files: &[NewFile]) -> Result<Vec<u8>> {
        let count_records = u16::try_from(files.len()).map_err(|_| {
            Error::Unrepresentable(format!("{} files exceed the 65535 entry limit", files.len()))
        })?;

        let mut writer = ByteWriter::new();
        let mut entries = Vec::with_capacity(files.len());

        for file in files {
            check_u16(file.name.len(), "file name length")?;

            let compressed = self
                .compressor
                .compress(&file.data)
                .await
                .map_err(|source| Error::Compressor {
                    operation: "compress",
                    name: file.name.clone(),
                    source,
                })?;
            let (method, payload): (_, Cow<'_, [u8]>) = if compressed.len() < file.data.len() {
                (CompressionMethod::Deflate, Cow::Owned(compressed))
            } else {
                (CompressionMethod::Stored, Cow::Borrowed(file.data.as_slice()))
            };
            debug!(
                name = %file.name,
                method = ?method,
                size = file.data.len(),
                stored = payload.len(),
                "adding file"
            );

            let timestamp = file
                .last_modification
                .unwrap_or_else(|| Local::now().naive_local());
            let (last_mod_date, last_mod_time) = datetime_to_dos(&timestamp)?;

            let entry = DirectoryEntry {
                version_made_by: VERSION_MADE_BY,
                version_needed: VERSION_NEEDED,
                flag: GENERAL_PURPOSE_FLAG,
                compression_method: method.as_u16(),
                last_mod_time,
                last_mod_date,
                crc32: crc32(&file.data),
                compressed_size: check_u32(payload.len(), "compressed size")?,
                uncompressed_size: check_u32(file.data.len(), "uncompressed size")?,
                disk_number: 0,
                internal_attributes: 0,
                external_attributes: 0,
                offset: check_u32(writer.len(), "local header offset")?,
                name: file.name.clone(),
                extra_field: Vec::new(),
                comment: Vec::new(),
            };
            writer.write_file_entry(FileEntry::for_entry(&entry, payload));
            entries.push(entry);
        }

        let offset = check_u32(writer.len(), "central directory offset")?;
        for entry in entries {
            writer.write_directory_entry(entry);
        }
        let size = check_u32(writer.len() - offset as usize, "central directory size")?;
        writer.write_directory(Directory {
            count_disks: 0,
            disk_number: 0,
            count_disk_records: count_records,
            count_records,
            size,
            offset,
            comment: Vec::new(),
        });

        Ok(writer.serialize())
    }
}

/// Locate the trailer and read every central directory entry.
///
/// Only single-disk archives are accepted.
fn read_central_directory(reader: &mut ByteReader<'_>) -> Result<Vec<DirectoryEntry>> {
    let eocd_offset = reader.locate_directory()?;
    let directory = reader.read_directory()?;
    debug!(
        eocd_offset,
        records = directory.count_records,
        cd_offset = directory.offset,
        cd_size = directory.size,
        "found end of central directory"
    );

    if directory.count_disks != 0 {
        return Err(Error::MultiDisk("disk count"));
    }
    if directory.disk_number != 0 {
        return Err(Error::MultiDisk("central directory disk number"));
    }
    if directory.count_disk_records != directory.count_records {
        return Err(Error::MultiDisk("records on this disk differ from total"));
    }

    reader.seek(directory.offset as u64);
    let mut entries = Vec::with_capacity(directory.count_records as usize);
    for _ in 0..directory.count_records {
        let entry = reader.read_directory_entry()?;
        if entry.disk_number != 0 {
            return Err(Error::MultiDisk("entry disk number"));
        }
        entries.push(entry);
    }

    Ok(entries)
}

fn check_u16(value: usize, what: &str) -> Result<u16> {
    u16::try_from(value)
        .map_err(|_| Error::Unrepresentable(format!("{what} {value} does not fit in 16 bits")))
}

fn check_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| Error::Unrepresentable(format!("{what} {value} needs ZIP64")))
}
