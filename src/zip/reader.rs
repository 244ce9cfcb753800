//! Low-level ZIP record reader.
//!
//! [`ByteReader`] walks an in-memory archive with a single cursor. ZIP files
//! are read from the end:
//! 1. Scan backwards for the End of Central Directory (EOCD) signature
//! 2. Read the Central Directory entries it points at
//! 3. For each entry, read the Local File Header and payload at its offset,
//!    checking every duplicated field against the Central Directory
//!
//! Nothing is copied except names and extra fields; payloads are returned
//! as borrowed views into the input.

use std::borrow::Cow;
use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::trace;

use crate::error::{Error, Result};

use super::structures::*;

/// Cursor-based reader over a borrowed archive buffer.
pub struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> ByteReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_offset(buffer, 0)
    }

    pub fn with_offset(buffer: &'a [u8], offset: u64) -> Self {
        let mut cursor = Cursor::new(buffer);
        cursor.set_position(offset);
        Self { cursor }
    }

    /// Move the cursor. Out-of-range offsets fail on the next read.
    pub fn seek(&mut self, offset: u64) {
        self.cursor.set_position(offset);
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(self.cursor.read_u16::<LittleEndian>()?)
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(self.cursor.read_u32::<LittleEndian>()?)
    }

    /// Borrow the next `length` bytes and advance past them.
    pub fn read_buffer(&mut self, length: usize) -> Result<&'a [u8]> {
        let buffer: &'a [u8] = *self.cursor.get_ref();
        let view = usize::try_from(self.cursor.position())
            .ok()
            .and_then(|start| Some(start..start.checked_add(length)?))
            .and_then(|range| buffer.get(range))
            .ok_or_else(|| {
                Error::Truncated(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!(
                        "{length} bytes requested at offset {}, buffer is {} bytes",
                        self.cursor.position(),
                        buffer.len()
                    ),
                ))
            })?;
        self.cursor.set_position(self.cursor.position() + length as u64);
        Ok(view)
    }

    fn expect_signature(&mut self, record: &'static str, expected: u32) -> Result<()> {
        let actual = self.read_u32_le()?;
        if actual != expected {
            return Err(Error::InvalidSignature {
                record,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Position the cursor on the last EOCD signature in the buffer.
    ///
    /// The scan goes backwards over every byte so that an archive comment
    /// of any length after the record is skipped.
    pub fn locate_directory(&mut self) -> Result<u64> {
        let needle = EOCD_SIGNATURE.to_le_bytes();
        let buffer: &[u8] = *self.cursor.get_ref();
        let offset = buffer
            .windows(needle.len())
            .rposition(|window| window == needle)
            .ok_or(Error::DirectoryNotFound)? as u64;
        self.cursor.set_position(offset);
        Ok(offset)
    }

    /// Read the End of Central Directory record at the cursor.
    pub fn read_directory(&mut self) -> Result<Directory> {
        self.expect_signature("end of central directory", EOCD_SIGNATURE)?;
        let count_disks = self.read_u16_le()?;
        let disk_number = self.read_u16_le()?;
        let count_disk_records = self.read_u16_le()?;
        let count_records = self.read_u16_le()?;
        let size = self.read_u32_le()?;
        let offset = self.read_u32_le()?;
        let comment_length = self.read_u16_le()?;
        let comment = self.read_buffer(comment_length as usize)?.to_vec();

        Ok(Directory {
            count_disks,
            disk_number,
            count_disk_records,
            count_records,
            size,
            offset,
            comment,
        })
    }

    /// Read one Central Directory File Header at the cursor.
    pub fn read_directory_entry(&mut self) -> Result<DirectoryEntry> {
        self.expect_signature("central directory entry", CDFH_SIGNATURE)?;

        let version_made_by = self.read_u16_le()?;
        let version_needed = self.read_u16_le()?;
        let flag = self.read_u16_le()?;
        let compression_method = self.read_u16_le()?;
        let last_mod_time = self.read_u16_le()?;
        let last_mod_date = self.read_u16_le()?;
        let crc32 = self.read_u32_le()?;
        let compressed_size = self.read_u32_le()?;
        let uncompressed_size = self.read_u32_le()?;
        let name_length = self.read_u16_le()?;
        let extra_field_length = self.read_u16_le()?;
        let comment_length = self.read_u16_le()?;
        let disk_number = self.read_u16_le()?;
        let internal_attributes = self.read_u16_le()?;
        let external_attributes = self.read_u32_le()?;
        let offset = self.read_u32_le()?;

        let name = String::from_utf8(self.read_buffer(name_length as usize)?.to_vec())?;
        let extra_field = self.read_buffer(extra_field_length as usize)?.to_vec();
        let comment = self.read_buffer(comment_length as usize)?.to_vec();

        trace!(%name, offset, compressed_size, uncompressed_size, "central directory entry");

        Ok(DirectoryEntry {
            version_made_by,
            version_needed,
            flag,
            compression_method,
            last_mod_time,
            last_mod_date,
            crc32,
            compressed_size,
            uncompressed_size,
            disk_number,
            internal_attributes,
            external_attributes,
            offset,
            name,
            extra_field,
            comment,
        })
    }

    /// Read the Local File Header and payload belonging to `entry`.
    ///
    /// Seeks to `entry.offset` first. Every field the local header shares
    /// with the central directory must match it exactly, except that a zero
    /// CRC or size means "deferred" and takes the central directory's value.
    pub fn read_file_entry(&mut self, entry: &DirectoryEntry) -> Result<FileEntry<'a>> {
        self.seek(entry.offset as u64);
        self.expect_signature("local file header", LFH_SIGNATURE)?;

        let mismatch = |field: &'static str, local: u32, central: u32| Error::FieldMismatch {
            name: entry.name.clone(),
            field,
            local,
            central,
        };
        let exact = |field: &'static str, local: u16, central: u16| {
            if local == central {
                Ok(local)
            } else {
                Err(mismatch(field, local as u32, central as u32))
            }
        };
        let deferred = |field: &'static str, local: u32, central: u32| match local {
            0 => Ok(central),
            _ if local == central => Ok(local),
            _ => Err(mismatch(field, local, central)),
        };

        let version_needed = exact("version needed", self.read_u16_le()?, entry.version_needed)?;
        let flag = exact("general purpose flag", self.read_u16_le()?, entry.flag)?;
        let compression_method = exact(
            "compression method",
            self.read_u16_le()?,
            entry.compression_method,
        )?;
        let last_mod_time = exact("modification time", self.read_u16_le()?, entry.last_mod_time)?;
        let last_mod_date = exact("modification date", self.read_u16_le()?, entry.last_mod_date)?;
        let crc32 = deferred("crc-32", self.read_u32_le()?, entry.crc32)?;
        let compressed_size = deferred(
            "compressed size",
            self.read_u32_le()?,
            entry.compressed_size,
        )?;
        let uncompressed_size = deferred(
            "uncompressed size",
            self.read_u32_le()?,
            entry.uncompressed_size,
        )?;
        let name_length = self.read_u16_le()?;
        let extra_field_length = self.read_u16_le()?;

        let name = String::from_utf8(self.read_buffer(name_length as usize)?.to_vec())?;
        if name != entry.name {
            return Err(Error::NameMismatch {
                local: name,
                central: entry.name.clone(),
            });
        }
        let extra_field = self.read_buffer(extra_field_length as usize)?;
        if extra_field != entry.extra_field.as_slice() {
            return Err(Error::ExtraFieldMismatch(name));
        }
        let data = self.read_buffer(compressed_size as usize)?;

        Ok(FileEntry {
            version_needed,
            flag,
            compression_method,
            last_mod_time,
            last_mod_date,
            crc32,
            compressed_size,
            uncompressed_size,
            name,
            extra_field: extra_field.to_vec(),
            data: Cow::Borrowed(data),
        })
    }
}
