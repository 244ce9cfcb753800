//! Low-level ZIP record writer.
//!
//! Each `write_*` method emits fields in exactly the order the matching
//! [`ByteReader`](super::ByteReader) method reads them.

use std::borrow::Cow;

use byteorder::{ByteOrder, LittleEndian};

use super::structures::*;

/// Growable list of byte chunks with a running length.
///
/// Chunks are either owned or borrowed from the caller; nothing is copied
/// until [`serialize`](Self::serialize).
#[derive(Debug, Default)]
pub struct ByteWriter<'a> {
    chunks: Vec<Cow<'a, [u8]>>,
    length: usize,
}

impl<'a> ByteWriter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far, i.e. the offset of the next write.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn write_buffer(&mut self, chunk: impl Into<Cow<'a, [u8]>>) -> &mut Self {
        let chunk = chunk.into();
        self.length += chunk.len();
        self.chunks.push(chunk);
        self
    }

    pub fn write_u16_le(&mut self, value: u16) -> &mut Self {
        let mut buf = [0u8; 2];
        LittleEndian::write_u16(&mut buf, value);
        self.write_buffer(buf.to_vec())
    }

    pub fn write_u32_le(&mut self, value: u32) -> &mut Self {
        let mut buf = [0u8; 4];
        LittleEndian::write_u32(&mut buf, value);
        self.write_buffer(buf.to_vec())
    }

    /// Write an End of Central Directory record.
    ///
    /// A comment longer than 65535 bytes is truncated.
    pub fn write_directory(&mut self, directory: Directory) -> &mut Self {
        let comment = clamp_u16(directory.comment);
        self.write_u32_le(EOCD_SIGNATURE)
            .write_u16_le(directory.count_disks)
            .write_u16_le(directory.disk_number)
            .write_u16_le(directory.count_disk_records)
            .write_u16_le(directory.count_records)
            .write_u32_le(directory.size)
            .write_u32_le(directory.offset)
            .write_u16_le(comment.len() as u16)
            .write_buffer(comment)
    }

    /// Write a Central Directory File Header.
    ///
    /// Name, extra field and comment longer than 65535 bytes are truncated.
    pub fn write_directory_entry(&mut self, entry: DirectoryEntry) -> &mut Self {
        let name = clamp_u16(entry.name.into_bytes());
        let extra_field = clamp_u16(entry.extra_field);
        let comment = clamp_u16(entry.comment);
        self.write_u32_le(CDFH_SIGNATURE)
            .write_u16_le(entry.version_made_by)
            .write_u16_le(entry.version_needed)
            .write_u16_le(entry.flag)
            .write_u16_le(entry.compression_method)
            .write_u16_le(entry.last_mod_time)
            .write_u16_le(entry.last_mod_date)
            .write_u32_le(entry.crc32)
            .write_u32_le(entry.compressed_size)
            .write_u32_le(entry.uncompressed_size)
            .write_u16_le(name.len() as u16)
            .write_u16_le(extra_field.len() as u16)
            .write_u16_le(comment.len() as u16)
            .write_u16_le(entry.disk_number)
            .write_u16_le(entry.internal_attributes)
            .write_u32_le(entry.external_attributes)
            .write_u32_le(entry.offset)
            .write_buffer(name)
            .write_buffer(extra_field)
            .write_buffer(comment)
    }

    /// Write a Local File Header followed by its payload.
    ///
    /// Name and extra field longer than 65535 bytes are truncated.
    pub fn write_file_entry(&mut self, entry: FileEntry<'a>) -> &mut Self {
        let name = clamp_u16(entry.name.into_bytes());
        let extra_field = clamp_u16(entry.extra_field);
        self.write_u32_le(LFH_SIGNATURE)
            .write_u16_le(entry.version_needed)
            .write_u16_le(entry.flag)
            .write_u16_le(entry.compression_method)
            .write_u16_le(entry.last_mod_time)
            .write_u16_le(entry.last_mod_date)
            .write_u32_le(entry.crc32)
            .write_u32_le(entry.compressed_size)
            .write_u32_le(entry.uncompressed_size)
            .write_u16_le(name.len() as u16)
            .write_u16_le(extra_field.len() as u16)
            .write_buffer(name)
            .write_buffer(extra_field)
            .write_buffer(entry.data)
    }

    /// Concatenate every chunk into the finished archive.
    pub fn serialize(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.length);
        for chunk in &self.chunks {
            out.extend_from_slice(chunk);
        }
        out
    }
}

/// Cut a variable-length field to what a 16-bit length can describe.
fn clamp_u16(mut field: Vec<u8>) -> Vec<u8> {
    field.truncate(u16::MAX as usize);
    field
}
