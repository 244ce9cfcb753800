use std::borrow::Cow;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike};

use crate::error::{Error, Result};

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

/// Local File Header (LFH) - 30 bytes
pub const LFH_SIGNATURE: u32 = 0x0403_4b50;
pub const LFH_SIZE: usize = 30;

/// Central Directory File Header (CDFH) - 46 bytes minimum
pub const CDFH_SIGNATURE: u32 = 0x0201_4b50;
pub const CDFH_MIN_SIZE: usize = 46;

/// End of Central Directory (EOCD) - 22 bytes minimum
pub const EOCD_SIGNATURE: u32 = 0x0605_4b50;
pub const EOCD_SIZE: usize = 22;

/// Version made by written into every new entry (4.5).
pub const VERSION_MADE_BY: u16 = 45;
/// Version needed to extract written into every new entry (2.0, deflate).
pub const VERSION_NEEDED: u16 = 20;
/// General purpose flag written into every new entry.
pub const GENERAL_PURPOSE_FLAG: u16 = 6;

/// End of central directory record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    pub count_disks: u16,
    pub disk_number: u16,
    pub count_disk_records: u16,
    pub count_records: u16,
    /// Byte size of the central directory.
    pub size: u32,
    /// Offset of the first central directory entry.
    pub offset: u32,
    pub comment: Vec<u8>,
}

/// Central directory entry: the authoritative metadata for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub version_made_by: u16,
    pub version_needed: u16,
    pub flag: u16,
    pub compression_method: u16,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub disk_number: u16,
    pub internal_attributes: u16,
    pub external_attributes: u32,
    /// Offset of the matching local file header.
    pub offset: u32,
    pub name: String,
    pub extra_field: Vec<u8>,
    pub comment: Vec<u8>,
}

impl DirectoryEntry {
    pub fn compression(&self) -> CompressionMethod {
        CompressionMethod::from_u16(self.compression_method)
    }

    pub fn is_directory(&self) -> bool {
        self.name.ends_with('/')
    }

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

    pub fn last_modification(&self) -> NaiveDateTime {
        dos_to_datetime(self.last_mod_date, self.last_mod_time)
    }
}

/// Local file header plus its raw payload.
///
/// When read from an archive the deferred CRC and size fields have already
/// been replaced by the central directory's values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry<'a> {
    pub version_needed: u16,
    pub flag: u16,
    pub compression_method: u16,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub name: String,
    pub extra_field: Vec<u8>,
    /// Possibly compressed payload, `compressed_size` bytes long.
    pub data: Cow<'a, [u8]>,
}

impl<'a> FileEntry<'a> {
    /// Local header mirroring `entry`, carrying `data` as its payload.
    pub fn for_entry(entry: &DirectoryEntry, data: Cow<'a, [u8]>) -> Self {
        Self {
            version_needed: entry.version_needed,
            flag: entry.flag,
            compression_method: entry.compression_method,
            last_mod_time: entry.last_mod_time,
            last_mod_date: entry.last_mod_date,
            crc32: entry.crc32,
            compressed_size: entry.compressed_size,
            uncompressed_size: entry.uncompressed_size,
            name: entry.name.clone(),
            extra_field: entry.extra_field.clone(),
            data,
        }
    }
}

/// Rebuild a timestamp from packed MS-DOS date and time fields.
///
/// Out-of-range fields roll over instead of failing: month 0 is December
/// of the previous year, day 0 the last day of the previous month, and
/// hours, minutes and seconds past their maximum carry into the next unit.
pub fn dos_to_datetime(date: u16, time: u16) -> NaiveDateTime {
    let year = ((date >> 9) & 0x7F) as i32 + 1980;
    let month = ((date >> 5) & 0x0F) as u32;
    let day = (date & 0x1F) as i64;
    let hour = ((time >> 11) & 0x1F) as i64;
    let minute = ((time >> 5) & 0x3F) as i64;
    let second = ((time & 0x1F) * 2) as i64;

    // year is always within 1980..=2107 so these cannot fail
    let base = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    let base = if month == 0 {
        base - Months::new(1)
    } else {
        base + Months::new(month - 1)
    };
    base + Duration::days(day - 1) + Duration::seconds(hour * 3600 + minute * 60 + second)
}

/// Pack a timestamp into MS-DOS `(date, time)` fields.
///
/// Seconds are stored halved, so odd seconds round down. Years outside
/// 1980..=2107 cannot be represented.
pub fn datetime_to_dos(datetime: &NaiveDateTime) -> Result<(u16, u16)> {
    let year = datetime.year();
    if !(1980..=2107).contains(&year) {
        return Err(Error::Unrepresentable(format!(
            "modification year {year} is outside 1980..=2107"
        )));
    }
    let date = (((year - 1980) as u16) << 9) | ((datetime.month() as u16) << 5) | datetime.day() as u16;
    let time = ((datetime.hour() as u16) << 11)
        | ((datetime.minute() as u16) << 5)
        | (datetime.second() as u16 / 2);
    Ok((date, time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn packs_known_timestamp() {
        let (date, time) = datetime_to_dos(&at(2024, 3, 15, 13, 45, 31)).unwrap();
        assert_eq!(date, (44 << 9) | (3 << 5) | 15);
        assert_eq!(time, (13 << 11) | (45 << 5) | 15);
        assert_eq!(dos_to_datetime(date, time), at(2024, 3, 15, 13, 45, 30));
    }

    #[test]
    fn bounds_of_dos_range() {
        let (date, time) = datetime_to_dos(&at(1980, 1, 1, 0, 0, 0)).unwrap();
        assert_eq!((date, time), (0x0021, 0));
        let (date, time) = datetime_to_dos(&at(2107, 12, 31, 23, 59, 59)).unwrap();
        assert_eq!(dos_to_datetime(date, time), at(2107, 12, 31, 23, 59, 58));

        let err = datetime_to_dos(&at(1979, 12, 31, 23, 59, 59)).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::UnsupportedFeature);
        assert!(datetime_to_dos(&at(2108, 1, 1, 0, 0, 0)).is_err());
    }

    #[test]
    fn zero_fields_roll_back() {
        // all-zero date: month 0 and day 0 of 1980
        assert_eq!(dos_to_datetime(0, 0), at(1979, 11, 30, 0, 0, 0));
    }

    #[test]
    fn overflowing_time_carries() {
        // 31:63:62 on 2000-01-31
        let date = (20 << 9) | (1 << 5) | 31;
        let time = (31 << 11) | (63 << 5) | 31;
        assert_eq!(dos_to_datetime(date, time), at(2000, 2, 1, 8, 4, 2));
    }

    #[test]
    fn entry_accessors() {
        let entry = DirectoryEntry {
            version_made_by: VERSION_MADE_BY,
            version_needed: VERSION_NEEDED,
            flag: GENERAL_PURPOSE_FLAG,
            compression_method: 8,
            last_mod_time: (13 << 11) | (45 << 5) | 15,
            last_mod_date: (44 << 9) | (3 << 5) | 15,
            crc32: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            disk_number: 0,
            internal_attributes: 0,
            external_attributes: 0,
            offset: 0,
            name: "dir/".into(),
            extra_field: Vec::new(),
            comment: Vec::new(),
        };
        assert_eq!(entry.compression(), CompressionMethod::Deflate);
        assert!(entry.is_directory());
        assert_eq!(entry.mod_date(), (2024, 3, 15));
        assert_eq!(entry.mod_time(), (13, 45, 30));
        assert_eq!(entry.last_modification(), at(2024, 3, 15, 13, 45, 30));
    }
}
