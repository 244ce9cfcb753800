//! CRC-32 (ISO-HDLC) as used by ZIP.

use std::sync::LazyLock;

/// Reflected form of the 0x04C11DB7 polynomial.
const POLYNOMIAL: u32 = 0xEDB8_8320;

static TABLE: LazyLock<[u32; 256]> = LazyLock::new(|| {
    let mut table = [0u32; 256];
    for (i, slot) in table.iter_mut().enumerate() {
        let mut r = i as u32;
        for _ in 0..8 {
            r = if r & 1 != 0 { (r >> 1) ^ POLYNOMIAL } else { r >> 1 };
        }
        *slot = r;
    }
    table
});

/// Initial register value for [`crc32_with`].
pub const CRC32_INIT: u32 = 0xFFFF_FFFF;

/// CRC-32 of `buffer`.
pub fn crc32(buffer: &[u8]) -> u32 {
    crc32_with(buffer, CRC32_INIT)
}

/// CRC-32 of `buffer` starting from an explicit register value.
pub fn crc32_with(buffer: &[u8], initial: u32) -> u32 {
    let table = &*TABLE;
    let crc = buffer.iter().fold(initial, |crc, &byte| {
        table[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8)
    });
    !crc
}
