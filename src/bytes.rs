//! Bounds-checked primitive readers over an in-memory blob, plus the
//! CRC and formatting helpers shared by parsers and extractors.
//!
//! The fixed-width readers assume the caller has already verified that
//! the read fits inside the blob; reading past the end is a programming
//! error and panics like any other out-of-bounds index.

pub fn read_be16(blob: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([blob[offset], blob[offset + 1]])
}

pub fn read_be32(blob: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        blob[offset],
        blob[offset + 1],
        blob[offset + 2],
        blob[offset + 3],
    ])
}

pub fn read_be64(blob: &[u8], offset: usize) -> u64 {
    u64::from_be_bytes([
        blob[offset],
        blob[offset + 1],
        blob[offset + 2],
        blob[offset + 3],
        blob[offset + 4],
        blob[offset + 5],
        blob[offset + 6],
        blob[offset + 7],
    ])
}

pub fn read_le16(blob: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([blob[offset], blob[offset + 1]])
}

pub fn read_le32(blob: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        blob[offset],
        blob[offset + 1],
        blob[offset + 2],
        blob[offset + 3],
    ])
}

pub fn read_le64(blob: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes([
        blob[offset],
        blob[offset + 1],
        blob[offset + 2],
        blob[offset + 3],
        blob[offset + 4],
        blob[offset + 5],
        blob[offset + 6],
        blob[offset + 7],
    ])
}

/// Read the bytes from `start` up to (but not including) the first NUL
/// or `limit` characters, whichever comes first. Stops at the end of
/// the blob.
pub fn read_cstring(blob: &[u8], start: usize, limit: usize) -> String {
    let mut out = String::new();
    let mut i = start;
    while i < blob.len() && out.len() < limit {
        let c = blob[i];
        if c == 0 {
            break;
        }
        out.push(c as char);
        i += 1;
    }
    out
}

/// CRC-16/ARC: polynomial 0xA001 (reflected 0x8005), init 0x0000.
pub fn crc16_arc(data: &[u8]) -> u16 {
    let mut crc: u16 = 0x0000;
    for &byte in data {
        crc ^= u16::from(byte);
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xA001
            } else {
                crc >> 1
            };
        }
    }
    crc
}

const CRC32_TABLE: [u32; 256] = crc32_table();

const fn crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 {
                0xEDB8_8320 ^ (c >> 1)
            } else {
                c >> 1
            };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

/// CRC-32/IEEE, zlib calling convention: pass 0 to start, or a previous
/// return value to continue an incremental computation. Matches the
/// checksums embedded in PNG, GZIP, and XZ.
pub fn crc32_ieee(prev: u32, data: &[u8]) -> u32 {
    let mut c = prev ^ 0xFFFF_FFFF;
    for &byte in data {
        c = CRC32_TABLE[((c ^ u32::from(byte)) & 0xFF) as usize] ^ (c >> 8);
    }
    c ^ 0xFFFF_FFFF
}

/// Lowercase base-16 with no leading zeros; used for the per-result
/// extraction directory names.
pub fn to_hex(value: usize) -> String {
    format!("{value:x}")
}

pub fn format_timestamp(ts: u32) -> String {
    match chrono::DateTime::from_timestamp(i64::from(ts), 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("@{ts}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endian_readers() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        assert_eq!(read_be16(&buf, 0), 0x0102);
        assert_eq!(read_le16(&buf, 0), 0x0201);
        assert_eq!(read_be32(&buf, 2), 0x0304_0506);
        assert_eq!(read_le32(&buf, 2), 0x0605_0403);
        assert_eq!(read_be64(&buf, 0), 0x0102_0304_0506_0708);
        assert_eq!(read_le64(&buf, 0), 0x0807_0605_0403_0201);
    }

    #[test]
    fn cstring_stops_at_nul_and_limit() {
        let buf = b"hello\0world";
        assert_eq!(read_cstring(buf, 0, 32), "hello");
        assert_eq!(read_cstring(buf, 6, 3), "wor");
        assert_eq!(read_cstring(buf, 6, 32), "world");
        assert_eq!(read_cstring(buf, 20, 32), "");
    }

    #[test]
    fn crc16_check_value() {
        // CRC-16/ARC check value for "123456789".
        assert_eq!(crc16_arc(b"123456789"), 0xBB3D);
    }

    #[test]
    fn crc32_check_value() {
        // CRC-32/IEEE check value for "123456789".
        assert_eq!(crc32_ieee(0, b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn crc32_incremental_matches_one_shot() {
        let whole = crc32_ieee(0, b"hello world");
        let partial = crc32_ieee(crc32_ieee(0, b"hello "), b"world");
        assert_eq!(whole, partial);
    }

    #[test]
    fn hex_has_no_leading_zeros() {
        assert_eq!(to_hex(0), "0");
        assert_eq!(to_hex(0x1a3f), "1a3f");
    }
}
