//! CRC lookup-table recognition: 16-byte prefix match against the
//! CRC-32/IEEE, CRC-16/IBM, CRC-16/CCITT, and CRC-8 tables in both
//! byte orders.

use crate::bytes::{read_be16, read_be32, read_le16, read_le32};
use crate::common::tables::{
    CRC16_CCITT_PREFIX, CRC16_IBM_PREFIX, CRC32_IEEE_PREFIX, CRC8_POLY07_PREFIX,
};
use crate::parsers::Parser;
use crate::result::ScanResult;
use std::fmt::Write;

const PREFIX_LEN: usize = 16;

pub struct CrcParser;

struct CrcMatch {
    width: &'static str,
    poly_name: &'static str,
    polynomial: u64,
    endianness: &'static str,
    table_bytes: usize,
}

fn match_u32_table(blob: &[u8], offset: usize, table: &[u32; 4], le: bool) -> bool {
    if offset + PREFIX_LEN > blob.len() {
        return false;
    }
    let read = if le { read_le32 } else { read_be32 };
    table
        .iter()
        .enumerate()
        .all(|(i, &entry)| read(blob, offset + i * 4) == entry)
}

fn match_u16_table(blob: &[u8], offset: usize, table: &[u16; 8], le: bool) -> bool {
    if offset + PREFIX_LEN > blob.len() {
        return false;
    }
    let read = if le { read_le16 } else { read_be16 };
    table
        .iter()
        .enumerate()
        .all(|(i, &entry)| read(blob, offset + i * 2) == entry)
}

fn identify(blob: &[u8], offset: usize) -> Option<CrcMatch> {
    for (le, label) in [(true, "LE"), (false, "BE")] {
        if match_u32_table(blob, offset, &CRC32_IEEE_PREFIX, le) {
            return Some(CrcMatch {
                width: "CRC32",
                poly_name: "CRC-32/IEEE (poly 0x04C11DB7)",
                polynomial: 0x04C1_1DB7,
                endianness: label,
                table_bytes: 256 * 4,
            });
        }
    }
    for (le, label) in [(true, "LE"), (false, "BE")] {
        if match_u16_table(blob, offset, &CRC16_IBM_PREFIX, le) {
            return Some(CrcMatch {
                width: "CRC16",
                poly_name: "CRC-16/IBM (poly 0x8005)",
                polynomial: 0x8005,
                endianness: label,
                table_bytes: 256 * 2,
            });
        }
    }
    for (le, label) in [(true, "LE"), (false, "BE")] {
        if match_u16_table(blob, offset, &CRC16_CCITT_PREFIX, le) {
            return Some(CrcMatch {
                width: "CRC16",
                poly_name: "CRC-16/CCITT (poly 0x1021)",
                polynomial: 0x1021,
                endianness: label,
                table_bytes: 256 * 2,
            });
        }
    }
    if offset + PREFIX_LEN <= blob.len()
        && blob[offset..offset + PREFIX_LEN] == CRC8_POLY07_PREFIX
    {
        return Some(CrcMatch {
            width: "CRC8",
            poly_name: "CRC-8 (poly 0x07)",
            polynomial: 0x07,
            endianness: "byte-array",
            table_bytes: 256,
        });
    }
    None
}

impl Parser for CrcParser {
    fn name(&self) -> &'static str {
        "CRC"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        identify(blob, offset).is_some()
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "CRC");

        let Some(m) = identify(blob, offset) else {
            r.info = "No CRC table recognized".to_string();
            return r;
        };

        let mut info = String::new();
        let _ = write!(
            info,
            "{}, {}, polynomial=0x{:x}, storage endianness={}, confidence=high, entries=256, table bytes={}",
            m.width, m.poly_name, m.polynomial, m.endianness, m.table_bytes
        );
        r.info = info;
        r.length = m.table_bytes.min(blob.len() - offset);
        r.is_valid = true;
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_le_table_is_recognized() {
        let mut data = Vec::new();
        for entry in CRC32_IEEE_PREFIX {
            data.extend_from_slice(&entry.to_le_bytes());
        }
        data.resize(1024, 0);
        assert!(CrcParser.matches(&data, 0));
        let r = CrcParser.parse(&data, 0);
        assert!(r.is_valid);
        assert_eq!(r.length, 1024);
        assert!(r.info.contains("CRC-32/IEEE"), "{}", r.info);
        assert!(r.info.contains("endianness=LE"), "{}", r.info);
    }

    #[test]
    fn crc16_ccitt_be_table_is_recognized() {
        let mut data = Vec::new();
        for entry in CRC16_CCITT_PREFIX {
            data.extend_from_slice(&entry.to_be_bytes());
        }
        data.resize(512, 0);
        let r = CrcParser.parse(&data, 0);
        assert!(r.is_valid);
        assert!(r.info.contains("CRC-16/CCITT"), "{}", r.info);
        assert!(r.info.contains("endianness=BE"), "{}", r.info);
    }

    #[test]
    fn crc8_table_is_recognized() {
        let mut data = CRC8_POLY07_PREFIX.to_vec();
        data.resize(256, 0);
        let r = CrcParser.parse(&data, 0);
        assert!(r.is_valid);
        assert_eq!(r.length, 256);
        assert!(r.info.contains("CRC-8"), "{}", r.info);
    }

    #[test]
    fn random_bytes_do_not_match() {
        let data = vec![0x37u8; 64];
        assert!(!CrcParser.matches(&data, 0));
    }
}
