//! SquashFS superblock recognition with endianness autodetection from
//! the `sqsh`/`hsqs` magic spelling.

use crate::bytes::{read_be32, read_le32};
use crate::parsers::Parser;
use crate::result::ScanResult;
use std::fmt::Write;

const SUPERBLOCK_MIN: usize = 96;

pub struct SquashfsParser;

impl Parser for SquashfsParser {
    fn name(&self) -> &'static str {
        "SquashFS"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        if offset + 4 > blob.len() {
            return false;
        }
        let magic = &blob[offset..offset + 4];
        magic == b"sqsh" || magic == b"hsqs"
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "SquashFS");
        r.extractor_type = "SquashFS".to_string();

        if offset + SUPERBLOCK_MIN > blob.len() {
            r.info = "Truncated SquashFS superblock".to_string();
            r.length = blob.len() - offset;
            return r;
        }

        // Probe little-endian first; fall back to big-endian when the
        // LE interpretation looks like byte-swapped garbage.
        let block_size_le = read_le32(blob, offset + 28);
        let version_major = u16::from(blob[offset + 32]);
        let version_minor = u16::from(blob[offset + 33]);
        let looks_le = version_major < 10 && block_size_le > 0 && block_size_le < (1 << 20);

        let (block_size, inode_count, fs_size, endian) = if looks_le {
            (
                block_size_le,
                read_le32(blob, offset + 36),
                read_le32(blob, offset + 40),
                "LE",
            )
        } else {
            (
                read_be32(blob, offset + 28),
                read_be32(blob, offset + 36),
                read_be32(blob, offset + 40),
                "BE",
            )
        };

        let available = blob.len() - offset;
        r.length = (fs_size as usize).min(available);
        r.is_valid = fs_size as usize >= SUPERBLOCK_MIN;

        let mut info = String::new();
        let _ = write!(
            info,
            "v{version_major}.{version_minor} ({endian}), Inodes: {inode_count}, Block: {block_size}"
        );
        r.info = info;
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn le_superblock_fields() {
        let mut data = vec![0u8; 256];
        data[..4].copy_from_slice(b"sqsh");
        data[28..32].copy_from_slice(&4096u32.to_le_bytes());
        data[32] = 4; // major
        data[33] = 0; // minor
        data[36..40].copy_from_slice(&7u32.to_le_bytes());
        data[40..44].copy_from_slice(&200u32.to_le_bytes());
        let r = SquashfsParser.parse(&data, 0);
        assert!(r.is_valid);
        assert_eq!(r.length, 200);
        assert!(r.info.contains("v4.0 (LE)"), "{}", r.info);
        assert!(r.info.contains("Inodes: 7"), "{}", r.info);
    }

    #[test]
    fn declared_size_is_clamped_to_blob() {
        let mut data = vec![0u8; 128];
        data[..4].copy_from_slice(b"sqsh");
        data[28..32].copy_from_slice(&4096u32.to_le_bytes());
        data[32] = 4;
        data[40..44].copy_from_slice(&100_000u32.to_le_bytes());
        let r = SquashfsParser.parse(&data, 0);
        assert_eq!(r.length, 128);
    }
}
