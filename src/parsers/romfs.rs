//! ROMFS recognition from the `-rom1fs-` signature and the big-endian
//! size/checksum words that follow it.

use crate::bytes::read_be32;
use crate::parsers::Parser;
use crate::result::ScanResult;
use std::fmt::Write;

pub struct RomfsParser;

impl Parser for RomfsParser {
    fn name(&self) -> &'static str {
        "ROMFS"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        offset + 8 <= blob.len() && &blob[offset..offset + 8] == b"-rom1fs-"
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "ROMFS");
        r.extractor_type = "ROMFS".to_string();

        if offset + 16 > blob.len() {
            r.info = "Truncated ROMFS superblock".to_string();
            r.length = blob.len() - offset;
            return r;
        }

        let fs_size = read_be32(blob, offset + 8) as usize;
        let checksum = read_be32(blob, offset + 12);

        let available = blob.len() - offset;
        r.length = fs_size.min(available);
        r.is_valid = fs_size > 0 && fs_size <= available;

        let mut info = String::new();
        let _ = write!(
            info,
            "ROMFS filesystem, size={fs_size} bytes, checksum=0x{checksum:x}"
        );
        r.info = info;
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_within_blob_is_valid() {
        let mut data = vec![0u8; 64];
        data[..8].copy_from_slice(b"-rom1fs-");
        data[8..12].copy_from_slice(&64u32.to_be_bytes());
        let r = RomfsParser.parse(&data, 0);
        assert!(r.is_valid);
        assert_eq!(r.length, 64);
    }

    #[test]
    fn size_beyond_blob_is_invalid() {
        let mut data = vec![0u8; 32];
        data[..8].copy_from_slice(b"-rom1fs-");
        data[8..12].copy_from_slice(&4096u32.to_be_bytes());
        let r = RomfsParser.parse(&data, 0);
        assert!(!r.is_valid);
        assert_eq!(r.length, 32);
    }
}
