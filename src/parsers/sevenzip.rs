//! 7-Zip archive recognition from the fixed start header: signature,
//! version, and the next-header offset/size pair that determines the
//! archive length.

use crate::bytes::{read_le16, read_le32, read_le64};
use crate::parsers::Parser;
use crate::result::ScanResult;
use std::fmt::Write;

const SEVENZIP_MAGIC: [u8; 6] = [0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C];

pub struct SevenZipParser;

impl Parser for SevenZipParser {
    fn name(&self) -> &'static str {
        "7Z"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        offset + 6 <= blob.len() && blob[offset..offset + 6] == SEVENZIP_MAGIC
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "7Z");
        r.extractor_type = "7Z".to_string();

        if offset + 32 > blob.len() {
            r.info = "Truncated 7-Zip header".to_string();
            r.length = blob.len() - offset;
            return r;
        }

        let version = read_le16(blob, offset + 6);
        let start_header_crc = read_le32(blob, offset + 8);
        let next_header_offset = read_le64(blob, offset + 12);
        let next_header_size = read_le64(blob, offset + 20);
        let next_header_crc = read_le32(blob, offset + 28);

        let plausible = version > 0 && next_header_size < blob.len() as u64;

        let end = (offset as u64)
            .saturating_add(32)
            .saturating_add(next_header_offset)
            .saturating_add(next_header_size)
            .min(blob.len() as u64);
        r.length = end as usize - offset;
        r.is_valid = plausible;

        let mut info = String::new();
        let _ = write!(
            info,
            "7-Zip archive, version={}.{}, nextHeaderSize={next_header_size}, offset={next_header_offset}, CRCs: start=0x{start_header_crc:x}, next=0x{next_header_crc:x}",
            (version >> 8) & 0xFF,
            version & 0xFF
        );
        r.info = info;
        r
    }
}
