//! RAR archive recognition: 7-byte RAR4 or 8-byte RAR5 signature, then
//! a walk over the little-endian block headers.

use crate::bytes::read_le16;
use crate::parsers::Parser;
use crate::result::ScanResult;
use std::fmt::Write;

const RAR4_SIG: [u8; 7] = [0x52, 0x61, 0x72, 0x21, 0x1A, 0x07, 0x00];
const RAR5_SIG: [u8; 8] = [0x52, 0x61, 0x72, 0x21, 0x1A, 0x07, 0x01, 0x00];

/// RAR4 end-of-archive block type.
const RAR4_END_BLOCK: u8 = 0x7B;

pub struct RarParser;

fn is_rar5(blob: &[u8], offset: usize) -> bool {
    offset + 8 <= blob.len() && blob[offset..offset + 8] == RAR5_SIG
}

fn is_rar4(blob: &[u8], offset: usize) -> bool {
    offset + 7 <= blob.len() && blob[offset..offset + 7] == RAR4_SIG
}

impl Parser for RarParser {
    fn name(&self) -> &'static str {
        "RAR"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        is_rar4(blob, offset) || is_rar5(blob, offset)
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "RAR");
        r.extractor_type = "7Z".to_string();

        if offset + 7 > blob.len() {
            r.info = "Truncated RAR header".to_string();
            r.length = blob.len() - offset;
            return r;
        }

        let rar5 = is_rar5(blob, offset);
        let mut cursor = offset + if rar5 { 8 } else { 7 };
        let mut block_count = 0usize;

        // Each block carries CRC16, type, flags, and its own size.
        while cursor + 7 <= blob.len() {
            let block_type = blob[cursor + 2];
            let size = read_le16(blob, cursor + 5) as usize;

            if size < 7 || cursor + size > blob.len() {
                break;
            }
            block_count += 1;
            cursor += size;

            if !rar5 && block_type == RAR4_END_BLOCK {
                break;
            }
        }

        let available = blob.len() - offset;
        r.length = (cursor - offset).min(available);
        r.is_valid = block_count > 0;

        let mut info = String::new();
        let _ = write!(
            info,
            "RAR archive, format={}, blocks={block_count}",
            if rar5 { "RAR5" } else { "RAR4" }
        );
        r.info = info;
        r
    }
}
