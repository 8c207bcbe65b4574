//! Raw LZMA ("alone" format) recognition: a 13-byte header with a known
//! properties byte and a dictionary size from the fixed table of sizes
//! seen in the wild.

use crate::bytes::{read_le32, read_le64};
use crate::common::MAX_ANALYZED_FILE_SIZE;
use crate::parsers::Parser;
use crate::result::ScanResult;
use std::fmt::Write;

const SUPPORTED_PROPS: [u8; 4] = [0x5D, 0x6E, 0x6D, 0x6C];
const SUPPORTED_DICTS: [u32; 10] = [
    0x0100_0000, 0x0200_0000, 0x0400_0000, 0x0080_0000, 0x0040_0000, 0x0020_0000, 0x0010_0000,
    0x0008_0000, 0x0002_0000, 0x0001_0000,
];

pub struct LzmaParser;

impl Parser for LzmaParser {
    fn name(&self) -> &'static str {
        "LZMA"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        if offset + 13 > blob.len() {
            return false;
        }
        let props = blob[offset];
        let dict = read_le32(blob, offset + 1);
        SUPPORTED_PROPS.contains(&props) && SUPPORTED_DICTS.contains(&dict)
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "LZMA");
        r.extractor_type = "LZMA".to_string();

        if offset + 13 > blob.len() {
            r.info = "Invalid header".to_string();
            return r;
        }

        let props = blob[offset];
        let dict = read_le32(blob, offset + 1);
        let uncompressed = read_le64(blob, offset + 5);

        let mut info = String::new();
        let _ = write!(info, "LZMA compressed data, props=0x{props:02x}, dict={dict}");
        if uncompressed != u64::MAX {
            let _ = write!(info, ", uncompressed={uncompressed}");
        } else {
            info.push_str(", uncompressed=unknown");
        }

        r.info = info;
        // Best guess: the stream runs to the end of the blob.
        r.length = blob.len() - offset;
        r.is_valid = uncompressed == u64::MAX || uncompressed <= MAX_ANALYZED_FILE_SIZE;
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(props: u8, dict: u32, uncompressed: u64) -> Vec<u8> {
        let mut out = vec![props];
        out.extend_from_slice(&dict.to_le_bytes());
        out.extend_from_slice(&uncompressed.to_le_bytes());
        out.push(0x00);
        out
    }

    #[test]
    fn known_props_and_dict_match() {
        let data = header(0x5D, 0x0080_0000, 4096);
        assert!(LzmaParser.matches(&data, 0));
        let r = LzmaParser.parse(&data, 0);
        assert!(r.is_valid);
        assert!(r.info.contains("props=0x5d"), "{}", r.info);
    }

    #[test]
    fn unknown_dict_size_is_rejected() {
        let data = header(0x5D, 0x0012_3456, 4096);
        assert!(!LzmaParser.matches(&data, 0));
    }

    #[test]
    fn unknown_props_byte_is_rejected() {
        let data = header(0x42, 0x0080_0000, 4096);
        assert!(!LzmaParser.matches(&data, 0));
    }

    #[test]
    fn absurd_uncompressed_size_is_invalid() {
        let data = header(0x5D, 0x0080_0000, u64::MAX - 1);
        let r = LzmaParser.parse(&data, 0);
        assert!(!r.is_valid);
    }
}
