//! Flattened device tree recognition: FDT header followed by a full
//! walk of the structure block, which must be well-formed token soup up
//! to FDT_END.

use crate::bytes::read_be32;
use crate::common::dtb::{
    parse_header, FDT_BEGIN_NODE, FDT_END, FDT_END_NODE, FDT_HEADER_SIZE, FDT_MAGIC, FDT_NOP,
    FDT_PROP,
};
use crate::parsers::Parser;
use crate::result::ScanResult;

pub struct DtbParser;

impl Parser for DtbParser {
    fn name(&self) -> &'static str {
        "DTB"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        offset + FDT_HEADER_SIZE <= blob.len() && read_be32(blob, offset) == FDT_MAGIC
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "DTB");
        r.extractor_type = "DTB".to_string();
        r.info = "Device Tree Blob".to_string();

        if !self.matches(blob, offset) {
            r.info = "Invalid DTB magic".to_string();
            return r;
        }

        let header = parse_header(blob, offset);
        r.length = (header.totalsize as usize).min(blob.len() - offset);

        let mut pos = offset + header.off_dt_struct as usize;
        let end = pos.saturating_add(header.size_dt_struct as usize);

        while pos + 4 <= blob.len() && pos < end {
            let token = read_be32(blob, pos);
            pos += 4;
            match token {
                FDT_BEGIN_NODE => {
                    // NUL-terminated node name, padded to 4 bytes.
                    while pos < blob.len() && blob[pos] != 0 {
                        pos += 1;
                    }
                    pos += 1;
                    pos = (pos + 3) & !3;
                }
                FDT_END_NODE | FDT_NOP => {}
                FDT_PROP => {
                    if pos + 8 > blob.len() {
                        break;
                    }
                    let len = read_be32(blob, pos) as usize;
                    pos += 8;
                    pos = pos.saturating_add(len);
                    pos = (pos + 3) & !3;
                }
                FDT_END => {
                    r.is_valid = true;
                    return r;
                }
                _ => {
                    r.info = "Unknown token in DTB structure".to_string();
                    return r;
                }
            }
        }

        r.info = "DTB structure incomplete".to_string();
        r
    }
}
