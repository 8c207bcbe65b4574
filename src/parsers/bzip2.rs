//! Bzip2 recognition by walking the bit-level block markers that happen
//! to sit byte-aligned at member boundaries: `31 41 59 26 53 59` opens
//! a block and `17 72 45 38 50 90` ends a member.

use crate::bytes::{read_be16, read_be32};
use crate::parsers::Parser;
use crate::result::ScanResult;
use std::fmt::Write;

const BLOCK_MAGIC_HI: u32 = 0x3141_5926;
const BLOCK_MAGIC_LO: u16 = 0x5359;
const END_MAGIC_HI: u32 = 0x1772_4538;
const END_MAGIC_LO: u16 = 0x5090;

pub struct Bzip2Parser;

fn is_member_header(blob: &[u8], offset: usize) -> bool {
    offset + 4 <= blob.len()
        && blob[offset] == b'B'
        && blob[offset + 1] == b'Z'
        && blob[offset + 2] == b'h'
        && blob[offset + 3].is_ascii_digit()
        && blob[offset + 3] != b'0'
}

fn find_next_marker(blob: &[u8], start: usize) -> usize {
    let mut i = start;
    while i + 6 <= blob.len() {
        let hi = read_be32(blob, i);
        let lo = read_be16(blob, i + 4);
        if (hi == BLOCK_MAGIC_HI && lo == BLOCK_MAGIC_LO)
            || (hi == END_MAGIC_HI && lo == END_MAGIC_LO)
        {
            return i;
        }
        i += 1;
    }
    blob.len()
}

impl Parser for Bzip2Parser {
    fn name(&self) -> &'static str {
        "Bzip2"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        is_member_header(blob, offset)
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "Bzip2");
        r.extractor_type = "7Z".to_string();

        if offset + 4 > blob.len() {
            r.info = "Truncated Bzip2 header".to_string();
            r.length = blob.len() - offset;
            return r;
        }

        let mut cursor = offset;
        let mut member_count = 0usize;
        let mut block_count_total = 0usize;
        let mut all_ended_properly = true;

        while is_member_header(blob, cursor) {
            cursor += 4;
            let mut block_count = 0usize;
            let mut end_found = false;

            while cursor + 6 <= blob.len() {
                let marker = read_be32(blob, cursor);
                let marker2 = read_be16(blob, cursor + 4);

                if marker == BLOCK_MAGIC_HI && marker2 == BLOCK_MAGIC_LO {
                    block_count += 1;
                    cursor += 6;
                    cursor = find_next_marker(blob, cursor);
                    if cursor == blob.len() {
                        break;
                    }
                } else if marker == END_MAGIC_HI && marker2 == END_MAGIC_LO {
                    end_found = true;
                    cursor += 6;
                    break;
                } else {
                    break;
                }
            }

            member_count += 1;
            block_count_total += block_count;
            if !end_found {
                all_ended_properly = false;
            }
        }

        let available = blob.len() - offset;
        r.length = (cursor - offset).min(available);
        r.is_valid = member_count > 0;

        let mut info = String::new();
        let _ = write!(
            info,
            "Bzip2 archive, members={member_count}, total blocks={block_count_total}"
        );
        info.push_str(if all_ended_properly {
            ", all end markers OK"
        } else {
            ", some members truncated/missing end marker"
        });
        r.info = info;
        r
    }
}
