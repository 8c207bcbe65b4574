//! CPIO (newc, magic `070701`) recognition: 13 ASCII-hex header fields,
//! 4-byte alignment for names and data, terminated by the `TRAILER!!!`
//! entry.

use crate::parsers::Parser;
use crate::result::ScanResult;

const HEADER_SIZE: usize = 110;
const MAGIC: &[u8; 6] = b"070701";

pub struct CpioParser;

fn is_cpio_magic(blob: &[u8], offset: usize) -> bool {
    offset + 6 <= blob.len() && &blob[offset..offset + 6] == MAGIC
}

/// One 8-character ASCII-hex field. `None` when any character is not a
/// hex digit.
fn hex_field(blob: &[u8], offset: usize) -> Option<usize> {
    let mut value = 0usize;
    for &b in &blob[offset..offset + 8] {
        let digit = (b as char).to_digit(16)?;
        value = value * 16 + digit as usize;
    }
    Some(value)
}

fn align4(n: usize) -> usize {
    (n + 3) & !3
}

impl Parser for CpioParser {
    fn name(&self) -> &'static str {
        "CPIO"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        is_cpio_magic(blob, offset)
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "CPIO");
        r.extractor_type = "CPIO".to_string();
        r.info = "CPIO archive".to_string();

        let mut pos = offset;
        while pos + HEADER_SIZE < blob.len() {
            if !is_cpio_magic(blob, pos) {
                break;
            }

            let name_end = (pos + HEADER_SIZE + 10).min(blob.len());
            if blob[pos + HEADER_SIZE..name_end].starts_with(b"TRAILER!!!") {
                r.length = align4(pos + HEADER_SIZE + 10 - offset).min(blob.len() - offset);
                r.is_valid = true;
                return r;
            }

            let (Some(namesize), Some(filesize)) =
                (hex_field(blob, pos + 94), hex_field(blob, pos + 54))
            else {
                r.info.push_str(", malformed or truncated");
                return r;
            };

            let header_end = pos + HEADER_SIZE;
            let name_end = align4(header_end + namesize);
            let file_end = align4(name_end + filesize);
            if file_end > blob.len() {
                break;
            }
            pos = file_end;
        }

        r.info.push_str(", malformed or truncated");
        r
    }
}
