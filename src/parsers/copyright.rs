//! Copyright-string recognition: the literal word (any case) followed
//! by printable ASCII, captured up to a NUL, newline, or 100 bytes.

use crate::parsers::Parser;
use crate::result::ScanResult;

const KEYWORD: &[u8] = b"copyright";
const MAX_TEXT: usize = 100;

pub struct CopyrightParser;

impl Parser for CopyrightParser {
    fn name(&self) -> &'static str {
        "COPYRIGHT"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        offset + KEYWORD.len() <= blob.len()
            && blob[offset..offset + KEYWORD.len()]
                .iter()
                .zip(KEYWORD)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "COPYRIGHT");

        let mut text = String::new();
        let mut i = offset;
        while i < blob.len() && text.len() < MAX_TEXT {
            let c = blob[i];
            if c == 0x00 || c == b'\n' || c == b'\r' {
                break;
            }
            if !(0x20..=0x7E).contains(&c) {
                break;
            }
            text.push(c as char);
            i += 1;
        }

        // The keyword alone carries no information.
        if text.len() > KEYWORD.len() + 1 {
            r.is_valid = true;
            r.length = text.len();
            r.info = text;
        } else {
            r.length = text.len();
            r.info = "Short or invalid copyright string".to_string();
        }
        r
    }
}
