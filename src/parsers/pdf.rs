//! PDF recognition: `%PDF-` header, then a forward scan for the last
//! `%%EOF` before the next document header, including any trailing
//! whitespace.

use crate::parsers::Parser;
use crate::result::ScanResult;

const PDF_MAGIC: &[u8] = b"%PDF-";
const EOF_MARKER: &[u8] = b"%%EOF";

pub struct PdfParser;

fn find_last_eof(blob: &[u8], offset: usize) -> usize {
    let mut last_eof = offset;
    let mut i = offset + PDF_MAGIC.len();

    while i + EOF_MARKER.len() < blob.len() {
        if blob[i..].starts_with(PDF_MAGIC) {
            break;
        }
        if blob[i..].starts_with(EOF_MARKER) {
            let mut end = i + EOF_MARKER.len();
            while end < blob.len() && matches!(blob[end], b'\n' | b'\r' | b' ' | b'\t') {
                end += 1;
            }
            last_eof = end;
        }
        i += 1;
    }
    last_eof
}

impl Parser for PdfParser {
    fn name(&self) -> &'static str {
        "PDF"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        offset + PDF_MAGIC.len() < blob.len() && blob[offset..].starts_with(PDF_MAGIC)
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "PDF");
        r.extractor_type = "RAW".to_string();

        let version = if offset + 8 < blob.len() {
            blob[offset + 5..offset + 8]
                .iter()
                .map(|&b| b as char)
                .collect()
        } else {
            "unknown".to_string()
        };

        let end = find_last_eof(blob, offset);
        r.length = if end > offset {
            end - offset
        } else {
            blob.len() - offset
        };
        r.is_valid = true;
        r.info = format!("Version: {version}");
        r
    }
}
