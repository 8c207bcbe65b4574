//! JPEG recognition: SOI followed by an APP0/APP1/DQT segment, then a
//! marker walk honoring restart markers, fill bytes, and the SOF0-SOF3
//! frame headers for dimensions, ending at EOI.

use crate::parsers::Parser;
use crate::result::ScanResult;
use std::fmt::Write;

pub struct JpgParser;

impl Parser for JpgParser {
    fn name(&self) -> &'static str {
        "JPG"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        offset + 4 <= blob.len()
            && blob[offset] == 0xFF
            && blob[offset + 1] == 0xD8
            && blob[offset + 2] == 0xFF
            && matches!(blob[offset + 3], 0xE0 | 0xE1 | 0xDB)
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "JPG");
        r.extractor_type = "RAW".to_string();

        let mut width = 0usize;
        let mut height = 0usize;
        let mut found_end = false;
        let mut found_sof = false;
        let mut length = 0usize;

        let mut i = offset + 2;
        while i + 1 < blob.len() {
            if blob[i] != 0xFF {
                i += 1;
                continue;
            }
            let marker = blob[i + 1];

            if marker == 0xD9 {
                length = i + 2 - offset;
                found_end = true;
                break;
            }
            // Fill bytes before a marker.
            if marker == 0xFF {
                i += 1;
                continue;
            }
            // Restart markers carry no length field.
            if (0xD0..=0xD7).contains(&marker) {
                i += 2;
                continue;
            }

            if i + 4 > blob.len() {
                break;
            }
            let segment_length = ((blob[i + 2] as usize) << 8) | blob[i + 3] as usize;
            if segment_length < 2 || i + 2 + segment_length > blob.len() {
                break;
            }

            if !found_sof && (0xC0..=0xC3).contains(&marker) {
                if segment_length < 7 {
                    break;
                }
                height = ((blob[i + 5] as usize) << 8) | blob[i + 6] as usize;
                width = ((blob[i + 7] as usize) << 8) | blob[i + 8] as usize;
                found_sof = true;
            }

            i += 2 + segment_length;
        }

        if !found_end {
            length = blob.len() - offset;
        }

        let mut info = String::new();
        let _ = write!(info, "Resolution: {width}x{height}");
        r.info = info;
        r.length = length;
        r.is_valid = true;
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_jpeg() -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8];
        // APP0 segment
        data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
        data.extend_from_slice(b"JFIF\0");
        data.extend_from_slice(&[0u8; 9]);
        // SOF0: length 17, precision 8, height 2, width 3, 3 components
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x02, 0x00, 0x03]);
        data.extend_from_slice(&[3, 1, 0x11, 0, 2, 0x11, 1, 3, 0x11, 1]);
        // entropy-coded noise
        data.extend_from_slice(&[0x12, 0x34, 0x56]);
        data.extend_from_slice(&[0xFF, 0xD9]);
        data
    }

    #[test]
    fn dimensions_come_from_sof0() {
        let data = tiny_jpeg();
        assert!(JpgParser.matches(&data, 0));
        let r = JpgParser.parse(&data, 0);
        assert!(r.is_valid);
        assert_eq!(r.length, data.len());
        assert!(r.info.contains("Resolution: 3x2"), "{}", r.info);
    }

    #[test]
    fn missing_eoi_runs_to_blob_end() {
        let data = tiny_jpeg();
        let r = JpgParser.parse(&data[..data.len() - 2], 0);
        assert!(r.is_valid);
        assert_eq!(r.length, data.len() - 2);
    }
}
