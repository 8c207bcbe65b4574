//! PNG recognition: full signature, IHDR with the mandatory 13-byte
//! payload, then a chunk walk validating every chunk's CRC-32 over
//! `type || data` until IEND.

use crate::bytes::{crc32_ieee, read_be32};
use crate::parsers::Parser;
use crate::result::ScanResult;
use std::fmt::Write;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];
const IHDR_LENGTH: usize = 13;

pub struct PngParser;

impl Parser for PngParser {
    fn name(&self) -> &'static str {
        "PNG"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        offset + 8 <= blob.len() && blob[offset..offset + 8] == PNG_SIGNATURE
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "PNG");

        let mut width = 0u32;
        let mut height = 0u32;
        let mut cursor = offset + 8;
        let mut first = true;

        loop {
            if cursor + 8 > blob.len() {
                r.length = blob.len() - offset;
                r.info = "Truncated PNG chunk header".to_string();
                return r;
            }
            let length = read_be32(blob, cursor) as usize;
            let chunk_type = &blob[cursor + 4..cursor + 8];

            let data_start = cursor + 8;
            let crc_start = match data_start.checked_add(length) {
                Some(v) => v,
                None => {
                    r.length = blob.len() - offset;
                    r.info = "Invalid PNG chunk length".to_string();
                    return r;
                }
            };
            if crc_start + 4 > blob.len() {
                r.length = blob.len() - offset;
                r.info = "Truncated PNG chunk".to_string();
                return r;
            }

            let crc_stored = read_be32(blob, crc_start);
            let crc_calc = crc32_ieee(0, &blob[cursor + 4..crc_start]);
            if crc_stored != crc_calc {
                r.length = crc_start + 4 - offset;
                r.info = format!(
                    "PNG chunk {} CRC mismatch",
                    chunk_type.iter().map(|&b| b as char).collect::<String>()
                );
                return r;
            }

            if first {
                if chunk_type != b"IHDR" || length != IHDR_LENGTH {
                    r.length = blob.len() - offset;
                    r.info = "PNG without leading IHDR".to_string();
                    return r;
                }
                width = read_be32(blob, data_start);
                height = read_be32(blob, data_start + 4);
                first = false;
            }

            cursor = crc_start + 4;

            if chunk_type == b"IEND" {
                r.length = cursor - offset;
                r.is_valid = true;
                let mut info = String::new();
                let _ = write!(info, "Resolution: {width}x{height}");
                r.info = info;
                return r;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(chunk_type: &[u8; 4], data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(chunk_type);
        out.extend_from_slice(data);
        let mut crc_input = chunk_type.to_vec();
        crc_input.extend_from_slice(data);
        out.extend_from_slice(&crc32_ieee(0, &crc_input).to_be_bytes());
        out
    }

    pub(crate) fn tiny_png(width: u32, height: u32) -> Vec<u8> {
        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&width.to_be_bytes());
        ihdr.extend_from_slice(&height.to_be_bytes());
        ihdr.extend_from_slice(&[8, 2, 0, 0, 0]); // 8-bit RGB
        let mut out = PNG_SIGNATURE.to_vec();
        out.extend_from_slice(&chunk(b"IHDR", &ihdr));
        out.extend_from_slice(&chunk(b"IDAT", b"\x78\x9c\x03\x00\x00\x00\x00\x01"));
        out.extend_from_slice(&chunk(b"IEND", b""));
        out
    }

    #[test]
    fn valid_png_reports_resolution() {
        let data = tiny_png(4, 4);
        assert!(PngParser.matches(&data, 0));
        let r = PngParser.parse(&data, 0);
        assert!(r.is_valid, "{}", r.info);
        assert_eq!(r.length, data.len());
        assert!(r.info.contains("Resolution: 4x4"), "{}", r.info);
    }

    #[test]
    fn chunk_crc_mismatch_is_rejected() {
        let mut data = tiny_png(4, 4);
        // Flip a bit inside the IDAT payload.
        let idat_payload = 8 + 25 + 8;
        data[idat_payload] ^= 0x01;
        let r = PngParser.parse(&data, 0);
        assert!(!r.is_valid);
        assert!(r.info.contains("CRC mismatch"), "{}", r.info);
    }

    #[test]
    fn missing_iend_is_rejected() {
        let data = tiny_png(4, 4);
        let r = PngParser.parse(&data[..data.len() - 6], 0);
        assert!(!r.is_valid);
    }

    #[test]
    fn signature_at_blob_tail_is_rejected() {
        let data = PNG_SIGNATURE.to_vec();
        let r = PngParser.parse(&data, 0);
        assert!(!r.is_valid);
    }
}
