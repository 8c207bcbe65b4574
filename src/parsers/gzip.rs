//! GZIP member recognition with full trailer validation.
//!
//! The deflate body is inflated in-process while tracking how many
//! input bytes the stream consumes; the 8-byte trailer that follows is
//! then checked against the recomputed CRC-32 and ISIZE.

use crate::bytes::{crc32_ieee, read_le16, read_le32};
use crate::parsers::Parser;
use crate::result::ScanResult;
use flate2::{Decompress, FlushDecompress, Status};
use std::fmt::Write;

const GZIP_ID1: u8 = 0x1F;
const GZIP_ID2: u8 = 0x8B;
const GZIP_CM_DEFLATE: u8 = 0x08;

const FHCRC: u8 = 0x02;
const FEXTRA: u8 = 0x04;
const FNAME: u8 = 0x08;
const FCOMMENT: u8 = 0x10;

pub struct GzipParser;

impl Parser for GzipParser {
    fn name(&self) -> &'static str {
        "GZIP"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        offset + 3 <= blob.len()
            && blob[offset] == GZIP_ID1
            && blob[offset + 1] == GZIP_ID2
            && blob[offset + 2] == GZIP_CM_DEFLATE
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "GZIP");
        r.extractor_type = "GZIP".to_string();

        if offset + 10 > blob.len() {
            r.length = blob.len() - offset;
            r.info = "Truncated GZIP header".to_string();
            return r;
        }

        let flags = blob[offset + 3];
        let mtime = read_le32(blob, offset + 4);
        let xfl = blob[offset + 8];
        let os = blob[offset + 9];

        let mut info = String::new();
        let _ = write!(
            info,
            "GZIP stream, compression method={}, flags=0x{flags:x}, mtime={mtime}, extra flags={xfl}, OS={os}",
            blob[offset + 2]
        );

        let mut cursor = offset + 10;
        if flags & FEXTRA != 0 {
            if cursor + 2 > blob.len() {
                r.length = blob.len() - offset;
                r.info = "Truncated GZIP extra field".to_string();
                return r;
            }
            let xlen = read_le16(blob, cursor) as usize;
            cursor += 2 + xlen;
            let _ = write!(info, ", extra field length={xlen}");
        }
        if flags & FNAME != 0 {
            let start = cursor;
            while cursor < blob.len() && blob[cursor] != 0 {
                cursor += 1;
            }
            if cursor > start {
                let name: String = blob[start..cursor]
                    .iter()
                    .map(|&b| b as char)
                    .collect();
                let _ = write!(info, ", original filename=\"{name}\"");
            }
            cursor += 1;
        }
        if flags & FCOMMENT != 0 {
            let start = cursor;
            while cursor < blob.len() && blob[cursor] != 0 {
                cursor += 1;
            }
            if cursor > start {
                let comment: String = blob[start..cursor]
                    .iter()
                    .map(|&b| b as char)
                    .collect();
                let _ = write!(info, ", comment=\"{comment}\"");
            }
            cursor += 1;
        }
        if flags & FHCRC != 0 {
            cursor += 2;
        }

        if cursor + 8 > blob.len() {
            r.length = blob.len() - offset;
            r.info = "Invalid GZIP: too short".to_string();
            return r;
        }

        // Inflate the raw deflate body, tracking consumed input and the
        // CRC/size of the output.
        let body = &blob[cursor..];
        let mut inflater = Decompress::new(false);
        let mut out = vec![0u8; 16384];
        let mut crc_calc: u32 = 0;
        let mut isize_calc: u32 = 0;
        loop {
            let consumed_in = inflater.total_in() as usize;
            let before_out = inflater.total_out();
            let status = match inflater.decompress(
                &body[consumed_in..],
                &mut out,
                FlushDecompress::None,
            ) {
                Ok(s) => s,
                Err(_) => {
                    r.length = blob.len() - offset;
                    r.info = "Invalid GZIP: inflate failed".to_string();
                    return r;
                }
            };
            let produced = (inflater.total_out() - before_out) as usize;
            if produced > 0 {
                crc_calc = crc32_ieee(crc_calc, &out[..produced]);
                isize_calc = isize_calc.wrapping_add(produced as u32);
            }
            match status {
                Status::StreamEnd => break,
                Status::Ok => {}
                Status::BufError => {
                    r.length = blob.len() - offset;
                    r.info = "Invalid GZIP: truncated deflate stream".to_string();
                    return r;
                }
            }
        }

        let trailer_pos = cursor + inflater.total_in() as usize;
        if trailer_pos + 8 > blob.len() {
            r.length = blob.len() - offset;
            r.info = "Invalid GZIP: missing trailer".to_string();
            return r;
        }
        let crc_trailer = read_le32(blob, trailer_pos);
        let isize_trailer = read_le32(blob, trailer_pos + 4);

        let _ = write!(
            info,
            ", trailer CRC32=0x{crc_trailer:x}, ISIZE={isize_trailer}, recomputed CRC32=0x{crc_calc:x}, recomputed ISIZE={isize_calc}"
        );

        if crc_calc == crc_trailer && isize_calc == isize_trailer {
            info.push_str(" (validated)");
            r.is_valid = true;
        } else {
            info.push_str(" (validation failed)");
            r.is_valid = false;
        }

        r.length = trailer_pos + 8 - offset;
        r.info = info;
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write as IoWrite;

    fn gzip_bytes(payload: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(payload).expect("compress");
        encoder.finish().expect("finish")
    }

    #[test]
    fn valid_member_is_validated() {
        let data = gzip_bytes(b"hello\n");
        let r = GzipParser.parse(&data, 0);
        assert!(r.is_valid);
        assert_eq!(r.length, data.len());
        assert!(r.info.contains("(validated)"), "{}", r.info);
    }

    #[test]
    fn corrupt_trailer_crc_fails_validation() {
        let mut data = gzip_bytes(b"hello\n");
        let crc_pos = data.len() - 8;
        data[crc_pos] ^= 0xFF;
        let r = GzipParser.parse(&data, 0);
        assert!(!r.is_valid);
        assert!(r.info.contains("(validation failed)"), "{}", r.info);
    }

    #[test]
    fn length_stops_after_trailer() {
        let mut data = gzip_bytes(b"payload");
        let member_len = data.len();
        data.extend_from_slice(b"TRAILING GARBAGE");
        let r = GzipParser.parse(&data, 0);
        assert!(r.is_valid);
        assert_eq!(r.length, member_len);
    }

    #[test]
    fn truncated_header_is_invalid() {
        let r = GzipParser.parse(&[0x1F, 0x8B, 0x08, 0x00], 0);
        assert!(!r.is_valid);
    }
}
