//! GIF recognition: header and logical screen descriptor, then a
//! structural walk over color tables, image descriptors, extensions,
//! and their sub-block chains to the 0x3B trailer.

use crate::parsers::Parser;
use crate::result::ScanResult;
use std::fmt::Write;

pub struct GifParser;

/// Consume a sub-block chain. Returns the position one past the
/// terminator, or `None` on truncation.
fn skip_sub_blocks(blob: &[u8], mut cur: usize) -> Option<usize> {
    loop {
        if cur >= blob.len() {
            return None;
        }
        let size = blob[cur] as usize;
        cur += 1;
        if size == 0 {
            return Some(cur);
        }
        if cur + size > blob.len() {
            return None;
        }
        cur += size;
    }
}

impl Parser for GifParser {
    fn name(&self) -> &'static str {
        "GIF"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        offset + 6 <= blob.len()
            && &blob[offset..offset + 4] == b"GIF8"
            && (blob[offset + 4] == b'7' || blob[offset + 4] == b'9')
            && blob[offset + 5] == b'a'
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "GIF");
        r.extractor_type = "RAW".to_string();

        if offset + 10 > blob.len() {
            r.length = blob.len() - offset;
            r.info = "Truncated GIF header".to_string();
            return r;
        }

        let is_89a = blob[offset + 4] == b'9';
        let width = u16::from(blob[offset + 6]) | (u16::from(blob[offset + 7]) << 8);
        let height = u16::from(blob[offset + 8]) | (u16::from(blob[offset + 9]) << 8);

        let mut cursor = offset + 10;

        // Global Color Table directly follows the screen descriptor.
        let packed = blob[offset + 10 - 1];
        if packed & 0x80 != 0 {
            let entries = 1usize << ((packed & 0x07) + 1);
            let gct_bytes = entries * 3;
            if cursor + gct_bytes > blob.len() {
                r.length = blob.len() - offset;
                r.info = "Truncated Global Color Table".to_string();
                return r;
            }
            cursor += gct_bytes;
        }

        while cursor < blob.len() {
            let marker = blob[cursor];
            cursor += 1;

            match marker {
                0x3B => {
                    r.is_valid = true;
                    r.length = cursor - offset;
                    let mut info = String::new();
                    let _ = write!(
                        info,
                        "Version: GIF{}, Resolution: {width}x{height}",
                        if is_89a { "89a" } else { "87a" }
                    );
                    r.info = info;
                    return r;
                }
                0x2C => {
                    // Image descriptor: 9 fixed bytes, optional local
                    // color table, LZW code size, data sub-blocks.
                    if cursor + 9 > blob.len() {
                        r.length = blob.len() - offset;
                        r.info = "Truncated Image Descriptor".to_string();
                        return r;
                    }
                    let packed_img = blob[cursor + 8];
                    cursor += 9;

                    if packed_img & 0x80 != 0 {
                        let entries = 1usize << ((packed_img & 0x07) + 1);
                        let lct_bytes = entries * 3;
                        if cursor + lct_bytes > blob.len() {
                            r.length = blob.len() - offset;
                            r.info = "Truncated Local Color Table".to_string();
                            return r;
                        }
                        cursor += lct_bytes;
                    }

                    if cursor >= blob.len() {
                        r.length = blob.len() - offset;
                        r.info = "Missing LZW minimum code size".to_string();
                        return r;
                    }
                    cursor += 1;

                    match skip_sub_blocks(blob, cursor) {
                        Some(next) => cursor = next,
                        None => {
                            r.length = blob.len() - offset;
                            r.info = "Truncated image data sub-blocks".to_string();
                            return r;
                        }
                    }
                }
                0x21 => {
                    // Extension: label byte, then sub-blocks.
                    if cursor >= blob.len() {
                        r.length = blob.len() - offset;
                        r.info = "Truncated extension label".to_string();
                        return r;
                    }
                    cursor += 1;
                    match skip_sub_blocks(blob, cursor) {
                        Some(next) => cursor = next,
                        None => {
                            r.length = blob.len() - offset;
                            r.info = "Truncated extension sub-blocks".to_string();
                            return r;
                        }
                    }
                }
                other => {
                    r.length = cursor - offset;
                    r.info = format!("Invalid block marker 0x{other:x}");
                    return r;
                }
            }
        }

        r.length = blob.len() - offset;
        r.info = "Truncated: trailer not found".to_string();
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_gif() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(b"GIF89a");
        data.extend_from_slice(&2u16.to_le_bytes()); // width
        data.extend_from_slice(&2u16.to_le_bytes()); // height
        data.push(0x00); // no global color table
        data.push(0x00); // background
        data.push(0x00); // aspect
        // image descriptor
        data.push(0x2C);
        data.extend_from_slice(&[0, 0, 0, 0]); // left, top
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&2u16.to_le_bytes());
        data.push(0x00); // no local color table
        data.push(0x02); // LZW minimum code size
        data.push(2); // sub-block of 2 bytes
        data.extend_from_slice(&[0x4C, 0x01]);
        data.push(0x00); // terminator
        data.push(0x3B); // trailer
        data
    }

    #[test]
    fn wellformed_gif_walks_to_trailer() {
        let data = tiny_gif();
        assert!(GifParser.matches(&data, 0));
        let r = GifParser.parse(&data, 0);
        assert!(r.is_valid, "{}", r.info);
        assert_eq!(r.length, data.len());
        assert!(r.info.contains("GIF89a"), "{}", r.info);
        assert!(r.info.contains("Resolution: 2x2"), "{}", r.info);
    }

    #[test]
    fn missing_trailer_is_invalid() {
        let data = tiny_gif();
        let r = GifParser.parse(&data[..data.len() - 1], 0);
        assert!(!r.is_valid);
    }

    #[test]
    fn garbage_marker_is_invalid() {
        let mut data = tiny_gif();
        let len = data.len();
        data[len - 2] = 0xAA; // corrupt the sub-block terminator
        let r = GifParser.parse(&data, 0);
        assert!(!r.is_valid);
    }
}
