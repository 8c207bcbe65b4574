//! Apple UDIF disk image recognition from the `koly` trailer. The
//! trailer sits at the *end* of the image, so the parser decides
//! whole-file vs embedded and reports a start offset that lies before
//! the offset it was asked about.

use crate::bytes::{read_be32, read_be64};
use crate::parsers::Parser;
use crate::result::ScanResult;
use std::fmt::Write;

const TRAILER_SIZE: usize = 512;
const UDIF_VERSION: u32 = 4;

pub struct DmgParser;

impl Parser for DmgParser {
    fn name(&self) -> &'static str {
        "DMG"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        if offset + 12 > blob.len() {
            return false;
        }
        &blob[offset..offset + 4] == b"koly"
            && read_be32(blob, offset + 4) == UDIF_VERSION
            && read_be32(blob, offset + 8) == TRAILER_SIZE as u32
    }

    fn parse(&self, blob: &[u8], trailer_offset: usize) -> ScanResult {
        let mut r = ScanResult::new(trailer_offset, "DMG");
        r.extractor_type = "7Z".to_string();
        r.info = "Invalid DMG".to_string();

        if trailer_offset + TRAILER_SIZE > blob.len() {
            return r;
        }
        if !self.matches(blob, trailer_offset) {
            return r;
        }

        let base = trailer_offset;
        let version = read_be32(blob, base + 0x04);
        let header_size = read_be32(blob, base + 0x08);
        let flags = read_be32(blob, base + 0x0C);
        let data_fork_offset = read_be64(blob, base + 0x18);
        let data_fork_length = read_be64(blob, base + 0x20);
        let rsrc_fork_offset = read_be64(blob, base + 0x28);
        let rsrc_fork_length = read_be64(blob, base + 0x30);
        let xml_offset = read_be64(blob, base + 0xD8);
        let xml_length = read_be64(blob, base + 0xE0);
        let image_variant = read_be32(blob, base + 0x1E8);
        let sector_count = read_be64(blob, base + 0x1EC);

        // A trailer that is exactly the last 512 bytes means the whole
        // blob is the DMG; otherwise estimate the embedded span from
        // the fork and XML ranges.
        let whole_file = trailer_offset + TRAILER_SIZE == blob.len();

        let (dmg_start, dmg_size) = if whole_file {
            (0u64, blob.len() as u64)
        } else {
            let mut max_end = 0u64;
            if data_fork_length > 0 {
                max_end = max_end.max(data_fork_offset.saturating_add(data_fork_length));
            }
            if rsrc_fork_length > 0 {
                max_end = max_end.max(rsrc_fork_offset.saturating_add(rsrc_fork_length));
            }
            if xml_length > 0 {
                max_end = max_end.max(xml_offset.saturating_add(xml_length));
            }
            if max_end == 0 {
                return r;
            }
            let dmg_size = max_end + TRAILER_SIZE as u64;
            let dmg_end = trailer_offset as u64 + TRAILER_SIZE as u64;
            if dmg_end < dmg_size {
                return r;
            }
            let dmg_start = dmg_end - dmg_size;
            if dmg_start + dmg_size > blob.len() as u64 {
                return r;
            }
            (dmg_start, dmg_size)
        };

        // Referenced ranges must lie inside the computed span.
        let dmg_end_abs = dmg_start + dmg_size;
        if data_fork_length > 0 {
            let start = dmg_start.saturating_add(data_fork_offset);
            if start < dmg_start || start.saturating_add(data_fork_length) > dmg_end_abs {
                return r;
            }
        }
        if rsrc_fork_length > 0 {
            let start = dmg_start.saturating_add(rsrc_fork_offset);
            if start < dmg_start || start.saturating_add(rsrc_fork_length) > dmg_end_abs {
                return r;
            }
        }

        r.offset = dmg_start as usize;
        r.length = dmg_size as usize;
        r.is_valid = true;

        let mut info = String::new();
        let _ = write!(
            info,
            "Apple UDIF disk image (DMG), version={version}, headerSize={header_size}, flags=0x{flags:x}, dataForkOffset={data_fork_offset}, dataForkLength={data_fork_length}, rsrcForkOffset={rsrc_fork_offset}, rsrcForkLength={rsrc_fork_length}, xmlOffset={xml_offset}, xmlLength={xml_length}, imageVariant={image_variant}, sectorCount={sector_count}, wholeFile={whole_file}"
        );
        r.info = info;
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trailer(data_fork_offset: u64, data_fork_length: u64, xml_offset: u64, xml_length: u64) -> Vec<u8> {
        let mut t = vec![0u8; TRAILER_SIZE];
        t[..4].copy_from_slice(b"koly");
        t[0x04..0x08].copy_from_slice(&UDIF_VERSION.to_be_bytes());
        t[0x08..0x0C].copy_from_slice(&(TRAILER_SIZE as u32).to_be_bytes());
        t[0x18..0x20].copy_from_slice(&data_fork_offset.to_be_bytes());
        t[0x20..0x28].copy_from_slice(&data_fork_length.to_be_bytes());
        t[0xD8..0xE0].copy_from_slice(&xml_offset.to_be_bytes());
        t[0xE0..0xE8].copy_from_slice(&xml_length.to_be_bytes());
        t
    }

    #[test]
    fn whole_file_dmg_spans_the_blob() {
        let mut data = vec![0u8; 1024];
        let t = trailer(0, 512, 512, 256);
        let trailer_at = data.len() - TRAILER_SIZE;
        data[trailer_at..].copy_from_slice(&t);
        assert!(DmgParser.matches(&data, trailer_at));
        let r = DmgParser.parse(&data, trailer_at);
        assert!(r.is_valid, "{}", r.info);
        assert_eq!(r.offset, 0);
        assert_eq!(r.length, 1024);
        assert!(r.info.contains("wholeFile=true"), "{}", r.info);
    }

    #[test]
    fn embedded_dmg_start_is_computed_backward() {
        // 256 bytes of prefix, then a DMG of 512 data + 512 trailer,
        // then 256 bytes of suffix.
        let mut data = vec![0u8; 256 + 512 + TRAILER_SIZE + 256];
        let t = trailer(0, 512, 0, 0);
        let trailer_at = 256 + 512;
        data[trailer_at..trailer_at + TRAILER_SIZE].copy_from_slice(&t);
        let r = DmgParser.parse(&data, trailer_at);
        assert!(r.is_valid, "{}", r.info);
        assert_eq!(r.offset, 256);
        assert_eq!(r.length, 512 + TRAILER_SIZE);
    }

    #[test]
    fn trailer_with_no_ranges_is_invalid_when_embedded() {
        let mut data = vec![0u8; 2048];
        let t = trailer(0, 0, 0, 0);
        data[512..1024].copy_from_slice(&t);
        let r = DmgParser.parse(&data, 512);
        assert!(!r.is_valid);
    }

    #[test]
    fn wrong_version_does_not_match(){
        let mut data = vec![0u8; 1024];
        let mut t = trailer(0, 512, 0, 0);
        t[0x04..0x08].copy_from_slice(&5u32.to_be_bytes());
        data[512..].copy_from_slice(&t);
        assert!(!DmgParser.matches(&data, 512));
    }
}
