//! Master Boot Record recognition. Only offset 0 is accepted: a `55 AA`
//! signature anywhere else in a firmware blob is almost never a real
//! MBR, and the partition table gives no way to tell.

use crate::bytes::read_le32;
use crate::parsers::Parser;
use crate::result::ScanResult;
use std::fmt::Write;

const SECTOR: usize = 512;
const PART_TABLE_OFF: usize = 446;

pub struct MbrParser;

fn partition_type_name(type_byte: u8) -> &'static str {
    match type_byte {
        0x05 => "Extended",
        0x07 => "NTFS/exFAT",
        0x0B => "FAT32",
        0x0C => "FAT32 LBA",
        0x0E => "FAT16 LBA",
        0x0F => "Extended LBA",
        0x82 => "Linux swap",
        0x83 => "Linux",
        0xA5 => "FreeBSD",
        0xA6 => "OpenBSD",
        0xAF => "MacOS X HFS",
        0xEE => "GPT protective",
        _ => "Unknown",
    }
}

impl Parser for MbrParser {
    fn name(&self) -> &'static str {
        "MBR"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        offset == 0
            && offset + SECTOR <= blob.len()
            && blob[offset + 510] == 0x55
            && blob[offset + 511] == 0xAA
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "MBR");
        r.extractor_type = "7Z".to_string();
        r.length = SECTOR;

        if offset + SECTOR > blob.len() {
            r.info = "Truncated MBR sector".to_string();
            r.length = blob.len() - offset;
            return r;
        }

        let mut info = String::from("DOS Master Boot Record");
        let mut found_partition = false;
        for i in 0..4 {
            let entry = offset + PART_TABLE_OFF + i * 16;
            let part_type = blob[entry + 4];
            let sectors = read_le32(blob, entry + 12);
            if part_type != 0 && sectors > 0 {
                found_partition = true;
                let image_size = u64::from(sectors) * 512;
                let _ = write!(
                    info,
                    ", partition: {}, image size: {image_size} bytes",
                    partition_type_name(part_type)
                );
                break;
            }
        }

        r.is_valid = found_partition;
        r.info = info;
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sector_with_partition(part_type: u8, sectors: u32) -> Vec<u8> {
        let mut data = vec![0u8; 512];
        data[446 + 4] = part_type;
        data[446 + 12..446 + 16].copy_from_slice(&sectors.to_le_bytes());
        data[510] = 0x55;
        data[511] = 0xAA;
        data
    }

    #[test]
    fn linux_partition_at_offset_zero() {
        let data = sector_with_partition(0x83, 2048);
        assert!(MbrParser.matches(&data, 0));
        let r = MbrParser.parse(&data, 0);
        assert!(r.is_valid);
        assert!(r.info.contains("Linux"), "{}", r.info);
        assert_eq!(r.length, 512);
    }

    #[test]
    fn nonzero_offset_never_matches() {
        let mut data = vec![0u8; 100];
        data.extend_from_slice(&sector_with_partition(0x83, 2048));
        assert!(!MbrParser.matches(&data, 100));
    }

    #[test]
    fn empty_partition_table_is_invalid() {
        let mut data = vec![0u8; 512];
        data[510] = 0x55;
        data[511] = 0xAA;
        let r = MbrParser.parse(&data, 0);
        assert!(!r.is_valid);
    }
}
