//! FAT boot-sector recognition: x86 jump, `FAT` label at one of the two
//! conventional positions, then BIOS Parameter Block plausibility and
//! FAT12/16/32 classification by cluster count.

use crate::bytes::{read_le16, read_le32};
use crate::parsers::Parser;
use crate::result::ScanResult;
use std::fmt::Write;

pub struct FatParser;

fn has_fat_label(blob: &[u8], offset: usize) -> bool {
    (offset + 57 <= blob.len() && &blob[offset + 54..offset + 57] == b"FAT")
        || (offset + 85 <= blob.len() && &blob[offset + 82..offset + 85] == b"FAT")
}

impl Parser for FatParser {
    fn name(&self) -> &'static str {
        "FAT"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        if offset + 64 > blob.len() {
            return false;
        }
        let b0 = blob[offset];
        let b2 = blob[offset + 2];
        let jump_ok = (b0 == 0xEB && b2 == 0x90) || b0 == 0xE9;
        jump_ok && has_fat_label(blob, offset)
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "FAT");
        r.extractor_type = "7Z".to_string();

        if offset + 64 > blob.len() {
            r.info = "Truncated FAT boot sector".to_string();
            r.length = blob.len() - offset;
            return r;
        }

        let bytes_per_sector = read_le16(blob, offset + 11);
        let sectors_per_cluster = blob[offset + 13];
        let reserved_sectors = read_le16(blob, offset + 14);
        let num_fats = blob[offset + 16];
        let root_entries = read_le16(blob, offset + 17);
        let total_sectors_16 = read_le16(blob, offset + 19);
        let media = blob[offset + 21];
        let sectors_per_fat_16 = read_le16(blob, offset + 22);
        let total_sectors_32 = read_le32(blob, offset + 32);

        let total_sectors = if total_sectors_16 != 0 {
            u32::from(total_sectors_16)
        } else {
            total_sectors_32
        };

        let sectors_per_fat_32 = if offset + 72 <= blob.len() {
            read_le32(blob, offset + 36)
        } else {
            0
        };
        let sectors_per_fat = if sectors_per_fat_16 != 0 {
            u32::from(sectors_per_fat_16)
        } else {
            sectors_per_fat_32
        };

        let bps_ok = matches!(bytes_per_sector, 512 | 1024 | 2048 | 4096);
        let spc_ok = sectors_per_cluster > 0
            && sectors_per_cluster <= 128
            && sectors_per_cluster.is_power_of_two();
        let fats_ok = (1..=4).contains(&num_fats);
        let media_ok = media == 0xF0 || media >= 0xF8;
        let totals_ok = total_sectors > 0;

        let image_size = u64::from(total_sectors) * u64::from(bytes_per_sector);
        let available = blob.len() - offset;
        let length = if image_size > 0 && image_size <= available as u64 {
            image_size as usize
        } else {
            available
        };

        // Classification mirrors mkfs.fat: cluster count decides the
        // variant, not the label string.
        let bps = u32::from(bytes_per_sector.max(1));
        let root_dir_sectors = (u32::from(root_entries) * 32 + bps - 1) / bps;
        let overhead =
            u32::from(reserved_sectors) + u32::from(num_fats) * sectors_per_fat + root_dir_sectors;
        let data_sectors = total_sectors.saturating_sub(overhead);
        let cluster_count = if sectors_per_cluster > 0 {
            data_sectors / u32::from(sectors_per_cluster)
        } else {
            0
        };
        let fat_type = if cluster_count < 4085 {
            "FAT12"
        } else if cluster_count < 65525 {
            "FAT16"
        } else {
            "FAT32"
        };

        r.length = length;
        r.is_valid = bps_ok && spc_ok && fats_ok && media_ok && totals_ok;

        let mut info = String::new();
        let _ = write!(
            info,
            "FAT filesystem ({fat_type}), bytes/sector={bytes_per_sector}, sectors/cluster={sectors_per_cluster}, reserved={reserved_sectors}, FATs={num_fats}, sectors/FAT={sectors_per_fat}, totalSectors={total_sectors}, size={image_size} bytes"
        );
        r.info = info;
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boot_sector(total_sectors: u16, spc: u8) -> Vec<u8> {
        let mut data = vec![0u8; 512 * usize::from(total_sectors)];
        data[0] = 0xEB;
        data[1] = 0x3C;
        data[2] = 0x90;
        data[11..13].copy_from_slice(&512u16.to_le_bytes());
        data[13] = spc;
        data[14..16].copy_from_slice(&1u16.to_le_bytes()); // reserved
        data[16] = 2; // FATs
        data[17..19].copy_from_slice(&224u16.to_le_bytes()); // root entries
        data[19..21].copy_from_slice(&total_sectors.to_le_bytes());
        data[21] = 0xF8;
        data[22..24].copy_from_slice(&9u16.to_le_bytes()); // sectors/FAT
        data[54..57].copy_from_slice(b"FAT");
        data[510] = 0x55;
        data[511] = 0xAA;
        data
    }

    #[test]
    fn small_volume_classifies_as_fat12() {
        let data = boot_sector(64, 1);
        assert!(FatParser.matches(&data, 0));
        let r = FatParser.parse(&data, 0);
        assert!(r.is_valid, "{}", r.info);
        assert!(r.info.contains("FAT12"), "{}", r.info);
        assert_eq!(r.length, 64 * 512);
    }

    #[test]
    fn non_power_of_two_cluster_size_is_invalid() {
        let data = boot_sector(64, 3);
        let r = FatParser.parse(&data, 0);
        assert!(!r.is_valid);
    }

    #[test]
    fn missing_label_does_not_match() {
        let mut data = boot_sector(64, 1);
        data[54..57].copy_from_slice(b"XXX");
        assert!(!FatParser.matches(&data, 0));
    }
}
