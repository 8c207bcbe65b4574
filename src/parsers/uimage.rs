//! U-Boot legacy image recognition: 64-byte big-endian header with
//! OS/arch/type/compression enums and a 32-byte image name. Unknown
//! compression enums are rejected outright.

use crate::bytes::{format_timestamp, read_be32, read_cstring};
use crate::parsers::Parser;
use crate::result::ScanResult;
use std::fmt::Write;

const UIMAGE_MAGIC: u32 = 0x2705_1956;
const HEADER_SIZE: usize = 64;

pub struct UimageParser;

fn os_name(os: u8) -> &'static str {
    match os {
        0 => "Invalid",
        1 => "OpenBSD",
        2 => "NetBSD",
        3 => "FreeBSD",
        4 => "4.4BSD",
        5 => "Linux",
        6 => "SVR4",
        7 => "Esix",
        8 => "Solaris",
        9 => "Irix",
        10 => "SCO",
        11 => "Dell",
        12 => "NCR",
        13 => "LynxOS",
        14 => "VxWorks",
        15 => "psos",
        16 => "QNX",
        17 => "U-Boot",
        18 => "RTEMS",
        19 => "OSE",
        20 => "Plan 9",
        21 => "Inferno",
        22 => "Linux Kernel",
        _ => "Unknown",
    }
}

fn arch_name(arch: u8) -> &'static str {
    match arch {
        0 => "Invalid",
        1 => "Alpha",
        2 => "ARM",
        3 => "AVR32",
        4 => "Blackfin",
        5 => "x86",
        6 => "IA64",
        7 => "MIPS",
        8 => "NDS32",
        9 => "Nios-II",
        10 => "PowerPC",
        11 => "RISC-V",
        12 => "S390",
        13 => "SH",
        14 => "SPARC",
        15 => "x86_64",
        _ => "Unknown",
    }
}

fn image_type_name(image_type: u8) -> &'static str {
    match image_type {
        1 => "Standalone",
        2 => "Kernel",
        3 => "RAMDisk",
        4 => "Multi",
        5 => "Firmware",
        6 => "Script",
        7 => "Filesystem",
        8 => "Flat Device Tree",
        9 => "Kernel with FDT",
        _ => "Unknown",
    }
}

fn compression_name(comp: u8) -> &'static str {
    match comp {
        0 => "None",
        1 => "gzip",
        2 => "bzip2",
        3 => "lzma",
        4 => "lz4",
        5 => "zstd",
        _ => "Unknown",
    }
}

impl Parser for UimageParser {
    fn name(&self) -> &'static str {
        "UIMAGE"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        offset + 4 <= blob.len() && read_be32(blob, offset) == UIMAGE_MAGIC
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "UIMAGE");
        r.extractor_type = "UIMAGE".to_string();

        if offset + HEADER_SIZE > blob.len() {
            r.info = "Invalid Header".to_string();
            return r;
        }

        let timestamp = read_be32(blob, offset + 8);
        let size = read_be32(blob, offset + 12) as usize;
        let os = blob[offset + 28];
        let arch = blob[offset + 29];
        let image_type = blob[offset + 30];
        let compression = blob[offset + 31];

        if compression_name(compression) == "Unknown" {
            return r;
        }

        let mut image_name = read_cstring(blob, offset + 32, 32);
        if image_name.is_empty() {
            image_name = "uimage_payload".to_string();
        }

        let mut info = String::new();
        let _ = write!(
            info,
            "UImage: {image_name}, timestamp={}, OS={}, CPU={}, Type={}, Compression={}",
            format_timestamp(timestamp),
            os_name(os),
            arch_name(arch),
            image_type_name(image_type),
            compression_name(compression)
        );

        r.info = info;
        r.length = size.min(blob.len() - offset);
        r.is_valid = true;
        r
    }
}
