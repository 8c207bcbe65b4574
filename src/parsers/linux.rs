//! Linux kernel image recognition: x86 boot images (`!HdrS`), ARM64
//! boot images and ARM zImages whose magic sits *inside* the image (the
//! parser reports a start before the matched offset), and the
//! `Linux version ...` banner as a low-confidence fallback.

use crate::parsers::Parser;
use crate::result::ScanResult;

/// x86 real-mode setup code prologue common to bzImage kernels.
const BOOT_IMAGE_SIG: [u8; 16] = [
    0xB8, 0xC0, 0x07, 0x8E, 0xD8, 0xB8, 0x00, 0x90, 0x8E, 0xC0, 0xB9, 0x00, 0x01, 0x29, 0xF6,
    0x29,
];

/// ARM zImage magic appears 36 bytes into the image.
const ZIMAGE_MAGIC_OFFSET: usize = 36;
/// ARM64 "ARMd" magic appears at image offset 0x30, preceded by 8 zero
/// bytes of the reserved field.
const ARM64_MAGIC_OFFSET: usize = 0x30;

const BANNER: &[u8] = b"Linux version ";

pub struct LinuxKernelParser;

fn matches_boot_image(blob: &[u8], offset: usize) -> bool {
    if offset + BOOT_IMAGE_SIG.len() > blob.len() {
        return false;
    }
    if blob[offset..offset + BOOT_IMAGE_SIG.len()] != BOOT_IMAGE_SIG {
        return false;
    }
    // "!HdrS" sits 514 bytes after the prologue.
    let hdrs = offset + 514;
    hdrs + 5 <= blob.len() && &blob[hdrs..hdrs + 5] == b"!HdrS"
}

fn matches_arm64_boot(blob: &[u8], offset: usize) -> bool {
    let base = offset + ARM64_MAGIC_OFFSET;
    if base + 12 > blob.len() {
        return false;
    }
    blob[base..base + 8].iter().all(|&b| b == 0) && &blob[base + 8..base + 12] == b"ARMd"
}

fn matches_zimage(blob: &[u8], offset: usize) -> bool {
    if offset + 4 > blob.len() {
        return false;
    }
    let p = &blob[offset..offset + 4];
    p == [0x18, 0x28, 0x6F, 0x01] || p == [0x01, 0x6F, 0x28, 0x18]
}

fn find_banner(blob: &[u8], offset: usize) -> Option<String> {
    let start = blob[offset..]
        .windows(BANNER.len())
        .position(|w| w == BANNER)?
        + offset;
    let end = blob[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|i| start + i + 1)
        .unwrap_or(blob.len());
    Some(blob[start..end].iter().map(|&b| b as char).collect())
}

/// Binwalk-style plausibility checks on the version banner.
fn banner_looks_valid(banner: &str) -> bool {
    const MIN_VERSION_STRING_LENGTH: usize = 75;
    if banner.len() <= MIN_VERSION_STRING_LENGTH {
        return false;
    }
    if !banner.contains("gcc ") || !banner.contains('@') {
        return false;
    }
    if !banner.ends_with('\n') {
        return false;
    }
    let bytes = banner.as_bytes();
    let base = BANNER.len() + 1;
    if banner.len() <= base + 18 {
        return false;
    }
    bytes[base] == b'.' && (bytes[base + 2] == b'.' || bytes[base + 3] == b'.')
}

/// A kallsyms-style number table ("\0 0 \0 1 ... \0 9 \0") appearing
/// exactly once marks an uncompressed vmlinux.
fn has_symbol_table(blob: &[u8]) -> bool {
    let mut pattern = Vec::with_capacity(21);
    for c in b'0'..=b'9' {
        pattern.push(0x00);
        pattern.push(c);
    }
    pattern.push(0x00);
    let matches = blob.windows(pattern.len()).filter(|w| *w == pattern).count();
    matches == 1
}

impl Parser for LinuxKernelParser {
    fn name(&self) -> &'static str {
        "LinuxKernel"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        if matches_boot_image(blob, offset) {
            return true;
        }
        if matches_arm64_boot(blob, offset) {
            return true;
        }
        if offset >= ZIMAGE_MAGIC_OFFSET && matches_zimage(blob, offset) {
            return true;
        }
        offset + BANNER.len() <= blob.len()
            && &blob[offset..offset + BANNER.len()] == BANNER
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "LinuxKernel");

        if matches_boot_image(blob, offset) {
            r.info = "Linux kernel boot image".to_string();
            r.length = blob.len() - offset;
            r.is_valid = true;
            return r;
        }

        if matches_arm64_boot(blob, offset) {
            r.info = "ARM64 boot image header detected".to_string();
            r.length = blob.len() - offset;
            r.is_valid = true;
            return r;
        }

        if offset >= ZIMAGE_MAGIC_OFFSET && matches_zimage(blob, offset) {
            // The true image start lies before the magic.
            r.offset = offset - ZIMAGE_MAGIC_OFFSET;
            r.extractor_type = "XZ".to_string();
            r.info = "ARM zImage header detected".to_string();
            r.length = blob.len() - r.offset;
            r.is_valid = true;
            return r;
        }

        if let Some(banner) = find_banner(blob, offset) {
            let valid = banner_looks_valid(&banner);
            let symtab = has_symbol_table(blob);
            let trimmed = banner.trim_end_matches('\n');
            if symtab {
                // A symbol table means the whole blob is a vmlinux.
                r.offset = 0;
                r.length = blob.len();
                r.info = format!("{trimmed}, has symbol table: true");
            } else {
                r.length = banner.len();
                r.info = format!("{trimmed}, has symbol table: false");
            }
            r.confident = false;
            r.is_valid = valid;
            return r;
        }

        r.info = "No kernel signature at offset".to_string();
        r.length = blob.len() - offset;
        r.is_valid = false;
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zimage_magic_adjusts_start_backward() {
        let mut data = vec![0u8; 4096];
        data[36..40].copy_from_slice(&[0x18, 0x28, 0x6F, 0x01]);
        assert!(LinuxKernelParser.matches(&data, 36));
        let r = LinuxKernelParser.parse(&data, 36);
        assert!(r.is_valid);
        assert_eq!(r.offset, 0);
        assert_eq!(r.length, 4096);
        assert_eq!(r.extractor_type, "XZ");
    }

    #[test]
    fn arm64_boot_image_is_recognized() {
        let mut data = vec![0xCCu8; 4096];
        data[0x30..0x38].copy_from_slice(&[0u8; 8]);
        data[0x38..0x3C].copy_from_slice(b"ARMd");
        assert!(LinuxKernelParser.matches(&data, 0));
        let r = LinuxKernelParser.parse(&data, 0);
        assert!(r.is_valid);
    }

    #[test]
    fn plausible_banner_is_low_confidence() {
        let banner = "Linux version 5.10.17 (builder@host) (gcc (GCC) 10.2.0, GNU ld (GNU Binutils) 2.35) #1 SMP Mon Feb 1 00:00:00 UTC 2021\n";
        let mut data = vec![0u8; 64];
        data.extend_from_slice(banner.as_bytes());
        data.extend_from_slice(&[0u8; 64]);
        let r = LinuxKernelParser.parse(&data, 64);
        assert!(r.is_valid, "{}", r.info);
        assert!(!r.confident);
        assert_eq!(r.length, banner.len());
    }

    #[test]
    fn short_banner_is_invalid() {
        let mut data = b"Linux version 5.1\n".to_vec();
        data.resize(64, 0);
        let r = LinuxKernelParser.parse(&data, 0);
        assert!(!r.is_valid);
    }
}
