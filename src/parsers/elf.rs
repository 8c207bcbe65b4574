//! ELF recognition. The reported length is the maximum extent of the
//! header, the program/section header tables, and every segment and
//! section, honoring the extended count encodings (PN_XNUM and
//! `e_shnum == 0`).

use crate::bytes::{read_be16, read_be32, read_be64, read_le16, read_le32, read_le64};
use crate::parsers::Parser;
use crate::result::ScanResult;

const EI_CLASS: usize = 4;
const EI_DATA: usize = 5;
const EI_NIDENT: usize = 16;
const ELFCLASS32: u8 = 1;
const ELFCLASS64: u8 = 2;
const ELFDATA2MSB: u8 = 2;
const PN_XNUM: u16 = 0xFFFF;

const EHDR32_SIZE: usize = 52;
const EHDR64_SIZE: usize = 64;
const SHDR32_SIZE: usize = 40;
const SHDR64_SIZE: usize = 64;

pub struct ElfParser;

struct Readers {
    u16: fn(&[u8], usize) -> u16,
    u32: fn(&[u8], usize) -> u32,
    u64: fn(&[u8], usize) -> u64,
}

const LE: Readers = Readers {
    u16: read_le16,
    u32: read_le32,
    u64: read_le64,
};
const BE: Readers = Readers {
    u16: read_be16,
    u32: read_be32,
    u64: read_be64,
};

/// Compute the maximum file extent of a 32-bit ELF relative to its
/// start. `None` when even the header does not fit.
fn extent32(blob: &[u8], offset: usize, r: &Readers) -> Option<usize> {
    if offset + EHDR32_SIZE > blob.len() {
        return None;
    }
    let avail = blob.len() - offset;

    let e_phoff = (r.u32)(blob, offset + 28) as usize;
    let e_shoff = (r.u32)(blob, offset + 32) as usize;
    let e_ehsize = (r.u16)(blob, offset + 40) as usize;
    let e_phentsize = (r.u16)(blob, offset + 42) as usize;
    let mut phnum = (r.u16)(blob, offset + 44);
    let e_shentsize = (r.u16)(blob, offset + 46) as usize;
    let mut shnum = (r.u16)(blob, offset + 48);

    let mut max_end = e_ehsize;

    // Extended counts live in section header 0.
    if e_shoff != 0 && e_shentsize >= SHDR32_SIZE && offset + e_shoff + SHDR32_SIZE <= blob.len() {
        if phnum == PN_XNUM && shnum > 0 {
            phnum = (r.u32)(blob, offset + e_shoff + 28) as u16; // sh_info
        }
        if shnum == 0 {
            shnum = (r.u32)(blob, offset + e_shoff + 20) as u16; // sh_size
        }
    }

    if e_phoff != 0 && phnum > 0 && e_phentsize > 0 {
        max_end = max_end.max(e_phoff + phnum as usize * e_phentsize);
        for i in 0..phnum as usize {
            let ent = offset + e_phoff + i * e_phentsize;
            if ent + 32 > blob.len() {
                break;
            }
            let p_offset = (r.u32)(blob, ent + 4) as usize;
            let p_filesz = (r.u32)(blob, ent + 16) as usize;
            max_end = max_end.max(p_offset.saturating_add(p_filesz));
        }
    }

    if e_shoff != 0 && shnum > 0 && e_shentsize > 0 {
        max_end = max_end.max(e_shoff + shnum as usize * e_shentsize);
        for i in 0..shnum as usize {
            let ent = offset + e_shoff + i * e_shentsize;
            if ent + SHDR32_SIZE > blob.len() {
                break;
            }
            let sh_offset = (r.u32)(blob, ent + 16) as usize;
            let sh_size = (r.u32)(blob, ent + 20) as usize;
            max_end = max_end.max(sh_offset.saturating_add(sh_size));
        }
    }

    Some(max_end.min(avail))
}

/// Same as [`extent32`] for the 64-bit layout.
fn extent64(blob: &[u8], offset: usize, r: &Readers) -> Option<usize> {
    if offset + EHDR64_SIZE > blob.len() {
        return None;
    }
    let avail = blob.len() - offset;

    let e_phoff = (r.u64)(blob, offset + 32) as usize;
    let e_shoff = (r.u64)(blob, offset + 40) as usize;
    let e_ehsize = (r.u16)(blob, offset + 52) as usize;
    let e_phentsize = (r.u16)(blob, offset + 54) as usize;
    let mut phnum = (r.u16)(blob, offset + 56);
    let e_shentsize = (r.u16)(blob, offset + 58) as usize;
    let mut shnum = (r.u16)(blob, offset + 60);

    let mut max_end = e_ehsize;

    let shdr0 = offset.saturating_add(e_shoff);
    if e_shoff != 0
        && e_shentsize >= SHDR64_SIZE
        && shdr0.saturating_add(SHDR64_SIZE) <= blob.len()
    {
        if phnum == PN_XNUM && shnum > 0 {
            phnum = (r.u32)(blob, shdr0 + 44) as u16; // sh_info
        }
        if shnum == 0 {
            shnum = (r.u64)(blob, shdr0 + 32) as u16; // sh_size
        }
    }

    if e_phoff != 0 && phnum > 0 && e_phentsize > 0 {
        max_end = max_end.max(e_phoff.saturating_add(phnum as usize * e_phentsize));
        for i in 0..phnum as usize {
            let ent = offset
                .saturating_add(e_phoff)
                .saturating_add(i * e_phentsize);
            if ent.saturating_add(56) > blob.len() {
                break;
            }
            let p_offset = (r.u64)(blob, ent + 8) as usize;
            let p_filesz = (r.u64)(blob, ent + 32) as usize;
            max_end = max_end.max(p_offset.saturating_add(p_filesz));
        }
    }

    if e_shoff != 0 && shnum > 0 && e_shentsize > 0 {
        max_end = max_end.max(e_shoff.saturating_add(shnum as usize * e_shentsize));
        for i in 0..shnum as usize {
            let ent = offset
                .saturating_add(e_shoff)
                .saturating_add(i * e_shentsize);
            if ent.saturating_add(SHDR64_SIZE) > blob.len() {
                break;
            }
            let sh_offset = (r.u64)(blob, ent + 24) as usize;
            let sh_size = (r.u64)(blob, ent + 32) as usize;
            max_end = max_end.max(sh_offset.saturating_add(sh_size));
        }
    }

    Some(max_end.min(avail))
}

impl Parser for ElfParser {
    fn name(&self) -> &'static str {
        "ELF"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        offset + 4 <= blob.len() && &blob[offset..offset + 4] == b"\x7FELF"
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "ELF");

        if offset + EI_NIDENT > blob.len() {
            r.info = "Truncated ELF ident".to_string();
            r.length = blob.len() - offset;
            return r;
        }

        let class = blob[offset + EI_CLASS];
        let readers = if blob[offset + EI_DATA] == ELFDATA2MSB {
            &BE
        } else {
            &LE
        };

        let extent = match class {
            ELFCLASS32 => extent32(blob, offset, readers),
            ELFCLASS64 => extent64(blob, offset, readers),
            _ => {
                r.info = "Unknown ELF class".to_string();
                r.length = blob.len() - offset;
                return r;
            }
        };

        let Some(mut max_end) = extent else {
            r.info = format!(
                "Truncated ELF{} header",
                if class == ELFCLASS64 { "64" } else { "32" }
            );
            r.length = blob.len() - offset;
            return r;
        };
        if max_end == 0 {
            max_end = EI_NIDENT;
        }

        r.length = max_end.min(blob.len() - offset);
        r.is_valid = r.length >= EHDR32_SIZE;
        r.info = format!("ELF{}", if class == ELFCLASS64 { "64" } else { "32" });
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal 64-bit little-endian ELF: header plus one loadable
    /// segment of `filesz` bytes at `p_offset`.
    fn elf64_le(p_offset: u64, p_filesz: u64) -> Vec<u8> {
        let total = (EHDR64_SIZE + 56).max((p_offset + p_filesz) as usize);
        let mut data = vec![0u8; total];
        data[..4].copy_from_slice(b"\x7FELF");
        data[EI_CLASS] = ELFCLASS64;
        data[EI_DATA] = 1; // little-endian
        data[32..40].copy_from_slice(&(EHDR64_SIZE as u64).to_le_bytes()); // e_phoff
        data[52..54].copy_from_slice(&(EHDR64_SIZE as u16).to_le_bytes()); // e_ehsize
        data[54..56].copy_from_slice(&56u16.to_le_bytes()); // e_phentsize
        data[56..58].copy_from_slice(&1u16.to_le_bytes()); // e_phnum
        // program header
        let ph = EHDR64_SIZE;
        data[ph + 8..ph + 16].copy_from_slice(&p_offset.to_le_bytes());
        data[ph + 32..ph + 40].copy_from_slice(&p_filesz.to_le_bytes());
        data
    }

    #[test]
    fn length_covers_segment_end() {
        let data = elf64_le(0x100, 0x80);
        let r = ElfParser.parse(&data, 0);
        assert!(r.is_valid);
        assert_eq!(r.length, 0x180);
        assert_eq!(r.info, "ELF64");
    }

    #[test]
    fn segment_beyond_blob_clamps_to_available() {
        let mut data = elf64_le(0x100, 0x80);
        data.truncate(0x150);
        let r = ElfParser.parse(&data, 0);
        assert!(r.is_valid);
        assert_eq!(r.length, 0x150);
    }

    #[test]
    fn unknown_class_is_invalid() {
        let mut data = elf64_le(0, 0x100);
        data[EI_CLASS] = 9;
        let r = ElfParser.parse(&data, 0);
        assert!(!r.is_valid);
    }
}
