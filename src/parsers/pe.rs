//! PE/MZ executable recognition. Header parsing goes through goblin;
//! the length is a heuristic (distance to the next `MZ` or end of
//! blob), since the section table routinely under-reports files with
//! overlay data.

use crate::parsers::Parser;
use crate::result::ScanResult;
use goblin::pe::header::Header;

const COFF_MACHINE_X86: u16 = 0x014C;
const COFF_MACHINE_X86_64: u16 = 0x8664;

pub struct PeParser;

fn arch_name(machine: u16) -> &'static str {
    match machine {
        COFF_MACHINE_X86 => "x86",
        COFF_MACHINE_X86_64 => "x64",
        _ => "unknown",
    }
}

fn estimate_length(blob: &[u8], pe_offset: usize) -> usize {
    let mut i = pe_offset + 4;
    while i + 2 <= blob.len() {
        if blob[i] == b'M' && blob[i + 1] == b'Z' {
            return i - pe_offset;
        }
        i += 1;
    }
    blob.len() - pe_offset
}

impl Parser for PeParser {
    fn name(&self) -> &'static str {
        "EXE"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        offset + 2 <= blob.len() && blob[offset] == b'M' && blob[offset + 1] == b'Z'
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "EXE");

        let Ok(header) = Header::parse(&blob[offset..]) else {
            r.info = "Invalid PE Header".to_string();
            return r;
        };

        let pe_offset = header.dos_header.pe_pointer as usize;
        if offset + pe_offset + 6 > blob.len() {
            r.info = "Invalid PE Header".to_string();
            return r;
        }

        r.length = estimate_length(blob, offset + pe_offset).min(blob.len() - offset);
        r.is_valid = true;
        r.info = format!("PE32, Arch: {}", arch_name(header.coff_header.machine));
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal DOS + PE header pair that goblin accepts.
    fn tiny_pe(machine: u16) -> Vec<u8> {
        let mut data = vec![0u8; 0x80 + 64];
        data[0] = b'M';
        data[1] = b'Z';
        data[0x3C..0x40].copy_from_slice(&0x80u32.to_le_bytes());
        data[0x80..0x84].copy_from_slice(b"PE\0\0");
        data[0x84..0x86].copy_from_slice(&machine.to_le_bytes());
        data
    }

    #[test]
    fn x64_machine_is_reported() {
        let data = tiny_pe(COFF_MACHINE_X86_64);
        assert!(PeParser.matches(&data, 0));
        let r = PeParser.parse(&data, 0);
        assert!(r.is_valid);
        assert!(r.info.contains("x64"), "{}", r.info);
    }

    #[test]
    fn mz_without_pe_signature_is_invalid() {
        let mut data = vec![0u8; 256];
        data[0] = b'M';
        data[1] = b'Z';
        data[0x3C..0x40].copy_from_slice(&0x80u32.to_le_bytes());
        let r = PeParser.parse(&data, 0);
        assert!(!r.is_valid);
    }
}
