//! Microsoft Cabinet recognition from the fixed CFHEADER fields, with
//! plausibility checks on the declared size, file-table offset, and
//! folder/file counts.

use crate::bytes::{read_le16, read_le32};
use crate::parsers::Parser;
use crate::result::ScanResult;
use std::fmt::Write;

const HEADER_MIN: usize = 38;
const COUNT_SANITY: u32 = 0x10_0000;

pub struct CabParser;

fn describe_flags(flags: u16) -> String {
    let mut parts = Vec::new();
    if flags & 0x0001 != 0 {
        parts.push("RESERVED");
    }
    if flags & 0x0004 != 0 {
        parts.push("PREV");
    }
    if flags & 0x0008 != 0 {
        parts.push("NEXT");
    }
    if parts.is_empty() {
        parts.push("NONE");
    }
    parts.join("|")
}

impl Parser for CabParser {
    fn name(&self) -> &'static str {
        "CAB"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        offset + 4 <= blob.len() && &blob[offset..offset + 4] == b"MSCF"
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "CAB");
        r.extractor_type = "7Z".to_string();

        if offset + HEADER_MIN > blob.len() {
            r.info = "Truncated CAB header".to_string();
            r.length = blob.len() - offset;
            return r;
        }

        let cb_cabinet = read_le32(blob, offset + 8);
        let coff_files = read_le32(blob, offset + 20);
        let n_folders = read_le32(blob, offset + 24);
        let n_files = read_le32(blob, offset + 28);
        let flags = read_le16(blob, offset + 32);
        let set_id = read_le16(blob, offset + 34);
        let i_cabinet = read_le16(blob, offset + 36);

        let available = blob.len() - offset;
        let size_fits = cb_cabinet > 0 && cb_cabinet as usize <= available;
        let counts_plausible = n_folders <= COUNT_SANITY && n_files <= COUNT_SANITY;
        let files_off_plausible =
            coff_files == 0 || (coff_files >= HEADER_MIN as u32 && coff_files < cb_cabinet);

        r.length = (cb_cabinet as usize).min(available);
        r.is_valid = size_fits && files_off_plausible && counts_plausible;

        let mut info = String::new();
        let _ = write!(
            info,
            "Microsoft Cabinet archive, size={cb_cabinet} bytes, folders={n_folders}, files={n_files}, flags={}, setID={set_id}, index={i_cabinet}, coffFiles={coff_files}",
            describe_flags(flags)
        );
        r.info = info;
        r
    }
}
