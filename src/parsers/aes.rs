//! AES lookup-table recognition: 16-byte prefix match against the
//! S-boxes, Rcon, and the Te/Td word tables in both byte orders.

use crate::bytes::{read_be32, read_le32};
use crate::common::tables::{
    AES_INV_SBOX_PREFIX, AES_RCON_PREFIX, AES_SBOX_PREFIX, AES_TD_PREFIXES, AES_TE_PREFIXES,
};
use crate::parsers::Parser;
use crate::result::ScanResult;
use std::fmt::Write;

const PREFIX_LEN: usize = 16;
/// Byte tables are 256 single-byte entries.
const BYTE_TABLE_LEN: usize = 256;
/// Word tables are 256 four-byte entries.
const WORD_TABLE_LEN: usize = 1024;

pub struct AesParser;

struct TableMatch {
    name: String,
    endianness: Option<&'static str>,
    table_bytes: usize,
}

fn bytes_match(blob: &[u8], offset: usize, prefix: &[u8; 16]) -> bool {
    offset + PREFIX_LEN <= blob.len() && &blob[offset..offset + PREFIX_LEN] == prefix
}

fn words_match(blob: &[u8], offset: usize, entries: &[u32; 4], le: bool) -> bool {
    if offset + PREFIX_LEN > blob.len() {
        return false;
    }
    let read = if le { read_le32 } else { read_be32 };
    entries
        .iter()
        .enumerate()
        .all(|(i, &entry)| read(blob, offset + i * 4) == entry)
}

fn identify(blob: &[u8], offset: usize) -> Option<TableMatch> {
    for (name, prefix) in [
        ("AES S-box", &AES_SBOX_PREFIX),
        ("AES inverse S-box", &AES_INV_SBOX_PREFIX),
        ("AES Rcon", &AES_RCON_PREFIX),
    ] {
        if bytes_match(blob, offset, prefix) {
            return Some(TableMatch {
                name: name.to_string(),
                endianness: None,
                table_bytes: BYTE_TABLE_LEN,
            });
        }
    }

    for tables in [&AES_TE_PREFIXES, &AES_TD_PREFIXES] {
        for (name, entries) in tables.iter() {
            for (le, label) in [(true, "LE"), (false, "BE")] {
                if words_match(blob, offset, entries, le) {
                    return Some(TableMatch {
                        name: format!("AES {name}"),
                        endianness: Some(label),
                        table_bytes: WORD_TABLE_LEN,
                    });
                }
            }
        }
    }

    None
}

impl Parser for AesParser {
    fn name(&self) -> &'static str {
        "AES"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        identify(blob, offset).is_some()
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "AES");

        let Some(m) = identify(blob, offset) else {
            r.info = "No AES table recognized".to_string();
            return r;
        };

        let mut info = m.name;
        if let Some(endianness) = m.endianness {
            let _ = write!(info, ", {endianness}");
        }
        let _ = write!(info, ", entries=256, table bytes={}", m.table_bytes);

        r.info = info;
        r.length = m.table_bytes.min(blob.len() - offset);
        r.is_valid = true;
        r
    }
}
