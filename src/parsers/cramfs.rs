//! CramFS superblock recognition in either endianness: declared size
//! against remaining bytes, then validation of the root inode at
//! superblock offset 0x40.

use crate::bytes::{read_be32, read_le32};
use crate::common::cramfs::{is_dir, parse_inode, CRAMFS_MAGIC, CRAMFS_MAGIC_SWAPPED, INODE_SIZE};
use crate::parsers::Parser;
use crate::result::ScanResult;
use std::fmt::Write;

const ROOT_INODE_OFF: usize = 0x40;

pub struct CramfsParser;

fn detect_endianness(blob: &[u8], offset: usize) -> Option<bool> {
    let le = read_le32(blob, offset);
    if le == CRAMFS_MAGIC || le == CRAMFS_MAGIC_SWAPPED {
        return Some(true);
    }
    let be = read_be32(blob, offset);
    if be == CRAMFS_MAGIC || be == CRAMFS_MAGIC_SWAPPED {
        return Some(false);
    }
    None
}

impl Parser for CramfsParser {
    fn name(&self) -> &'static str {
        "CramFS"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        offset + 8 <= blob.len() && detect_endianness(blob, offset).is_some()
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "CramFS");
        r.extractor_type = "CramFS".to_string();

        if offset + ROOT_INODE_OFF > blob.len() {
            r.info = "Truncated CramFS superblock".to_string();
            r.length = blob.len() - offset;
            return r;
        }

        let Some(le) = detect_endianness(blob, offset) else {
            r.info = "Invalid CramFS magic".to_string();
            r.length = blob.len() - offset;
            return r;
        };
        let read = if le { read_le32 } else { read_be32 };

        let declared_size = read(blob, offset + 4) as usize;
        let flags = read(blob, offset + 8);
        let future = read(blob, offset + 12);

        let mut signature = String::new();
        for i in 16..32 {
            let c = blob[offset + i];
            if c == 0 {
                break;
            }
            if c.is_ascii_graphic() || c == b' ' {
                signature.push(c as char);
            }
        }

        let remaining = blob.len() - offset;
        let computed_len = declared_size.min(remaining);
        let plausible_decl = declared_size >= ROOT_INODE_OFF && declared_size <= remaining;

        let root_off = offset + ROOT_INODE_OFF;
        if root_off + INODE_SIZE > blob.len() {
            r.info = "Truncated root inode".to_string();
            r.length = computed_len;
            return r;
        }
        let root = parse_inode(blob, root_off, le);

        let root_is_dir = is_dir(root.mode);
        let root_name_ok = root.namelen == 0
            || root_off + INODE_SIZE + root.namelen as usize <= offset + declared_size;
        let root_offset_ok = (root.offset as usize) < declared_size;
        let root_size_ok = root.size as usize <= declared_size;

        let mut root_name = String::new();
        if root.namelen > 0 && root_off + INODE_SIZE + root.namelen as usize <= blob.len() {
            for i in 0..root.namelen as usize {
                root_name.push(blob[root_off + INODE_SIZE + i] as char);
            }
        }

        let mut info = String::new();
        let _ = write!(
            info,
            "Compressed ROM File System, endianness={}, declared size={declared_size}, flags=0x{flags:x}, future=0x{future:x}",
            if le { "LE" } else { "BE" }
        );
        if !signature.is_empty() {
            let _ = write!(info, ", signature=\"{signature}\"");
        }
        let _ = write!(
            info,
            ", root: mode=0x{:x}, uid={}, gid={}, namelen={}{}, offset={}, size={}",
            root.mode,
            root.uid,
            root.gid,
            root.namelen,
            if root_name.is_empty() {
                String::new()
            } else {
                format!(", name=\"{root_name}\"")
            },
            root.offset,
            root.size
        );

        r.info = info;
        r.length = computed_len;
        r.is_valid = plausible_decl && root_is_dir && root_name_ok && root_offset_ok && root_size_ok;
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn superblock(declared: u32, root_mode: u16) -> Vec<u8> {
        let mut data = vec![0u8; 256];
        data[..4].copy_from_slice(&CRAMFS_MAGIC.to_le_bytes());
        data[4..8].copy_from_slice(&declared.to_le_bytes());
        data[16..22].copy_from_slice(b"Cramfs");
        // root inode at 0x40: mode word, size word, namelen/offset word
        data[0x40..0x44].copy_from_slice(&u32::from(root_mode).to_le_bytes());
        data[0x44..0x48].copy_from_slice(&0u32.to_le_bytes());
        data[0x48..0x4C].copy_from_slice(&(0x50u32 << 6).to_le_bytes());
        data
    }

    #[test]
    fn directory_root_inode_validates() {
        let data = superblock(256, 0x41ED);
        assert!(CramfsParser.matches(&data, 0));
        let r = CramfsParser.parse(&data, 0);
        assert!(r.is_valid, "{}", r.info);
        assert_eq!(r.length, 256);
        assert!(r.info.contains("endianness=LE"), "{}", r.info);
    }

    #[test]
    fn regular_file_root_inode_is_rejected() {
        let data = superblock(256, 0x81ED);
        let r = CramfsParser.parse(&data, 0);
        assert!(!r.is_valid);
    }

    #[test]
    fn declared_size_beyond_blob_is_rejected() {
        let data = superblock(100_000, 0x41ED);
        let r = CramfsParser.parse(&data, 0);
        assert!(!r.is_valid);
    }
}
