//! ROMFS extractor: walk the file-header chain and mirror the tree.
//! Entry classification is heuristic (the header gives no explicit
//! type): size > 0 means a regular file, a non-zero spec word is
//! treated as a directory whose children start there, and everything
//! else becomes a symlink stub.

use crate::bytes::read_be32;
use crate::error::{CarveError, Result};
use crate::extractors::{entry_dir, sanitize_path, Extractor};
use rustc_hash::FxHashSet;
use std::path::Path;

pub struct RomfsExtractor;

enum EntryKind {
    Regular,
    Directory,
    Symlink,
}

struct RomfsEntry {
    next: u32,
    spec: u32,
    size: u32,
    data_offset: usize,
    name: String,
    kind: EntryKind,
}

fn read_nul_string(blob: &[u8], start: usize, limit: usize) -> String {
    let mut s = String::new();
    let mut i = start;
    while i < limit.min(blob.len()) {
        let c = blob[i];
        if c == 0 {
            break;
        }
        s.push(c as char);
        i += 1;
    }
    s
}

fn read_entry(blob: &[u8], fs_end: usize, header_off: usize) -> RomfsEntry {
    let next = read_be32(blob, header_off);
    let spec = read_be32(blob, header_off + 4);
    let size = read_be32(blob, header_off + 8);

    let name_start = header_off + 16;
    let name = read_nul_string(blob, name_start, fs_end);
    let after_name = name_start + name.len() + 1;
    let data_offset = (after_name + 15) & !15;

    let kind = if size > 0 {
        EntryKind::Regular
    } else if spec != 0 {
        EntryKind::Directory
    } else {
        EntryKind::Symlink
    };

    RomfsEntry {
        next,
        spec,
        size,
        data_offset,
        name,
        kind,
    }
}

fn walk_chain(
    blob: &[u8],
    base: usize,
    fs_end: usize,
    first: usize,
    out_dir: &Path,
    visited: &mut FxHashSet<usize>,
) -> Result<()> {
    std::fs::create_dir_all(out_dir)?;
    let mut cursor = first;

    while cursor + 16 <= fs_end {
        if !visited.insert(cursor) {
            break;
        }
        let entry = read_entry(blob, fs_end, cursor);
        if entry.name.is_empty() {
            break;
        }

        // "." and ".." entries sanitize to nothing; skip them without
        // following spec, which points back into the chain.
        let safe = sanitize_path(Path::new(&entry.name));
        if !safe.as_os_str().is_empty() {
            let target = out_dir.join(&safe);
            match entry.kind {
                EntryKind::Directory => {
                    let child = base + entry.spec as usize;
                    walk_chain(blob, base, fs_end, child, &target, visited)?;
                }
                EntryKind::Regular => {
                    if entry.data_offset + entry.size as usize <= fs_end {
                        if let Some(parent) = target.parent() {
                            std::fs::create_dir_all(parent)?;
                        }
                        std::fs::write(
                            &target,
                            &blob[entry.data_offset..entry.data_offset + entry.size as usize],
                        )?;
                    }
                }
                EntryKind::Symlink => {
                    let link = read_nul_string(blob, entry.data_offset, fs_end);
                    if let Some(parent) = target.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    // Stub text instead of a real symlink.
                    std::fs::write(&target, format!("{link}\n"))?;
                }
            }
        }

        if entry.next == 0 {
            break;
        }
        cursor = base + entry.next as usize;
    }
    Ok(())
}

impl Extractor for RomfsExtractor {
    fn name(&self) -> &'static str {
        "ROMFS"
    }

    fn extract(&self, blob: &[u8], offset: usize, out_dir: &Path, _hint: Option<&str>) -> Result<()> {
        if offset + 16 > blob.len() {
            return Err(CarveError::extraction("truncated ROMFS superblock"));
        }
        let dir = entry_dir(out_dir, offset)?;

        let fs_size = read_be32(blob, offset + 8) as usize;
        let fs_end = offset + fs_size;
        if fs_size == 0 || fs_end > blob.len() {
            return Err(CarveError::extraction("implausible ROMFS size"));
        }

        // The volume name follows the superblock; the first file header
        // starts 16-byte aligned after it.
        let volume_name = read_nul_string(blob, offset + 16, fs_end);
        let first = (offset + 16 + volume_name.len() + 1 + 15) & !15;

        let mut visited = FxHashSet::default();
        walk_chain(blob, offset, fs_end, first, &dir, &mut visited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn align16(v: &mut Vec<u8>) {
        while v.len() % 16 != 0 {
            v.push(0);
        }
    }

    /// Image with one regular file "hello" containing "world".
    fn tiny_romfs() -> Vec<u8> {
        let mut image = Vec::new();
        image.extend_from_slice(b"-rom1fs-");
        image.extend_from_slice(&0u32.to_be_bytes()); // size patched below
        image.extend_from_slice(&0u32.to_be_bytes()); // checksum
        image.extend_from_slice(b"vol\0");
        align16(&mut image);

        // file header: next=0, spec=0, size=5, checksum=0, name "hello"
        image.extend_from_slice(&0u32.to_be_bytes());
        image.extend_from_slice(&0u32.to_be_bytes());
        image.extend_from_slice(&5u32.to_be_bytes());
        image.extend_from_slice(&0u32.to_be_bytes());
        image.extend_from_slice(b"hello\0");
        align16(&mut image);
        image.extend_from_slice(b"world");

        let total = image.len() as u32;
        image[8..12].copy_from_slice(&total.to_be_bytes());
        image
    }

    #[test]
    fn regular_file_is_mirrored() {
        let data = tiny_romfs();
        let dir = tempfile::tempdir().expect("tempdir");
        RomfsExtractor
            .extract(&data, 0, dir.path(), None)
            .expect("extract");
        let out = std::fs::read(dir.path().join("0/hello")).expect("read");
        assert_eq!(out, b"world");
    }

    #[test]
    fn oversized_declared_size_is_an_error() {
        let mut data = tiny_romfs();
        data[8..12].copy_from_slice(&0xFFFF_FFFFu32.to_be_bytes());
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(RomfsExtractor.extract(&data, 0, dir.path(), None).is_err());
    }
}
