//! CramFS extractor: walk the inode tree from the root directory and
//! inflate regular files block by block (each block is an independent
//! zlib stream prefixed by its compressed length).

use crate::bytes::{read_be32, read_le32};
use crate::common::cramfs::{is_dir, is_reg, parse_inode, CramfsInode, CRAMFS_MAGIC, CRAMFS_MAGIC_SWAPPED, INODE_SIZE};
use crate::error::{CarveError, Result};
use crate::extractors::{entry_dir, sanitize_path, Extractor};
use flate2::read::ZlibDecoder;
use std::io::Read;
use std::path::Path;

const MAX_DEPTH: usize = 64;

pub struct CramfsExtractor;

fn decompress_block(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4096);
    let mut decoder = ZlibDecoder::new(data);
    match decoder.read_to_end(&mut out) {
        Ok(_) => out,
        Err(_) => Vec::new(),
    }
}

fn extract_inode(
    blob: &[u8],
    base: usize,
    le: bool,
    ino: &CramfsInode,
    name: &str,
    out_dir: &Path,
    depth: usize,
) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(CarveError::extraction("CramFS directory nesting too deep"));
    }
    let safe = sanitize_path(Path::new(name));
    if safe.as_os_str().is_empty() {
        return Ok(());
    }
    let target = out_dir.join(&safe);

    if is_dir(ino.mode) {
        std::fs::create_dir_all(&target)?;
        let mut cursor = base + ino.offset as usize;
        let end = cursor + ino.size as usize;
        while cursor + INODE_SIZE <= end.min(blob.len()) {
            let child = parse_inode(blob, cursor, le);
            cursor += INODE_SIZE;
            let name_end = cursor + child.namelen as usize;
            if name_end > blob.len() {
                break;
            }
            let child_name: String = blob[cursor..name_end]
                .iter()
                .take_while(|&&b| b != 0)
                .map(|&b| b as char)
                .collect();
            cursor = name_end;
            if child_name.is_empty() {
                break;
            }
            extract_inode(blob, base, le, &child, &child_name, &target, depth + 1)?;
        }
    } else if is_reg(ino.mode) {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut contents = Vec::new();
        let mut cursor = base + ino.offset as usize;
        let mut remaining = ino.size as usize;
        while remaining > 0 && cursor + 4 <= blob.len() {
            let block_len = if le {
                read_le32(blob, cursor)
            } else {
                read_be32(blob, cursor)
            } as usize;
            cursor += 4;
            if cursor + block_len > blob.len() {
                break;
            }
            let block = decompress_block(&blob[cursor..cursor + block_len]);
            cursor += block_len;
            if block.is_empty() || block.len() > remaining {
                contents.extend_from_slice(&block[..block.len().min(remaining)]);
                break;
            }
            remaining -= block.len();
            contents.extend_from_slice(&block);
        }
        std::fs::write(&target, &contents)?;
    }
    Ok(())
}

impl Extractor for CramfsExtractor {
    fn name(&self) -> &'static str {
        "CramFS"
    }

    fn extract(&self, blob: &[u8], offset: usize, out_dir: &Path, _hint: Option<&str>) -> Result<()> {
        if offset + 0x40 + INODE_SIZE > blob.len() {
            return Err(CarveError::extraction("truncated CramFS image"));
        }
        let dir = entry_dir(out_dir, offset)?;

        let magic_le = read_le32(blob, offset);
        let le = magic_le == CRAMFS_MAGIC || magic_le == CRAMFS_MAGIC_SWAPPED;

        let root_off = offset + 0x40;
        let root = parse_inode(blob, root_off, le);
        let root_name = if root.namelen > 0
            && root_off + INODE_SIZE + root.namelen as usize <= blob.len()
        {
            blob[root_off + INODE_SIZE..root_off + INODE_SIZE + root.namelen as usize]
                .iter()
                .take_while(|&&b| b != 0)
                .map(|&b| b as char)
                .collect()
        } else {
            "root".to_string()
        };

        extract_inode(blob, offset, le, &root, &root_name, &dir, 0)
    }
}
