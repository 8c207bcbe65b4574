//! CPIO (newc) extractor: walk the ASCII-hex headers and mirror
//! directories and regular files under the output directory.

use crate::error::{CarveError, Result};
use crate::extractors::{entry_dir, sanitize_path, Extractor};
use std::path::Path;

const HEADER_SIZE: usize = 110;

struct CpioHeader {
    mode: u32,
    filesize: usize,
    namesize: usize,
}

fn align4(n: usize) -> usize {
    (n + 3) & !3
}

fn hex_field(blob: &[u8], offset: usize) -> Result<usize> {
    let mut value = 0usize;
    for &b in &blob[offset..offset + 8] {
        let digit = (b as char)
            .to_digit(16)
            .ok_or_else(|| CarveError::extraction("non-hex CPIO header field"))?;
        value = value * 16 + digit as usize;
    }
    Ok(value)
}

fn read_header(blob: &[u8], offset: usize) -> Result<CpioHeader> {
    if offset + HEADER_SIZE > blob.len() {
        return Err(CarveError::extraction("unexpected end of CPIO data"));
    }
    if &blob[offset..offset + 6] != b"070701" {
        return Err(CarveError::extraction("unsupported CPIO format"));
    }
    Ok(CpioHeader {
        mode: hex_field(blob, offset + 14)? as u32,
        filesize: hex_field(blob, offset + 54)?,
        namesize: hex_field(blob, offset + 94)?,
    })
}

pub struct CpioExtractor;

impl Extractor for CpioExtractor {
    fn name(&self) -> &'static str {
        "CPIO"
    }

    fn extract(&self, blob: &[u8], offset: usize, out_dir: &Path, _hint: Option<&str>) -> Result<()> {
        let dir = entry_dir(out_dir, offset)?;

        let mut pos = offset;
        while pos < blob.len() {
            let header = read_header(blob, pos)?;
            pos += HEADER_SIZE;

            if pos + header.namesize > blob.len() {
                return Err(CarveError::extraction("invalid CPIO name size"));
            }
            let name_bytes = &blob[pos..pos + header.namesize];
            let name: String = name_bytes
                .iter()
                .take_while(|&&b| b != 0)
                .map(|&b| b as char)
                .collect();
            pos = align4(pos + header.namesize);

            if name == "TRAILER!!!" {
                break;
            }

            let safe = sanitize_path(Path::new(&name));
            if safe.as_os_str().is_empty() {
                pos = align4(pos + header.filesize);
                continue;
            }
            let target = dir.join(&safe);

            match header.mode & 0o170000 {
                0o040000 => {
                    std::fs::create_dir_all(&target)?;
                }
                0o100000 => {
                    if pos + header.filesize > blob.len() {
                        return Err(CarveError::extraction("invalid CPIO file size"));
                    }
                    if let Some(parent) = target.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&target, &blob[pos..pos + header.filesize])?;
                }
                _ => {}
            }

            pos = align4(pos + header.filesize);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, data: &[u8], mode: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"070701");
        out.extend_from_slice(b"00000000"); // ino
        out.extend_from_slice(format!("{mode:08X}").as_bytes());
        for _ in 0..4 {
            out.extend_from_slice(b"00000000"); // uid gid nlink mtime
        }
        out.extend_from_slice(format!("{:08X}", data.len()).as_bytes());
        for _ in 0..4 {
            out.extend_from_slice(b"00000000"); // dev/rdev
        }
        out.extend_from_slice(format!("{:08X}", name.len() + 1).as_bytes());
        out.extend_from_slice(b"00000000"); // check
        out.extend_from_slice(name.as_bytes());
        out.push(0);
        while out.len() % 4 != 0 {
            out.push(0);
        }
        out.extend_from_slice(data);
        while out.len() % 4 != 0 {
            out.push(0);
        }
        out
    }

    #[test]
    fn files_and_directories_are_mirrored() {
        let mut data = entry("etc", b"", 0o040755);
        data.extend_from_slice(&entry("etc/issue", b"firmware 1.0\n", 0o100644));
        data.extend_from_slice(&entry("TRAILER!!!", b"", 0));
        let dir = tempfile::tempdir().expect("tempdir");
        CpioExtractor
            .extract(&data, 0, dir.path(), None)
            .expect("extract");
        let out = std::fs::read(dir.path().join("0/etc/issue")).expect("read");
        assert_eq!(out, b"firmware 1.0\n");
    }

    #[test]
    fn truncated_file_data_is_an_error() {
        let mut data = entry("etc/issue", b"firmware 1.0\n", 0o100644);
        data.truncate(data.len() - 8);
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(CpioExtractor.extract(&data, 0, dir.path(), None).is_err());
    }
}
