//! TAR extractor: walk the archive with the tar reader, sanitizing
//! member paths before they touch the filesystem. Symlinks become
//! `<name>.symlink` stub files and special entries become empty
//! placeholders, so nothing escapes the output directory.

use crate::error::{CarveError, Result};
use crate::extractors::{entry_dir, sanitize_path, Extractor};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::debug;

pub struct TarExtractor;

impl Extractor for TarExtractor {
    fn name(&self) -> &'static str {
        "TAR"
    }

    fn extract(&self, blob: &[u8], offset: usize, out_dir: &Path, _hint: Option<&str>) -> Result<()> {
        if offset + 512 > blob.len() {
            return Err(CarveError::extraction("truncated TAR header"));
        }
        let dir = entry_dir(out_dir, offset)?;

        let mut archive = Archive::new(&blob[offset..]);
        let entries = archive
            .entries()
            .map_err(|e| CarveError::extraction(format!("cannot read TAR entries: {e}")))?;

        for entry in entries {
            // A parse error here usually means unrelated bytes follow
            // the archive; stop instead of failing the extraction.
            let Ok(mut entry) = entry else {
                break;
            };
            let Ok(raw_path) = entry.path().map(|p| p.into_owned()) else {
                continue;
            };
            let safe = sanitize_path(&raw_path);
            if safe.as_os_str().is_empty() {
                continue;
            }
            debug!("{}", safe.display());
            let target = dir.join(&safe);

            let entry_type = entry.header().entry_type();
            if entry_type.is_dir() {
                std::fs::create_dir_all(&target)?;
            } else if entry_type.is_file() {
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let mut out = std::fs::File::create(&target)?;
                std::io::copy(&mut entry, &mut out)
                    .map_err(|e| CarveError::extraction(format!("cannot extract TAR entry: {e}")))?;
            } else if entry_type.is_symlink() {
                let link = entry
                    .link_name()
                    .ok()
                    .flatten()
                    .map(|l| l.display().to_string())
                    .unwrap_or_default();
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let mut stub = OsString::from(target.as_os_str());
                stub.push(".symlink");
                std::fs::write(PathBuf::from(stub), format!("Symlink to: {link}\n"))?;
            } else {
                // Character/block devices, FIFOs: placeholder only.
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&target, b"")?;
            }
        }
        Ok(())
    }
}
