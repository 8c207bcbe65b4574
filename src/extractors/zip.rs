//! ZIP extractor: in-process reader mirroring the archive's directory
//! tree under the output directory.

use crate::error::{CarveError, Result};
use crate::extractors::{entry_dir, Extractor};
use std::io::Cursor;
use std::path::Path;
use tracing::warn;
use zip::ZipArchive;

pub struct ZipExtractor;

impl Extractor for ZipExtractor {
    fn name(&self) -> &'static str {
        "ZIP"
    }

    fn extract(&self, blob: &[u8], offset: usize, out_dir: &Path, _hint: Option<&str>) -> Result<()> {
        if offset >= blob.len() {
            return Err(CarveError::extraction("offset beyond blob size"));
        }
        let dir = entry_dir(out_dir, offset)?;

        let cursor = Cursor::new(&blob[offset..]);
        let mut archive = ZipArchive::new(cursor)
            .map_err(|e| CarveError::extraction(format!("cannot open ZIP archive: {e}")))?;

        for i in 0..archive.len() {
            let mut file = match archive.by_index(i) {
                Ok(f) => f,
                Err(e) => {
                    warn!("skipping unreadable ZIP entry {i}: {e}");
                    continue;
                }
            };
            let Some(rel) = file.enclosed_name() else {
                warn!("skipping ZIP entry {i} with unsafe name");
                continue;
            };
            let target = dir.join(rel);

            if file.is_dir() {
                std::fs::create_dir_all(&target)?;
                continue;
            }
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut out = std::fs::File::create(&target)?;
            std::io::copy(&mut file, &mut out)
                .map_err(|e| CarveError::extraction(format!("cannot extract ZIP entry: {e}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn zip_with_entries() -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.add_directory("sub", options).expect("dir");
        writer.start_file("sub/inner.txt", options).expect("start");
        writer.write_all(b"nested").expect("write");
        writer.start_file("top.txt", options).expect("start");
        writer.write_all(b"top level").expect("write");
        writer.finish().expect("finish").into_inner()
    }

    #[test]
    fn mirrors_the_directory_tree() {
        let data = zip_with_entries();
        let dir = tempfile::tempdir().expect("tempdir");
        ZipExtractor
            .extract(&data, 0, dir.path(), None)
            .expect("extract");

        let nested = std::fs::read(dir.path().join("0/sub/inner.txt")).expect("read");
        assert_eq!(nested, b"nested");
        let top = std::fs::read(dir.path().join("0/top.txt")).expect("read");
        assert_eq!(top, b"top level");
    }

    #[test]
    fn garbage_input_is_an_error() {
        let data = vec![0u8; 64];
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(ZipExtractor.extract(&data, 0, dir.path(), None).is_err());
    }
}
