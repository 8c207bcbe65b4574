//! RAW extractor: write the remainder of the blob verbatim as
//! `file.<ext>`, with the extension supplied by the scanner as a hint
//! (the matched format's tag in lowercase).

use crate::error::{CarveError, Result};
use crate::extractors::{entry_dir, Extractor};
use std::path::Path;

pub struct RawExtractor;

impl Extractor for RawExtractor {
    fn name(&self) -> &'static str {
        "RAW"
    }

    fn extract(&self, blob: &[u8], offset: usize, out_dir: &Path, hint: Option<&str>) -> Result<()> {
        if offset >= blob.len() {
            return Err(CarveError::extraction("offset beyond blob size"));
        }
        let dir = entry_dir(out_dir, offset)?;

        let ext = hint.unwrap_or("bin").trim_start_matches('.');
        let ext = if ext.is_empty() { "bin" } else { ext };

        std::fs::write(dir.join(format!("file.{ext}")), &blob[offset..])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainder_is_written_with_hint_extension() {
        let data = b"....JPEGDATA".to_vec();
        let dir = tempfile::tempdir().expect("tempdir");
        RawExtractor
            .extract(&data, 4, dir.path(), Some("jpg"))
            .expect("extract");
        let out = std::fs::read(dir.path().join("4/file.jpg")).expect("read");
        assert_eq!(out, b"JPEGDATA");
    }

    #[test]
    fn missing_hint_falls_back_to_bin() {
        let data = b"abc".to_vec();
        let dir = tempfile::tempdir().expect("tempdir");
        RawExtractor
            .extract(&data, 0, dir.path(), None)
            .expect("extract");
        assert!(dir.path().join("0/file.bin").exists());
    }
}
