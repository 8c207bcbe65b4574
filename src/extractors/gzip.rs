//! GZIP extractor: inflate the member in-process and write
//! `decompressed.bin`.

use crate::error::{CarveError, Result};
use crate::extractors::{entry_dir, Extractor};
use flate2::read::GzDecoder;
use std::io::Read;
use std::path::Path;

pub struct GzipExtractor;

impl Extractor for GzipExtractor {
    fn name(&self) -> &'static str {
        "GZIP"
    }

    fn extract(&self, blob: &[u8], offset: usize, out_dir: &Path, _hint: Option<&str>) -> Result<()> {
        if offset >= blob.len() {
            return Err(CarveError::extraction("offset beyond blob size"));
        }
        let dir = entry_dir(out_dir, offset)?;

        let mut decoder = GzDecoder::new(&blob[offset..]);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| CarveError::extraction(format!("gzip inflate failed: {e}")))?;

        std::fs::write(dir.join("decompressed.bin"), &out)?;
        Ok(())
    }
}
