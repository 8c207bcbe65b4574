//! LZMA ("alone" format) extractor: decode through the xz2 lzma
//! decoder and write `lzma_extracted.bin`. A stream that dies partway
//! still yields whatever was decoded, matching how firmware blobs are
//! usually truncated mid-stream.

use crate::error::{CarveError, Result};
use crate::extractors::{entry_dir, Extractor};
use std::io::Read;
use std::path::Path;
use tracing::warn;
use xz2::read::XzDecoder;
use xz2::stream::Stream;

pub struct LzmaExtractor;

impl Extractor for LzmaExtractor {
    fn name(&self) -> &'static str {
        "LZMA"
    }

    fn extract(&self, blob: &[u8], offset: usize, out_dir: &Path, _hint: Option<&str>) -> Result<()> {
        if offset + 13 > blob.len() {
            return Err(CarveError::extraction("truncated LZMA header"));
        }
        let dir = entry_dir(out_dir, offset)?;

        let stream = Stream::new_lzma_decoder(u64::MAX)
            .map_err(|e| CarveError::extraction(format!("lzma decoder init failed: {e}")))?;
        let mut decoder = XzDecoder::new_stream(&blob[offset..], stream);

        let mut out = Vec::new();
        match decoder.read_to_end(&mut out) {
            Ok(_) => {}
            Err(e) if !out.is_empty() => {
                warn!("lzma stream ended early: {e}");
            }
            Err(e) => {
                return Err(CarveError::extraction(format!("lzma decode failed: {e}")));
            }
        }

        std::fs::write(dir.join("lzma_extracted.bin"), &out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_header_is_an_error() {
        let data = vec![0x42u8; 64];
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(LzmaExtractor.extract(&data, 0, dir.path(), None).is_err());
    }

    #[test]
    fn truncated_header_is_an_error() {
        let data = vec![0x5D, 0x00, 0x00];
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(LzmaExtractor.extract(&data, 0, dir.path(), None).is_err());
    }
}
