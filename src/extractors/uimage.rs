//! U-Boot image extractor: slice the payload that follows the 64-byte
//! header and write it as `<image_name>.bin`.

use crate::bytes::{read_be32, read_cstring};
use crate::error::{CarveError, Result};
use crate::extractors::{entry_dir, Extractor};
use std::path::Path;

const UIMAGE_MAGIC: u32 = 0x2705_1956;
const HEADER_SIZE: usize = 64;

pub struct UimageExtractor;

impl Extractor for UimageExtractor {
    fn name(&self) -> &'static str {
        "UIMAGE"
    }

    fn extract(&self, blob: &[u8], offset: usize, out_dir: &Path, _hint: Option<&str>) -> Result<()> {
        if offset + HEADER_SIZE > blob.len() {
            return Err(CarveError::extraction("truncated UImage header"));
        }
        if read_be32(blob, offset) != UIMAGE_MAGIC {
            return Err(CarveError::extraction("invalid UImage magic"));
        }

        let size = read_be32(blob, offset + 12) as usize;
        let mut image_name = read_cstring(blob, offset + 32, 32);
        if image_name.is_empty() {
            image_name = "uimage_payload".to_string();
        }
        // Image names occasionally carry path separators.
        let file_name: String = image_name
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();

        let payload_start = offset + HEADER_SIZE;
        let payload_end = payload_start.saturating_add(size).min(blob.len());

        let dir = entry_dir(out_dir, offset)?;
        std::fs::write(
            dir.join(format!("{file_name}.bin")),
            &blob[payload_start..payload_end],
        )?;
        Ok(())
    }
}
