//! External-archiver extractor for the formats `7z` can unpack (7-Zip,
//! ZIP-family leftovers, RAR, ARJ, CAB, FAT, MBR, DMG, Bzip2): dump the
//! payload to a temp file and let the tool extract it in place.

use crate::common::MAX_ANALYZED_FILE_SIZE;
use crate::error::{CarveError, Result};
use crate::extractors::{entry_dir, run_tool, Extractor};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

pub struct SevenZipExtractor;

impl Extractor for SevenZipExtractor {
    fn name(&self) -> &'static str {
        "7Z"
    }

    fn extract(&self, blob: &[u8], offset: usize, out_dir: &Path, _hint: Option<&str>) -> Result<()> {
        if offset >= blob.len() {
            return Err(CarveError::extraction("offset beyond blob size"));
        }
        let dump_size = blob.len() - offset;
        if dump_size as u64 > MAX_ANALYZED_FILE_SIZE {
            return Err(CarveError::payload_too_large(
                dump_size as u64,
                MAX_ANALYZED_FILE_SIZE,
            ));
        }

        let dir = entry_dir(out_dir, offset)?;
        let payload = dir.join("payload.bin");
        std::fs::write(&payload, &blob[offset..])?;

        debug!("running 7z on {}", payload.display());
        let result = run_tool(
            Command::new("7z")
                .arg("x")
                .arg(&payload)
                .arg(format!("-o{}", dir.display()))
                .arg("-y")
                .arg("-p")
                .stdout(Stdio::null())
                .stderr(Stdio::null()),
            "7z",
        );
        let _ = std::fs::remove_file(&payload);
        result
    }
}
