//! XZ extractor: delegate to the external `7z` tool, which handles
//! multi-stream files and index validation better than a hand-rolled
//! decoder loop.

use crate::common::MAX_ANALYZED_FILE_SIZE;
use crate::error::{CarveError, Result};
use crate::extractors::{entry_dir, run_tool, Extractor};
use std::path::Path;
use std::process::{Command, Stdio};

pub struct XzExtractor;

impl Extractor for XzExtractor {
    fn name(&self) -> &'static str {
        "XZ"
    }

    fn extract(&self, blob: &[u8], offset: usize, out_dir: &Path, _hint: Option<&str>) -> Result<()> {
        if offset >= blob.len() {
            return Err(CarveError::extraction("offset beyond blob size"));
        }
        let dir = entry_dir(out_dir, offset)?;

        let dump_size = (blob.len() - offset).min(MAX_ANALYZED_FILE_SIZE as usize);
        let payload = dir.join("xz_file.bin.xz");
        std::fs::write(&payload, &blob[offset..offset + dump_size])?;

        let result = run_tool(
            Command::new("7z")
                .arg("x")
                .arg(&payload)
                .arg(format!("-o{}", dir.display()))
                .arg("-y")
                .stdout(Stdio::null())
                .stderr(Stdio::null()),
            "7z",
        );
        let _ = std::fs::remove_file(&payload);
        result
    }
}
