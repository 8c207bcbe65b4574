//! SquashFS extractor: delegate to `sasquatch`, the firmware-tolerant
//! unsquashfs fork.

use crate::error::{CarveError, Result};
use crate::extractors::{entry_dir, run_tool, Extractor};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

pub struct SquashfsExtractor;

impl Extractor for SquashfsExtractor {
    fn name(&self) -> &'static str {
        "SquashFS"
    }

    fn extract(&self, blob: &[u8], offset: usize, out_dir: &Path, _hint: Option<&str>) -> Result<()> {
        if offset >= blob.len() {
            return Err(CarveError::extraction("offset beyond blob size"));
        }
        let dir = entry_dir(out_dir, offset)?;
        debug!("{}", dir.display());

        let image = dir.join("squashfs.img");
        std::fs::write(&image, &blob[offset..])?;

        let result = run_tool(
            Command::new("sasquatch")
                .arg("-d")
                .arg(&dir)
                .arg(&image)
                .stdout(Stdio::null())
                .stderr(Stdio::null()),
            "sasquatch",
        );
        let _ = std::fs::remove_file(&image);
        result
    }
}
