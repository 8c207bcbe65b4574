//! Extractors: side-effecting modules that, given the blob and a
//! validated offset, materialize artifacts on disk.
//!
//! Every extractor creates `out_dir/<hex(offset)>` and writes its
//! output there; the scanner later recurses into that directory. The
//! external-archiver extractors spawn their tool through
//! `std::process::Command` with an argument vector and interpret the
//! exit status explicitly.

mod cpio;
mod cramfs;
mod dtb;
mod gzip;
mod lzma;
mod raw;
mod romfs;
mod sevenzip;
mod squashfs;
mod tar;
mod uimage;
mod xz;
mod zip;

use crate::bytes::to_hex;
use crate::error::{CarveError, Result};
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use tracing::warn;

/// Uniform capability implemented by every extractor.
pub trait Extractor {
    /// Tag matched against `ScanResult::extractor_type`.
    fn name(&self) -> &'static str;

    /// Materialize the structure at `offset` under
    /// `out_dir/<hex(offset)>`. `hint` carries the filename-extension
    /// hint for the RAW extractor and is ignored by everything else.
    fn extract(&self, blob: &[u8], offset: usize, out_dir: &Path, hint: Option<&str>)
        -> Result<()>;
}

/// The builtin extractors.
pub fn builtin() -> Vec<Box<dyn Extractor>> {
    vec![
        Box::new(gzip::GzipExtractor),
        Box::new(lzma::LzmaExtractor),
        Box::new(zip::ZipExtractor),
        Box::new(tar::TarExtractor),
        Box::new(cpio::CpioExtractor),
        Box::new(cramfs::CramfsExtractor),
        Box::new(romfs::RomfsExtractor),
        Box::new(dtb::DtbExtractor),
        Box::new(uimage::UimageExtractor),
        Box::new(sevenzip::SevenZipExtractor),
        Box::new(xz::XzExtractor),
        Box::new(squashfs::SquashfsExtractor),
        Box::new(raw::RawExtractor),
    ]
}

/// Create and return the per-result output directory
/// `out_dir/<hex(offset)>`.
pub(crate) fn entry_dir(out_dir: &Path, offset: usize) -> Result<PathBuf> {
    let dir = out_dir.join(to_hex(offset));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Strip root and prefix components and drop `.`/`..` so an archive
/// member can never escape the output directory.
pub(crate) fn sanitize_path(raw: &Path) -> PathBuf {
    let mut safe = PathBuf::new();
    for part in raw.components() {
        if let Component::Normal(name) = part {
            safe.push(name);
        }
    }
    safe
}

/// Run an external archiver. A missing binary is a hard error; any
/// other non-zero exit is logged and swallowed so the scan continues.
pub(crate) fn run_tool(command: &mut Command, tool: &str) -> Result<()> {
    match command.status() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => {
            warn!("{tool} exited with {status}");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CarveError::missing_tool(tool)),
        Err(e) => Err(CarveError::Io(e)),
    }
}
