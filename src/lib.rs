//! EXCISE - carve recognizable formats out of firmware and other binary
//! images.
//!
//! Given an opaque byte blob, the scanner locates structures at
//! arbitrary offsets, validates them, reports their type, offset,
//! length, and a human-readable summary, and optionally extracts their
//! contents to disk, recursing a bounded number of levels into whatever
//! the extractors produce.
//!
//! # Example
//!
//! ```no_run
//! use excise::{ScanOptions, Scanner};
//!
//! let mut scanner = Scanner::new(ScanOptions::default());
//! for result in scanner.scan(std::path::Path::new("firmware.bin")) {
//!     println!("0x{:x} {} ({} bytes)", result.offset, result.type_tag, result.length);
//! }
//! ```

pub mod bytes;
pub mod cli;
mod common;
pub mod error;
pub mod extractors;
pub mod output;
pub mod parsers;
pub mod registry;
pub mod result;
pub mod scanner;

pub use error::{CarveError, Result};
pub use extractors::Extractor;
pub use parsers::Parser;
pub use result::ScanResult;
pub use scanner::{ScanOptions, Scanner};

use std::path::Path;

/// Scan a single file with the given options.
///
/// Convenience wrapper around [`Scanner`] for one-shot use; I/O failures
/// yield an empty result list, matching [`Scanner::scan`].
pub fn scan_file<P: AsRef<Path>>(path: P, options: ScanOptions) -> Vec<ScanResult> {
    Scanner::new(options).scan(path.as_ref())
}
