//! Structures shared between a parser and its extractor.

pub mod cramfs;
pub mod dtb;
pub mod tables;

/// Upper bound on any single payload handed to a decompression backend
/// or dumped for an external archiver.
pub const MAX_ANALYZED_FILE_SIZE: u64 = 1024 * 1024 * 1024;
