use std::path::PathBuf;
use thiserror::Error;

/// Errors shared by the scanner engine and the extractor set.
///
/// Parsers never produce errors; invalid input is reported through
/// `ScanResult::is_valid`. Everything here originates from filesystem
/// work or external tooling.
#[derive(Debug, Error)]
pub enum CarveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a regular file: {path}")]
    NotRegularFile { path: PathBuf },

    #[error("extraction failed: {message}")]
    Extraction { message: String },

    #[error("required external tool is not installed: {tool}")]
    MissingTool { tool: String },

    #[error("payload too large to extract: {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: u64, limit: u64 },
}

pub type Result<T> = std::result::Result<T, CarveError>;

impl CarveError {
    pub fn extraction<S: Into<String>>(message: S) -> Self {
        Self::Extraction { message: message.into() }
    }

    pub fn missing_tool<S: Into<String>>(tool: S) -> Self {
        Self::MissingTool { tool: tool.into() }
    }

    pub fn not_regular_file<P: Into<PathBuf>>(path: P) -> Self {
        Self::NotRegularFile { path: path.into() }
    }

    pub fn payload_too_large(size: u64, limit: u64) -> Self {
        Self::PayloadTooLarge { size, limit }
    }

    /// True when the error means an external archiver is absent rather
    /// than that this particular payload failed.
    pub fn is_missing_tool(&self) -> bool {
        matches!(self, Self::MissingTool { .. })
    }
}
