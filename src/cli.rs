//! Command-line interface definitions.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "excise")]
#[command(about = "Carve recognizable formats out of firmware and other binary images")]
#[command(version)]
pub struct Args {
    /// Input file to scan
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Extract recognized structures to disk
    #[arg(short = 'e', long = "extract")]
    pub extract: bool,

    /// Recursively scan extracted artifacts up to DEPTH levels
    /// (defaults to 1 when --extract is set)
    #[arg(short = 'r', long = "recurse", value_name = "DEPTH")]
    pub recurse: Option<u32>,

    /// Directory that receives extracted artifacts
    #[arg(
        short = 'C',
        long = "extractionPath",
        value_name = "PATH",
        default_value = "extractions"
    )]
    pub extraction_path: PathBuf,

    /// Write the result forest as JSON to the given file
    #[arg(short = 'O', long = "jsonPath", value_name = "PATH")]
    pub json_path: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Keep whole-file results that would otherwise be suppressed
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Args {
    /// Effective recursion depth: an explicit --recurse wins (clamped to
    /// at least 1), otherwise --extract implies one level.
    pub fn recursion_depth(&self) -> u32 {
        match self.recurse {
            Some(depth) => depth.max(1),
            None if self.extract => 1,
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_implies_one_level() {
        let args = Args::parse_from(["excise", "-e", "fw.bin"]);
        assert_eq!(args.recursion_depth(), 1);
    }

    #[test]
    fn recurse_is_clamped_to_one() {
        let args = Args::parse_from(["excise", "-e", "-r", "0", "fw.bin"]);
        assert_eq!(args.recursion_depth(), 1);
    }

    #[test]
    fn no_extract_means_no_recursion() {
        let args = Args::parse_from(["excise", "fw.bin"]);
        assert!(!args.extract);
        assert_eq!(args.recursion_depth(), 0);
    }
}
