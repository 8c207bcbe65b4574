//! The scanner engine: a linear scan over an in-memory blob that
//! dispatches parsers in registration order, records validated results,
//! invokes extractors, and recurses a bounded number of levels into
//! whatever they produce.

use crate::bytes::to_hex;
use crate::registry::{ExtractorRegistry, ParserRegistry};
use crate::result::ScanResult;
use rustc_hash::FxHashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// Configuration for a [`Scanner`].
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Invoke extractors for results that declare an extractor type.
    pub extract: bool,
    /// Remaining recursion budget. Extraction and recursion both stop
    /// once this reaches zero.
    pub recursion_depth: u32,
    /// Directory under which `<input_name>.extracted/` trees are
    /// created.
    pub extraction_root: PathBuf,
    /// Keep whole-file results that would otherwise be suppressed.
    pub verbose: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extract: false,
            recursion_depth: 1,
            extraction_root: PathBuf::from("extractions"),
            verbose: false,
        }
    }
}

pub struct Scanner {
    options: ScanOptions,
    current_depth: u32,
    parsers: ParserRegistry,
    extractors: ExtractorRegistry,
    results: Vec<ScanResult>,
    visited_offsets: FxHashSet<usize>,
    /// Absolute paths of extracted artifacts that were already handed to
    /// a nested scanner, threaded through the whole recursion so each
    /// file is analyzed at most once per top-level scan.
    already_analyzed: Vec<String>,
}

impl Scanner {
    pub fn new(options: ScanOptions) -> Self {
        Self::at_depth(options, 0)
    }

    fn at_depth(options: ScanOptions, current_depth: u32) -> Self {
        Self {
            options,
            current_depth,
            parsers: ParserRegistry::builtin(),
            extractors: ExtractorRegistry::builtin(),
            results: Vec::new(),
            visited_offsets: FxHashSet::default(),
            already_analyzed: Vec::new(),
        }
    }

    /// Scan one file and return the result forest.
    ///
    /// I/O failures (missing file, not a regular file, unreadable) log
    /// one error and yield an empty list; no error escapes to the
    /// caller.
    pub fn scan(&mut self, file_path: &Path) -> Vec<ScanResult> {
        debug!(
            "scan {} (depth {})",
            file_path.display(),
            self.current_depth
        );
        self.results.clear();
        self.visited_offsets.clear();

        let metadata = match fs::metadata(file_path) {
            Ok(m) => m,
            Err(e) => {
                error!("cannot stat {}: {e}", file_path.display());
                return Vec::new();
            }
        };
        if !metadata.is_file() {
            error!("not a regular file: {}", file_path.display());
            return Vec::new();
        }
        let blob = match fs::read(file_path) {
            Ok(b) => b,
            Err(e) => {
                error!("cannot read {}: {e}", file_path.display());
                return Vec::new();
            }
        };

        let input_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string());
        let extraction_root = self
            .options
            .extraction_root
            .join(format!("{input_name}.extracted"));

        let mut offset = 0usize;
        while offset < blob.len() {
            if !self.visited_offsets.insert(offset) {
                offset += 1;
                continue;
            }

            let accepted = self.dispatch(&blob, offset);
            let Some(mut result) = accepted else {
                offset += 1;
                continue;
            };

            // The parser may have moved the start backward (magic inside
            // the image); from here on its offset is authoritative.
            result.source = file_path.to_string_lossy().into_owned();

            let mut extracted = false;
            if self.options.extract && self.options.recursion_depth > 0 {
                extracted = self.extract_and_recurse(&blob, &mut result, &extraction_root);
            }

            let next_offset = if result.confident {
                result.end()
            } else {
                result.offset + 1
            };

            let whole_file =
                result.offset == 0 && result.length == blob.len() && !extracted;
            if whole_file && !self.options.verbose {
                debug!("ignoring whole-file {} result", result.type_tag);
            } else {
                self.results.push(result);
            }

            offset = next_offset.max(offset);
        }

        std::mem::take(&mut self.results)
    }

    /// Try parsers in registration order at one offset; the first valid
    /// result wins. Parser misbehavior is contained here: a panic is
    /// treated as a rejection.
    fn dispatch(&self, blob: &[u8], offset: usize) -> Option<ScanResult> {
        for parser in self.parsers.iter() {
            if !parser.matches(blob, offset) {
                continue;
            }
            debug!("{} {}", to_hex(offset), parser.name());
            let parsed = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                parser.parse(blob, offset)
            }));
            let result = match parsed {
                Ok(r) => r,
                Err(_) => {
                    warn!("{} parser panicked at offset {}", parser.name(), offset);
                    continue;
                }
            };
            if result.is_valid && result.end() <= blob.len() {
                return Some(result);
            }
        }
        None
    }

    /// Run the extractor selected by the result (if any), then scan
    /// every new regular file under `extraction_root/<hex(offset)>`
    /// with a reduced recursion budget, attaching nested results as
    /// children. Returns true once an extractor was invoked.
    fn extract_and_recurse(
        &mut self,
        blob: &[u8],
        result: &mut ScanResult,
        extraction_root: &Path,
    ) -> bool {
        if result.extractor_type.is_empty() {
            return false;
        }
        let Some(extractor) = self.extractors.find(&result.extractor_type) else {
            return false;
        };

        debug!(
            "using {} extractor with path {}",
            extractor.name(),
            extraction_root.display()
        );
        let hint = (extractor.name() == "RAW").then(|| result.type_tag.to_lowercase());
        if let Err(e) = extractor.extract(blob, result.offset, extraction_root, hint.as_deref()) {
            if e.is_missing_tool() {
                error!("{e}");
            } else {
                warn!("{} extractor failed: {e}", extractor.name());
            }
        }

        let produced = extraction_root.join(to_hex(result.offset));
        self.recurse_into(&produced, result);
        true
    }

    fn recurse_into(&mut self, dir: &Path, result: &mut ScanResult) {
        if !dir.is_dir() {
            return;
        }
        for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path_str = entry.path().to_string_lossy().into_owned();
            if self.already_analyzed.iter().any(|p| p == &path_str) {
                continue;
            }
            self.already_analyzed.push(path_str);
            debug!("recursing into {}", entry.path().display());

            let child_root = entry
                .path()
                .parent()
                .unwrap_or(dir)
                .to_path_buf();
            let child_options = ScanOptions {
                extract: true,
                recursion_depth: self.options.recursion_depth - 1,
                extraction_root: child_root,
                verbose: false,
            };
            let mut child = Scanner::at_depth(child_options, self.current_depth + 1);
            child.already_analyzed = std::mem::take(&mut self.already_analyzed);
            let mut nested = child.scan(entry.path());
            self.already_analyzed = child.already_analyzed;
            result.children.append(&mut nested);
        }
    }
}
