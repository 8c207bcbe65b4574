/// Shared data model returned by every parser and nested by the scanner.
///
/// A parser fills in everything except `source` and `children`, which
/// belong to the scanner: `source` is attached when a result is
/// finalized, `children` when nested scans of extracted artifacts
/// return. The parent exclusively owns its children.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Byte offset within the current blob where the structure begins.
    /// A parser may place this *before* the offset it was asked to
    /// parse when the magic sits inside the image (DMG trailer, ARM
    /// zImage); the scanner adopts the returned value.
    pub offset: usize,
    /// Short uppercase tag naming the format, e.g. `"PNG"`.
    pub type_tag: String,
    /// Tag selecting the extractor to invoke; empty means not
    /// extractable. Often equals `type_tag` but may differ (a FAT image
    /// dispatches to the external archiver labelled `"7Z"`).
    pub extractor_type: String,
    /// Best-known length in bytes, always clamped so that
    /// `offset + length <= blob.len()`.
    pub length: usize,
    /// Free-form human-readable summary. Never parsed by the scanner.
    pub info: String,
    /// Originating file path, populated by the scanner.
    pub source: String,
    /// When true the scanner advances by `length` after accepting the
    /// result; when false it advances one byte (heuristic matchers).
    pub confident: bool,
    /// Only valid results reach the output or the extractors.
    pub is_valid: bool,
    /// Nested results from recursion into extracted artifacts.
    pub children: Vec<ScanResult>,
}

impl ScanResult {
    pub fn new(offset: usize, type_tag: &str) -> Self {
        Self {
            offset,
            type_tag: type_tag.to_string(),
            extractor_type: String::new(),
            length: 0,
            info: String::new(),
            source: String::new(),
            confident: true,
            is_valid: false,
            children: Vec::new(),
        }
    }

    /// One past the last byte covered by this result.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

impl Default for ScanResult {
    fn default() -> Self {
        Self::new(0, "")
    }
}
