//! Ordered parser and extractor registries.
//!
//! Registration happens once per scanner instance from the central
//! lists in [`crate::parsers::builtin`] and
//! [`crate::extractors::builtin`]; iteration order equals registration
//! order and drives dispatch priority. There is no removal and no
//! mutation after construction.

use crate::extractors::{self, Extractor};
use crate::parsers::{self, Parser};

pub struct ParserRegistry {
    parsers: Vec<Box<dyn Parser>>,
}

impl ParserRegistry {
    /// All builtin parsers in dispatch order.
    pub fn builtin() -> Self {
        Self {
            parsers: parsers::builtin(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Parser> {
        self.parsers.iter().map(AsRef::as_ref)
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn Extractor>>,
}

impl ExtractorRegistry {
    pub fn builtin() -> Self {
        Self {
            extractors: extractors::builtin(),
        }
    }

    /// Look up the extractor selected by a result's `extractor_type`.
    pub fn find(&self, name: &str) -> Option<&dyn Extractor> {
        self.extractors
            .iter()
            .find(|e| e.name() == name)
            .map(AsRef::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_order_is_stable() {
        let a: Vec<&str> = ParserRegistry::builtin().iter().map(|p| p.name()).collect();
        let b: Vec<&str> = ParserRegistry::builtin().iter().map(|p| p.name()).collect();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn every_declared_extractor_type_is_registered() {
        let extractors = ExtractorRegistry::builtin();
        for name in ["GZIP", "LZMA", "7Z", "XZ", "SquashFS", "CramFS", "CPIO", "TAR", "ZIP", "ROMFS", "DTB", "UIMAGE", "RAW"] {
            assert!(extractors.find(name).is_some(), "missing extractor {name}");
        }
        assert!(extractors.find("NOPE").is_none());
    }
}
