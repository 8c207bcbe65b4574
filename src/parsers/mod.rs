//! Format parsers.
//!
//! One module per format. Each implements the [`Parser`] contract: a
//! cheap `matches` discriminator reading a small bounded prefix, and a
//! fuller `parse` that returns a validated [`ScanResult`]. Parsers are
//! stateless pure functions over the blob; they never touch the
//! filesystem and never panic on malformed input.

mod aes;
mod arj;
mod bmp;
mod bzip2;
mod cab;
mod copyright;
mod cpio;
mod cramfs;
mod crc;
mod dmg;
mod dtb;
mod elf;
mod fat;
mod gif;
mod gzip;
mod jpg;
mod linux;
mod lzma;
mod mbr;
mod pdf;
mod pe;
mod png;
mod rar;
mod romfs;
mod sevenzip;
mod squashfs;
mod svg;
mod tar;
mod uimage;
mod xz;
mod zip;

use crate::result::ScanResult;

/// Uniform capability implemented by every format parser.
pub trait Parser {
    /// Short tag naming the format.
    fn name(&self) -> &'static str;

    /// Cheap O(1) discriminator at `offset`. May read only a small
    /// bounded prefix. False positives are acceptable; false negatives
    /// for well-formed input are not.
    fn matches(&self, blob: &[u8], offset: usize) -> bool;

    /// Full validation. Invalid input is reported with
    /// `is_valid = false` and a descriptive `info`, never via panic.
    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult;
}

/// The builtin parsers in dispatch order. When two parsers could match
/// the same offset, the earlier entry wins; strong magics come first,
/// heuristic text and table matchers last.
pub fn builtin() -> Vec<Box<dyn Parser>> {
    vec![
        Box::new(gzip::GzipParser),
        Box::new(xz::XzParser),
        Box::new(bzip2::Bzip2Parser),
        Box::new(sevenzip::SevenZipParser),
        Box::new(zip::ZipParser),
        Box::new(rar::RarParser),
        Box::new(arj::ArjParser),
        Box::new(cab::CabParser),
        Box::new(tar::TarParser),
        Box::new(cpio::CpioParser),
        Box::new(lzma::LzmaParser),
        Box::new(squashfs::SquashfsParser),
        Box::new(cramfs::CramfsParser),
        Box::new(romfs::RomfsParser),
        Box::new(fat::FatParser),
        Box::new(mbr::MbrParser),
        Box::new(uimage::UimageParser),
        Box::new(dtb::DtbParser),
        Box::new(dmg::DmgParser),
        Box::new(elf::ElfParser),
        Box::new(pe::PeParser),
        Box::new(linux::LinuxKernelParser),
        Box::new(png::PngParser),
        Box::new(gif::GifParser),
        Box::new(jpg::JpgParser),
        Box::new(bmp::BmpParser),
        Box::new(pdf::PdfParser),
        Box::new(svg::SvgParser),
        Box::new(copyright::CopyrightParser),
        Box::new(aes::AesParser),
        Box::new(crc::CrcParser),
    ]
}
