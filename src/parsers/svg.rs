//! SVG recognition: an opening `<svg` tag, optionally preceded by
//! whitespace and an XML declaration, closed by `</svg ...>`.

use crate::parsers::Parser;
use crate::result::ScanResult;

pub struct SvgParser;

fn skip_whitespace(blob: &[u8], mut i: usize) -> usize {
    while i < blob.len() && blob[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Skip an `<?xml ...?>` declaration if one starts at `i`. `None` on a
/// truncated declaration.
fn skip_xml_declaration(blob: &[u8], i: usize) -> Option<usize> {
    if i + 5 >= blob.len()
        || blob[i] != b'<'
        || blob[i + 1] != b'?'
        || !blob[i + 2].eq_ignore_ascii_case(&b'x')
        || !blob[i + 3].eq_ignore_ascii_case(&b'm')
        || !blob[i + 4].eq_ignore_ascii_case(&b'l')
    {
        return Some(i);
    }
    let mut end = i;
    while end + 1 < blob.len() && !(blob[end] == b'?' && blob[end + 1] == b'>') {
        end += 1;
    }
    if end + 2 >= blob.len() {
        return None;
    }
    Some(skip_whitespace(blob, end + 2))
}

fn opens_svg_tag(blob: &[u8], i: usize) -> bool {
    if i + 4 >= blob.len() || blob[i] != b'<' {
        return false;
    }
    if !blob[i + 1].eq_ignore_ascii_case(&b's')
        || !blob[i + 2].eq_ignore_ascii_case(&b'v')
        || !blob[i + 3].eq_ignore_ascii_case(&b'g')
    {
        return false;
    }
    let next = blob[i + 4];
    next.is_ascii_whitespace() || next == b'>' || next == b'/'
}

impl Parser for SvgParser {
    fn name(&self) -> &'static str {
        "SVG"
    }

    fn matches(&self, blob: &[u8], offset: usize) -> bool {
        if offset >= blob.len() {
            return false;
        }
        let i = skip_whitespace(blob, offset);
        let Some(i) = skip_xml_declaration(blob, i) else {
            return false;
        };
        opens_svg_tag(blob, i)
    }

    fn parse(&self, blob: &[u8], offset: usize) -> ScanResult {
        let mut r = ScanResult::new(offset, "SVG");
        r.extractor_type = "RAW".to_string();

        let start = skip_whitespace(blob, offset);
        let Some(start) = skip_xml_declaration(blob, start) else {
            r.info = "Truncated XML declaration".to_string();
            r.length = blob.len() - offset;
            return r;
        };

        // Find the closing </svg ...> tag, case-insensitively.
        let end_tag = b"</svg";
        let mut pos = start;
        let mut end_pos = None;
        'search: while pos + end_tag.len() <= blob.len() {
            let candidate = &blob[pos..pos + end_tag.len()];
            if candidate
                .iter()
                .zip(end_tag)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
            {
                let mut k = pos + end_tag.len();
                while k < blob.len() {
                    if blob[k] == b'>' {
                        end_pos = Some(k);
                        break 'search;
                    }
                    k += 1;
                }
            }
            pos += 1;
        }

        match end_pos {
            Some(end) => {
                r.length = end - offset;
                r.is_valid = true;
                r.info = "SVG image".to_string();
            }
            None => {
                r.info = "Truncated SVG (no closing </svg>)".to_string();
                r.length = blob.len() - offset;
            }
        }
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_with_xml_declaration() {
        let data = b"<?xml version=\"1.0\"?>\n<svg xmlns=\"x\"><rect/></svg>".to_vec();
        assert!(SvgParser.matches(&data, 0));
        let r = SvgParser.parse(&data, 0);
        assert!(r.is_valid);
        assert_eq!(r.length, data.len() - 1);
    }

    #[test]
    fn bare_svg_tag_matches() {
        let data = b"  <SVG viewBox=\"0 0 1 1\"></SVG>".to_vec();
        assert!(SvgParser.matches(&data, 0));
        let r = SvgParser.parse(&data, 0);
        assert!(r.is_valid);
    }

    #[test]
    fn svgfoo_tag_does_not_match() {
        let data = b"<svgfoo></svgfoo>".to_vec();
        assert!(!SvgParser.matches(&data, 0));
    }

    #[test]
    fn unterminated_svg_is_invalid() {
        let data = b"<svg><rect/>".to_vec();
        let r = SvgParser.parse(&data, 0);
        assert!(!r.is_valid);
        assert!(r.info.contains("Truncated"), "{}", r.info);
    }
}
