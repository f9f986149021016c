//! Text encodings for XML documents
//!
//! Labels are looked up in the WHATWG registry of `encoding_rs`, so any
//! charset a site descriptor is likely to declare (windows-1252,
//! ISO-8859-15, Shift_JIS, UTF-16 with a byte order mark, ...) can be read.
//! ISO-8859-1 is kept exact: WHATWG folds that label into windows-1252,
//! which disagrees with Latin-1 in the 0x80..0x9F range.

use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

static DECLARED_ENCODING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*<\?xml[^>]*?encoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#)
        .expect("static regex is valid")
});

const LATIN1_LABELS: &[&str] = &[
    "iso-8859-1",
    "iso8859-1",
    "iso_8859-1",
    "iso_8859_1",
    "iso88591",
    "latin1",
    "latin-1",
    "l1",
    "cp819",
    "ibm819",
    "iso-ir-100",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Latin1,
    /// Any other encoding known to `encoding_rs`
    Other(&'static Encoding),
}

impl TextEncoding {
    /// Look up an encoding by label. Java style `CpNNNN` aliases are
    /// accepted as `windows-NNNN`.
    pub fn from_label(label: &str) -> Result<Self> {
        let normalized = label.trim().to_ascii_lowercase();
        if LATIN1_LABELS.contains(&normalized.as_str()) {
            return Ok(Self::Latin1);
        }
        let lookup = match normalized.strip_prefix("cp") {
            Some(code) if !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit()) => {
                format!("windows-{}", code)
            }
            _ => normalized,
        };
        match Encoding::for_label(lookup.as_bytes()) {
            Some(encoding) if encoding == encoding_rs::REPLACEMENT => {
                Err(CoreError::UnsupportedEncoding {
                    label: label.to_string(),
                })
            }
            Some(encoding) => Ok(Self::from_encoding(encoding)),
            None => Err(CoreError::UnsupportedEncoding {
                label: label.to_string(),
            }),
        }
    }

    pub fn from_encoding(encoding: &'static Encoding) -> Self {
        if encoding == encoding_rs::UTF_8 {
            Self::Utf8
        } else {
            Self::Other(encoding)
        }
    }

    /// Canonical label of the encoding written out, as used in an XML
    /// declaration. Encodings without an encoder (UTF-16) are written as
    /// UTF-8.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Latin1 => "ISO-8859-1",
            Self::Other(encoding) => encoding.output_encoding().name(),
        }
    }

    /// Decode bytes that carry no byte order mark
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        match self {
            Self::Latin1 => Ok(encoding_rs::mem::decode_latin1(bytes).into_owned()),
            Self::Utf8 => {
                let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                decode_strict(encoding_rs::UTF_8, bytes)
            }
            Self::Other(encoding) => decode_strict(encoding, bytes),
        }
    }

    /// Encode XML text. Characters outside the encoding become numeric
    /// character references, which is only valid inside content and
    /// attribute values.
    pub fn encode_xml(&self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Latin1 => encode_latin1(text),
            Self::Other(encoding) => encoding.encode(text).0.into_owned(),
        }
    }

    /// Encoding named by the XML declaration at the start of `bytes`, if any
    pub fn declared(bytes: &[u8]) -> Option<String> {
        let head = &bytes[..bytes.len().min(256)];
        let head = head.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(head);
        DECLARED_ENCODING
            .captures(head)
            .and_then(|c| c.get(1))
            .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
    }

    /// Decode an XML document. A byte order mark wins, then the declared
    /// encoding, then `fallback`.
    pub fn decode_document(bytes: &[u8], fallback: TextEncoding) -> Result<String> {
        if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
            return Self::from_encoding(encoding).decode(&bytes[bom_length..]);
        }
        let encoding = match Self::declared(bytes) {
            // a declaration readable as ASCII rules out UTF-16 without a BOM
            Some(label) => match Self::from_label(&label)? {
                Self::Other(encoding) if !encoding.is_ascii_compatible() => Self::Utf8,
                encoding => encoding,
            },
            None => fallback,
        };
        encoding.decode(bytes)
    }
}

fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> Result<String> {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(CoreError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("malformed {} input", encoding.name()),
        )));
    }
    Ok(text.into_owned())
}

fn encode_latin1(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut rest = text;
    loop {
        let valid = encoding_rs::mem::str_latin1_up_to(rest);
        out.extend_from_slice(&encoding_rs::mem::encode_latin1_lossy(&rest[..valid]));
        let mut chars = rest[valid..].chars();
        match chars.next() {
            Some(c) => {
                out.extend_from_slice(format!("&#{};", u32::from(c)).as_bytes());
                rest = chars.as_str();
            }
            None => return out,
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TextEncoding {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(TextEncoding::from_label("UTF-8").unwrap(), TextEncoding::Utf8);
        assert_eq!(
            TextEncoding::from_label("iso-8859-1").unwrap(),
            TextEncoding::Latin1
        );
        assert_eq!(
            TextEncoding::from_label("ISO-8859-15").unwrap().label(),
            "ISO-8859-15"
        );
        assert_eq!(
            TextEncoding::from_label("Cp1252").unwrap(),
            TextEncoding::Other(encoding_rs::WINDOWS_1252)
        );
        assert!(TextEncoding::from_label("EBCDIC").is_err());
        assert!(TextEncoding::from_label("iso-2022-kr").is_err());
    }

    #[test]
    fn test_utf16_is_written_as_utf8() {
        let encoding = TextEncoding::from_label("UTF-16").unwrap();
        assert_eq!(encoding.label(), "UTF-8");
    }

    #[test]
    fn test_declared_encoding() {
        let xml = br#"<?xml version="1.0" encoding="ISO-8859-1"?><project/>"#;
        assert_eq!(TextEncoding::declared(xml).as_deref(), Some("ISO-8859-1"));
        assert_eq!(TextEncoding::declared(b"<project/>"), None);
    }

    #[test]
    fn test_latin1_round_trip_with_references() {
        let bytes = TextEncoding::Latin1.encode_xml("caf\u{e9} \u{2603}");
        assert_eq!(bytes, b"caf\xE9 &#9731;".to_vec());
        let text = TextEncoding::Latin1.decode(b"caf\xE9").unwrap();
        assert_eq!(text, "caf\u{e9}");
    }

    #[test]
    fn test_latin1_keeps_c1_range() {
        let text = TextEncoding::Latin1.decode(b"\x80").unwrap();
        assert_eq!(text, "\u{80}");
    }

    #[test]
    fn test_windows_1252_encodes_with_references() {
        let encoding = TextEncoding::from_label("windows-1252").unwrap();
        assert_eq!(encoding.encode_xml("\u{20ac}5 \u{2603}"), b"\x805 &#9731;".to_vec());
        assert_eq!(encoding.decode(b"\x805").unwrap(), "\u{20ac}5");
    }

    #[test]
    fn test_decode_document_prefers_declaration() {
        let bytes = b"<?xml version='1.0' encoding='ISO-8859-1'?><a>\xE9</a>";
        let text = TextEncoding::decode_document(bytes, TextEncoding::Utf8).unwrap();
        assert!(text.contains('\u{e9}'));

        let bytes = b"<?xml version='1.0' encoding='windows-1252'?><a>\x80</a>";
        let text = TextEncoding::decode_document(bytes, TextEncoding::Utf8).unwrap();
        assert!(text.contains('\u{20ac}'));
    }

    #[test]
    fn test_decode_document_honours_byte_order_mark() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "<a>\u{e9}</a>".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let text = TextEncoding::decode_document(&bytes, TextEncoding::Latin1).unwrap();
        assert_eq!(text, "<a>\u{e9}</a>");
    }

    #[test]
    fn test_malformed_utf8_is_an_error() {
        assert!(TextEncoding::Utf8.decode(b"caf\xE9").is_err());
    }
}
