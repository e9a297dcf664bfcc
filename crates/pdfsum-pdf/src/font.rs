use lopdf::{Dictionary, Document, Object};

use crate::cmap::{ToUnicode, code_of};

/// Maps the bytes of shown strings to Unicode for one font.
///
/// Order of preference:
/// 1. the font's `/ToUnicode` CMap, when present;
/// 2. for composite (`Type0`, `Identity-H`/`Identity-V`) fonts without one,
///    two-byte codes read as UTF-16BE code units;
/// 3. the simple-font `/Encoding` (or its `/BaseEncoding`) through
///    [`Document::decode_text`], with `StandardEncoding` as the default.
///
/// Strings starting with a UTF-16BE byte-order mark are decoded as UTF-16
/// for simple fonts and when no font is selected.
#[derive(Debug, Clone, Default)]
pub(crate) struct FontDecoder {
    encoding: Option<String>,
    two_byte: bool,
    to_unicode: Option<ToUnicode>,
}

impl FontDecoder {
    pub(crate) fn from_font(document: &Document, font: &Dictionary) -> Self {
        let subtype = font.get(b"Subtype").and_then(Object::as_name).ok();
        let encoding = encoding_name(document, font);
        let two_byte = subtype == Some(b"Type0".as_slice())
            || encoding.as_deref().is_some_and(|e| e.starts_with("Identity"));

        let to_unicode = font
            .get(b"ToUnicode")
            .and_then(|o| document.dereference(o))
            .and_then(|(_, o)| o.as_stream())
            .ok()
            .map(|stream| {
                let data = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                ToUnicode::parse(&data)
            })
            .filter(|cmap| !cmap.is_empty());

        Self {
            encoding,
            two_byte,
            to_unicode,
        }
    }

    pub(crate) fn decode(&self, bytes: &[u8]) -> String {
        if let Some(cmap) = &self.to_unicode {
            let width = if self.two_byte { 2 } else { cmap.code_width() };
            return bytes
                .chunks(width)
                .map(|code| {
                    cmap.lookup(code_of(code))
                        .unwrap_or_else(|| self.decode_unmapped(code))
                })
                .collect();
        }
        if self.two_byte {
            return utf16_lossy(bytes);
        }
        if bytes.starts_with(&[0xFE, 0xFF]) {
            return utf16_lossy(&bytes[2..]);
        }
        Document::decode_text(Some(self.encoding.as_deref().unwrap_or("StandardEncoding")), bytes)
    }

    /// A code the ToUnicode map does not cover.
    fn decode_unmapped(&self, code: &[u8]) -> String {
        if self.two_byte {
            utf16_lossy(code)
        } else {
            Document::decode_text(Some(self.encoding.as_deref().unwrap_or("StandardEncoding")), code)
        }
    }

    pub(crate) fn decode_object(&self, object: &Object) -> Option<String> {
        match object {
            Object::String(bytes, _) => Some(self.decode(bytes)),
            _ => None,
        }
    }
}

/// The font's encoding name, or the `/BaseEncoding` of an encoding dictionary.
fn encoding_name(document: &Document, font: &Dictionary) -> Option<String> {
    let (_, encoding) = document.dereference(font.get(b"Encoding").ok()?).ok()?;
    match encoding {
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        Object::Dictionary(dict) => dict
            .get(b"BaseEncoding")
            .and_then(Object::as_name_str)
            .ok()
            .map(str::to_owned),
        _ => None,
    }
}

fn utf16_lossy(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn default_decoder_uses_standard_encoding() {
        let decoder = FontDecoder::default();
        assert_eq!(decoder.decode(b"Hello"), "Hello");
        // 0x27 is quoteright in StandardEncoding
        assert_eq!(decoder.decode(b"it's"), "it\u{2019}s");
    }

    #[test]
    fn bom_strings_are_utf16() {
        let decoder = FontDecoder::default();
        assert_eq!(decoder.decode(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0xE9]), "Hé");
    }

    #[test]
    fn win_ansi_font_maps_typographic_bytes() {
        let doc = Document::with_version("1.5");
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "Encoding" => "WinAnsiEncoding",
        };
        let decoder = FontDecoder::from_font(&doc, &font);
        assert_eq!(decoder.decode(b"\x93Hi\x94 \x97 \x80 5"), "“Hi” — € 5");
    }

    #[test]
    fn encoding_dictionary_uses_base_encoding() {
        let doc = Document::with_version("1.5");
        let font = dictionary! {
            "Subtype" => "Type1",
            "Encoding" => dictionary! {
                "Type" => "Encoding",
                "BaseEncoding" => "MacRomanEncoding",
            },
        };
        let decoder = FontDecoder::from_font(&doc, &font);
        // 0x8E is eacute in MacRoman
        assert_eq!(decoder.decode(b"caf\x8E"), "café");
    }

    #[test]
    fn identity_font_without_to_unicode_reads_utf16_units() {
        let doc = Document::with_version("1.5");
        let font = dictionary! {
            "Subtype" => "Type0",
            "Encoding" => "Identity-H",
        };
        let decoder = FontDecoder::from_font(&doc, &font);
        assert_eq!(decoder.decode(&[0x00, 0x41, 0x00, 0x42]), "AB");
    }
}
