use crate::error::{PdfError, Result};

/// Byte encodings for text shown with the standard fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    StandardEncoding,
    WinAnsiEncoding,
}

impl TextEncoding {
    /// Encodes text, replacing unmappable characters with `?`.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        text.chars()
            .map(|ch| self.encode_char(ch).unwrap_or(b'?'))
            .collect()
    }

    /// Encodes text, failing on the first unmappable character.
    pub fn encode_strict(&self, text: &str) -> Result<Vec<u8>> {
        text.chars()
            .map(|ch| {
                self.encode_char(ch).ok_or_else(|| {
                    PdfError::EncodingError(format!(
                        "character {ch:?} has no {} mapping",
                        self.pdf_name()
                    ))
                })
            })
            .collect()
    }

    pub fn pdf_name(&self) -> &'static str {
        match self {
            TextEncoding::StandardEncoding => "StandardEncoding",
            TextEncoding::WinAnsiEncoding => "WinAnsiEncoding",
        }
    }

    fn encode_char(&self, ch: char) -> Option<u8> {
        match self {
            TextEncoding::StandardEncoding => {
                if ch.is_ascii() {
                    Some(ch as u8)
                } else {
                    None
                }
            }
            TextEncoding::WinAnsiEncoding => match ch as u32 {
                // ASCII and the Latin-1 range shared with CP1252
                0x00..=0x7F | 0xA0..=0xFF => Some(ch as u32 as u8),
                // CP1252-specific mappings in the 0x80..0x9F window
                0x20AC => Some(0x80), // Euro sign
                0x201A => Some(0x82), // Single low quotation mark
                0x0192 => Some(0x83), // Latin small letter f with hook
                0x201E => Some(0x84), // Double low quotation mark
                0x2026 => Some(0x85), // Horizontal ellipsis
                0x2020 => Some(0x86), // Dagger
                0x2021 => Some(0x87), // Double dagger
                0x02C6 => Some(0x88), // Circumflex accent
                0x2030 => Some(0x89), // Per mille sign
                0x0160 => Some(0x8A), // S with caron
                0x2039 => Some(0x8B), // Single left angle quotation mark
                0x0152 => Some(0x8C), // Ligature OE
                0x017D => Some(0x8E), // Z with caron
                0x2018 => Some(0x91), // Left single quotation mark
                0x2019 => Some(0x92), // Right single quotation mark
                0x201C => Some(0x93), // Left double quotation mark
                0x201D => Some(0x94), // Right double quotation mark
                0x2022 => Some(0x95), // Bullet
                0x2013 => Some(0x96), // En dash
                0x2014 => Some(0x97), // Em dash
                0x02DC => Some(0x98), // Small tilde
                0x2122 => Some(0x99), // Trade mark sign
                0x0161 => Some(0x9A), // s with caron
                0x203A => Some(0x9B), // Single right angle quotation mark
                0x0153 => Some(0x9C), // Ligature oe
                0x017E => Some(0x9E), // z with caron
                0x0178 => Some(0x9F), // Y with diaeresis
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        let bytes = TextEncoding::WinAnsiEncoding.encode("Hello!");
        assert_eq!(bytes, b"Hello!");
    }

    #[test]
    fn test_winansi_special_chars() {
        let bytes = TextEncoding::WinAnsiEncoding.encode("\u{20AC}\u{2013}");
        assert_eq!(bytes, vec![0x80, 0x96]);
    }

    #[test]
    fn test_latin1_range() {
        let bytes = TextEncoding::WinAnsiEncoding.encode("café");
        assert_eq!(bytes, vec![b'c', b'a', b'f', 0xE9]);
    }

    #[test]
    fn test_lossy_replacement() {
        let bytes = TextEncoding::WinAnsiEncoding.encode("a\u{4E2D}b");
        assert_eq!(bytes, b"a?b");
    }

    #[test]
    fn test_encode_strict_fails_on_unmappable() {
        let err = TextEncoding::WinAnsiEncoding
            .encode_strict("\u{4E2D}")
            .unwrap_err();
        assert!(matches!(err, PdfError::EncodingError(_)));

        let ok = TextEncoding::WinAnsiEncoding.encode_strict("plain").unwrap();
        assert_eq!(ok, b"plain");
    }

    #[test]
    fn test_standard_encoding_ascii_only() {
        assert_eq!(TextEncoding::StandardEncoding.encode("abc"), b"abc");
        assert_eq!(TextEncoding::StandardEncoding.encode("é"), b"?");
    }
}
