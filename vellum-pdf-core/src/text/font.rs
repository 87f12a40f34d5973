use crate::error::{PdfError, Result};

/// PDF font encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FontEncoding {
    /// Windows ANSI encoding (CP1252), the common choice for text fonts
    WinAnsiEncoding,
    /// Apple Macintosh Roman encoding
    MacRomanEncoding,
    /// Adobe Standard encoding
    StandardEncoding,
}

impl FontEncoding {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            FontEncoding::WinAnsiEncoding => "WinAnsiEncoding",
            FontEncoding::MacRomanEncoding => "MacRomanEncoding",
            FontEncoding::StandardEncoding => "StandardEncoding",
        }
    }
}

/// The standard 14 PDF fonts.
///
/// Guaranteed to be available in all PDF readers; never embedded. Custom
/// fonts are embedded through [`EmbeddedFont`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Font {
    /// Helvetica (sans-serif)
    Helvetica,
    /// Helvetica Bold
    HelveticaBold,
    /// Helvetica Oblique (italic)
    HelveticaOblique,
    /// Helvetica Bold Oblique
    HelveticaBoldOblique,
    /// Times Roman (serif)
    TimesRoman,
    /// Times Bold
    TimesBold,
    /// Times Italic
    TimesItalic,
    /// Times Bold Italic
    TimesBoldItalic,
    /// Courier (monospace)
    Courier,
    /// Courier Bold
    CourierBold,
    /// Courier Oblique
    CourierOblique,
    /// Courier Bold Oblique
    CourierBoldOblique,
    /// Symbol font (mathematical symbols)
    Symbol,
    /// ZapfDingbats (decorative symbols)
    ZapfDingbats,
}

impl Font {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
            Font::HelveticaOblique => "Helvetica-Oblique",
            Font::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Font::TimesRoman => "Times-Roman",
            Font::TimesBold => "Times-Bold",
            Font::TimesItalic => "Times-Italic",
            Font::TimesBoldItalic => "Times-BoldItalic",
            Font::Courier => "Courier",
            Font::CourierBold => "Courier-Bold",
            Font::CourierOblique => "Courier-Oblique",
            Font::CourierBoldOblique => "Courier-BoldOblique",
            Font::Symbol => "Symbol",
            Font::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Symbolic fonts don't take a text encoding.
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Font::Symbol | Font::ZapfDingbats)
    }
}

/// A typeface family resolvable to a concrete styled [`Font`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFamily {
    Helvetica,
    Times,
    Courier,
}

impl FontFamily {
    /// The family member matching the given bold/italic style.
    pub fn styled(&self, bold: bool, italic: bool) -> Font {
        match (self, bold, italic) {
            (FontFamily::Helvetica, false, false) => Font::Helvetica,
            (FontFamily::Helvetica, true, false) => Font::HelveticaBold,
            (FontFamily::Helvetica, false, true) => Font::HelveticaOblique,
            (FontFamily::Helvetica, true, true) => Font::HelveticaBoldOblique,
            (FontFamily::Times, false, false) => Font::TimesRoman,
            (FontFamily::Times, true, false) => Font::TimesBold,
            (FontFamily::Times, false, true) => Font::TimesItalic,
            (FontFamily::Times, true, true) => Font::TimesBoldItalic,
            (FontFamily::Courier, false, false) => Font::Courier,
            (FontFamily::Courier, true, false) => Font::CourierBold,
            (FontFamily::Courier, false, true) => Font::CourierOblique,
            (FontFamily::Courier, true, true) => Font::CourierBoldOblique,
        }
    }

    pub fn regular(&self) -> Font {
        self.styled(false, false)
    }
}

/// Numeric font descriptor entries for an embedded font.
///
/// Values come from a collaborator font loader; the engine does not parse
/// font container formats.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    pub flags: u32,
    pub font_bbox: [f64; 4],
    pub italic_angle: f64,
    pub ascent: f64,
    pub descent: f64,
    pub cap_height: f64,
    pub stem_v: f64,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            flags: 32, // nonsymbolic
            font_bbox: [0.0, -200.0, 1000.0, 900.0],
            italic_angle: 0.0,
            ascent: 800.0,
            descent: -200.0,
            cap_height: 700.0,
            stem_v: 80.0,
        }
    }
}

/// A custom font embedded as a TrueType program.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedFont {
    pub(crate) name: String,
    pub(crate) program: Vec<u8>,
    pub(crate) first_char: u8,
    pub(crate) widths: Vec<u16>,
    pub(crate) descriptor: FontDescriptor,
}

impl EmbeddedFont {
    /// Wraps a decoded TrueType program plus its metrics.
    ///
    /// `widths` are advance widths in 1/1000 units for the consecutive
    /// character codes starting at `first_char`.
    pub fn new(
        name: impl Into<String>,
        program: Vec<u8>,
        first_char: u8,
        widths: Vec<u16>,
        descriptor: FontDescriptor,
    ) -> Result<Self> {
        let name = name.into();
        if program.is_empty() {
            return Err(PdfError::InvalidResource(format!(
                "font {name}: empty font program"
            )));
        }
        if widths.is_empty() {
            return Err(PdfError::InvalidResource(format!(
                "font {name}: no glyph widths"
            )));
        }
        if first_char as usize + widths.len() > 256 {
            return Err(PdfError::InvalidResource(format!(
                "font {name}: widths run past character code 255"
            )));
        }
        Ok(Self {
            name,
            program,
            first_char,
            widths,
            descriptor,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn last_char(&self) -> u8 {
        self.first_char + (self.widths.len() - 1) as u8
    }
}

/// Everything the resource manager needs to register a font.
#[derive(Debug, Clone, PartialEq)]
pub enum FontSpec {
    /// One of the standard 14 fonts, with an optional explicit encoding
    Standard {
        font: Font,
        encoding: Option<FontEncoding>,
    },
    /// A collaborator-decoded font to embed
    Embedded(EmbeddedFont),
}

impl FontSpec {
    pub fn standard(font: Font) -> Self {
        FontSpec::Standard {
            font,
            encoding: None,
        }
    }

    pub fn standard_with_encoding(font: Font, encoding: FontEncoding) -> Self {
        FontSpec::Standard {
            font,
            encoding: Some(encoding),
        }
    }

    /// Font identity plus encoding/subsetting parameters, for dedup.
    pub(crate) fn fingerprint_bytes(&self) -> Vec<u8> {
        match self {
            FontSpec::Standard { font, encoding } => {
                let mut bytes = Vec::with_capacity(32);
                bytes.extend_from_slice(font.pdf_name().as_bytes());
                bytes.push(0);
                if let Some(enc) = encoding {
                    bytes.extend_from_slice(enc.pdf_name().as_bytes());
                }
                bytes
            }
            FontSpec::Embedded(font) => {
                let mut bytes = Vec::with_capacity(font.program.len() + 64);
                bytes.extend_from_slice(font.name.as_bytes());
                bytes.push(0);
                bytes.push(font.first_char);
                for w in &font.widths {
                    bytes.extend_from_slice(&w.to_be_bytes());
                }
                bytes.extend_from_slice(&font.program);
                bytes
            }
        }
    }
}

impl From<Font> for FontSpec {
    fn from(font: Font) -> Self {
        FontSpec::standard(font)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_names() {
        assert_eq!(Font::Helvetica.pdf_name(), "Helvetica");
        assert_eq!(Font::TimesBoldItalic.pdf_name(), "Times-BoldItalic");
        assert_eq!(Font::ZapfDingbats.pdf_name(), "ZapfDingbats");
    }

    #[test]
    fn test_symbolic_fonts() {
        assert!(Font::Symbol.is_symbolic());
        assert!(Font::ZapfDingbats.is_symbolic());
        assert!(!Font::Courier.is_symbolic());
    }

    #[test]
    fn test_family_styling() {
        assert_eq!(FontFamily::Helvetica.styled(true, false), Font::HelveticaBold);
        assert_eq!(FontFamily::Times.styled(false, true), Font::TimesItalic);
        assert_eq!(
            FontFamily::Courier.styled(true, true),
            Font::CourierBoldOblique
        );
        assert_eq!(FontFamily::Times.regular(), Font::TimesRoman);
    }

    #[test]
    fn test_embedded_font_validation() {
        let descriptor = FontDescriptor::default();

        let err = EmbeddedFont::new("Empty", vec![], 32, vec![500], descriptor.clone());
        assert!(matches!(err, Err(PdfError::InvalidResource(_))));

        let err = EmbeddedFont::new("NoWidths", vec![0, 1], 32, vec![], descriptor.clone());
        assert!(matches!(err, Err(PdfError::InvalidResource(_))));

        let err = EmbeddedFont::new("TooWide", vec![0, 1], 250, vec![500; 10], descriptor.clone());
        assert!(matches!(err, Err(PdfError::InvalidResource(_))));

        let font = EmbeddedFont::new("Ok", vec![0, 1], 32, vec![500; 95], descriptor).unwrap();
        assert_eq!(font.last_char(), 126);
    }

    #[test]
    fn test_fingerprint_separates_encodings() {
        let plain = FontSpec::standard(Font::Helvetica);
        let win = FontSpec::standard_with_encoding(Font::Helvetica, FontEncoding::WinAnsiEncoding);
        assert_ne!(plain.fingerprint_bytes(), win.fingerprint_bytes());
        assert_eq!(plain.fingerprint_bytes(), plain.fingerprint_bytes());
    }
}
