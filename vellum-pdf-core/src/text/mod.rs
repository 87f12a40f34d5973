mod encoding;
mod flow;
mod font;
pub mod layout;
mod markdown;
mod metrics;

pub use encoding::TextEncoding;
pub use flow::{TextAlign, TextFlowContext};
pub use font::{EmbeddedFont, Font, FontDescriptor, FontEncoding, FontFamily, FontSpec};
pub use layout::{Fragment, MultiLineBreak, TextLine, SOFT_HYPHEN};
pub use markdown::parse_markdown;
pub use metrics::{measure_char, measure_text};

use crate::error::{PdfError, Result};
use crate::resources::ResourceRef;
use std::collections::BTreeSet;
use std::fmt::Write;

/// Appends a paren-delimited PDF literal string to an operator buffer.
pub(crate) fn append_literal_string(operations: &mut String, bytes: &[u8]) {
    operations.push('(');
    for &byte in bytes {
        match byte {
            b'(' => operations.push_str("\\("),
            b')' => operations.push_str("\\)"),
            b'\\' => operations.push_str("\\\\"),
            b'\n' => operations.push_str("\\n"),
            b'\r' => operations.push_str("\\r"),
            b'\t' => operations.push_str("\\t"),
            // printable ASCII as-is
            0x20..=0x7E => operations.push(byte as char),
            // everything else as octal escapes
            _ => write!(operations, "\\{byte:03o}").unwrap(),
        }
    }
    operations.push(')');
}

/// Accumulates page text operators in emission order.
#[derive(Debug, Clone)]
pub struct TextContext {
    operations: String,
    current_font: Font,
    current_font_name: String,
    font_size: f64,
    position: (f64, f64),
    used_fonts: BTreeSet<Font>,
    used_refs: BTreeSet<ResourceRef>,
}

impl Default for TextContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TextContext {
    pub fn new() -> Self {
        Self {
            operations: String::new(),
            current_font: Font::Helvetica,
            current_font_name: Font::Helvetica.pdf_name().to_string(),
            font_size: 12.0,
            position: (0.0, 0.0),
            used_fonts: BTreeSet::new(),
            used_refs: BTreeSet::new(),
        }
    }

    /// Selects one of the standard 14 fonts.
    pub fn set_font(&mut self, font: Font, size: f64) -> &mut Self {
        self.current_font = font;
        self.current_font_name = font.pdf_name().to_string();
        self.font_size = size;
        self.used_fonts.insert(font);
        self
    }

    /// Selects a registered embedded font by its resource handle.
    pub fn set_embedded_font(&mut self, font: ResourceRef, size: f64) -> Result<&mut Self> {
        if !font.is_font() {
            return Err(PdfError::InvalidResource(format!(
                "{} is not a font resource",
                font.name()
            )));
        }
        self.current_font_name = font.name();
        self.font_size = size;
        self.used_refs.insert(font);
        Ok(self)
    }

    pub fn at(&mut self, x: f64, y: f64) -> &mut Self {
        self.position = (x, y);
        self
    }

    pub fn current_font(&self) -> Font {
        self.current_font
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    /// Shows text at the current position.
    pub fn write(&mut self, text: &str) -> Result<&mut Self> {
        self.operations.push_str("BT\n");

        writeln!(
            &mut self.operations,
            "/{} {} Tf",
            self.current_font_name, self.font_size
        )
        .unwrap();

        writeln!(
            &mut self.operations,
            "{:.2} {:.2} Td",
            self.position.0, self.position.1
        )
        .unwrap();

        let encoded = TextEncoding::WinAnsiEncoding.encode(text);
        append_literal_string(&mut self.operations, &encoded);
        self.operations.push_str(" Tj\n");

        self.operations.push_str("ET\n");

        Ok(self)
    }

    /// Shows text, then moves the position down one line.
    pub fn write_line(&mut self, text: &str) -> Result<&mut Self> {
        self.write(text)?;
        self.position.1 -= self.font_size * 1.2;
        Ok(self)
    }

    pub fn set_character_spacing(&mut self, spacing: f64) -> &mut Self {
        writeln!(&mut self.operations, "{spacing:.2} Tc").unwrap();
        self
    }

    pub fn set_word_spacing(&mut self, spacing: f64) -> &mut Self {
        writeln!(&mut self.operations, "{spacing:.2} Tw").unwrap();
        self
    }

    pub fn set_leading(&mut self, leading: f64) -> &mut Self {
        writeln!(&mut self.operations, "{leading:.2} TL").unwrap();
        self
    }

    pub fn set_text_rise(&mut self, rise: f64) -> &mut Self {
        writeln!(&mut self.operations, "{rise:.2} Ts").unwrap();
        self
    }

    pub fn operations(&self) -> &str {
        &self.operations
    }

    pub(crate) fn generate_operations(&self) -> Vec<u8> {
        self.operations.as_bytes().to_vec()
    }

    pub(crate) fn used_fonts(&self) -> &BTreeSet<Font> {
        &self.used_fonts
    }

    pub(crate) fn used_refs(&self) -> &BTreeSet<ResourceRef> {
        &self.used_refs
    }
}
