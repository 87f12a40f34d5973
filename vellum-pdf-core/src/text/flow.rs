use crate::error::Result;
use crate::page::Margins;
use crate::text::layout::{Fragment, MultiLineBreak, TextLine};
use crate::text::markdown::parse_markdown;
use crate::text::{append_literal_string, measure_text, Font, FontFamily, TextEncoding};
use std::collections::BTreeSet;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
    Center,
    Justified,
}

/// Flows wrapped text down a page, line by line.
///
/// Obtained from [`Page::text_flow`](crate::page::Page::text_flow) and merged
/// back with [`Page::add_text_flow`](crate::page::Page::add_text_flow).
#[derive(Debug, Clone)]
pub struct TextFlowContext {
    operations: String,
    current_family: FontFamily,
    current_font: Font,
    font_size: f64,
    line_height: f64,
    cursor_x: f64,
    cursor_y: f64,
    alignment: TextAlign,
    page_width: f64,
    margins: Margins,
    used_fonts: BTreeSet<Font>,
}

impl TextFlowContext {
    pub fn new(page_width: f64, page_height: f64, margins: Margins) -> Self {
        Self {
            operations: String::new(),
            current_family: FontFamily::Helvetica,
            current_font: Font::Helvetica,
            font_size: 12.0,
            line_height: 1.2,
            cursor_x: margins.left,
            cursor_y: page_height - margins.top,
            alignment: TextAlign::Left,
            page_width,
            margins,
            used_fonts: BTreeSet::new(),
        }
    }

    pub fn set_font(&mut self, font: Font, size: f64) -> &mut Self {
        self.current_font = font;
        self.font_size = size;
        self
    }

    /// Sets the family used by [`write_markdown`](Self::write_markdown) and
    /// the regular face for plain text.
    pub fn set_font_family(&mut self, family: FontFamily, size: f64) -> &mut Self {
        self.current_family = family;
        self.current_font = family.regular();
        self.font_size = size;
        self
    }

    pub fn set_line_height(&mut self, multiplier: f64) -> &mut Self {
        self.line_height = multiplier;
        self
    }

    pub fn set_alignment(&mut self, alignment: TextAlign) -> &mut Self {
        self.alignment = alignment;
        self
    }

    pub fn at(&mut self, x: f64, y: f64) -> &mut Self {
        self.cursor_x = x;
        self.cursor_y = y;
        self
    }

    pub fn content_width(&self) -> f64 {
        self.page_width - self.margins.left - self.margins.right
    }

    /// Writes text wrapped to the content width in the current font.
    pub fn write_wrapped(&mut self, text: &str) -> Result<&mut Self> {
        let fragments = vec![Fragment::new(self.current_font, self.font_size, text)];
        self.render_fragments(&fragments)?;
        Ok(self)
    }

    /// Writes `**bold**`/`__italic__`/`--underline--` marked-up text wrapped
    /// to the content width.
    pub fn write_markdown(&mut self, text: &str) -> Result<&mut Self> {
        let fragments = parse_markdown(text, self.current_family, self.font_size);
        self.render_fragments(&fragments)?;
        Ok(self)
    }

    /// Writes a wrapped paragraph followed by half a line of spacing.
    pub fn write_paragraph(&mut self, text: &str) -> Result<&mut Self> {
        self.write_wrapped(text)?;
        self.cursor_y -= self.font_size * self.line_height * 0.5;
        Ok(self)
    }

    pub fn newline(&mut self) -> &mut Self {
        self.cursor_y -= self.font_size * self.line_height;
        self.cursor_x = self.margins.left;
        self
    }

    pub fn cursor_position(&self) -> (f64, f64) {
        (self.cursor_x, self.cursor_y)
    }

    fn render_fragments(&mut self, fragments: &[Fragment]) -> Result<()> {
        let content_width = self.content_width();
        let lines = MultiLineBreak::new(fragments).lines(content_width)?;
        let count = lines.len();

        for (i, line) in lines.iter().enumerate() {
            let is_last = i + 1 == count;
            self.render_line(line, content_width, is_last);
            self.cursor_y -= self.font_size * self.line_height;
        }
        Ok(())
    }

    fn render_line(&mut self, line: &TextLine, content_width: f64, is_last: bool) {
        let x = match self.alignment {
            TextAlign::Left | TextAlign::Justified => self.margins.left,
            TextAlign::Right => self.page_width - self.margins.right - line.width,
            TextAlign::Center => self.margins.left + (content_width - line.width) / 2.0,
        };

        let justify = self.alignment == TextAlign::Justified
            && !is_last
            && !line.trailing_newline
            && line.spaces > 0;
        let word_spacing = if justify {
            (content_width - line.width) / line.spaces as f64
        } else {
            0.0
        };

        self.operations.push_str("BT\n");
        writeln!(&mut self.operations, "{:.2} {:.2} Td", x, self.cursor_y).unwrap();
        if justify {
            writeln!(&mut self.operations, "{word_spacing:.2} Tw").unwrap();
        }

        let mut underlines: Vec<(f64, f64)> = Vec::new();
        let mut pen_x = x;
        for fragment in &line.fragments {
            self.used_fonts.insert(fragment.font);
            writeln!(
                &mut self.operations,
                "/{} {} Tf",
                fragment.font.pdf_name(),
                fragment.size
            )
            .unwrap();

            let encoded = TextEncoding::WinAnsiEncoding.encode(&fragment.text);
            append_literal_string(&mut self.operations, &encoded);
            self.operations.push_str(" Tj\n");

            let fragment_spaces = fragment.text.chars().filter(|&c| c == ' ').count();
            let advance = measure_text(&fragment.text, fragment.font, fragment.size)
                + word_spacing * fragment_spaces as f64;
            if fragment.underline {
                underlines.push((pen_x, advance));
            }
            pen_x += advance;
        }

        if justify {
            self.operations.push_str("0 Tw\n");
        }
        self.operations.push_str("ET\n");

        // underline rules as filled rectangles below the baseline
        for (ux, uw) in underlines {
            let uy = self.cursor_y - self.font_size * 0.12;
            let thickness = self.font_size * 0.05;
            writeln!(
                &mut self.operations,
                "{ux:.2} {uy:.2} {uw:.2} {thickness:.2} re f"
            )
            .unwrap();
        }
    }

    pub fn generate_operations(&self) -> Vec<u8> {
        self.operations.as_bytes().to_vec()
    }

    pub(crate) fn used_fonts(&self) -> &BTreeSet<Font> {
        &self.used_fonts
    }
}
