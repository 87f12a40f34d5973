use crate::error::Result;
use crate::graphics::GraphicsContext;
use crate::resources::ResourceRef;
use crate::text::{Font, TextContext, TextFlowContext};
use std::collections::BTreeSet;

/// Page margins in points (1/72 inch).
#[derive(Clone, Debug)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 72.0,   // 1 inch
            right: 72.0,  // 1 inch
            top: 72.0,    // 1 inch
            bottom: 72.0, // 1 inch
        }
    }
}

/// A single page in a PDF document.
///
/// Pages have a size (width and height in points), margins, and accumulate
/// graphics and text operators through their contexts. Page order in the
/// document is preserved in the output.
///
/// # Example
///
/// ```rust
/// use vellum_pdf::{Page, Font, Color};
///
/// let mut page = Page::a4();
///
/// page.text()
///     .set_font(Font::Helvetica, 12.0)
///     .at(100.0, 700.0)
///     .write("Hello World")?;
///
/// page.graphics()
///     .set_fill_color(Color::red())
///     .rect(100.0, 100.0, 200.0, 150.0)
///     .fill();
/// # Ok::<(), vellum_pdf::PdfError>(())
/// ```
#[derive(Clone)]
pub struct Page {
    width: f64,
    height: f64,
    margins: Margins,
    graphics_context: GraphicsContext,
    text_context: TextContext,
    flowed_content: Vec<u8>,
    flowed_fonts: BTreeSet<Font>,
}

impl Page {
    /// Creates a new page with the specified width and height in points.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margins: Margins::default(),
            graphics_context: GraphicsContext::new(),
            text_context: TextContext::new(),
            flowed_content: Vec::new(),
            flowed_fonts: BTreeSet::new(),
        }
    }

    /// Creates a new A4 page (595 x 842 points).
    pub fn a4() -> Self {
        Self::new(595.0, 842.0)
    }

    /// Creates a new US Letter page (612 x 792 points).
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    /// The graphics context for drawing shapes.
    pub fn graphics(&mut self) -> &mut GraphicsContext {
        &mut self.graphics_context
    }

    /// The text context for placing text.
    pub fn text(&mut self) -> &mut TextContext {
        &mut self.text_context
    }

    pub fn set_margins(&mut self, left: f64, right: f64, top: f64, bottom: f64) {
        self.margins = Margins {
            left,
            right,
            top,
            bottom,
        };
    }

    pub fn margins(&self) -> &Margins {
        &self.margins
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn content_width(&self) -> f64 {
        self.width - self.margins.left - self.margins.right
    }

    pub fn content_height(&self) -> f64 {
        self.height - self.margins.top - self.margins.bottom
    }

    /// A flow context sized to this page; merge it back with
    /// [`add_text_flow`](Page::add_text_flow).
    pub fn text_flow(&self) -> TextFlowContext {
        TextFlowContext::new(self.width, self.height, self.margins.clone())
    }

    pub fn add_text_flow(&mut self, text_flow: &TextFlowContext) {
        self.flowed_content
            .extend_from_slice(&text_flow.generate_operations());
        self.flowed_fonts.extend(text_flow.used_fonts().iter().copied());
    }

    /// Paints a registered image into the given rectangle.
    pub fn draw_image(
        &mut self,
        image: ResourceRef,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        self.graphics_context.draw_image(image, x, y, width, height)?;
        Ok(())
    }

    /// Concatenated operator bytes: graphics, then direct text, then flowed
    /// text, each in its own emission order.
    pub(crate) fn generate_content(&self) -> Vec<u8> {
        let mut content = Vec::new();
        content.extend_from_slice(&self.graphics_context.generate_operations());
        content.extend_from_slice(&self.text_context.generate_operations());
        content.extend_from_slice(&self.flowed_content);
        content
    }

    /// Standard fonts this page shows text with.
    pub(crate) fn used_fonts(&self) -> BTreeSet<Font> {
        let mut fonts = self.text_context.used_fonts().clone();
        fonts.extend(self.flowed_fonts.iter().copied());
        fonts
    }

    /// Registered resources this page references.
    pub(crate) fn used_refs(&self) -> BTreeSet<ResourceRef> {
        let mut refs = self.graphics_context.used_refs().clone();
        refs.extend(self.text_context.used_refs().iter().copied());
        refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::Color;

    #[test]
    fn test_page_sizes() {
        let a4 = Page::a4();
        assert_eq!(a4.width(), 595.0);
        assert_eq!(a4.height(), 842.0);

        let letter = Page::letter();
        assert_eq!(letter.width(), 612.0);
        assert_eq!(letter.height(), 792.0);
    }

    #[test]
    fn test_content_area() {
        let mut page = Page::a4();
        assert_eq!(page.content_width(), 595.0 - 144.0);
        assert_eq!(page.content_height(), 842.0 - 144.0);

        page.set_margins(10.0, 20.0, 30.0, 40.0);
        assert_eq!(page.content_width(), 595.0 - 30.0);
        assert_eq!(page.content_height(), 842.0 - 70.0);
    }

    #[test]
    fn test_generate_content_order() {
        let mut page = Page::a4();
        page.graphics()
            .set_fill_color(Color::red())
            .rect(0.0, 0.0, 10.0, 10.0)
            .fill();
        page.text()
            .set_font(Font::Helvetica, 12.0)
            .at(50.0, 50.0)
            .write("after graphics")
            .unwrap();

        let content = String::from_utf8(page.generate_content()).unwrap();
        let graphics_at = content.find(" re\n").unwrap();
        let text_at = content.find("BT\n").unwrap();
        assert!(graphics_at < text_at);
    }

    #[test]
    fn test_text_flow_merges_fonts() {
        let mut page = Page::a4();
        let mut flow = page.text_flow();
        flow.set_font(Font::TimesRoman, 12.0)
            .write_wrapped("flowed words")
            .unwrap();
        page.add_text_flow(&flow);

        assert!(page.used_fonts().contains(&Font::TimesRoman));
        let content = String::from_utf8(page.generate_content()).unwrap();
        assert!(content.contains("(flowed words) Tj\n"));
    }
}
