//! # vellum-pdf
//!
//! A pure Rust PDF document assembly and serialization engine.
//!
//! ## Features
//!
//! - **Document assembly**: multi-page documents with text, vector graphics
//!   and images built against an indirect object graph
//! - **Content streams**: path, text and state operators accumulated in exact
//!   emission order, with balanced save/restore checking
//! - **Resource dedup**: fonts, images, graphics states and patterns are
//!   fingerprinted and embedded once, however often they are used
//! - **Line breaking**: greedy, soft-hyphen-aware wrapping that keeps width
//!   accounting continuous across bold/italic/markdown style runs
//! - **Deterministic output**: serializing the same document twice yields
//!   byte-identical PDFs
//! - **Pure Rust**: no C dependencies or external PDF libraries
//!
//! ## Quick Start
//!
//! ```rust
//! use vellum_pdf::{Document, Page, Font, Color, Result};
//!
//! # fn main() -> Result<()> {
//! // Create a new document
//! let mut doc = Document::new();
//! doc.set_title("My PDF")?;
//!
//! // Create a page
//! let mut page = Page::a4();
//!
//! // Add text
//! page.text()
//!     .set_font(Font::Helvetica, 24.0)
//!     .at(50.0, 700.0)
//!     .write("Hello, PDF!")?;
//!
//! // Add graphics
//! page.graphics()
//!     .set_fill_color(Color::rgb(0.0, 0.5, 1.0))
//!     .circle(300.0, 400.0, 50.0)
//!     .fill();
//!
//! // Serialize
//! doc.add_page(page)?;
//! let bytes = doc.to_bytes()?;
//! assert!(bytes.starts_with(b"%PDF-1.7"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`document`] - document lifecycle, metadata and finalization
//! - [`page`] - page creation and layout
//! - [`graphics`] - vector graphics, images, graphics states and patterns
//! - [`text`] - text placement, wrapping and styled runs
//! - [`objects`] - the indirect object graph
//! - [`resources`] - fingerprinted, deduplicated shared resources
//! - [`writer`] - low-level PDF byte-stream serialization

pub mod document;
pub mod error;
pub mod graphics;
pub mod objects;
pub mod page;
pub mod resources;
pub mod text;
pub mod writer;

pub use document::{Document, DocumentMetadata, DocumentState};
pub use error::{PdfError, Result};
pub use graphics::{Color, ExtGState, GraphicsContext, Image, ImageColorSpace, ImageFilter, Pattern};
pub use objects::{Dictionary, Object, ObjectGraph, ObjectId};
pub use page::{Margins, Page};
pub use resources::{ResourceKind, ResourceManager, ResourceRef};
pub use text::{
    measure_char, measure_text, parse_markdown, EmbeddedFont, Font, FontDescriptor, FontEncoding,
    FontFamily, FontSpec, Fragment, MultiLineBreak, TextAlign, TextContext, TextFlowContext,
    TextLine, SOFT_HYPHEN,
};

/// Current version of vellum-pdf
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// PDF version emitted by the serializer
pub const PDF_VERSION: &str = "1.7";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_empty_document() {
        let doc = Document::new();
        assert_eq!(doc.page_count(), 0);
    }

    #[test]
    fn test_create_page() {
        let page = Page::new(595.0, 842.0);
        assert_eq!(page.width(), 595.0);
        assert_eq!(page.height(), 842.0);
    }

    #[test]
    fn test_version_info() {
        assert!(!VERSION.is_empty());
        assert_eq!(PDF_VERSION, "1.7");
    }
}
