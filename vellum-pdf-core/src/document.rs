use crate::error::{PdfError, Result};
use crate::graphics::{ExtGState, Image, Pattern};
use crate::objects::{Dictionary, Object, ObjectGraph, ObjectId, Stream};
use crate::page::Page;
use crate::resources::{Resource, ResourceManager, ResourceRef};
use crate::text::{EmbeddedFont, Font, FontEncoding, FontSpec};
use crate::writer::PdfWriter;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Lifecycle of a document.
///
/// Transitions run forward only: `Building -> Finalizing -> Serialized`.
/// Every mutating call outside `Building` fails with
/// [`PdfError::FrozenDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    Building,
    Finalizing,
    Serialized,
}

/// Metadata written to the document Info dictionary.
#[derive(Debug, Clone)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    /// Software that created the original document
    pub creator: Option<String>,
    /// Software that produced the PDF
    pub producer: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub modification_date: Option<DateTime<Utc>>,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            title: None,
            author: None,
            subject: None,
            keywords: None,
            creator: Some("vellum_pdf".to_string()),
            producer: Some(format!("vellum_pdf v{}", env!("CARGO_PKG_VERSION"))),
            creation_date: Some(now),
            modification_date: Some(now),
        }
    }
}

/// A PDF document under construction.
///
/// Accumulates pages, resources and metadata, then serializes itself into a
/// complete byte stream. Serialization is all-or-nothing: bytes are handed
/// out only after the whole stream was produced.
///
/// # Example
///
/// ```rust
/// use vellum_pdf::{Document, Page, Font};
///
/// let mut doc = Document::new();
/// doc.set_title("My Document")?;
///
/// let mut page = Page::a4();
/// page.text()
///     .set_font(Font::Helvetica, 24.0)
///     .at(50.0, 700.0)
///     .write("Hello, PDF!")?;
/// doc.add_page(page)?;
///
/// let bytes = doc.to_bytes()?;
/// assert!(bytes.starts_with(b"%PDF-1.7"));
/// # Ok::<(), vellum_pdf::PdfError>(())
/// ```
pub struct Document {
    pub(crate) pages: Vec<Page>,
    pub(crate) graph: ObjectGraph,
    pub(crate) resources: ResourceManager,
    pub(crate) metadata: DocumentMetadata,
    state: DocumentState,
    default_font_encoding: Option<FontEncoding>,
    pub(crate) catalog_id: Option<ObjectId>,
    pub(crate) info_id: Option<ObjectId>,
}

impl Document {
    /// Creates a new empty PDF document.
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            graph: ObjectGraph::new(),
            resources: ResourceManager::new(),
            metadata: DocumentMetadata::default(),
            state: DocumentState::Building,
            default_font_encoding: None,
            catalog_id: None,
            info_id: None,
        }
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    fn check_building(&self, operation: &'static str) -> Result<()> {
        if self.state != DocumentState::Building {
            return Err(PdfError::FrozenDocument(operation));
        }
        Ok(())
    }

    /// Adds a page to the document.
    pub fn add_page(&mut self, page: Page) -> Result<()> {
        self.check_building("add page")?;
        self.pages.push(page);
        Ok(())
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        self.check_building("set title")?;
        self.metadata.title = Some(title.into());
        Ok(())
    }

    pub fn set_author(&mut self, author: impl Into<String>) -> Result<()> {
        self.check_building("set author")?;
        self.metadata.author = Some(author.into());
        Ok(())
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) -> Result<()> {
        self.check_building("set subject")?;
        self.metadata.subject = Some(subject.into());
        Ok(())
    }

    pub fn set_keywords(&mut self, keywords: impl Into<String>) -> Result<()> {
        self.check_building("set keywords")?;
        self.metadata.keywords = Some(keywords.into());
        Ok(())
    }

    pub fn set_creator(&mut self, creator: impl Into<String>) -> Result<()> {
        self.check_building("set creator")?;
        self.metadata.creator = Some(creator.into());
        Ok(())
    }

    pub fn set_producer(&mut self, producer: impl Into<String>) -> Result<()> {
        self.check_building("set producer")?;
        self.metadata.producer = Some(producer.into());
        Ok(())
    }

    pub fn set_creation_date(&mut self, date: DateTime<Utc>) -> Result<()> {
        self.check_building("set creation date")?;
        self.metadata.creation_date = Some(date);
        Ok(())
    }

    pub fn set_modification_date(&mut self, date: DateTime<Utc>) -> Result<()> {
        self.check_building("set modification date")?;
        self.metadata.modification_date = Some(date);
        Ok(())
    }

    /// Encoding applied to standard fonts that don't specify one.
    pub fn set_default_font_encoding(&mut self, encoding: Option<FontEncoding>) -> Result<()> {
        self.check_building("set default font encoding")?;
        self.default_font_encoding = encoding;
        Ok(())
    }

    /// Registers a font for use on pages; identical specs share one handle.
    pub fn register_font(&mut self, spec: impl Into<FontSpec>) -> Result<ResourceRef> {
        self.check_building("register font")?;
        self.resources.register_font(spec.into())
    }

    /// Registers a collaborator-decoded font for embedding.
    pub fn register_embedded_font(&mut self, font: EmbeddedFont) -> Result<ResourceRef> {
        self.check_building("register font")?;
        self.resources.register_font(FontSpec::Embedded(font))
    }

    /// Registers an image; identical pixel data and filter share one handle.
    pub fn register_image(&mut self, image: Image) -> Result<ResourceRef> {
        self.check_building("register image")?;
        self.resources.register_image(image)
    }

    pub fn register_ext_g_state(&mut self, state: ExtGState) -> Result<ResourceRef> {
        self.check_building("register graphics state")?;
        self.resources.register_ext_g_state(state)
    }

    pub fn register_pattern(&mut self, pattern: Pattern) -> Result<ResourceRef> {
        self.check_building("register pattern")?;
        self.resources.register_pattern(pattern)
    }

    /// Registers an arbitrary indirect object.
    ///
    /// Collaborator layers (outline builders, metadata writers) use this to
    /// extend the object graph through the same door as the engine itself.
    pub fn register_object(&mut self, object: Object) -> Result<ObjectId> {
        self.check_building("register object")?;
        self.graph.register(object)
    }

    /// Resolves a registered object by id.
    pub fn resolve_object(&self, id: ObjectId) -> Result<&Object> {
        self.graph.resolve(id)
    }

    /// Serializes the document and returns the complete byte stream.
    ///
    /// The first call finalizes the document (no further mutation); repeated
    /// calls re-serialize the frozen object graph and yield byte-identical
    /// output.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        PdfWriter::new().write_document(self)
    }

    /// Serializes the document into a writer.
    ///
    /// The stream is produced fully in memory first, so nothing is written
    /// on error.
    pub fn write<W: std::io::Write>(&mut self, writer: &mut W) -> Result<()> {
        let bytes = self.to_bytes()?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// Saves the document to a file.
    pub fn save(&mut self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub(crate) fn mark_serialized(&mut self) {
        self.state = DocumentState::Serialized;
    }

    /// Assembles the object graph from pages, resources and metadata, then
    /// freezes it. Idempotent: later calls are no-ops.
    pub(crate) fn finalize(&mut self) -> Result<()> {
        if self.state != DocumentState::Building {
            // already assembled; a document whose finalization failed
            // part-way stays unusable
            if self.catalog_id.is_some() {
                return Ok(());
            }
            return Err(PdfError::FrozenDocument("finalize after a failed finalization"));
        }
        self.state = DocumentState::Finalizing;

        // standard fonts used on pages register themselves
        let mut used_standard_fonts: BTreeMap<Font, ResourceRef> = BTreeMap::new();
        let page_fonts: Vec<Font> = self
            .pages
            .iter()
            .flat_map(|p| p.used_fonts().into_iter())
            .collect();
        for font in page_fonts {
            if !used_standard_fonts.contains_key(&font) {
                let spec = FontSpec::Standard {
                    font,
                    encoding: self.default_font_encoding,
                };
                let resource_ref = self.resources.register_font(spec)?;
                used_standard_fonts.insert(font, resource_ref);
            }
        }

        let catalog_id = self.graph.reserve()?;
        let pages_root_id = self.graph.reserve()?;

        let resource_ids = Self::assemble_resources(&mut self.graph, &self.resources)?;

        // pages and their content streams
        let mut kids = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let content_id =
                Self::assemble_content_stream(&mut self.graph, page.generate_content())?;

            let mut page_dict = Dictionary::new();
            page_dict.set("Type", Object::Name("Page".to_string()));
            page_dict.set("Parent", Object::Reference(pages_root_id));
            page_dict.set(
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(page.width()),
                    Object::Real(page.height()),
                ]),
            );
            page_dict.set("Contents", Object::Reference(content_id));
            page_dict.set(
                "Resources",
                Object::Dictionary(Self::page_resources(
                    page,
                    &used_standard_fonts,
                    &resource_ids,
                )?),
            );

            let page_id = self.graph.register(Object::Dictionary(page_dict))?;
            kids.push(Object::Reference(page_id));
        }

        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name("Pages".to_string()));
        pages_dict.set("Count", Object::Integer(self.pages.len() as i64));
        pages_dict.set("Kids", Object::Array(kids));
        self.graph.set(pages_root_id, Object::Dictionary(pages_dict))?;

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name("Catalog".to_string()));
        catalog.set("Pages", Object::Reference(pages_root_id));
        self.graph.set(catalog_id, Object::Dictionary(catalog))?;

        let info_id = self.graph.register(Object::Dictionary(self.info_dict()))?;

        self.validate_references()?;
        self.graph.freeze();
        self.catalog_id = Some(catalog_id);
        self.info_id = Some(info_id);

        tracing::debug!(
            objects = self.graph.len(),
            pages = self.pages.len(),
            resources = self.resources.len(),
            "document finalized"
        );
        Ok(())
    }

    /// Registers one object (plus dependents) per deduped resource.
    fn assemble_resources(
        graph: &mut ObjectGraph,
        resources: &ResourceManager,
    ) -> Result<BTreeMap<ResourceRef, ObjectId>> {
        let mut resource_ids = BTreeMap::new();

        for (resource_ref, resource) in resources.iter() {
            let id = match resource {
                Resource::Font(FontSpec::Standard { font, encoding }) => {
                    let mut dict = Dictionary::new();
                    dict.set("Type", Object::Name("Font".to_string()));
                    dict.set("Subtype", Object::Name("Type1".to_string()));
                    dict.set("BaseFont", Object::Name(font.pdf_name().to_string()));
                    if let Some(encoding) = encoding {
                        if !font.is_symbolic() {
                            dict.set("Encoding", Object::Name(encoding.pdf_name().to_string()));
                        }
                    }
                    graph.register(Object::Dictionary(dict))?
                }
                Resource::Font(FontSpec::Embedded(font)) => {
                    Self::assemble_embedded_font(graph, font)?
                }
                Resource::Image(image) => {
                    let soft_mask_id = match image.soft_mask_stream()? {
                        Some(mask) => {
                            let (dict, data) = (mask.dictionary().clone(), mask.data().to_vec());
                            Some(graph.register(Object::Stream(dict, data))?)
                        }
                        None => None,
                    };
                    let stream = image.to_stream(soft_mask_id)?;
                    let (dict, data) = (stream.dictionary().clone(), stream.data().to_vec());
                    graph.register(Object::Stream(dict, data))?
                }
                Resource::ExtGState(state) => {
                    graph.register(Object::Dictionary(state.to_dict()))?
                }
                Resource::Pattern(pattern) => {
                    graph.register(Object::Dictionary(pattern.to_dict()))?
                }
            };
            resource_ids.insert(resource_ref, id);
        }

        Ok(resource_ids)
    }

    fn assemble_embedded_font(graph: &mut ObjectGraph, font: &EmbeddedFont) -> Result<ObjectId> {
        let mut program_dict = Dictionary::new();
        program_dict.set("Length1", Object::Integer(font.program.len() as i64));
        #[allow(unused_mut)]
        let mut program_stream = Stream::with_dictionary(program_dict, font.program.clone());
        #[cfg(feature = "compression")]
        program_stream.compress_flate()?;
        let program_id = graph.register(Object::Stream(
            program_stream.dictionary().clone(),
            program_stream.data().to_vec(),
        ))?;

        let d = &font.descriptor;
        let mut descriptor = Dictionary::new();
        descriptor.set("Type", Object::Name("FontDescriptor".to_string()));
        descriptor.set("FontName", Object::Name(font.name.clone()));
        descriptor.set("Flags", Object::Integer(d.flags as i64));
        descriptor.set(
            "FontBBox",
            Object::Array(d.font_bbox.iter().map(|&v| Object::Real(v)).collect()),
        );
        descriptor.set("ItalicAngle", Object::Real(d.italic_angle));
        descriptor.set("Ascent", Object::Real(d.ascent));
        descriptor.set("Descent", Object::Real(d.descent));
        descriptor.set("CapHeight", Object::Real(d.cap_height));
        descriptor.set("StemV", Object::Real(d.stem_v));
        descriptor.set("FontFile2", Object::Reference(program_id));
        let descriptor_id = graph.register(Object::Dictionary(descriptor))?;

        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name("Font".to_string()));
        dict.set("Subtype", Object::Name("TrueType".to_string()));
        dict.set("BaseFont", Object::Name(font.name.clone()));
        dict.set("FirstChar", Object::Integer(font.first_char as i64));
        dict.set("LastChar", Object::Integer(font.last_char() as i64));
        dict.set(
            "Widths",
            Object::Array(
                font.widths
                    .iter()
                    .map(|&w| Object::Integer(w as i64))
                    .collect(),
            ),
        );
        dict.set("FontDescriptor", Object::Reference(descriptor_id));
        graph.register(Object::Dictionary(dict))
    }

    fn assemble_content_stream(graph: &mut ObjectGraph, content: Vec<u8>) -> Result<ObjectId> {
        #[allow(unused_mut)]
        let mut stream = Stream::new(content);
        #[cfg(feature = "compression")]
        stream.compress_flate()?;
        graph.register(Object::Stream(
            stream.dictionary().clone(),
            stream.data().to_vec(),
        ))
    }

    /// Builds a page's /Resources dictionary from the fonts and handles it
    /// actually uses.
    fn page_resources(
        page: &Page,
        standard_fonts: &BTreeMap<Font, ResourceRef>,
        resource_ids: &BTreeMap<ResourceRef, ObjectId>,
    ) -> Result<Dictionary> {
        let mut categories: BTreeMap<&'static str, Dictionary> = BTreeMap::new();

        for font in page.used_fonts() {
            let resource_ref = standard_fonts
                .get(&font)
                .ok_or_else(|| PdfError::FontError(format!("{} not registered", font.pdf_name())))?;
            let id = resource_ids[resource_ref];
            categories
                .entry("Font")
                .or_default()
                .set(font.pdf_name(), Object::Reference(id));
        }

        for resource_ref in page.used_refs() {
            let id = *resource_ids.get(&resource_ref).ok_or_else(|| {
                PdfError::InvalidResource(format!(
                    "{} was not registered with this document",
                    resource_ref.name()
                ))
            })?;
            categories
                .entry(resource_ref.kind().category())
                .or_default()
                .set(resource_ref.name(), Object::Reference(id));
        }

        let mut resources = Dictionary::new();
        for (category, dict) in categories {
            resources.set(category, Object::Dictionary(dict));
        }
        Ok(resources)
    }

    fn info_dict(&self) -> Dictionary {
        let mut info = Dictionary::new();
        if let Some(ref title) = self.metadata.title {
            info.set("Title", Object::String(title.clone()));
        }
        if let Some(ref author) = self.metadata.author {
            info.set("Author", Object::String(author.clone()));
        }
        if let Some(ref subject) = self.metadata.subject {
            info.set("Subject", Object::String(subject.clone()));
        }
        if let Some(ref keywords) = self.metadata.keywords {
            info.set("Keywords", Object::String(keywords.clone()));
        }
        if let Some(ref creator) = self.metadata.creator {
            info.set("Creator", Object::String(creator.clone()));
        }
        if let Some(ref producer) = self.metadata.producer {
            info.set("Producer", Object::String(producer.clone()));
        }
        if let Some(date) = self.metadata.creation_date {
            info.set("CreationDate", Object::String(format_pdf_date(date)));
        }
        if let Some(date) = self.metadata.modification_date {
            info.set("ModDate", Object::String(format_pdf_date(date)));
        }
        info
    }

    /// Walks every registered object and checks that each reference resolves.
    fn validate_references(&self) -> Result<()> {
        for (_, object) in self.graph.iter() {
            self.validate_object_references(object)?;
        }
        Ok(())
    }

    fn validate_object_references(&self, object: &Object) -> Result<()> {
        match object {
            Object::Reference(id) => {
                if !self.graph.contains(*id) {
                    return Err(PdfError::DanglingReference(*id));
                }
            }
            Object::Array(items) => {
                for item in items {
                    self.validate_object_references(item)?;
                }
            }
            Object::Dictionary(dict) => {
                for (_, value) in dict.entries() {
                    self.validate_object_references(value)?;
                }
            }
            Object::Stream(dict, _) => {
                for (_, value) in dict.entries() {
                    self.validate_object_references(value)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats a date as a PDF date string (D:YYYYMMDDHHmmSS+00'00).
fn format_pdf_date(date: DateTime<Utc>) -> String {
    let formatted = date.format("D:%Y%m%d%H%M%S");
    format!("{formatted}+00'00")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert_eq!(doc.page_count(), 0);
        assert_eq!(doc.state(), DocumentState::Building);
    }

    #[test]
    fn test_metadata_setters() {
        let mut doc = Document::new();
        doc.set_title("Title").unwrap();
        doc.set_author("Author").unwrap();
        doc.set_subject("Subject").unwrap();
        doc.set_keywords("a, b").unwrap();

        assert_eq!(doc.metadata.title.as_deref(), Some("Title"));
        assert_eq!(doc.metadata.author.as_deref(), Some("Author"));
        assert_eq!(doc.metadata.subject.as_deref(), Some("Subject"));
        assert_eq!(doc.metadata.keywords.as_deref(), Some("a, b"));
    }

    #[test]
    fn test_default_metadata_has_producer() {
        let doc = Document::new();
        assert!(doc
            .metadata
            .producer
            .as_deref()
            .unwrap()
            .starts_with("vellum_pdf v"));
        assert!(doc.metadata.creation_date.is_some());
    }

    #[test]
    fn test_format_pdf_date() {
        let date = Utc.with_ymd_and_hms(2023, 12, 25, 15, 30, 45).unwrap();
        assert_eq!(format_pdf_date(date), "D:20231225153045+00'00");
    }

    #[test]
    fn test_state_transitions_forward_only() {
        let mut doc = Document::new();
        doc.add_page(Page::a4()).unwrap();

        let _ = doc.to_bytes().unwrap();
        assert_eq!(doc.state(), DocumentState::Serialized);

        // mutation after serialization fails
        assert!(matches!(
            doc.add_page(Page::a4()),
            Err(PdfError::FrozenDocument(_))
        ));
        assert!(matches!(
            doc.set_title("late"),
            Err(PdfError::FrozenDocument(_))
        ));
        assert!(matches!(
            doc.register_font(Font::Helvetica),
            Err(PdfError::FrozenDocument(_))
        ));
    }

    #[test]
    fn test_serialize_twice_is_byte_identical() {
        let mut doc = Document::new();
        doc.set_title("Stable").unwrap();
        let mut page = Page::a4();
        page.text()
            .set_font(Font::Helvetica, 12.0)
            .at(50.0, 700.0)
            .write("same bytes")
            .unwrap();
        doc.add_page(page).unwrap();

        let first = doc.to_bytes().unwrap();
        let second = doc.to_bytes().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_register_object_and_resolve() {
        let mut doc = Document::new();
        let id = doc.register_object(Object::Integer(42)).unwrap();
        assert_eq!(doc.resolve_object(id).unwrap(), &Object::Integer(42));

        let missing = ObjectId::new(999, 0);
        assert!(matches!(
            doc.resolve_object(missing),
            Err(PdfError::DanglingReference(_))
        ));
    }

    #[test]
    fn test_finalize_rejects_dangling_reference() {
        let mut doc = Document::new();
        let mut dict = Dictionary::new();
        dict.set("Broken", Object::Reference(ObjectId::new(999, 0)));
        doc.register_object(Object::Dictionary(dict)).unwrap();
        doc.add_page(Page::a4()).unwrap();

        let err = doc.to_bytes().unwrap_err();
        assert!(matches!(err, PdfError::DanglingReference(id) if id.number() == 999));
    }

    #[test]
    fn test_font_dedup_across_pages() {
        let mut doc = Document::new();
        for _ in 0..3 {
            let mut page = Page::a4();
            page.text()
                .set_font(Font::Helvetica, 12.0)
                .at(10.0, 10.0)
                .write("x")
                .unwrap();
            doc.add_page(page).unwrap();
        }
        doc.finalize().unwrap();

        // one shared font resource for all three pages
        assert_eq!(doc.resources.len(), 1);
    }
}
