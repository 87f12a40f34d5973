use crate::document::Document;
use crate::error::Result;
use crate::objects::{Object, ObjectId};
use std::collections::BTreeMap;

/// Serializes a finalized document into a PDF byte stream.
///
/// Output accumulates in a single append-only growth buffer; every object is
/// written once, in ascending id order, and its start offset recorded for the
/// cross-reference table. Nothing is handed out until the stream is complete.
pub struct PdfWriter {
    buffer: Vec<u8>,
    xref_positions: BTreeMap<ObjectId, u64>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            xref_positions: BTreeMap::new(),
        }
    }

    /// Finalizes the document if needed and returns its complete byte stream.
    pub fn write_document(&mut self, document: &mut Document) -> Result<Vec<u8>> {
        document.finalize()?;
        let bytes = self.serialize(document)?;
        document.mark_serialized();
        Ok(bytes)
    }

    /// Single serialization pass: header, objects, xref table, trailer.
    fn serialize(&mut self, document: &Document) -> Result<Vec<u8>> {
        let catalog_id = document
            .catalog_id
            .expect("document finalized before serialization");
        let info_id = document
            .info_id
            .expect("document finalized before serialization");

        self.write_header();
        let header_end = self.buffer.len();

        for (id, object) in document.graph.iter() {
            self.write_object(id, object);
        }
        let body_end = self.buffer.len();

        let xref_position = self.buffer.len() as u64;
        self.write_xref(document.graph.max_number());
        self.write_trailer(document.graph.max_number(), catalog_id, info_id, xref_position);

        tracing::debug!(
            header = header_end,
            body = body_end - header_end,
            xref_and_trailer = self.buffer.len() - body_end,
            total = self.buffer.len(),
            "serialized document"
        );

        Ok(std::mem::take(&mut self.buffer))
    }

    fn write_header(&mut self) {
        self.write_bytes(b"%PDF-1.7\n");
        // binary comment so transports treat the file as binary
        self.write_bytes(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n']);
    }

    fn write_object(&mut self, id: ObjectId, object: &Object) {
        self.xref_positions.insert(id, self.buffer.len() as u64);

        let header = format!("{} {} obj\n", id.number(), id.generation());
        self.write_bytes(header.as_bytes());

        self.write_object_value(object);

        self.write_bytes(b"\nendobj\n");
    }

    fn write_object_value(&mut self, object: &Object) {
        match object {
            Object::Null => self.write_bytes(b"null"),
            Object::Boolean(b) => self.write_bytes(if *b { b"true" } else { b"false" }),
            Object::Integer(i) => self.write_bytes(i.to_string().as_bytes()),
            Object::Real(f) => self.write_bytes(
                format!("{f:.6}")
                    .trim_end_matches('0')
                    .trim_end_matches('.')
                    .as_bytes(),
            ),
            Object::String(s) => {
                self.write_bytes(b"(");
                for &byte in s.as_bytes() {
                    match byte {
                        b'(' => self.write_bytes(b"\\("),
                        b')' => self.write_bytes(b"\\)"),
                        b'\\' => self.write_bytes(b"\\\\"),
                        b'\n' => self.write_bytes(b"\\n"),
                        b'\r' => self.write_bytes(b"\\r"),
                        _ => self.write_bytes(&[byte]),
                    }
                }
                self.write_bytes(b")");
            }
            Object::Name(n) => {
                self.write_bytes(b"/");
                self.write_bytes(n.as_bytes());
            }
            Object::Array(arr) => {
                self.write_bytes(b"[");
                for (i, obj) in arr.iter().enumerate() {
                    if i > 0 {
                        self.write_bytes(b" ");
                    }
                    self.write_object_value(obj);
                }
                self.write_bytes(b"]");
            }
            Object::Dictionary(dict) => {
                self.write_bytes(b"<<");
                for (key, value) in dict.entries() {
                    self.write_bytes(b"\n/");
                    self.write_bytes(key.as_bytes());
                    self.write_bytes(b" ");
                    self.write_object_value(value);
                }
                self.write_bytes(b"\n>>");
            }
            Object::Stream(dict, data) => {
                self.write_object_value(&Object::Dictionary(dict.clone()));
                self.write_bytes(b"\nstream\n");
                self.write_bytes(data);
                self.write_bytes(b"\nendstream");
            }
            Object::Reference(id) => {
                let reference = format!("{} {} R", id.number(), id.generation());
                self.write_bytes(reference.as_bytes());
            }
        }
    }

    fn write_xref(&mut self, max_object_number: u32) {
        self.write_bytes(b"xref\n");

        // one subsection covering 0..=max; entry 0 heads the free list
        let subsection = format!("0 {}\n", max_object_number + 1);
        self.write_bytes(subsection.as_bytes());
        self.write_bytes(b"0000000000 65535 f \n");

        for number in 1..=max_object_number {
            match self.xref_positions.get(&ObjectId::new(number, 0)) {
                Some(position) => {
                    let entry = format!("{position:010} {:05} n \n", 0);
                    self.write_bytes(entry.as_bytes());
                }
                None => {
                    // gap: keep the table contiguous with a free entry
                    self.write_bytes(b"0000000000 00000 f \n");
                }
            }
        }
    }

    fn write_trailer(
        &mut self,
        max_object_number: u32,
        catalog_id: ObjectId,
        info_id: ObjectId,
        xref_position: u64,
    ) {
        use crate::objects::Dictionary;

        let mut trailer = Dictionary::new();
        trailer.set("Size", Object::Integer((max_object_number + 1) as i64));
        trailer.set("Root", Object::Reference(catalog_id));
        trailer.set("Info", Object::Reference(info_id));

        self.write_bytes(b"trailer\n");
        self.write_object_value(&Object::Dictionary(trailer));
        self.write_bytes(b"\nstartxref\n");
        self.write_bytes(xref_position.to_string().as_bytes());
        self.write_bytes(b"\n%%EOF\n");
    }

    fn write_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Dictionary;
    use crate::page::Page;
    use crate::text::Font;

    fn serialized(document: &mut Document) -> Vec<u8> {
        document.to_bytes().unwrap()
    }

    #[test]
    fn test_header() {
        let mut writer = PdfWriter::new();
        writer.write_header();

        assert!(writer.buffer.starts_with(b"%PDF-1.7\n"));
        assert_eq!(&writer.buffer[9..15], &[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n']);
    }

    #[test]
    fn test_write_object_records_offset() {
        let mut writer = PdfWriter::new();
        writer.write_bytes(b"prefix");
        writer.write_object(ObjectId::new(5, 0), &Object::String("Hello PDF".to_string()));

        assert_eq!(writer.xref_positions[&ObjectId::new(5, 0)], 6);
        let content = String::from_utf8_lossy(&writer.buffer);
        assert!(content.contains("5 0 obj\n"));
        assert!(content.contains("(Hello PDF)"));
        assert!(content.contains("endobj"));
    }

    #[test]
    fn test_write_object_values() {
        let mut writer = PdfWriter::new();
        writer.write_object_value(&Object::Null);
        writer.write_object_value(&Object::Boolean(true));
        writer.write_object_value(&Object::Integer(42));
        writer.write_object_value(&Object::Real(1.5));
        writer.write_object_value(&Object::Real(3.0));
        writer.write_object_value(&Object::Name("Page".to_string()));
        writer.write_object_value(&Object::Reference(ObjectId::new(7, 0)));

        let content = String::from_utf8_lossy(&writer.buffer);
        assert!(content.contains("null"));
        assert!(content.contains("true"));
        assert!(content.contains("42"));
        assert!(content.contains("1.5"));
        // trailing zeros trimmed
        assert!(content.contains("3"));
        assert!(!content.contains("3.000000"));
        assert!(content.contains("/Page"));
        assert!(content.contains("7 0 R"));
    }

    #[test]
    fn test_string_escaping() {
        let mut writer = PdfWriter::new();
        writer.write_object_value(&Object::String("a(b)c\\".to_string()));

        assert_eq!(writer.buffer, b"(a\\(b\\)c\\\\)");
    }

    #[test]
    fn test_dictionary_keys_sorted_in_output() {
        let mut dict = Dictionary::new();
        dict.set("Zebra", 1);
        dict.set("Alpha", 2);

        let mut writer = PdfWriter::new();
        writer.write_object_value(&Object::Dictionary(dict));

        let content = String::from_utf8_lossy(&writer.buffer);
        assert!(content.find("/Alpha").unwrap() < content.find("/Zebra").unwrap());
    }

    #[test]
    fn test_stream_serialization() {
        let mut dict = Dictionary::new();
        dict.set("Length", 3);

        let mut writer = PdfWriter::new();
        writer.write_object_value(&Object::Stream(dict, vec![1, 2, 3]));

        let content = &writer.buffer;
        let text = String::from_utf8_lossy(content);
        assert!(text.contains("/Length 3"));
        assert!(text.contains("stream\n"));
        assert!(text.contains("endstream"));
    }

    #[test]
    fn test_complete_document_structure() {
        let mut document = Document::new();
        document.set_title("Complete Test").unwrap();
        document.add_page(Page::a4()).unwrap();

        let bytes = serialized(&mut document);

        assert!(bytes.starts_with(b"%PDF-1.7\n"));
        assert!(bytes.ends_with(b"%%EOF\n"));

        let content = String::from_utf8_lossy(&bytes);
        assert!(content.contains("/Type /Catalog"));
        assert!(content.contains("/Type /Pages"));
        assert!(content.contains("/Type /Page"));
        assert!(content.contains("/MediaBox"));
        assert!(content.contains("xref"));
        assert!(content.contains("trailer"));
        assert!(content.contains("/Root 1 0 R"));
        assert!(content.contains("/Title (Complete Test)"));
        assert!(content.contains("startxref"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let mut document = Document::new();
        let mut page = Page::a4();
        page.text()
            .set_font(Font::Helvetica, 12.0)
            .at(50.0, 700.0)
            .write("offsets")
            .unwrap();
        document.add_page(page).unwrap();

        let bytes = serialized(&mut document);

        // follow the startxref pointer; the table itself is pure ASCII
        let tail = String::from_utf8_lossy(&bytes[bytes.len() - 48..]);
        let xref_at: usize = tail
            .split("startxref\n")
            .nth(1)
            .unwrap()
            .split_whitespace()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert!(bytes[xref_at..].starts_with(b"xref\n"));

        let table = String::from_utf8_lossy(&bytes[xref_at..]);
        let lines: Vec<&str> = table.lines().collect();
        let mut object_number = 0u32;
        for line in &lines[2..] {
            if line.len() < 18 {
                break;
            }
            let offset: usize = line[..10].parse().unwrap();
            if &line[17..18] == "n" {
                let expected = format!("{object_number} 0 obj");
                assert!(
                    bytes[offset..].starts_with(expected.as_bytes()),
                    "object {object_number} not at offset {offset}"
                );
            }
            object_number += 1;
        }
        assert!(object_number > 3);
    }

    #[test]
    fn test_trailer_size_matches_object_count() {
        let mut document = Document::new();
        document.add_page(Page::a4()).unwrap();

        let bytes = serialized(&mut document);
        let content = String::from_utf8_lossy(&bytes);

        let size: usize = content
            .split("/Size ")
            .nth(1)
            .unwrap()
            .split_whitespace()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        // objects are numbered 1..size-1 with entry 0 free
        let expected_objects = size - 1;
        assert_eq!(content.matches(" 0 obj\n").count(), expected_objects);
    }
}
