//! A `.docx` package served as a document.

use std::collections::HashMap;
use std::path::Path;

use super::parser::parse_body;
use super::styles::{parse_default_font, OOXML_DEFAULT_SIZE};
use super::writer::write_paragraph;
use crate::container::OoxmlContainer;
use crate::error::Result;
use crate::model::{FontAttribute, FontAttributes};
use crate::service::{DocumentService, InsertLocation, MemoryDocument, ParagraphRef, RangeRef, Staged};

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";

/// Where an original paragraph came from.
struct Slot {
    paragraph: ParagraphRef,
    span: std::ops::Range<usize>,
    open_tag: String,
    properties: Option<String>,
}

/// A Word document opened from a `.docx` package.
///
/// Body paragraphs are loaded into a [`MemoryDocument`] and served through
/// [`DocumentService`]. Saving rewrites only the paragraphs that were
/// changed or inserted; all other bytes of the package are kept.
///
/// # Example
///
/// ```no_run
/// use wordlens::{set_or_cancel_word_bold, DocxDocument};
///
/// let mut doc = DocxDocument::open("report.docx")?;
/// let first = doc.document().paragraph_refs()[0];
/// set_or_cancel_word_bold(&mut doc, first, 2, true)?;
/// doc.save("report.docx")?;
/// # Ok::<(), wordlens::Error>(())
/// ```
pub struct DocxDocument {
    container: OoxmlContainer,
    xml: String,
    body_start: usize,
    body_end: usize,
    slots: Vec<Slot>,
    defaults: FontAttributes,
    document: MemoryDocument,
}

impl DocxDocument {
    /// Open a document from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Opening {}", path.display());
        Self::from_container(OoxmlContainer::open(path)?)
    }

    /// Open a document from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_container(OoxmlContainer::from_bytes(data)?)
    }

    /// Open a document from an already opened container.
    pub fn from_container(container: OoxmlContainer) -> Result<Self> {
        let defaults = match container.read_xml(STYLES_PART) {
            Ok(styles) => parse_default_font(&styles)?,
            Err(_) => FontAttributes::with_size(OOXML_DEFAULT_SIZE),
        };

        let xml = container.read_xml(DOCUMENT_PART)?;
        let layout = parse_body(&xml, &defaults)?;

        let mut document = MemoryDocument::new().with_default_font(defaults);
        let slots: Vec<Slot> = layout
            .paragraphs
            .into_iter()
            .map(|parsed| Slot {
                paragraph: document.push_paragraph(parsed.paragraph),
                span: parsed.span,
                open_tag: parsed.open_tag,
                properties: parsed.properties,
            })
            .collect();

        log::debug!(
            "Loaded {} body paragraphs, default size {}pt",
            slots.len(),
            defaults.size
        );

        Ok(Self {
            container,
            body_start: layout.start,
            body_end: layout.end,
            xml,
            slots,
            defaults,
            document,
        })
    }

    /// The loaded paragraphs.
    pub fn document(&self) -> &MemoryDocument {
        &self.document
    }

    /// Mutable access to the loaded paragraphs.
    pub fn document_mut(&mut self) -> &mut MemoryDocument {
        &mut self.document
    }

    /// Run formatting the document applies when a run specifies none.
    pub fn default_font(&self) -> FontAttributes {
        self.defaults
    }

    /// Generate the `word/document.xml` part for the current content.
    pub fn to_document_xml(&self) -> String {
        let index: HashMap<ParagraphRef, usize> = self
            .slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (slot.paragraph, i))
            .collect();

        let mut out = String::with_capacity(self.xml.len());
        out.push_str(&self.xml[..self.body_start]);
        let mut cursor = self.body_start;
        let mut next_slot = 0;
        let mut inserted = Vec::new();

        for (paragraph_ref, paragraph) in self.document.iter() {
            let Some(&i) = index.get(&paragraph_ref) else {
                inserted.push(paragraph);
                continue;
            };

            // Paragraphs inserted at the start go right after <w:body>
            for new in inserted.drain(..) {
                out.push_str(&write_paragraph("<w:p>", None, new, &self.defaults));
            }

            // Drop removed paragraphs, keep whatever sits between them
            for removed in &self.slots[next_slot..i] {
                out.push_str(&self.xml[cursor..removed.span.start]);
                cursor = removed.span.end;
            }

            let slot = &self.slots[i];
            out.push_str(&self.xml[cursor..slot.span.start]);
            if self.document.is_modified(paragraph_ref) {
                out.push_str(&write_paragraph(
                    &slot.open_tag,
                    slot.properties.as_deref(),
                    paragraph,
                    &self.defaults,
                ));
            } else {
                out.push_str(&self.xml[slot.span.clone()]);
            }
            cursor = slot.span.end;
            next_slot = i + 1;
        }

        for removed in &self.slots[next_slot..] {
            out.push_str(&self.xml[cursor..removed.span.start]);
            cursor = removed.span.end;
        }

        let end = self.body_end.max(cursor);
        out.push_str(&self.xml[cursor..end]);
        for new in inserted {
            out.push_str(&write_paragraph("<w:p>", None, new, &self.defaults));
        }
        out.push_str(&self.xml[end..]);
        out
    }

    /// Serialize the package with the current content.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.document.has_pending() {
            log::warn!("Serializing a document with uncommitted operations");
        }
        let mut replacements = HashMap::new();
        replacements.insert(DOCUMENT_PART.to_string(), self.to_document_xml().into_bytes());
        self.container.rewrite(&replacements)
    }

    /// Write the package to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_bytes()?)?;
        log::info!("Saved {}", path.display());
        Ok(())
    }
}

impl DocumentService for DocxDocument {
    fn paragraphs(&mut self) -> Staged<Vec<ParagraphRef>> {
        self.document.paragraphs()
    }

    fn load_text(&mut self, paragraph: ParagraphRef) -> Staged<String> {
        self.document.load_text(paragraph)
    }

    fn word_ranges(&mut self, paragraph: ParagraphRef) -> Staged<Vec<RangeRef>> {
        self.document.word_ranges(paragraph)
    }

    fn load_range_text(&mut self, range: &RangeRef) -> Staged<String> {
        self.document.load_range_text(range)
    }

    fn load_font(&mut self, range: &RangeRef) -> Staged<FontAttributes> {
        self.document.load_font(range)
    }

    fn set_font_attribute(&mut self, range: &RangeRef, attribute: FontAttribute) {
        self.document.set_font_attribute(range, attribute)
    }

    fn insert_paragraph(&mut self, text: &str, location: InsertLocation) {
        self.document.insert_paragraph(text, location)
    }

    fn has_pending(&self) -> bool {
        self.document.has_pending()
    }

    fn commit(&mut self) -> Result<()> {
        self.document.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::{insert_paragraph, set_or_cancel_word_bold};
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;
    const FOOTER: &str = r#"<w:sectPr><w:pgSz w:w="12240"/></w:sectPr></w:body></w:document>"#;

    fn docx(body: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer.write_all(b"<Types/>").unwrap();
        writer.start_file(DOCUMENT_PART, options).unwrap();
        writer
            .write_all(format!("{}{}{}", HEADER, body, FOOTER).as_bytes())
            .unwrap();
        writer.finish().unwrap().into_inner()
    }

    const FIRST: &str = r#"<w:p w:rsidR="01"><w:r><w:t>keep me</w:t></w:r></w:p>"#;
    const SECOND: &str = r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t>change this word</w:t></w:r></w:p>"#;

    #[test]
    fn test_unmodified_document_is_identical() {
        let body = format!("{}{}", FIRST, SECOND);
        let doc = DocxDocument::from_bytes(docx(&body)).unwrap();
        assert_eq!(doc.to_document_xml(), format!("{}{}{}", HEADER, body, FOOTER));
        assert_eq!(doc.default_font().size, OOXML_DEFAULT_SIZE);
        assert_eq!(doc.document().texts(), vec!["keep me", "change this word"]);
    }

    #[test]
    fn test_only_modified_paragraph_is_rewritten() {
        let mut doc = DocxDocument::from_bytes(docx(&format!("{}{}", FIRST, SECOND))).unwrap();
        let second = doc.document().paragraph_refs()[1];
        set_or_cancel_word_bold(&mut doc, second, 2, true).unwrap();

        let xml = doc.to_document_xml();
        assert!(xml.contains(FIRST));
        assert!(!xml.contains(SECOND));
        assert!(xml.contains(
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t xml:space="preserve">change </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">this</w:t></w:r>"#
        ));
        assert!(xml.ends_with(FOOTER));
    }

    #[test]
    fn test_inserted_paragraphs_are_placed_in_body() {
        let mut doc = DocxDocument::from_bytes(docx(FIRST)).unwrap();
        insert_paragraph(&mut doc, "top", InsertLocation::Start).unwrap();
        insert_paragraph(&mut doc, "bottom", InsertLocation::End).unwrap();

        let xml = doc.to_document_xml();
        let top = r#"<w:p><w:r><w:t xml:space="preserve">top</w:t></w:r></w:p>"#;
        let bottom = r#"<w:p><w:r><w:t xml:space="preserve">bottom</w:t></w:r></w:p>"#;
        assert!(xml.contains(&format!("<w:body>{}{}", top, FIRST)));
        assert!(xml.contains(&format!("{}{}<w:sectPr>", FIRST, bottom)));
    }

    #[test]
    fn test_removed_paragraph_is_dropped() {
        let mut doc = DocxDocument::from_bytes(docx(&format!("{}{}", FIRST, SECOND))).unwrap();
        let first = doc.document().paragraph_refs()[0];
        doc.document_mut().remove_paragraph(first).unwrap();

        let xml = doc.to_document_xml();
        assert_eq!(xml, format!("{}{}{}", HEADER, SECOND, FOOTER));
    }

    #[test]
    fn test_saved_bytes_reopen() {
        let mut doc = DocxDocument::from_bytes(docx(SECOND)).unwrap();
        let paragraph = doc.document().paragraph_refs()[0];
        set_or_cancel_word_bold(&mut doc, paragraph, 3, true).unwrap();

        let reopened = DocxDocument::from_bytes(doc.to_bytes().unwrap()).unwrap();
        let runs = &reopened.document().iter().next().unwrap().1.runs;
        assert_eq!(reopened.document().texts(), vec!["change this word"]);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].text, "word");
        assert!(runs[1].font.bold);
    }
}
