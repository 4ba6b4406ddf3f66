//! In-memory document host.

use super::{DocumentService, InsertLocation, ParagraphRef, RangeRef, Staged};
use crate::error::{Error, Result};
use crate::locator::split_words;
use crate::model::{FontAttribute, FontAttributes, Paragraph, TextRun};

struct Entry {
    id: u64,
    revision: u64,
    modified: bool,
    paragraph: Paragraph,
}

enum Operation {
    Paragraphs(Staged<Vec<ParagraphRef>>),
    Text(ParagraphRef, Staged<String>),
    WordRanges(ParagraphRef, Staged<Vec<RangeRef>>),
    RangeText(RangeRef, Staged<String>),
    Font(RangeRef, Staged<FontAttributes>),
    SetFont(RangeRef, FontAttribute),
    Insert(String, InsertLocation),
}

/// A document held in memory, served with staged/commit semantics.
///
/// Word ranges are computed with the same tokenization the core uses.
/// Every text edit bumps the paragraph's revision, so ranges obtained
/// before the edit are rejected at commit as stale.
pub struct MemoryDocument {
    entries: Vec<Entry>,
    next_id: u64,
    queue: Vec<Operation>,
    default_font: FontAttributes,
    fail_next_commit: Option<String>,
    commits: usize,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            queue: Vec::new(),
            default_font: FontAttributes::default(),
            fail_next_commit: None,
            commits: 0,
        }
    }

    /// Create a document with one plain paragraph per text.
    pub fn from_texts<I, T>(texts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut doc = Self::new();
        for text in texts {
            doc.push_paragraph(Paragraph::with_text(text));
        }
        doc
    }

    /// Set the formatting given to inserted paragraphs.
    pub fn with_default_font(mut self, font: FontAttributes) -> Self {
        self.default_font = font;
        self
    }

    /// Formatting given to inserted paragraphs.
    pub fn default_font(&self) -> FontAttributes {
        self.default_font
    }

    /// Append a paragraph directly, bypassing the staging queue.
    pub fn push_paragraph(&mut self, paragraph: Paragraph) -> ParagraphRef {
        let id = self.allocate_id();
        self.entries.push(Entry {
            id,
            revision: 0,
            modified: false,
            paragraph,
        });
        ParagraphRef::new(id)
    }

    /// Replace a paragraph's text directly, as a concurrent editor would.
    ///
    /// The new text takes the formatting of the paragraph's first run.
    pub fn edit_text(&mut self, paragraph: ParagraphRef, text: impl Into<String>) -> Result<()> {
        let default_font = self.default_font;
        let entry = self.entry_mut(paragraph)?;
        let font = entry
            .paragraph
            .runs
            .first()
            .map(|r| r.font)
            .unwrap_or(default_font);
        entry.paragraph = Paragraph::from_runs(vec![TextRun::styled(text, font)]);
        entry.revision += 1;
        entry.modified = true;
        Ok(())
    }

    /// Remove a paragraph directly, as a concurrent editor would.
    pub fn remove_paragraph(&mut self, paragraph: ParagraphRef) -> Result<Paragraph> {
        let position = self
            .entries
            .iter()
            .position(|e| e.id == paragraph.id)
            .ok_or_else(|| unknown_paragraph(paragraph))?;
        Ok(self.entries.remove(position).paragraph)
    }

    /// Make the next commit fail with the given host message.
    pub fn fail_next_commit(&mut self, message: impl Into<String>) {
        self.fail_next_commit = Some(message.into());
    }

    /// Number of paragraphs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the document has no paragraphs.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of commits that reached execution.
    pub fn commit_count(&self) -> usize {
        self.commits
    }

    /// Paragraph handles in document order, read without staging.
    pub fn paragraph_refs(&self) -> Vec<ParagraphRef> {
        self.entries.iter().map(|e| ParagraphRef::new(e.id)).collect()
    }

    /// Borrow a paragraph's content.
    pub fn paragraph(&self, paragraph: ParagraphRef) -> Option<&Paragraph> {
        self.entries
            .iter()
            .find(|e| e.id == paragraph.id)
            .map(|e| &e.paragraph)
    }

    /// Iterate paragraphs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (ParagraphRef, &Paragraph)> {
        self.entries
            .iter()
            .map(|e| (ParagraphRef::new(e.id), &e.paragraph))
    }

    /// Plain text of every paragraph.
    pub fn texts(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.paragraph.plain_text()).collect()
    }

    /// Check if a paragraph was written to since it was added.
    pub fn is_modified(&self, paragraph: ParagraphRef) -> bool {
        self.entries
            .iter()
            .any(|e| e.id == paragraph.id && e.modified)
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn entry(&self, paragraph: ParagraphRef) -> Result<&Entry> {
        self.entries
            .iter()
            .find(|e| e.id == paragraph.id)
            .ok_or_else(|| unknown_paragraph(paragraph))
    }

    fn entry_mut(&mut self, paragraph: ParagraphRef) -> Result<&mut Entry> {
        self.entries
            .iter_mut()
            .find(|e| e.id == paragraph.id)
            .ok_or_else(|| unknown_paragraph(paragraph))
    }

    /// Find the entry behind a range and check the range still applies.
    fn checked_entry(&mut self, range: &RangeRef) -> Result<&mut Entry> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == range.paragraph.id)
            .ok_or_else(|| {
                Error::RangeResolutionFailed(format!(
                    "paragraph {} no longer exists",
                    range.paragraph.id
                ))
            })?;

        if entry.revision != range.revision {
            return Err(Error::StaleRangeReference {
                paragraph: range.paragraph.id,
            });
        }

        let len = entry.paragraph.text_len();
        if range.start >= range.end || range.end > len {
            return Err(Error::RangeResolutionFailed(format!(
                "range {}..{} outside paragraph {} ({} bytes)",
                range.start, range.end, range.paragraph.id, len
            )));
        }

        Ok(entry)
    }

    fn execute(&mut self, operation: Operation) -> Result<()> {
        match operation {
            Operation::Paragraphs(slot) => slot.resolve(self.paragraph_refs()),
            Operation::Text(paragraph, slot) => {
                slot.resolve(self.entry(paragraph)?.paragraph.plain_text());
            }
            Operation::WordRanges(paragraph, slot) => {
                let entry = self.entry(paragraph)?;
                let text = entry.paragraph.plain_text();
                let ranges = split_words(&text)
                    .into_iter()
                    .map(|w| RangeRef {
                        paragraph,
                        revision: entry.revision,
                        start: w.start,
                        end: w.end,
                    })
                    .collect();
                slot.resolve(ranges);
            }
            Operation::RangeText(range, slot) => {
                let entry = self.checked_entry(&range)?;
                let text = entry.paragraph.plain_text();
                let covered = text.get(range.start..range.end).ok_or_else(|| {
                    Error::RangeResolutionFailed(format!(
                        "range {}..{} splits a character",
                        range.start, range.end
                    ))
                })?;
                slot.resolve(covered.to_string());
            }
            Operation::Font(range, slot) => {
                let entry = self.checked_entry(&range)?;
                let font = entry.paragraph.font_at(range.start).ok_or_else(|| {
                    Error::RangeResolutionFailed(format!(
                        "no run at offset {} in paragraph {}",
                        range.start, range.paragraph.id
                    ))
                })?;
                slot.resolve(font);
            }
            Operation::SetFont(range, attribute) => {
                attribute.validate()?;
                let entry = self.checked_entry(&range)?;
                entry
                    .paragraph
                    .apply_font(range.start, range.end, attribute)?;
                entry.modified = true;
            }
            Operation::Insert(text, location) => {
                let id = self.allocate_id();
                let entry = Entry {
                    id,
                    revision: 0,
                    modified: true,
                    paragraph: Paragraph::from_runs(vec![TextRun::styled(text, self.default_font)]),
                };
                match location {
                    InsertLocation::Start => self.entries.insert(0, entry),
                    InsertLocation::End => self.entries.push(entry),
                }
            }
        }
        Ok(())
    }
}

fn unknown_paragraph(paragraph: ParagraphRef) -> Error {
    Error::DocumentService(format!("paragraph {} not found", paragraph.id))
}

impl DocumentService for MemoryDocument {
    fn paragraphs(&mut self) -> Staged<Vec<ParagraphRef>> {
        let slot = Staged::pending("paragraphs");
        self.queue.push(Operation::Paragraphs(slot.clone()));
        slot
    }

    fn load_text(&mut self, paragraph: ParagraphRef) -> Staged<String> {
        let slot = Staged::pending("text");
        self.queue.push(Operation::Text(paragraph, slot.clone()));
        slot
    }

    fn word_ranges(&mut self, paragraph: ParagraphRef) -> Staged<Vec<RangeRef>> {
        let slot = Staged::pending("words");
        self.queue.push(Operation::WordRanges(paragraph, slot.clone()));
        slot
    }

    fn load_range_text(&mut self, range: &RangeRef) -> Staged<String> {
        let slot = Staged::pending("range text");
        self.queue.push(Operation::RangeText(range.clone(), slot.clone()));
        slot
    }

    fn load_font(&mut self, range: &RangeRef) -> Staged<FontAttributes> {
        let slot = Staged::pending("font");
        self.queue.push(Operation::Font(range.clone(), slot.clone()));
        slot
    }

    fn set_font_attribute(&mut self, range: &RangeRef, attribute: FontAttribute) {
        self.queue.push(Operation::SetFont(range.clone(), attribute));
    }

    fn insert_paragraph(&mut self, text: &str, location: InsertLocation) {
        self.queue
            .push(Operation::Insert(text.to_string(), location));
    }

    fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    fn commit(&mut self) -> Result<()> {
        let queue = std::mem::take(&mut self.queue);
        if let Some(message) = self.fail_next_commit.take() {
            log::debug!("Commit rejected, dropping {} staged operations", queue.len());
            return Err(Error::DocumentService(message));
        }

        self.commits += 1;
        log::debug!("Committing {} staged operations", queue.len());
        for operation in queue {
            self.execute(operation)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UnderlineStyle;

    fn first_ranges(doc: &mut MemoryDocument) -> Vec<RangeRef> {
        let target = doc.paragraph_refs()[0];
        let ranges = doc.word_ranges(target);
        doc.commit().unwrap();
        ranges.value().unwrap()
    }

    #[test]
    fn test_reads_wait_for_commit() {
        let mut doc = MemoryDocument::from_texts(["Hello world"]);
        let target = doc.paragraph_refs()[0];
        let text = doc.load_text(target);
        assert!(matches!(text.get(), Err(Error::NotLoaded("text"))));
        doc.commit().unwrap();
        assert_eq!(text.get().unwrap(), "Hello world");
        assert_eq!(doc.commit_count(), 1);
    }

    #[test]
    fn test_word_ranges_skip_whitespace_runs() {
        let mut doc = MemoryDocument::from_texts(["  alpha \t beta\ngamma  "]);
        let ranges = first_ranges(&mut doc);
        let offsets: Vec<_> = ranges.iter().map(|r| (r.start, r.end)).collect();
        assert_eq!(offsets, vec![(2, 7), (10, 14), (15, 20)]);
    }

    #[test]
    fn test_writes_are_ordered_with_reads() {
        let mut doc = MemoryDocument::from_texts(["red blue"]);
        let ranges = first_ranges(&mut doc);

        let before = doc.load_font(&ranges[1]);
        doc.set_font_attribute(&ranges[1], FontAttribute::Underline(UnderlineStyle::Double));
        let after = doc.load_font(&ranges[1]);
        doc.commit().unwrap();

        assert_eq!(before.get().unwrap().underline, UnderlineStyle::None);
        assert_eq!(after.get().unwrap().underline, UnderlineStyle::Double);
        assert!(doc.is_modified(doc.paragraph_refs()[0]));
    }

    #[test]
    fn test_stale_range_after_edit() {
        let mut doc = MemoryDocument::from_texts(["one two three"]);
        let ranges = first_ranges(&mut doc);
        doc.edit_text(ranges[0].paragraph, "zero one two three").unwrap();

        doc.set_font_attribute(&ranges[1], FontAttribute::Bold(true));
        let err = doc.commit().unwrap_err();
        assert!(matches!(err, Error::StaleRangeReference { .. }));
        assert!(!doc.has_pending());
    }

    #[test]
    fn test_removed_paragraph_fails_resolution() {
        let mut doc = MemoryDocument::from_texts(["one two"]);
        let ranges = first_ranges(&mut doc);
        doc.remove_paragraph(ranges[0].paragraph).unwrap();

        let _ = doc.load_range_text(&ranges[0]);
        assert!(matches!(
            doc.commit(),
            Err(Error::RangeResolutionFailed(_))
        ));
    }

    #[test]
    fn test_rejected_commit_discards_queue() {
        let mut doc = MemoryDocument::from_texts(["one"]);
        doc.insert_paragraph("two", InsertLocation::End);
        doc.fail_next_commit("sync failed");
        assert!(matches!(doc.commit(), Err(Error::DocumentService(_))));
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.commit_count(), 0);
    }

    #[test]
    fn test_insert_uses_default_font() {
        let mut doc = MemoryDocument::new().with_default_font(FontAttributes::with_size(12.0));
        doc.insert_paragraph("added", InsertLocation::End);
        doc.commit().unwrap();
        let target = doc.paragraph_refs()[0];
        assert_eq!(doc.paragraph(target).unwrap().runs[0].font.size, 12.0);
        assert!(doc.is_modified(target));
    }

    #[test]
    fn test_invalid_size_rejected_at_commit() {
        let mut doc = MemoryDocument::from_texts(["one"]);
        let ranges = first_ranges(&mut doc);
        doc.set_font_attribute(&ranges[0], FontAttribute::Size(0.0));
        assert!(matches!(
            doc.commit(),
            Err(Error::InvalidAttributeValue(_))
        ));
    }
}
