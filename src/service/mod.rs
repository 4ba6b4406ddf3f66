//! The document access seam.
//!
//! The core never touches document content directly. It stages reads and
//! writes against a [`DocumentService`] and only consumes results after the
//! service's [`commit`](DocumentService::commit) returns. A staged read hands
//! back a [`Staged`] slot that is filled during the commit.

mod batch;
mod memory;

pub use batch::{run, Batch};
pub use memory::MemoryDocument;

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{FontAttribute, FontAttributes};

/// Handle to a paragraph owned by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParagraphRef {
    /// Host-assigned identifier, stable for the lifetime of the paragraph
    pub id: u64,
}

impl ParagraphRef {
    pub fn new(id: u64) -> Self {
        Self { id }
    }
}

/// Handle to a contiguous span of text inside a paragraph.
///
/// Only the host that issued a range can interpret it. The recorded
/// revision lets the host detect text edits made after the range was
/// handed out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeRef {
    /// Paragraph containing the range
    pub paragraph: ParagraphRef,
    /// Paragraph text revision the offsets refer to
    pub revision: u64,
    /// Start byte offset in the paragraph text
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

/// Where a new paragraph is inserted in the document body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertLocation {
    /// Before the first paragraph
    Start,
    /// After the last paragraph
    #[default]
    End,
}

/// A value requested from a host that becomes readable after commit.
pub struct Staged<T> {
    slot: Rc<OnceCell<T>>,
    property: &'static str,
}

impl<T> Staged<T> {
    /// Create an empty slot for the named property.
    pub fn pending(property: &'static str) -> Self {
        Self {
            slot: Rc::new(OnceCell::new()),
            property,
        }
    }

    /// Fill the slot. Hosts call this while executing a commit.
    ///
    /// A slot is filled at most once; later values are ignored.
    pub fn resolve(&self, value: T) {
        let _ = self.slot.set(value);
    }

    /// Check if the value has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Borrow the loaded value.
    pub fn get(&self) -> Result<&T> {
        self.slot.get().ok_or(Error::NotLoaded(self.property))
    }
}

impl<T: Clone> Staged<T> {
    /// Clone the loaded value out of the slot.
    pub fn value(&self) -> Result<T> {
        self.get().cloned()
    }
}

impl<T> Clone for Staged<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
            property: self.property,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Staged<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Staged")
            .field("property", &self.property)
            .field("value", &self.slot.get())
            .finish()
    }
}

/// Access to a host document through staged operations.
///
/// Every read returns a [`Staged`] slot and every write is queued; nothing
/// is observable until [`commit`](DocumentService::commit) completes.
/// Operations execute in the order they were staged.
pub trait DocumentService {
    /// Stage a read of all body paragraphs, in document order.
    fn paragraphs(&mut self) -> Staged<Vec<ParagraphRef>>;

    /// Stage a read of a paragraph's text.
    fn load_text(&mut self, paragraph: ParagraphRef) -> Staged<String>;

    /// Stage a read of a paragraph's whitespace-delimited word ranges,
    /// ordered left to right.
    fn word_ranges(&mut self, paragraph: ParagraphRef) -> Staged<Vec<RangeRef>>;

    /// Stage a read of the text covered by a range.
    fn load_range_text(&mut self, range: &RangeRef) -> Staged<String>;

    /// Stage a read of a range's formatting.
    fn load_font(&mut self, range: &RangeRef) -> Staged<FontAttributes>;

    /// Stage a formatting write on a range.
    fn set_font_attribute(&mut self, range: &RangeRef, attribute: FontAttribute);

    /// Stage the insertion of a new paragraph.
    fn insert_paragraph(&mut self, text: &str, location: InsertLocation);

    /// Check if operations are waiting for a commit.
    fn has_pending(&self) -> bool;

    /// Execute all staged operations.
    ///
    /// On failure the remaining staged operations are discarded and the
    /// error is returned to the caller.
    fn commit(&mut self) -> Result<()>;
}
