//! # wordlens
//!
//! Word-indexed formatting and paragraph comparison for Word documents.
//!
//! Documents are reached through a [`DocumentService`]: reads and writes are
//! staged and take effect when the service commits. On top of that seam the
//! crate locates the n-th word of a paragraph, toggles its bold, underline
//! or size, and compares two paragraphs word by word.
//!
//! ## Quick Start
//!
//! ```
//! use wordlens::{compare_paragraphs, inspect_word, set_or_cancel_word_bold, MemoryDocument};
//!
//! let mut doc = MemoryDocument::from_texts(["In the small town", "In the small town"]);
//! let refs = doc.paragraph_refs();
//!
//! set_or_cancel_word_bold(&mut doc, refs[0], 2, true)?;
//! assert!(inspect_word(&mut doc, refs[0], 2)?.font.bold);
//!
//! let comparison = compare_paragraphs(&mut doc, refs[0], refs[1])?;
//! assert!(!comparison.equal);
//! # Ok::<(), wordlens::Error>(())
//! ```
//!
//! ## Word Documents
//!
//! ```no_run
//! use wordlens::{set_word_size, DocxDocument};
//!
//! let mut doc = DocxDocument::open("report.docx")?;
//! let first = wordlens::paragraph_at(&mut doc, 1)?;
//! set_word_size(&mut doc, first, 3, 16.0)?;
//! doc.save("report.docx")?;
//! # Ok::<(), wordlens::Error>(())
//! ```
//!
//! ## Features
//!
//! - `docx` (default): `.docx` package support

#[cfg(feature = "docx")]
pub mod container;
pub mod differ;
pub mod error;
pub mod formatter;
pub mod locator;
pub mod model;
pub mod options;
pub mod service;

#[cfg(feature = "docx")]
pub mod docx;

// Re-exports
pub use differ::{
    compare_first_paragraphs, compare_paragraphs, compare_paragraphs_with_options,
    ParagraphComparison, WordVerdict,
};
pub use error::{Error, Result};
pub use formatter::{
    apply_attribute, format_word, insert_paragraph, set_bold, set_or_cancel_word_bold,
    set_or_cancel_word_underline, set_size, set_underline, set_underline_style, set_word_size,
};
pub use locator::{
    inspect_word, locate_word, paragraph_at, read_words, split_words, word_count, WordInfo,
    WordRange,
};
pub use model::{
    ExplicitAttributes, FontAttribute, FontAttributes, Paragraph, RunProperty, TextRun, UnderlineStyle,
    Verbatim,
};
pub use options::CompareOptions;
pub use service::{
    run, Batch, DocumentService, InsertLocation, MemoryDocument, ParagraphRef, RangeRef, Staged,
};

#[cfg(feature = "docx")]
pub use container::OoxmlContainer;
#[cfg(feature = "docx")]
pub use docx::DocxDocument;

#[cfg(feature = "docx")]
use std::path::Path;

/// Open a `.docx` file.
///
/// # Example
///
/// ```no_run
/// let mut doc = wordlens::open_docx("document.docx")?;
/// let para = wordlens::paragraph_at(&mut doc, 1)?;
/// let words = wordlens::read_words(&mut doc, para)?;
/// println!("{} words", words.len());
/// # Ok::<(), wordlens::Error>(())
/// ```
#[cfg(feature = "docx")]
pub fn open_docx(path: impl AsRef<Path>) -> Result<DocxDocument> {
    DocxDocument::open(path)
}

/// Get the library version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
