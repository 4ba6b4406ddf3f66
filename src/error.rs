//! Error types for the wordlens library.

use std::io;
use thiserror::Error;

/// Result type alias for wordlens operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while locating, formatting or comparing words.
#[derive(Error, Debug)]
pub enum Error {
    /// A 1-based word index outside `1..=word_count`.
    #[error("Word index {index} out of range (paragraph has {word_count} words)")]
    WordIndexOutOfRange { index: usize, word_count: usize },

    /// The host could not map a word to a range.
    #[error("Range resolution failed: {0}")]
    RangeResolutionFailed(String),

    /// The paragraph text changed after the range was obtained.
    #[error("Stale range reference in paragraph {paragraph}")]
    StaleRangeReference { paragraph: u64 },

    /// A formatting value the host cannot apply.
    #[error("Invalid attribute value: {0}")]
    InvalidAttributeValue(String),

    /// One of the compared paragraphs has no words.
    #[error("Insufficient words: left paragraph has {left}, right paragraph has {right}")]
    InsufficientWords { left: usize, right: usize },

    /// The document does not contain enough paragraphs for the operation.
    #[error("Insufficient paragraphs: found {found}, need at least 2")]
    InsufficientParagraphs { found: usize },

    /// A 1-based paragraph index outside the document.
    #[error("Paragraph index {index} out of range (document has {paragraph_count} paragraphs)")]
    ParagraphIndexOutOfRange {
        index: usize,
        paragraph_count: usize,
    },

    /// A staged value was read before the commit that loads it.
    #[error("Property not loaded: {0} (commit the batch first)")]
    NotLoaded(&'static str),

    /// Failure reported by the document host, including commit failures.
    #[error("Document service error: {0}")]
    DocumentService(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or writing the ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// A required document component is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}
