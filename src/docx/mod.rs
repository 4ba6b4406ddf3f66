//! DOCX (Word) document host.
//!
//! Opens Office Open XML (.docx) packages, serves their body paragraphs
//! through [`DocumentService`](crate::service::DocumentService) and writes
//! them back with untouched parts of the package preserved.

mod document;
mod parser;
mod styles;
mod writer;

pub use document::DocxDocument;
pub use styles::{parse_default_font, OOXML_DEFAULT_SIZE};
