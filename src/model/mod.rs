//! Content model shared by the document hosts.
//!
//! A paragraph is a sequence of text runs, each with one set of
//! [`FontAttributes`]. Hosts keep their content in this shape and the core
//! reads it back through the [`DocumentService`](crate::service::DocumentService)
//! trait.

mod font;
mod paragraph;

pub use font::*;
pub use paragraph::*;
