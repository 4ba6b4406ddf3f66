//! Character formatting on located words.
//!
//! Every write sets exactly one attribute and commits before returning.
//! Writes are idempotent: applying the same value twice is indistinguishable
//! from applying it once.

use crate::error::Result;
use crate::locator::{locate_word, WordRange};
use crate::model::{FontAttribute, UnderlineStyle};
use crate::service::{Batch, DocumentService, InsertLocation, ParagraphRef};

/// Apply one attribute to a located word.
pub fn apply_attribute<S>(service: &mut S, word: &WordRange, attribute: FontAttribute) -> Result<()>
where
    S: DocumentService + ?Sized,
{
    attribute.validate()?;

    let mut batch = Batch::new(service);
    batch.set_font_attribute(&word.range, attribute);
    batch.finish()?;

    log::debug!(
        "Applied {} to word {} {:?}",
        attribute.name(),
        word.index,
        word.text
    );
    Ok(())
}

/// Set or clear bold on a word.
pub fn set_bold<S>(service: &mut S, word: &WordRange, enabled: bool) -> Result<()>
where
    S: DocumentService + ?Sized,
{
    apply_attribute(service, word, FontAttribute::Bold(enabled))
}

/// Set or clear underline on a word.
///
/// Enabling uses [`UnderlineStyle::Single`]; disabling always uses
/// [`UnderlineStyle::None`].
pub fn set_underline<S>(service: &mut S, word: &WordRange, enabled: bool) -> Result<()>
where
    S: DocumentService + ?Sized,
{
    let style = if enabled {
        UnderlineStyle::Single
    } else {
        UnderlineStyle::None
    };
    set_underline_style(service, word, style)
}

/// Set a specific underline style on a word.
pub fn set_underline_style<S>(service: &mut S, word: &WordRange, style: UnderlineStyle) -> Result<()>
where
    S: DocumentService + ?Sized,
{
    apply_attribute(service, word, FontAttribute::Underline(style))
}

/// Set the font size of a word, in points.
///
/// Fails with `InvalidAttributeValue` unless `points` is finite and positive.
pub fn set_size<S>(service: &mut S, word: &WordRange, points: f64) -> Result<()>
where
    S: DocumentService + ?Sized,
{
    apply_attribute(service, word, FontAttribute::Size(points))
}

/// Locate the `index`-th word of a paragraph and apply one attribute to it.
///
/// The value is validated before the host is contacted.
pub fn format_word<S>(
    service: &mut S,
    paragraph: ParagraphRef,
    index: usize,
    attribute: FontAttribute,
) -> Result<WordRange>
where
    S: DocumentService + ?Sized,
{
    attribute.validate()?;
    let word = locate_word(service, paragraph, index)?;
    apply_attribute(service, &word, attribute)?;
    Ok(word)
}

/// Make the `index`-th word bold, or remove its bold.
///
/// # Example
///
/// ```
/// use wordlens::{inspect_word, set_or_cancel_word_bold, MemoryDocument};
///
/// let mut doc = MemoryDocument::from_texts(["In the small charming town"]);
/// let paragraph = doc.paragraph_refs()[0];
/// set_or_cancel_word_bold(&mut doc, paragraph, 2, true)?;
/// assert!(inspect_word(&mut doc, paragraph, 2)?.font.bold);
/// # Ok::<(), wordlens::Error>(())
/// ```
pub fn set_or_cancel_word_bold<S>(
    service: &mut S,
    paragraph: ParagraphRef,
    index: usize,
    enabled: bool,
) -> Result<WordRange>
where
    S: DocumentService + ?Sized,
{
    format_word(service, paragraph, index, FontAttribute::Bold(enabled))
}

/// Underline the `index`-th word, or remove its underline.
pub fn set_or_cancel_word_underline<S>(
    service: &mut S,
    paragraph: ParagraphRef,
    index: usize,
    enabled: bool,
) -> Result<WordRange>
where
    S: DocumentService + ?Sized,
{
    let style = if enabled {
        UnderlineStyle::Single
    } else {
        UnderlineStyle::None
    };
    format_word(service, paragraph, index, FontAttribute::Underline(style))
}

/// Set the font size of the `index`-th word.
pub fn set_word_size<S>(
    service: &mut S,
    paragraph: ParagraphRef,
    index: usize,
    points: f64,
) -> Result<WordRange>
where
    S: DocumentService + ?Sized,
{
    format_word(service, paragraph, index, FontAttribute::Size(points))
}

/// Insert a paragraph of plain text at the start or end of the body.
pub fn insert_paragraph<S>(service: &mut S, text: &str, location: InsertLocation) -> Result<()>
where
    S: DocumentService + ?Sized,
{
    let mut batch = Batch::new(service);
    batch.insert_paragraph(text, location);
    batch.finish()?;
    log::debug!("Inserted paragraph at {:?}", location);
    Ok(())
}
