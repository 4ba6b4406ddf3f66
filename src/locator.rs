//! Word segmentation and word-index resolution.
//!
//! A word is a maximal run of non-whitespace characters. Word indices are
//! 1-based. Resolution never searches the paragraph for the word's text:
//! it asks the host for all word ranges of the paragraph and picks the Nth,
//! so repeated words resolve to the right occurrence.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::FontAttributes;
use crate::service::{Batch, DocumentService, ParagraphRef, RangeRef};

static WORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+").unwrap());

/// A word token with its byte span in the paragraph text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Word<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Split text into whitespace-delimited words.
///
/// Runs of spaces, tabs and line breaks count as a single delimiter.
///
/// # Example
///
/// ```
/// use wordlens::split_words;
///
/// let words: Vec<_> = split_words("In  the\tsmall town")
///     .into_iter()
///     .map(|w| w.text)
///     .collect();
/// assert_eq!(words, ["In", "the", "small", "town"]);
/// ```
pub fn split_words(text: &str) -> Vec<Word<'_>> {
    WORD_PATTERN
        .find_iter(text)
        .map(|m| Word {
            text: m.as_str(),
            start: m.start(),
            end: m.end(),
        })
        .collect()
}

/// Count the whitespace-delimited words in text.
pub fn word_count(text: &str) -> usize {
    WORD_PATTERN.find_iter(text).count()
}

/// Reject indices outside `1..=word_count`.
pub fn check_index(index: usize, word_count: usize) -> Result<()> {
    if index == 0 || index > word_count {
        return Err(Error::WordIndexOutOfRange { index, word_count });
    }
    Ok(())
}

/// A word resolved to a host range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordRange {
    /// 1-based word index
    pub index: usize,
    /// Word text as tokenized from the paragraph
    pub text: String,
    /// Host range covering the word
    pub range: RangeRef,
}

/// A word with its formatting snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordInfo {
    /// 1-based word index
    pub index: usize,
    /// Word text
    pub text: String,
    /// Formatting of the word
    pub font: FontAttributes,
}

/// Tokens of one paragraph paired with the host's ranges for them.
pub(crate) type Segmented = Vec<(String, RangeRef)>;

/// Load and tokenize paragraphs, pairing every token with its host range.
///
/// Fails with `RangeResolutionFailed` when the host reports a different
/// number of word ranges than the text tokenizes into.
pub(crate) fn segment<S>(batch: &mut Batch<'_, S>, paragraphs: &[ParagraphRef]) -> Result<Vec<Segmented>>
where
    S: DocumentService + ?Sized,
{
    let staged: Vec<_> = paragraphs
        .iter()
        .map(|&p| (p, batch.load_text(p), batch.word_ranges(p)))
        .collect();
    batch.sync()?;

    staged
        .iter()
        .map(|(paragraph, text, ranges)| -> Result<Segmented> {
            let words = split_words(text.get()?);
            let ranges = ranges.get()?;
            if words.len() != ranges.len() {
                return Err(Error::RangeResolutionFailed(format!(
                    "paragraph {} has {} words but the host reports {} word ranges",
                    paragraph.id,
                    words.len(),
                    ranges.len()
                )));
            }
            Ok(words
                .into_iter()
                .zip(ranges.iter().cloned())
                .map(|(w, r)| (w.text.to_string(), r))
                .collect())
        })
        .collect()
}

/// Read text and formatting for segmented words, starting at index 1.
///
/// Each range's text is checked against its token so that a shifted
/// range is reported instead of being read as the wrong word.
pub(crate) fn load_words<S>(batch: &mut Batch<'_, S>, words: &[(String, RangeRef)]) -> Result<Vec<WordInfo>>
where
    S: DocumentService + ?Sized,
{
    let staged: Vec<_> = words
        .iter()
        .map(|(_, range)| (batch.load_range_text(range), batch.load_font(range)))
        .collect();
    batch.sync()?;

    words
        .iter()
        .zip(staged)
        .enumerate()
        .map(|(i, ((expected, _), (text, font)))| -> Result<WordInfo> {
            verify_text(i + 1, expected, text.get()?)?;
            Ok(WordInfo {
                index: i + 1,
                text: expected.clone(),
                font: *font.get()?,
            })
        })
        .collect()
}

fn verify_text(index: usize, expected: &str, actual: &str) -> Result<()> {
    if expected != actual {
        return Err(Error::RangeResolutionFailed(format!(
            "word {} resolved to {:?}, expected {:?}",
            index, actual, expected
        )));
    }
    Ok(())
}

/// Resolve the `index`-th word (1-based) of a paragraph to a host range.
///
/// # Example
///
/// ```
/// use wordlens::{locate_word, MemoryDocument};
///
/// let mut doc = MemoryDocument::from_texts(["Hello world today"]);
/// let paragraph = doc.paragraph_refs()[0];
/// let word = locate_word(&mut doc, paragraph, 2)?;
/// assert_eq!(word.text, "world");
/// # Ok::<(), wordlens::Error>(())
/// ```
pub fn locate_word<S>(service: &mut S, paragraph: ParagraphRef, index: usize) -> Result<WordRange>
where
    S: DocumentService + ?Sized,
{
    let mut batch = Batch::new(service);
    let mut segmented = segment(&mut batch, &[paragraph])?;
    let words = segmented.pop().unwrap_or_default();
    check_index(index, words.len())?;

    let (text, range) = words[index - 1].clone();
    let resolved = batch.load_range_text(&range);
    batch.sync()?;
    verify_text(index, &text, resolved.get()?)?;

    log::debug!(
        "Located word {} {:?} at {}..{} in paragraph {}",
        index,
        text,
        range.start,
        range.end,
        paragraph.id
    );
    Ok(WordRange { index, text, range })
}

/// Resolve a word and read its formatting.
pub fn inspect_word<S>(service: &mut S, paragraph: ParagraphRef, index: usize) -> Result<WordInfo>
where
    S: DocumentService + ?Sized,
{
    let word = locate_word(service, paragraph, index)?;
    let mut batch = Batch::new(service);
    let font = batch.load_font(&word.range);
    batch.sync()?;
    Ok(WordInfo {
        index,
        text: word.text,
        font: *font.get()?,
    })
}

/// Read every word of a paragraph with its formatting.
pub fn read_words<S>(service: &mut S, paragraph: ParagraphRef) -> Result<Vec<WordInfo>>
where
    S: DocumentService + ?Sized,
{
    let mut batch = Batch::new(service);
    let mut segmented = segment(&mut batch, &[paragraph])?;
    let words = segmented.pop().unwrap_or_default();
    load_words(&mut batch, &words)
}

/// Resolve a 1-based paragraph index to a paragraph handle.
pub fn paragraph_at<S>(service: &mut S, index: usize) -> Result<ParagraphRef>
where
    S: DocumentService + ?Sized,
{
    let mut batch = Batch::new(service);
    let paragraphs = batch.paragraphs();
    batch.sync()?;
    let paragraphs = paragraphs.get()?;

    if index == 0 || index > paragraphs.len() {
        return Err(Error::ParagraphIndexOutOfRange {
            index,
            paragraph_count: paragraphs.len(),
        });
    }
    Ok(paragraphs[index - 1])
}
